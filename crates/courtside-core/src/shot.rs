//! Shot records and data set loading.

use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::error::CoreError;

/// One shot attempt from the data set.
///
/// Missing fields and JSON `null`s decode to the field's default, so a data
/// set with unlabelled rows (no `shot_made_flag`) still loads.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShotRecord {
    /// Play-by-play description, e.g. `Jump Shot`.
    #[serde(deserialize_with = "nullable")]
    pub action_type: String,
    /// Coarse shot category, e.g. `Dunk`.
    #[serde(deserialize_with = "nullable")]
    pub combined_shot_type: String,
    /// Event number within the game.
    #[serde(deserialize_with = "nullable")]
    pub game_event_id: i64,
    /// Game identifier.
    #[serde(deserialize_with = "nullable")]
    pub game_id: i64,
    /// Latitude of the shot location.
    #[serde(deserialize_with = "nullable")]
    pub lat: f64,
    /// Horizontal court position in tenths of a foot, basket at 0.
    #[serde(deserialize_with = "nullable")]
    pub loc_x: f64,
    /// Distance from the basket in tenths of a foot.
    #[serde(deserialize_with = "nullable")]
    pub loc_y: f64,
    /// Longitude of the shot location.
    #[serde(deserialize_with = "nullable")]
    pub lon: f64,
    /// Minutes left in the period.
    #[serde(deserialize_with = "nullable")]
    pub minutes_remaining: i64,
    /// Period number; overtime periods continue past 4.
    #[serde(deserialize_with = "nullable")]
    pub period: i64,
    /// 1 for a playoff game, 0 otherwise.
    #[serde(deserialize_with = "nullable")]
    pub playoffs: i64,
    /// Season label, e.g. `2000-01`.
    #[serde(deserialize_with = "nullable")]
    pub season: String,
    /// Seconds left in the current minute.
    #[serde(deserialize_with = "nullable")]
    pub seconds_remaining: i64,
    /// Shot distance in feet.
    #[serde(deserialize_with = "nullable")]
    pub shot_distance: i64,
    /// 1 if made, 0 if missed or unlabelled.
    #[serde(deserialize_with = "nullable")]
    pub shot_made_flag: i64,
    /// `2PT Field Goal` or `3PT Field Goal`.
    #[serde(deserialize_with = "nullable")]
    pub shot_type: String,
    /// Court side area, e.g. `Left Side(L)`.
    #[serde(deserialize_with = "nullable")]
    pub shot_zone_area: String,
    /// Zone, e.g. `Mid-Range`.
    #[serde(deserialize_with = "nullable")]
    pub shot_zone_basic: String,
    /// Distance bucket, e.g. `16-24 ft.`.
    #[serde(deserialize_with = "nullable")]
    pub shot_zone_range: String,
    /// Shooter's team identifier.
    #[serde(deserialize_with = "nullable")]
    pub team_id: i64,
    /// Shooter's team name.
    #[serde(deserialize_with = "nullable")]
    pub team_name: String,
    /// Game date as `YYYY-MM-DD`.
    #[serde(deserialize_with = "nullable")]
    pub game_date: String,
    /// Game location as given in the data set.
    #[serde(deserialize_with = "nullable")]
    pub location: String,
    /// Opponent abbreviation, e.g. `POR`.
    #[serde(deserialize_with = "nullable")]
    pub opponent: String,
    /// Unique shot identifier.
    #[serde(deserialize_with = "nullable")]
    pub shot_id: i64,
}

impl ShotRecord {
    /// Whether the shot went in.
    #[must_use]
    pub fn is_made(&self) -> bool {
        self.shot_made_flag == 1
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse a JSON array of shot records.
pub fn parse_shots(data: &[u8]) -> Result<Vec<ShotRecord>, serde_json::Error> {
    serde_json::from_slice(data)
}

/// Load the shot data set from `path`.
pub fn load_shots(path: &Path) -> Result<Vec<ShotRecord>, CoreError> {
    let data = std::fs::read(path).map_err(|source| CoreError::DataIo {
        path: path.to_path_buf(),
        source,
    })?;
    let shots = parse_shots(&data).map_err(|source| CoreError::DataParse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), records = shots.len(), "Shot data loaded");
    Ok(shots)
}
