//! Field filters for render jobs.
//!
//! A filter spec is `"Field: value"`. The field name is resolved once, at
//! decode time, against a static table of typed accessors; both the record
//! attribute names (`Period`, `ShotZoneArea`) and the data set's column names
//! (`period`, `shot_zone_area`) are accepted.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use crate::job::JobError;
use crate::shot::ShotRecord;

/// Typed read access to one shot attribute.
#[derive(Clone, Copy)]
pub enum FieldAccessor {
    /// Integer attribute, compared after parsing the filter value as `i64`.
    Int(fn(&ShotRecord) -> i64),
    /// Floating-point attribute, compared after parsing the filter value as `f64`.
    Float(fn(&ShotRecord) -> f64),
    /// Text attribute, compared against the trimmed filter value.
    Text(fn(&ShotRecord) -> &str),
}

impl fmt::Debug for FieldAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(_) => f.write_str("Int"),
            Self::Float(_) => f.write_str("Float"),
            Self::Text(_) => f.write_str("Text"),
        }
    }
}

/// `(record name, column name, accessor)` for every filterable attribute.
const FIELDS: &[(&str, &str, FieldAccessor)] = &[
    ("ActionType", "action_type", FieldAccessor::Text(|s| s.action_type.as_str())),
    ("CombinedShotType", "combined_shot_type", FieldAccessor::Text(|s| s.combined_shot_type.as_str())),
    ("GameEventID", "game_event_id", FieldAccessor::Int(|s| s.game_event_id)),
    ("GameId", "game_id", FieldAccessor::Int(|s| s.game_id)),
    ("Lat", "lat", FieldAccessor::Float(|s| s.lat)),
    ("X", "loc_x", FieldAccessor::Float(|s| s.loc_x)),
    ("Y", "loc_y", FieldAccessor::Float(|s| s.loc_y)),
    ("Lon", "lon", FieldAccessor::Float(|s| s.lon)),
    ("MinutesRemaining", "minutes_remaining", FieldAccessor::Int(|s| s.minutes_remaining)),
    ("Period", "period", FieldAccessor::Int(|s| s.period)),
    ("Playoffs", "playoffs", FieldAccessor::Int(|s| s.playoffs)),
    ("Season", "season", FieldAccessor::Text(|s| s.season.as_str())),
    ("SecondsRemaining", "seconds_remaining", FieldAccessor::Int(|s| s.seconds_remaining)),
    ("ShotDistance", "shot_distance", FieldAccessor::Int(|s| s.shot_distance)),
    ("ShotMadeFlag", "shot_made_flag", FieldAccessor::Int(|s| s.shot_made_flag)),
    ("ShotType", "shot_type", FieldAccessor::Text(|s| s.shot_type.as_str())),
    ("ShotZoneArea", "shot_zone_area", FieldAccessor::Text(|s| s.shot_zone_area.as_str())),
    ("ShotZoneBasic", "shot_zone_basic", FieldAccessor::Text(|s| s.shot_zone_basic.as_str())),
    ("ShotZoneRange", "shot_zone_range", FieldAccessor::Text(|s| s.shot_zone_range.as_str())),
    ("TeamId", "team_id", FieldAccessor::Int(|s| s.team_id)),
    ("TeamName", "team_name", FieldAccessor::Text(|s| s.team_name.as_str())),
    ("GameDate", "game_date", FieldAccessor::Text(|s| s.game_date.as_str())),
    ("Location", "location", FieldAccessor::Text(|s| s.location.as_str())),
    ("Opponent", "opponent", FieldAccessor::Text(|s| s.opponent.as_str())),
    ("ShotID", "shot_id", FieldAccessor::Int(|s| s.shot_id)),
];

fn field_table() -> &'static HashMap<&'static str, (&'static str, FieldAccessor)> {
    static TABLE: OnceLock<HashMap<&'static str, (&'static str, FieldAccessor)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = HashMap::with_capacity(FIELDS.len() * 2);
        for &(name, column, accessor) in FIELDS {
            table.insert(name, (name, accessor));
            table.insert(column, (name, accessor));
        }
        table
    })
}

/// Look up the accessor for a field name in either spelling.
///
/// Returns the canonical record name alongside the accessor.
#[must_use]
pub fn lookup(field: &str) -> Option<(&'static str, FieldAccessor)> {
    field_table().get(field).copied()
}

/// One `field == value` predicate over shot records.
#[derive(Debug, Clone)]
pub struct FieldFilter {
    field: &'static str,
    accessor: FieldAccessor,
    expected: String,
    as_int: Option<i64>,
    as_float: Option<f64>,
}

impl FieldFilter {
    /// Parse a `"Field: value"` spec.
    pub fn parse(spec: &str) -> Result<Self, JobError> {
        let (key, value) = spec.split_once(':').ok_or_else(|| JobError::Malformed {
            line: spec.to_string(),
            reason: "filter spec must have the form `Field: value`".into(),
        })?;
        let key = key.trim();
        let (field, accessor) = lookup(key).ok_or_else(|| JobError::UnknownField {
            field: key.to_string(),
            spec: spec.to_string(),
        })?;
        let expected = value.trim().to_string();
        Ok(Self {
            field,
            accessor,
            as_int: expected.parse().ok(),
            as_float: expected.parse().ok(),
            expected,
        })
    }

    /// Canonical field name.
    #[must_use]
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Trimmed expected value.
    #[must_use]
    pub fn expected(&self) -> &str {
        &self.expected
    }

    /// Whether `shot` satisfies this predicate.
    ///
    /// A value that does not parse as the field's numeric type never matches.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn matches(&self, shot: &ShotRecord) -> bool {
        match self.accessor {
            FieldAccessor::Int(get) => self.as_int == Some(get(shot)),
            FieldAccessor::Float(get) => self.as_float == Some(get(shot)),
            FieldAccessor::Text(get) => get(shot) == self.expected,
        }
    }
}

impl PartialEq for FieldFilter {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field && self.expected == other.expected
    }
}

/// Logical AND of every filter; an empty set keeps every record.
#[must_use]
pub fn matches_all(filters: &[FieldFilter], shot: &ShotRecord) -> bool {
    filters.iter().all(|f| f.matches(shot))
}
