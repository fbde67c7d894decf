//! Shot chart rendering.
//!
//! Render workers each fill a private [`ChartLayer`]; the dispatcher merges
//! the layers into a [`ShotChart`] and hands it to a [`Renderer`]. The
//! default renderer rasterizes the chart into an RGB PNG: missed shots as
//! purple crosses, made shots as gold rings, on a black background. Axes are
//! fitted to the plotted points, falling back to half-court bounds when there
//! is nothing to fit.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::constants::{CHART_HEIGHT, CHART_WIDTH, DEFAULT_CHART_NAME};
use crate::shot::ShotRecord;

/// Error type for chart output.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The output file could not be written.
    #[error("failed to write chart {}: {source}", path.display())]
    Io {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// PNG encoding failed.
    #[error("failed to encode chart: {0}")]
    Encode(#[from] png::EncodingError),
}

/// A shot location in court coordinates (tenths of a foot).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Horizontal position, basket at 0.
    pub x: f64,
    /// Distance from the baseline side of the basket.
    pub y: f64,
}

/// Points accumulated by one render worker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartLayer {
    /// Made shots.
    pub made: Vec<Point>,
    /// Missed shots.
    pub missed: Vec<Point>,
}

impl ChartLayer {
    /// Add one shot to the made or missed series.
    pub fn plot(&mut self, shot: &ShotRecord) {
        let point = Point {
            x: shot.loc_x,
            y: shot.loc_y,
        };
        if shot.is_made() {
            self.made.push(point);
        } else {
            self.missed.push(point);
        }
    }

    /// Append another layer's points after this layer's.
    pub fn merge(&mut self, other: Self) {
        self.made.extend(other.made);
        self.missed.extend(other.missed);
    }

    /// Total number of plotted points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.made.len() + self.missed.len()
    }

    /// Whether nothing has been plotted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.made.is_empty() && self.missed.is_empty()
    }

    fn points(&self) -> impl Iterator<Item = &Point> {
        self.missed.iter().chain(&self.made)
    }
}

/// Chart name for a set of filter specs: the specs joined by a space, or
/// `All_Shots` when there are none.
#[must_use]
pub fn chart_name(specs: &[String]) -> String {
    if specs.is_empty() {
        DEFAULT_CHART_NAME.to_string()
    } else {
        specs.join(" ")
    }
}

/// A finished chart, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotChart {
    /// Title, also used as the file stem.
    pub title: String,
    /// All plotted points.
    pub layer: ChartLayer,
}

impl ShotChart {
    /// Create a chart for the given specs.
    #[must_use]
    pub fn new(specs: &[String], layer: ChartLayer) -> Self {
        Self {
            title: chart_name(specs),
            layer,
        }
    }

    /// Output path inside `dir`. Only the last path component of the title
    /// is used, so a spec value containing `/` cannot escape `dir`.
    #[must_use]
    pub fn output_path(&self, dir: &Path) -> PathBuf {
        let file = format!("{}.png", self.title);
        let base = Path::new(&file)
            .file_name()
            .map_or_else(|| PathBuf::from(format!("{DEFAULT_CHART_NAME}.png")), PathBuf::from);
        dir.join(base)
    }
}

/// Writes a chart to disk.
pub trait Renderer: Send + Sync {
    /// Render `chart` to `path`.
    fn render(&self, chart: &ShotChart, path: &Path) -> Result<(), RenderError>;
}

/// Marker shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphShape {
    /// Diagonal cross.
    Cross,
    /// Circle outline.
    Ring,
}

/// Marker appearance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphStyle {
    /// RGB colour.
    pub color: [u8; 3],
    /// Radius in pixels.
    pub radius: f64,
    /// Shape.
    pub shape: GlyphShape,
}

/// Marker for missed shots.
pub const MISS_GLYPH: GlyphStyle = GlyphStyle {
    color: [0x89, 0x44, 0xCA],
    radius: 5.5,
    shape: GlyphShape::Cross,
};

/// Marker for made shots.
pub const MADE_GLYPH: GlyphStyle = GlyphStyle {
    color: [0xFD, 0xB9, 0x27],
    radius: 4.5,
    shape: GlyphShape::Ring,
};

/// Chart background.
pub const BACKGROUND: [u8; 3] = [0, 0, 0];

/// Legend text stored alongside the image.
pub const LEGEND: &str = "X = Miss, O = Make";

const MARGIN: f64 = 24.0;

/// Half-court extent used when the data gives no usable bounds.
const COURT_X: (f64, f64) = (-250.0, 250.0);
const COURT_Y: (f64, f64) = (-50.0, 900.0);

/// Axis-aligned data bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds {
    x: (f64, f64),
    y: (f64, f64),
}

impl Bounds {
    fn fit<'a>(points: impl Iterator<Item = &'a Point>) -> Self {
        let mut x = (f64::INFINITY, f64::NEG_INFINITY);
        let mut y = (f64::INFINITY, f64::NEG_INFINITY);
        for p in points {
            x = (x.0.min(p.x), x.1.max(p.x));
            y = (y.0.min(p.y), y.1.max(p.y));
        }
        Self {
            x: axis_or(x, COURT_X),
            y: axis_or(y, COURT_Y),
        }
    }
}

fn axis_or(range: (f64, f64), fallback: (f64, f64)) -> (f64, f64) {
    if !range.0.is_finite() || !range.1.is_finite() {
        fallback
    } else if range.1 - range.0 < f64::EPSILON {
        (range.0 - 1.0, range.1 + 1.0)
    } else {
        range
    }
}

/// RGB8 pixel buffer.
struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    fn new(width: u32, height: u32, background: [u8; 3]) -> Self {
        let pixels = background
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn put(&mut self, x: f64, y: f64, color: [u8; 3]) {
        let (x, y) = (x.round(), y.round());
        if x < 0.0 || y < 0.0 || x >= f64::from(self.width) || y >= f64::from(self.height) {
            return;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 3;
        self.pixels[offset..offset + 3].copy_from_slice(&color);
    }

    #[allow(clippy::cast_possible_truncation)]
    fn glyph(&mut self, cx: f64, cy: f64, style: GlyphStyle) {
        let r = style.radius;
        match style.shape {
            GlyphShape::Cross => {
                let steps = (r * 4.0).ceil() as i32;
                for i in -steps..=steps {
                    let d = r * f64::from(i) / f64::from(steps);
                    self.put(cx + d, cy + d, style.color);
                    self.put(cx + d, cy - d, style.color);
                }
            }
            GlyphShape::Ring => {
                let steps = (r * 8.0).ceil() as i32;
                for i in 0..steps {
                    let theta = std::f64::consts::TAU * f64::from(i) / f64::from(steps);
                    self.put(cx + r * theta.cos(), cy + r * theta.sin(), style.color);
                }
            }
        }
    }
}

/// PNG renderer with fixed styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngRenderer {
    width: u32,
    height: u32,
}

impl Default for PngRenderer {
    fn default() -> Self {
        Self::new(CHART_WIDTH, CHART_HEIGHT)
    }
}

impl PngRenderer {
    /// Renderer producing `width` x `height` images.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn rasterize(&self, layer: &ChartLayer) -> Canvas {
        let mut canvas = Canvas::new(self.width, self.height, BACKGROUND);
        let bounds = Bounds::fit(layer.points());
        let plot_w = (f64::from(self.width) - 2.0 * MARGIN).max(1.0);
        let plot_h = (f64::from(self.height) - 2.0 * MARGIN).max(1.0);
        let to_pixel = |p: &Point| {
            let px = MARGIN + (p.x - bounds.x.0) / (bounds.x.1 - bounds.x.0) * plot_w;
            let py = MARGIN + (bounds.y.1 - p.y) / (bounds.y.1 - bounds.y.0) * plot_h;
            (px, py)
        };
        for p in &layer.missed {
            let (x, y) = to_pixel(p);
            canvas.glyph(x, y, MISS_GLYPH);
        }
        for p in &layer.made {
            let (x, y) = to_pixel(p);
            canvas.glyph(x, y, MADE_GLYPH);
        }
        canvas
    }
}

impl PngRenderer {
    /// Encode `chart` into PNG bytes. Title and legend are stored as UTF-8
    /// `iTXt` chunks.
    pub fn encode(&self, chart: &ShotChart) -> Result<Vec<u8>, RenderError> {
        let canvas = self.rasterize(&chart.layer);
        let mut bytes = Vec::new();
        let mut encoder = png::Encoder::new(&mut bytes, canvas.width, canvas.height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.add_itxt_chunk("Title".to_string(), chart.title.clone())?;
        encoder.add_itxt_chunk("Description".to_string(), LEGEND.to_string())?;
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&canvas.pixels)?;
        writer.finish()?;
        Ok(bytes)
    }
}

impl Renderer for PngRenderer {
    fn render(&self, chart: &ShotChart, path: &Path) -> Result<(), RenderError> {
        let bytes = self.encode(chart)?;
        fs::write(path, &bytes).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), points = chart.layer.len(), "Chart written");
        Ok(())
    }
}
