use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};

use crate::error::CaptureError;

/// A single sampled point of a stroke, in canvas logical coordinates.
///
/// Deserialized pressure goes through [`Point::new`], so stored points always
/// carry a pressure in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPoint")]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub pressure: f32,
}

#[derive(Deserialize)]
struct RawPoint {
    x: f32,
    y: f32,
    #[serde(default)]
    pressure: Option<f32>,
}

impl From<RawPoint> for Point {
    fn from(raw: RawPoint) -> Self {
        Self::new(raw.x, raw.y, raw.pressure)
    }
}

impl Point {
    /// Missing, zero, negative or NaN pressure counts as full pressure.
    pub fn new(x: f32, y: f32, pressure: Option<f32>) -> Self {
        let pressure = pressure
            .filter(|p| *p > 0.0)
            .map(|p| p.min(1.0))
            .unwrap_or(1.0);
        Self { x, y, pressure }
    }

    pub fn pos(&self) -> Pos2 {
        Pos2::new(self.x, self.y)
    }
}

/// Drawing tool. Only affects compositing, never geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Pen,
    Eraser,
}

impl Tool {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pen => "Pen",
            Self::Eraser => "Eraser",
        }
    }
}

/// Stroke color, parsed from a hex string or a CSS color name.
///
/// Serializes back to `#rrggbb` (or `#rrggbbaa` when translucent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StrokeColor([u8; 4]);

impl StrokeColor {
    pub const BLACK: Self = Self([0, 0, 0, 255]);

    pub fn parse(input: &str) -> Result<Self, CaptureError> {
        let parsed = csscolorparser::parse(input.trim()).map_err(|err| CaptureError::InvalidColor {
            input: input.to_owned(),
            reason: err.to_string(),
        })?;
        Ok(Self(parsed.to_rgba8()))
    }

    pub fn from_color32(color: Color32) -> Self {
        Self(color.to_srgba_unmultiplied())
    }

    pub fn color32(self) -> Color32 {
        let [r, g, b, a] = self.0;
        Color32::from_rgba_unmultiplied(r, g, b, a)
    }

    /// Straight (non-premultiplied) RGBA components.
    pub fn to_rgba_unmultiplied(self) -> [u8; 4] {
        self.0
    }

    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self.to_rgba_unmultiplied();
        if a == u8::MAX {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

impl Default for StrokeColor {
    fn default() -> Self {
        Self::BLACK
    }
}

impl TryFrom<String> for StrokeColor {
    type Error = CaptureError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StrokeColor> for String {
    fn from(color: StrokeColor) -> Self {
        color.to_hex()
    }
}

/// Brush settings captured by each new stroke at pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushSettings {
    pub tool: Tool,
    pub color: StrokeColor,
    pub width: f32,
}

impl BrushSettings {
    pub fn validate(&self) -> Result<(), CaptureError> {
        validate_width(self.width)
    }
}

pub(crate) fn validate_width(width: f32) -> Result<(), CaptureError> {
    if width.is_finite() && width > 0.0 {
        Ok(())
    } else {
        Err(CaptureError::InvalidWidth(width))
    }
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            tool: Tool::Pen,
            color: StrokeColor::BLACK,
            width: 3.0,
        }
    }
}

/// One continuous pointer-down-to-pointer-up gesture.
///
/// Points are append-only while the stroke is in progress. Once a stroke is
/// committed to the session it is only reachable through shared references.
///
/// Deserializing rejects strokes without points or with a width that is not
/// a positive number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStroke")]
pub struct Stroke {
    points: Vec<Point>,
    color: StrokeColor,
    width: f32,
    tool: Tool,
    /// Seconds on the session clock (egui's app-relative `time`), not epoch
    /// milliseconds.
    #[serde(rename = "timestamp")]
    started_at: f64,
}

#[derive(Deserialize)]
struct RawStroke {
    points: Vec<Point>,
    color: StrokeColor,
    width: f32,
    #[serde(default)]
    tool: Tool,
    #[serde(rename = "timestamp", default)]
    started_at: f64,
}

impl TryFrom<RawStroke> for Stroke {
    type Error = CaptureError;

    fn try_from(raw: RawStroke) -> Result<Self, Self::Error> {
        let stroke = Self {
            points: raw.points,
            color: raw.color,
            width: raw.width,
            tool: raw.tool,
            started_at: raw.started_at,
        };
        stroke.validate()?;
        Ok(stroke)
    }
}

impl Stroke {
    /// Start a stroke at `first` using the given brush settings.
    pub fn begin(first: Point, brush: &BrushSettings, started_at: f64) -> Self {
        Self {
            points: vec![first],
            color: brush.color,
            width: brush.width,
            tool: brush.tool,
            started_at,
        }
    }

    /// Build a finished stroke from existing points, e.g. for rendering tests
    /// or replaying a stored drawing. Returns `None` for an empty point list
    /// or a brush width that is not a positive number.
    pub fn from_points(points: Vec<Point>, brush: &BrushSettings, started_at: f64) -> Option<Self> {
        let stroke = Self {
            points,
            color: brush.color,
            width: brush.width,
            tool: brush.tool,
            started_at,
        };
        stroke.validate().ok().map(|()| stroke)
    }

    /// Check the invariants every committed stroke holds: at least one point
    /// and a positive finite width.
    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.points.is_empty() {
            return Err(CaptureError::EmptyStroke);
        }
        validate_width(self.width)
    }

    pub(crate) fn push_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn color(&self) -> StrokeColor {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn started_at(&self) -> f64 {
        self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_pressure_defaults() {
        assert_eq!(Point::new(1.0, 2.0, None).pressure, 1.0);
        assert_eq!(Point::new(1.0, 2.0, Some(0.0)).pressure, 1.0);
        assert_eq!(Point::new(1.0, 2.0, Some(f32::NAN)).pressure, 1.0);
        assert_eq!(Point::new(1.0, 2.0, Some(3.0)).pressure, 1.0);
        assert_eq!(Point::new(1.0, 2.0, Some(0.25)).pressure, 0.25);
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!(StrokeColor::parse("#000000").unwrap(), StrokeColor::BLACK);
        assert_eq!(StrokeColor::parse("black").unwrap(), StrokeColor::BLACK);
        assert_eq!(
            StrokeColor::parse("red").unwrap().to_rgba_unmultiplied(),
            [255, 0, 0, 255]
        );
        assert!(StrokeColor::parse("not-a-color").is_err());
    }

    #[test]
    fn test_color_hex_output() {
        assert_eq!(StrokeColor::parse("#FF8800").unwrap().to_hex(), "#ff8800");
        assert_eq!(StrokeColor::parse("#ff880080").unwrap().to_hex(), "#ff880080");
    }

    #[test]
    fn test_stroke_serializes_with_interchange_names() {
        let brush = BrushSettings::default();
        let stroke = Stroke::begin(Point::new(1.0, 2.0, None), &brush, 5.0);
        let json = serde_json::to_value(&stroke).unwrap();

        assert_eq!(json["color"], "#000000");
        assert_eq!(json["tool"], "pen");
        assert_eq!(json["timestamp"], 5.0);
        assert_eq!(json["points"][0]["x"], 1.0);
    }

    #[test]
    fn test_stroke_captures_brush() {
        let brush = BrushSettings {
            tool: Tool::Eraser,
            color: StrokeColor::parse("blue").unwrap(),
            width: 12.0,
        };
        let stroke = Stroke::begin(Point::new(0.0, 0.0, None), &brush, 0.0);
        assert_eq!(stroke.tool(), Tool::Eraser);
        assert_eq!(stroke.width(), 12.0);
        assert_eq!(stroke.points().len(), 1);
    }

    #[test]
    fn test_from_points_rejects_empty() {
        assert!(Stroke::from_points(Vec::new(), &BrushSettings::default(), 0.0).is_none());
    }

    #[test]
    fn test_from_points_rejects_bad_width() {
        let brush = BrushSettings {
            width: 0.0,
            ..BrushSettings::default()
        };
        let points = vec![Point::new(0.0, 0.0, None)];
        assert!(Stroke::from_points(points, &brush, 0.0).is_none());
    }

    #[test]
    fn test_deserialized_pressure_is_clamped() {
        let point: Point = serde_json::from_str(r#"{"x": 1, "y": 2, "pressure": 7.5}"#).unwrap();
        assert_eq!(point.pressure, 1.0);
        let point: Point = serde_json::from_str(r#"{"x": 1, "y": 2, "pressure": -2}"#).unwrap();
        assert_eq!(point.pressure, 1.0);
        let point: Point = serde_json::from_str(r#"{"x": 1, "y": 2, "pressure": 0.4}"#).unwrap();
        assert_eq!(point.pressure, 0.4);
    }

    #[test]
    fn test_deserialize_rejects_invalid_strokes() {
        let empty = r##"{"points": [], "color": "#000000", "width": 3, "tool": "pen", "timestamp": 0}"##;
        assert!(serde_json::from_str::<Stroke>(empty).is_err());

        let negative = r##"{"points": [{"x": 0, "y": 0}], "color": "#000000", "width": -4, "tool": "pen", "timestamp": 0}"##;
        assert!(serde_json::from_str::<Stroke>(negative).is_err());

        let zero = r##"{"points": [{"x": 0, "y": 0}], "color": "#000000", "width": 0, "tool": "pen", "timestamp": 0}"##;
        assert!(serde_json::from_str::<Stroke>(zero).is_err());

        let valid = r##"{"points": [{"x": 0, "y": 0}], "color": "#000000", "width": 2, "tool": "pen", "timestamp": 0}"##;
        assert_eq!(serde_json::from_str::<Stroke>(valid).unwrap().width(), 2.0);
    }

    #[test]
    fn test_brush_validation() {
        assert!(BrushSettings::default().validate().is_ok());
        let brush = BrushSettings {
            width: f32::NAN,
            ..BrushSettings::default()
        };
        assert!(matches!(brush.validate(), Err(CaptureError::InvalidWidth(_))));
    }
}
