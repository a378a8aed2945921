use std::path::{Path, PathBuf};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use crate::drivers::smoothing::EwmaConvention;
use crate::drivers::GraphError;
/// Number of stacked panels in the figure.
pub const PANEL_COUNT: usize = 2;
/// Largest accepted image width or height, and annotation pixel offset.
pub const MAX_IMAGE_SIDE_PX: u32 = 16_384;
/// Annotations further than a year from the shade are rejected.
const MAX_ANNOTATION_MINUTES: i64 = 366 * 24 * 60;
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YLimits {
    /// Data range plus a small margin, like an unconfigured axis.
    Auto,
    /// Pad the data range by `fraction * (max - min)` on both ends.
    Padded { fraction: f64 },
}
impl Default for YLimits {
    fn default() -> Self {
        YLimits::Auto
    }
}
impl YLimits {
    pub fn range(&self, min: f64, max: f64) -> (f64, f64) {
        let span = max - min;
        if !span.is_finite() || span.abs() < f64::EPSILON {
            return (min - 0.5, max + 0.5);
        }
        let pad = match *self {
            YLimits::Auto => span * 0.05,
            YLimits::Padded { fraction } => span * fraction,
        };
        (min - pad, max + pad)
    }
}
/// Where the annotation text sits relative to the arrow head.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationStyle {
    /// Data coordinates: `minutes_before` the head on the time axis, head value times `y_multiple`.
    Fixed { minutes_before: i64, y_multiple: f64 },
    /// Pixel offset from the head; positive `dy` moves the text up.
    Offset { dx: i32, dy: i32 },
}
impl Default for AnnotationStyle {
    fn default() -> Self {
        AnnotationStyle::Fixed {
            minutes_before: 45,
            y_multiple: 2.0,
        }
    }
}
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSpec {
    pub family: String,
    pub bold: bool,
    pub size_pt: f64,
}
impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "DejaVu Sans".into(),
            bold: true,
            size_pt: 10.0,
        }
    }
}
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesConfig {
    pub name: String,
    /// Legend label.
    pub label: String,
    pub start_value: f64,
    pub smoothing_com: f64,
    pub color: [u8; 3],
    pub grid: bool,
}
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub series_length: usize,
    pub start_time: NaiveDateTime,
    pub seed: u64,
    pub series: [SeriesConfig; PANEL_COUNT],
    pub smoothing: EwmaConvention,
    pub shade_begin: NaiveDateTime,
    pub shade_end: NaiveDateTime,
    pub shade_alpha: f64,
    pub shade_color: [u8; 3],
    pub annotation_text: String,
    pub annotation: AnnotationStyle,
    pub y_limits: YLimits,
    pub font: FontSpec,
    /// Figure title; `None` derives one from the start date.
    pub title: Option<String>,
    pub output_path: PathBuf,
    pub dpi: u32,
    /// Width and height in inches.
    pub figure_size: (f64, f64),
    pub x_ticks: usize,
}
fn on_sample_day(hour: u32, min: u32, sec: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2018, 7, 25)
        .and_then(|d| d.and_hms_opt(hour, min, sec))
        .unwrap_or_default()
}
impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            series_length: 7200,
            start_time: on_sample_day(14, 0, 0),
            seed: 20180725,
            series: [
                SeriesConfig {
                    name: "data01".into(),
                    label: "this".into(),
                    start_value: 2.2,
                    smoothing_com: 60.0,
                    color: [0, 0, 255],
                    grid: true,
                },
                SeriesConfig {
                    name: "data02".into(),
                    label: "that".into(),
                    start_value: 2.8,
                    smoothing_com: 100.0,
                    color: [255, 0, 0],
                    grid: false,
                },
            ],
            smoothing: EwmaConvention::default(),
            shade_begin: on_sample_day(14, 45, 0),
            shade_end: on_sample_day(15, 6, 0),
            shade_alpha: 0.5,
            shade_color: [128, 128, 128],
            annotation_text: "Problem started here".into(),
            annotation: AnnotationStyle::default(),
            y_limits: YLimits::default(),
            font: FontSpec::default(),
            title: None,
            output_path: PathBuf::from("graph.png"),
            dpi: 100,
            figure_size: (8.0, 6.0),
            x_ticks: 10,
        }
    }
}
impl ChartConfig {
    pub fn from_json_str(text: &str) -> Result<Self, GraphError> {
        let config: ChartConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            GraphError::Config(format!("cannot read {}: {e}", path.as_ref().display()))
        })?;
        Self::from_json_str(&text)
    }
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.series_length < 1 {
            return Err(GraphError::InvalidSeriesLength(self.series_length));
        }
        for series in &self.series {
            if !series.start_value.is_finite() {
                return Err(GraphError::InvalidStartValue(series.start_value));
            }
            if !series.smoothing_com.is_finite() || series.smoothing_com < 0.0 {
                return Err(GraphError::InvalidSmoothing(series.smoothing_com));
            }
        }
        if self.dpi == 0 {
            return Err(GraphError::Config("dpi must be greater than zero".into()));
        }
        let (w, h) = self.figure_size;
        if !(w > 0.0 && h > 0.0) {
            return Err(GraphError::Config(format!(
                "figure size must be positive, got {w}x{h} inches"
            )));
        }
        let (w_px, h_px) = (w * self.dpi as f64, h * self.dpi as f64);
        let max_px = MAX_IMAGE_SIDE_PX as f64;
        if !(w_px <= max_px && h_px <= max_px) {
            return Err(GraphError::Config(format!(
                "figure of {w}x{h} inches at {} dpi exceeds {MAX_IMAGE_SIDE_PX} px per side",
                self.dpi
            )));
        }
        if !(0.0..=1.0).contains(&self.shade_alpha) {
            return Err(GraphError::Config(format!(
                "shade alpha must be within [0, 1], got {}",
                self.shade_alpha
            )));
        }
        if !(self.font.size_pt > 0.0) {
            return Err(GraphError::Config("font size must be positive".into()));
        }
        if let YLimits::Padded { fraction } = self.y_limits {
            if !(fraction.is_finite() && fraction >= 0.0) {
                return Err(GraphError::Config(format!(
                    "y padding fraction must be finite and >= 0, got {fraction}"
                )));
            }
        }
        self.validate_annotation()
    }
    fn validate_annotation(&self) -> Result<(), GraphError> {
        match self.annotation {
            AnnotationStyle::Fixed {
                minutes_before,
                y_multiple,
            } => {
                if minutes_before.unsigned_abs() > MAX_ANNOTATION_MINUTES as u64 {
                    return Err(GraphError::Config(format!(
                        "annotation offset of {minutes_before} minutes exceeds {MAX_ANNOTATION_MINUTES}"
                    )));
                }
                if !y_multiple.is_finite() {
                    return Err(GraphError::Config(format!(
                        "annotation y multiple must be finite, got {y_multiple}"
                    )));
                }
            }
            AnnotationStyle::Offset { dx, dy } => {
                let limit = MAX_IMAGE_SIDE_PX as u64;
                if dx.unsigned_abs() as u64 > limit || dy.unsigned_abs() as u64 > limit {
                    return Err(GraphError::Config(format!(
                        "annotation offset ({dx}, {dy}) exceeds {MAX_IMAGE_SIDE_PX} px"
                    )));
                }
            }
        }
        Ok(())
    }
    pub fn title_text(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("Time Series on {}", self.start_time.format("%Y-%m-%d")))
    }
    /// Output size in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let dpi = self.dpi as f64;
        (
            (self.figure_size.0 * dpi).round().max(1.0) as u32,
            (self.figure_size.1 * dpi).round().max(1.0) as u32,
        )
    }
    /// Font size in pixels at the configured resolution.
    pub fn font_px(&self) -> f64 {
        self.font.size_pt * self.dpi as f64 / 72.0
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn defaults_match_sample_script() {
        let config = ChartConfig::default();
        assert_eq!(config.series_length, 7200);
        assert_eq!(config.series[0].smoothing_com, 60.0);
        assert_eq!(config.series[1].smoothing_com, 100.0);
        assert_eq!(config.shade_begin.format("%H:%M:%S").to_string(), "14:45:00");
        assert_eq!(config.shade_end.format("%H:%M:%S").to_string(), "15:06:00");
        assert_eq!(config.title_text(), "Time Series on 2018-07-25");
        assert_eq!(config.pixel_size(), (800, 600));
        config.validate().unwrap();
    }
    #[test]
    fn padded_limits_extend_by_fraction() {
        let (lo, hi) = YLimits::Padded { fraction: 0.15 }.range(1.0, 3.0);
        assert!((lo - 0.7).abs() < 1e-12);
        assert!((hi - 3.3).abs() < 1e-12);
        let (lo, hi) = YLimits::Auto.range(2.0, 2.0);
        assert_eq!((lo, hi), (1.5, 2.5));
    }
    #[test]
    fn partial_json_keeps_defaults() {
        let config = ChartConfig::from_json_str(
            r#"{
                "series_length": 100,
                "dpi": 150,
                "output_path": "out/chart.png",
                "y_limits": {"padded": {"fraction": 0.15}},
                "annotation": {"offset": {"dx": -120, "dy": 40}}
            }"#,
        )
        .unwrap();
        assert_eq!(config.series_length, 100);
        assert_eq!(config.dpi, 150);
        assert_eq!(config.output_path, PathBuf::from("out/chart.png"));
        assert_eq!(config.y_limits, YLimits::Padded { fraction: 0.15 });
        assert_eq!(config.annotation, AnnotationStyle::Offset { dx: -120, dy: 40 });
        assert_eq!(config.series[1].name, "data02");
    }
    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.json");
        let mut expected = ChartConfig::default();
        expected.seed = 99;
        expected.annotation_text = "look here".into();
        std::fs::write(&path, serde_json::to_string_pretty(&expected).unwrap()).unwrap();
        let loaded = ChartConfig::load(&path).unwrap();
        assert_eq!(loaded, expected);
        assert!(matches!(
            ChartConfig::load(path.with_extension("missing")),
            Err(GraphError::Config(_))
        ));
    }
    #[test]
    fn rejects_zero_length_and_bad_smoothing() {
        let err = ChartConfig::from_json_str(r#"{"series_length": 0}"#).unwrap_err();
        assert!(matches!(err, GraphError::InvalidSeriesLength(0)));
        let mut config = ChartConfig::default();
        config.series[0].smoothing_com = -1.0;
        assert!(matches!(config.validate(), Err(GraphError::InvalidSmoothing(_))));
        let err = ChartConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, GraphError::Config(_)));
    }
    #[test]
    fn rejects_out_of_range_annotation() {
        let err = ChartConfig::from_json_str(
            r#"{"annotation": {"fixed": {"minutes_before": 1000000000000, "y_multiple": 2.0}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::Config(_)));
        let mut config = ChartConfig::default();
        config.annotation = AnnotationStyle::Offset { dx: i32::MIN, dy: 0 };
        assert!(matches!(config.validate(), Err(GraphError::Config(_))));
        config.annotation = AnnotationStyle::Fixed {
            minutes_before: -90,
            y_multiple: 0.5,
        };
        config.validate().unwrap();
    }
    #[test]
    fn rejects_negative_or_non_finite_padding() {
        let err = ChartConfig::from_json_str(r#"{"y_limits": {"padded": {"fraction": -0.9}}}"#)
            .unwrap_err();
        assert!(matches!(err, GraphError::Config(_)));
        let mut config = ChartConfig::default();
        config.y_limits = YLimits::Padded { fraction: f64::NAN };
        assert!(matches!(config.validate(), Err(GraphError::Config(_))));
        config.y_limits = YLimits::Padded { fraction: 0.0 };
        config.validate().unwrap();
    }
    #[test]
    fn rejects_oversized_figure() {
        let err = ChartConfig::from_json_str(r#"{"figure_size": [1.0e9, 6.0]}"#).unwrap_err();
        assert!(matches!(err, GraphError::Config(_)));
        let mut config = ChartConfig::default();
        config.figure_size = (8.0, f64::INFINITY);
        assert!(matches!(config.validate(), Err(GraphError::Config(_))));
        config.dpi = 64;
        config.figure_size = (256.0, 1.0);
        config.validate().unwrap();
        assert_eq!(config.pixel_size(), (MAX_IMAGE_SIDE_PX, 64));
    }
}
