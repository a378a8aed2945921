// src/lib.rs
pub mod config;
pub mod drivers;
pub use config::{
    AnnotationStyle, ChartConfig, FontSpec, SeriesConfig, YLimits, MAX_IMAGE_SIDE_PX, PANEL_COUNT,
};
pub use drivers::*;
