// src/drivers/mod.rs
pub mod error;
pub mod frame;
pub mod pipeline;
pub mod plot;
pub mod smoothing;
pub mod source;
pub mod time_index;
pub use error::GraphError;
pub use frame::{Sample, ShadeInterval, SmoothedSeries, TimeSeriesFrame};
pub use pipeline::{build_frame, Pipeline};
pub use plot::{render_figure, write_png};
pub use smoothing::{ewma, Ewma, EwmaConvention};
pub use source::{
    generate_random_data, ManualSource, RandomWalk, RandomWalkSource, SampleSource,
};
pub use time_index::build_time_index;
