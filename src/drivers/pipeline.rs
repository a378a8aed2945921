use std::path::PathBuf;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use crate::config::ChartConfig;
use crate::drivers::error::GraphError;
use crate::drivers::frame::{ShadeInterval, SmoothedSeries, TimeSeriesFrame};
use crate::drivers::plot::{check_output_format, render_figure, write_png};
use crate::drivers::smoothing::Ewma;
use crate::drivers::source::{RandomWalkSource, SampleSource};
use crate::drivers::time_index::build_time_index;
/// Generate, smooth and render in one pass.
pub struct Pipeline {
    config: ChartConfig,
}
impl Pipeline {
    pub fn new(config: ChartConfig) -> Result<Self, GraphError> {
        config.validate()?;
        Ok(Self { config })
    }
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }
    /// Frame built from the seeded random walk.
    pub fn generate(&self) -> Result<TimeSeriesFrame, GraphError> {
        let mut source = RandomWalkSource::new(StdRng::seed_from_u64(self.config.seed));
        build_frame(&self.config, &mut source)
    }
    pub fn resolve_shade(&self, frame: &TimeSeriesFrame) -> Result<ShadeInterval, GraphError> {
        let shade = frame.resolve_shade(self.config.shade_begin, self.config.shade_end)?;
        debug!(
            "shade {} .. {} resolved to {} .. {} (samples {}..={})",
            self.config.shade_begin,
            self.config.shade_end,
            shade.begin,
            shade.end,
            shade.begin_index,
            shade.end_index
        );
        if let Some(row) = frame.samples(0).nth(shade.begin_index) {
            debug!(
                "annotation head at {}: raw {:.3}, smoothed {:.3}",
                row.timestamp, row.raw, row.smoothed
            );
        }
        Ok(shade)
    }
    pub fn render(&self, frame: &TimeSeriesFrame) -> Result<Vec<u8>, GraphError> {
        let shade = self.resolve_shade(frame)?;
        render_figure(frame, &shade, &self.config)
    }
    /// Run every stage and write the image. Returns the output path.
    pub fn run(&self) -> Result<PathBuf, GraphError> {
        let path = self.config.output_path.clone();
        check_output_format(&path)?;
        let frame = self.generate()?;
        info!(
            "generated {} series of {} samples",
            frame.series.len(),
            frame.len()
        );
        let png = self.render(&frame)?;
        info!("rendered {} bytes", png.len());
        write_png(&path, &png)?;
        info!("wrote {}", path.display());
        Ok(path)
    }
}
/// Pull one raw series per configured panel from `source`, then index and smooth them.
pub fn build_frame<S: SampleSource>(
    config: &ChartConfig,
    source: &mut S,
) -> Result<TimeSeriesFrame, GraphError> {
    if config.series_length < 1 {
        return Err(GraphError::InvalidSeriesLength(config.series_length));
    }
    let time_index = build_time_index(config.start_time, config.series_length);
    let mut series = Vec::with_capacity(config.series.len());
    for series_cfg in &config.series {
        let raw = source.next_series(config.series_length, series_cfg.start_value)?;
        let smoother = Ewma::from_com(series_cfg.smoothing_com, config.smoothing)?;
        let smoothed = smoother.apply(&raw);
        debug!(
            "{}: start {:.3}, com {} (alpha {:.5}), last smoothed {:.3}",
            series_cfg.name,
            series_cfg.start_value,
            series_cfg.smoothing_com,
            smoother.alpha(),
            smoothed.last().copied().unwrap_or(f64::NAN)
        );
        series.push(SmoothedSeries {
            name: series_cfg.name.clone(),
            raw,
            smoothed,
        });
    }
    TimeSeriesFrame::new(time_index, series)
}
