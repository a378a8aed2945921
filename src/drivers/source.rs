use std::collections::VecDeque;
use rand::Rng;
use crate::drivers::GraphError;
/// Drift thresholds for the random walk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RandomWalk {
    pub up_cutoff: f64,
    pub down_cutoff: f64,
    /// Upward drift only applies below this value.
    pub upper_bound: f64,
    /// Downward drift only applies above this value.
    pub lower_bound: f64,
}
impl Default for RandomWalk {
    fn default() -> Self {
        Self {
            up_cutoff: 0.90,
            down_cutoff: 0.10,
            upper_bound: 4.0,
            lower_bound: 1.0,
        }
    }
}
impl RandomWalk {
    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        length: usize,
        start_value: f64,
    ) -> Result<Vec<f64>, GraphError> {
        if length < 1 {
            return Err(GraphError::InvalidSeriesLength(length));
        }
        if !start_value.is_finite() {
            return Err(GraphError::InvalidStartValue(start_value));
        }
        let mut values = Vec::with_capacity(length);
        let mut current = start_value;
        values.push(current);
        for _ in 1..length {
            let threshold: f64 = rng.gen();
            let up = threshold > self.up_cutoff && current < self.upper_bound;
            let down = threshold < self.down_cutoff && current > self.lower_bound;
            let drift = f64::from(u8::from(up)) - f64::from(u8::from(down));
            let add = rng.gen::<f64>() > 0.5;
            let noise: f64 = rng.gen();
            current = if add {
                current + drift + noise
            } else {
                current + drift - noise
            };
            values.push(current);
        }
        Ok(values)
    }
}
/// Random walk with the default drift thresholds.
pub fn generate_random_data<R: Rng + ?Sized>(
    rng: &mut R,
    length: usize,
    start_value: f64,
) -> Result<Vec<f64>, GraphError> {
    RandomWalk::default().generate(rng, length, start_value)
}
/// Something that can produce a raw series on demand.
pub trait SampleSource {
    fn next_series(&mut self, length: usize, start_value: f64) -> Result<Vec<f64>, GraphError>;
}
/// Seeded random walk source; series are drawn one after another from the same generator.
pub struct RandomWalkSource<R: Rng> {
    rng: R,
    walk: RandomWalk,
}
impl<R: Rng> RandomWalkSource<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            walk: RandomWalk::default(),
        }
    }
}
impl<R: Rng> SampleSource for RandomWalkSource<R> {
    fn next_series(&mut self, length: usize, start_value: f64) -> Result<Vec<f64>, GraphError> {
        self.walk.generate(&mut self.rng, length, start_value)
    }
}
/// In-memory source useful for tests and deterministic playback.
/// Ignores `start_value`; the queued series must already have the requested length.
pub struct ManualSource {
    queue: VecDeque<Vec<f64>>,
}
impl ManualSource {
    pub fn new(series: impl IntoIterator<Item = Vec<f64>>) -> Self {
        Self {
            queue: series.into_iter().collect(),
        }
    }
}
impl SampleSource for ManualSource {
    fn next_series(&mut self, length: usize, _start_value: f64) -> Result<Vec<f64>, GraphError> {
        let series = self.queue.pop_front().unwrap_or_default();
        if series.len() != length {
            return Err(GraphError::InvalidSeriesLength(series.len()));
        }
        Ok(series)
    }
}
