use chrono::NaiveDateTime;
use crate::drivers::GraphError;
/// One row of a series.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub raw: f64,
    pub smoothed: f64,
}
#[derive(Clone, Debug)]
pub struct SmoothedSeries {
    pub name: String,
    pub raw: Vec<f64>,
    pub smoothed: Vec<f64>,
}
impl SmoothedSeries {
    pub fn is_empty(&self) -> bool {
        self.smoothed.is_empty()
    }
    /// Smallest and largest smoothed value, ignoring non-finite entries.
    pub fn smoothed_bounds(&self) -> Option<(f64, f64)> {
        self.smoothed
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
/// Requested shade bounds after snapping onto the time index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShadeInterval {
    pub begin: NaiveDateTime,
    pub end: NaiveDateTime,
    pub begin_index: usize,
    pub end_index: usize,
}
/// Time index shared by every series, plus the series themselves.
#[derive(Clone, Debug)]
pub struct TimeSeriesFrame {
    pub time_index: Vec<NaiveDateTime>,
    pub series: Vec<SmoothedSeries>,
}
impl TimeSeriesFrame {
    pub fn new(
        time_index: Vec<NaiveDateTime>,
        series: Vec<SmoothedSeries>,
    ) -> Result<Self, GraphError> {
        for s in &series {
            if s.raw.len() != time_index.len() || s.smoothed.len() != time_index.len() {
                return Err(GraphError::InvalidSeriesLength(s.smoothed.len()));
            }
        }
        Ok(Self { time_index, series })
    }
    pub fn len(&self) -> usize {
        self.time_index.len()
    }
    pub fn is_empty(&self) -> bool {
        self.time_index.is_empty()
    }
    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.time_index.first().copied()
    }
    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.time_index.last().copied()
    }
    /// Rows of series `idx`.
    pub fn samples(&self, idx: usize) -> impl Iterator<Item = Sample> + '_ {
        self.series.get(idx).into_iter().flat_map(move |s| {
            self.time_index
                .iter()
                .zip(s.raw.iter().zip(&s.smoothed))
                .map(|(&timestamp, (&raw, &smoothed))| Sample {
                    timestamp,
                    raw,
                    smoothed,
                })
        })
    }
    /// Index of the sample closest to `target`. Ties go to the later sample.
    pub fn nearest_index(&self, target: NaiveDateTime) -> Option<usize> {
        let len = self.time_index.len();
        if len == 0 {
            return None;
        }
        let right = self.time_index.partition_point(|t| *t < target);
        if right == 0 {
            return Some(0);
        }
        if right == len {
            return Some(len - 1);
        }
        let left = right - 1;
        let left_distance = target - self.time_index[left];
        let right_distance = self.time_index[right] - target;
        if left_distance < right_distance {
            Some(left)
        } else {
            Some(right)
        }
    }
    /// Snap a requested interval onto existing timestamps.
    /// Fails when the interval is reversed or does not overlap the index at all.
    pub fn resolve_shade(
        &self,
        begin: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<ShadeInterval, GraphError> {
        let (first, last) = match (self.first_timestamp(), self.last_timestamp()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(GraphError::EmptySeries("time index".into())),
        };
        if begin > end || end < first || begin > last {
            return Err(GraphError::InvalidShadeInterval {
                begin,
                end,
                first,
                last,
            });
        }
        let begin_index = self.nearest_index(begin).unwrap_or(0);
        let end_index = self.nearest_index(end).unwrap_or(self.len() - 1);
        Ok(ShadeInterval {
            begin: self.time_index[begin_index],
            end: self.time_index[end_index],
            begin_index,
            end_index,
        })
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::time_index::build_time_index;
    use chrono::{Duration, NaiveDate};
    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 7, 25)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap()
    }
    fn frame(len: usize) -> TimeSeriesFrame {
        let values: Vec<f64> = (0..len).map(|i| i as f64).collect();
        TimeSeriesFrame::new(
            build_time_index(start(), len),
            vec![SmoothedSeries {
                name: "data01".into(),
                raw: values.clone(),
                smoothed: values,
            }],
        )
        .unwrap()
    }
    #[test]
    fn exact_match_snaps_to_itself() {
        let f = frame(600);
        let t = start() + Duration::seconds(123);
        assert_eq!(f.nearest_index(t), Some(123));
        let shade = f.resolve_shade(t, t).unwrap();
        assert_eq!(shade.begin, t);
        assert_eq!(shade.end, t);
    }
    #[test]
    fn sub_second_targets_pick_nearest_with_late_ties() {
        let f = frame(10);
        let base = start() + Duration::seconds(3);
        assert_eq!(f.nearest_index(base + Duration::milliseconds(400)), Some(3));
        assert_eq!(f.nearest_index(base + Duration::milliseconds(600)), Some(4));
        assert_eq!(f.nearest_index(base + Duration::milliseconds(500)), Some(4));
    }
    #[test]
    fn interval_inside_range_resolves_inside() {
        let f = frame(7200);
        let t0 = start() + Duration::minutes(45);
        let shade = f.resolve_shade(t0, t0 + Duration::seconds(60)).unwrap();
        assert!(shade.begin >= f.first_timestamp().unwrap());
        assert!(shade.end <= f.last_timestamp().unwrap());
        assert_eq!(shade.end_index - shade.begin_index, 60);
    }
    #[test]
    fn partially_outside_interval_snaps_to_edges() {
        let f = frame(100);
        let shade = f
            .resolve_shade(start() - Duration::minutes(5), start() + Duration::seconds(10))
            .unwrap();
        assert_eq!(shade.begin_index, 0);
        assert_eq!(shade.end_index, 10);
    }
    #[test]
    fn interval_before_series_is_rejected() {
        let f = frame(100);
        let err = f
            .resolve_shade(start() - Duration::hours(2), start() - Duration::hours(1))
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidShadeInterval { .. }));
        let err = f
            .resolve_shade(start() + Duration::seconds(50), start() + Duration::seconds(10))
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidShadeInterval { .. }));
    }
    #[test]
    fn mismatched_lengths_are_rejected() {
        let err = TimeSeriesFrame::new(
            build_time_index(start(), 3),
            vec![SmoothedSeries {
                name: "short".into(),
                raw: vec![1.0],
                smoothed: vec![1.0],
            }],
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::InvalidSeriesLength(1)));
    }
    #[test]
    fn samples_zip_index_and_values() {
        let f = frame(3);
        let rows: Vec<Sample> = f.samples(0).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].timestamp, start() + Duration::seconds(2));
        assert_eq!(rows[2].raw, 2.0);
        assert_eq!(f.samples(5).count(), 0);
    }
}
