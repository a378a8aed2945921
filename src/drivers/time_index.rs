use chrono::{Duration, NaiveDateTime};
/// `count` timestamps one second apart, starting at (and including) `start`.
pub fn build_time_index(start: NaiveDateTime, count: usize) -> Vec<NaiveDateTime> {
    (0..count)
        .map(|offset| start + Duration::seconds(offset as i64))
        .collect()
}
