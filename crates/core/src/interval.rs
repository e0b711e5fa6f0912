use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::window::Window;

/// A contiguous span of inferred activity. `end >= start` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        if end < start {
            return None;
        }
        Some(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration_seconds(&self) -> f64 {
        seconds_between(self.start, self.end)
    }

    /// Seconds shared with `[start, end)`, zero when disjoint.
    pub fn overlap_seconds(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
        let overlap_start = self.start.max(start);
        let overlap_end = self.end.min(end);
        if overlap_end <= overlap_start {
            return 0.0;
        }
        seconds_between(overlap_start, overlap_end)
    }

    /// Truncates to the window, dropping intervals without positive overlap.
    pub fn clamp(&self, window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> Option<Self> {
        if self.end <= window_start || self.start >= window_end {
            return None;
        }
        let start = self.start.max(window_start);
        let end = self.end.min(window_end);
        if end <= start {
            return None;
        }
        Some(Self { start, end })
    }
}

pub fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 1000.0
}

pub fn total_seconds(intervals: &[Interval]) -> f64 {
    intervals
        .iter()
        .map(Interval::duration_seconds)
        .sum::<f64>()
}

pub fn clamp_intervals(intervals: &[Interval], window: &Window) -> Vec<Interval> {
    intervals
        .iter()
        .filter_map(|interval| interval.clamp(window.start, window.end))
        .collect()
}

/// Minimal sorted, non-overlapping cover. Touching intervals are joined.
pub fn merge_intervals(intervals: &[Interval]) -> Vec<Interval> {
    let mut sorted = intervals.to_vec();
    sorted.sort_by_key(|interval| interval.start);

    let mut merged = Vec::with_capacity(sorted.len());
    let mut iter = sorted.into_iter();
    let Some(mut current) = iter.next() else {
        return merged;
    };
    for interval in iter {
        if interval.start <= current.end {
            current = Interval {
                start: current.start,
                end: current.end.max(interval.end),
            };
        } else {
            merged.push(current);
            current = interval;
        }
    }
    merged.push(current);
    merged
}
