use chrono::{DateTime, Utc};
use uptime_core::{Interval, TokenEvent};

/// Everything extracted from a single session log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileExtract {
    pub intervals: Vec<Interval>,
    pub token_events: Vec<TokenEvent>,
    pub bad_lines: u64,
}

impl FileExtract {
    pub(crate) fn unreadable() -> Self {
        Self {
            bad_lines: 1,
            ..Self::default()
        }
    }

    /// Earliest interval start or token timestamp in this file.
    pub fn earliest(&self) -> Option<DateTime<Utc>> {
        let interval_start = self.intervals.iter().map(Interval::start).min();
        let token_start = self.token_events.iter().map(|event| event.timestamp).min();
        match (interval_start, token_start) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

/// Pooled extraction results across every discovered log file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOutput {
    pub intervals: Vec<Interval>,
    pub token_events: Vec<TokenEvent>,
    pub files_scanned: usize,
    pub bad_lines: u64,
    pub earliest: Option<DateTime<Utc>>,
}

impl ScanOutput {
    pub(crate) fn absorb(&mut self, extract: FileExtract) {
        self.files_scanned += 1;
        self.bad_lines = self.bad_lines.saturating_add(extract.bad_lines);
        if let Some(file_earliest) = extract.earliest() {
            self.earliest = Some(match self.earliest {
                Some(current) => current.min(file_earliest),
                None => file_earliest,
            });
        }
        self.intervals.extend(extract.intervals);
        self.token_events.extend(extract.token_events);
    }
}
