use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::{DateTime, Utc};
use uptime_core::{Interval, TokenEvent, UNKNOWN_MODEL, UsageTotals};

use crate::parser::{
    CounterSnapshot, EventMessage, LogRecord, RecordKind, TokenCountInfo, parse_record,
};
use crate::types::FileExtract;

/// A user prompt waiting for the reply that closes it.
#[derive(Debug, Clone, Copy)]
struct PendingInterval {
    start: DateTime<Utc>,
    candidate_end: Option<DateTime<Utc>>,
}

/// Running state threaded through one file's lines.
#[derive(Debug)]
struct ExtractState {
    current_model: String,
    pending: Option<PendingInterval>,
    previous: CounterSnapshot,
    extract: FileExtract,
}

impl Default for ExtractState {
    fn default() -> Self {
        Self {
            current_model: UNKNOWN_MODEL.to_string(),
            pending: None,
            previous: CounterSnapshot::default(),
            extract: FileExtract::default(),
        }
    }
}

impl ExtractState {
    fn fold_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        match parse_record(line) {
            Ok(Some(record)) => self.apply(record),
            Ok(None) => {}
            Err(_) => self.extract.bad_lines += 1,
        }
    }

    fn apply(&mut self, record: LogRecord) {
        let ts = record.timestamp;
        match record.kind {
            RecordKind::TurnContext { model } => self.current_model = model,
            RecordKind::Event(EventMessage::UserMessage) => {
                if self.pending.is_none() {
                    self.pending = Some(PendingInterval {
                        start: ts,
                        candidate_end: None,
                    });
                }
            }
            RecordKind::Event(EventMessage::AgentMessage) => {
                // A reply stamped before its prompt closes nothing.
                if let Some(pending) = self.pending.take()
                    && let Some(interval) = Interval::new(pending.start, ts)
                {
                    self.extract.intervals.push(interval);
                }
            }
            RecordKind::Event(EventMessage::TokenCount(info)) => {
                let usage = self.token_delta(&info);
                let event = TokenEvent::new(ts, self.current_model.clone(), usage);
                self.extract.token_events.push(event);
            }
            RecordKind::ResponseItem {
                assistant_message: true,
            } => {
                if let Some(pending) = self.pending.as_mut()
                    && pending.candidate_end.is_none()
                {
                    pending.candidate_end = Some(ts);
                }
            }
            RecordKind::Event(EventMessage::Other)
            | RecordKind::ResponseItem {
                assistant_message: false,
            }
            | RecordKind::Unrecognized => {}
        }
    }

    /// A direct `last_token_usage` total makes the whole record direct, with
    /// missing counters read as zero. Otherwise each counter falls back to the
    /// difference from the previous cumulative snapshot.
    fn token_delta(&mut self, info: &TokenCountInfo) -> UsageTotals {
        let last = info.last.unwrap_or_default();
        let total = info.total.unwrap_or_default();
        let direct_record = last.total_tokens.is_some();
        let previous = &mut self.previous;
        let delta = |direct: Option<i64>, cumulative: Option<i64>, prev: &mut Option<i64>| {
            if direct_record {
                refresh_previous(cumulative, prev);
                clamp_count(direct)
            } else {
                counter_delta(direct, cumulative, prev)
            }
        };
        UsageTotals {
            input_tokens: delta(
                last.input_tokens,
                total.input_tokens,
                &mut previous.input_tokens,
            ),
            cached_input_tokens: delta(
                last.cached_input_tokens,
                total.cached_input_tokens,
                &mut previous.cached_input_tokens,
            ),
            output_tokens: delta(
                last.output_tokens,
                total.output_tokens,
                &mut previous.output_tokens,
            ),
            reasoning_output_tokens: delta(
                last.reasoning_output_tokens,
                total.reasoning_output_tokens,
                &mut previous.reasoning_output_tokens,
            ),
            total_tokens: delta(
                last.total_tokens,
                total.total_tokens,
                &mut previous.total_tokens,
            ),
        }
    }

    /// Closes a prompt left open at end of file with the first assistant
    /// response item seen after it, if any.
    fn finish(mut self) -> FileExtract {
        if let Some(pending) = self.pending.take()
            && let Some(candidate_end) = pending.candidate_end
            && let Some(interval) = Interval::new(pending.start, candidate_end)
        {
            self.extract.intervals.push(interval);
        }
        self.extract
    }
}

/// Counter resets produce negative differences, which are floored at zero.
fn counter_delta(direct: Option<i64>, cumulative: Option<i64>, previous: &mut Option<i64>) -> u64 {
    let delta = direct.or_else(|| {
        cumulative.map(|current| match *previous {
            Some(prev) => current.saturating_sub(prev),
            None => current,
        })
    });
    refresh_previous(cumulative, previous);
    clamp_count(delta)
}

fn refresh_previous(cumulative: Option<i64>, previous: &mut Option<i64>) {
    if cumulative.is_some() {
        *previous = cumulative;
    }
}

fn clamp_count(value: Option<i64>) -> u64 {
    value.unwrap_or(0).max(0) as u64
}

/// Extracts activity intervals and token events from newline-delimited
/// records. Never fails: bad lines are counted, and a read error ends the
/// scan with one extra bad unit.
pub fn extract_from_reader<R: BufRead>(mut reader: R) -> FileExtract {
    let mut state = ExtractState::default();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => match std::str::from_utf8(&buf) {
                Ok(line) => state.fold_line(line),
                Err(_) => state.extract.bad_lines += 1,
            },
            Err(err) => {
                tracing::debug!(error = %err, "read error while extracting session log");
                let mut extract = state.extract;
                extract.bad_lines += 1;
                return extract;
            }
        }
    }
    state.finish()
}

pub fn extract_file(path: &Path) -> FileExtract {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            tracing::debug!(?path, error = %err, "failed to open session log");
            return FileExtract::unreadable();
        }
    };
    let extract = extract_from_reader(BufReader::new(file));
    tracing::debug!(
        ?path,
        intervals = extract.intervals.len(),
        token_events = extract.token_events.len(),
        bad_lines = extract.bad_lines,
        "extracted session log"
    );
    extract
}
