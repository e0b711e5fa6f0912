mod buckets;
mod interval;
mod pricing;
mod report;
mod window;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use buckets::{
    ActivityBucket, BucketSpan, TokenBucket, attribute_intervals, attribute_tokens, bucket_spans,
};
pub use interval::{Interval, clamp_intervals, merge_intervals, seconds_between, total_seconds};
pub use pricing::{
    CostBreakdown, PricingEntry, PricingFallback, PricingTable, compute_cost_breakdown,
    model_matches_pattern,
};
pub use report::{ModelUsage, UsageReport};
pub use window::{Granularity, Window, WindowSpec, resolve_window, shift_months};

/// Model name used when a session never declared one.
pub const UNKNOWN_MODEL: &str = "unknown";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageTotals {
    pub input_tokens: u64,
    pub cached_input_tokens: u64,
    pub output_tokens: u64,
    pub reasoning_output_tokens: u64,
    pub total_tokens: u64,
}

impl UsageTotals {
    pub fn add(&mut self, other: &UsageTotals) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.cached_input_tokens = self
            .cached_input_tokens
            .saturating_add(other.cached_input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
        self.reasoning_output_tokens = self
            .reasoning_output_tokens
            .saturating_add(other.reasoning_output_tokens);
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);
    }
}

/// Per-step token usage attributed to the model active when it was reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEvent {
    pub timestamp: DateTime<Utc>,
    pub model: String,
    pub usage: UsageTotals,
}

impl TokenEvent {
    /// Builds an event from per-counter deltas. A zero total is replaced by
    /// `input + output + reasoning`.
    pub fn new(timestamp: DateTime<Utc>, model: impl Into<String>, usage: UsageTotals) -> Self {
        let mut usage = usage;
        if usage.total_tokens == 0 {
            usage.total_tokens = usage
                .input_tokens
                .saturating_add(usage.output_tokens)
                .saturating_add(usage.reasoning_output_tokens);
        }
        Self {
            timestamp,
            model: model.into(),
            usage,
        }
    }
}

pub fn normalize_model_name(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => UNKNOWN_MODEL.to_string(),
    }
}
