use serde::{Deserialize, Serialize};

use crate::UsageTotals;
use crate::buckets::{ActivityBucket, TokenBucket};
use crate::window::Granularity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelUsage {
    pub model: String,
    pub total_tokens: u64,
    pub cost_usd: Option<f64>,
}

/// Result of one uptime computation. Timestamps are RFC 3339 strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageReport {
    pub window: String,
    pub window_start: String,
    pub window_end: String,
    pub granularity: Granularity,
    pub token_buckets: Vec<TokenBucket>,
    pub activity_buckets: Vec<ActivityBucket>,
    pub tokens_total: u64,
    pub token_totals: UsageTotals,
    pub models: Vec<ModelUsage>,
    pub cost_total_usd: f64,
    pub cost_partial: bool,
    pub unknown_models: Vec<String>,
    pub pricing_version: String,
    pub files_scanned: usize,
    pub bad_lines: u64,
    pub intervals_raw: usize,
    pub intervals_merged: usize,
    pub active_seconds_any_instance: f64,
    pub active_seconds_summed: f64,
    pub percent_any_instance: f64,
    pub percent_summed: f64,
}
