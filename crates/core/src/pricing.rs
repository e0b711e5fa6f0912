use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::UsageTotals;

const BUILTIN_VERSION: &str = "2025-12";

// (model, input, cached input, output) in USD per million tokens.
const BUILTIN_RATES: &[(&str, f64, f64, f64)] = &[
    ("gpt-5.2", 1.75, 0.175, 14.00),
    ("gpt-5.2-chat-latest", 1.75, 0.175, 14.00),
    ("gpt-5.2-codex", 1.75, 0.175, 14.00),
    ("gpt-5.1", 1.25, 0.125, 10.00),
    ("gpt-5.1-chat-latest", 1.25, 0.125, 10.00),
    ("gpt-5.1-codex", 1.25, 0.125, 10.00),
    ("gpt-5.1-codex-max", 1.25, 0.125, 10.00),
    ("gpt-5.1-codex-mini", 0.25, 0.025, 2.00),
    ("gpt-5", 1.25, 0.125, 10.00),
    ("gpt-5-chat-latest", 1.25, 0.125, 10.00),
    ("gpt-5-mini", 0.25, 0.025, 2.00),
    ("gpt-5-nano", 0.05, 0.005, 0.40),
    ("gpt-5-codex", 1.25, 0.125, 10.00),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingEntry {
    pub input_per_1m: f64,
    pub cached_input_per_1m: f64,
    pub output_per_1m: f64,
}

/// Prices models matching `pattern` (with `*` wildcards) like `model`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingFallback {
    pub pattern: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTable {
    pub version: String,
    pub models: BTreeMap<String, PricingEntry>,
    #[serde(default)]
    pub fallbacks: Vec<PricingFallback>,
}

impl PricingTable {
    pub fn builtin() -> Self {
        let models = BUILTIN_RATES
            .iter()
            .map(|(model, input, cached, output)| {
                (
                    model.to_string(),
                    PricingEntry {
                        input_per_1m: *input,
                        cached_input_per_1m: *cached,
                        output_per_1m: *output,
                    },
                )
            })
            .collect();
        Self {
            version: BUILTIN_VERSION.to_string(),
            models,
            fallbacks: vec![PricingFallback {
                pattern: "gpt-5.2*codex*".to_string(),
                model: "gpt-5.2".to_string(),
            }],
        }
    }

    /// Exact match first, then the first fallback whose pattern matches.
    pub fn lookup(&self, model: &str) -> Option<PricingEntry> {
        if let Some(entry) = self.models.get(model) {
            return Some(*entry);
        }
        self.fallbacks
            .iter()
            .find(|fallback| model_matches_pattern(model, &fallback.pattern))
            .and_then(|fallback| self.models.get(&fallback.model).copied())
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::builtin()
    }
}

pub fn model_matches_pattern(model: &str, pattern: &str) -> bool {
    let model = model.to_ascii_lowercase();
    let pattern = pattern.to_ascii_lowercase();
    if pattern == "*" {
        return true;
    }
    if !pattern.contains('*') {
        return model == pattern;
    }
    let mut remainder = model.as_str();
    let mut first = true;
    for part in pattern.split('*') {
        if part.is_empty() {
            first = false;
            continue;
        }
        match remainder.find(part) {
            Some(index) if !(first && index != 0) => {
                remainder = &remainder[index + part.len()..];
                first = false;
            }
            _ => return false,
        }
    }
    pattern.ends_with('*') || remainder.is_empty()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub input_cost_usd: f64,
    pub cached_input_cost_usd: f64,
    pub output_cost_usd: f64,
    pub total_cost_usd: f64,
}

pub fn compute_cost_breakdown(usage: &UsageTotals, entry: &PricingEntry) -> CostBreakdown {
    let cached = usage.cached_input_tokens.min(usage.input_tokens);
    let uncached = usage.input_tokens.saturating_sub(cached) as f64;
    // Reasoning tokens are billed at the output rate on top of visible output.
    let output = usage
        .output_tokens
        .saturating_add(usage.reasoning_output_tokens) as f64;
    let input_cost = (uncached / 1_000_000.0) * entry.input_per_1m;
    let cached_input_cost = (cached as f64 / 1_000_000.0) * entry.cached_input_per_1m;
    let output_cost = (output / 1_000_000.0) * entry.output_per_1m;
    CostBreakdown {
        input_cost_usd: input_cost,
        cached_input_cost_usd: cached_input_cost,
        output_cost_usd: output_cost,
        total_cost_usd: input_cost + cached_input_cost + output_cost,
    }
}
