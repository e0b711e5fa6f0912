use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use chrono::{DateTime, Local, TimeZone, Utc};
use ingest::scan_roots;
use uptime_core::{
    Granularity, ModelUsage, PricingTable, UsageReport, UsageTotals, WindowSpec,
    attribute_intervals, attribute_tokens, bucket_spans, clamp_intervals, compute_cost_breakdown,
    merge_intervals, resolve_window, total_seconds,
};

use crate::config::UptimeParams;
use crate::error::{AppError, Result};
use crate::pricing::load_pricing_table;
use crate::services::SharedConfig;
use crate::sources::session_roots;
use crate::util::time::{non_empty, parse_datetime_input};

/// A validated uptime request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageQuery {
    pub window: WindowSpec,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// `None` picks a granularity from the resolved window span.
    pub granularity: Option<Granularity>,
}

impl UsageQuery {
    pub fn from_params<Tz: TimeZone>(params: &UptimeParams, tz: &Tz) -> Result<Self> {
        let window = match non_empty(params.window.as_deref()) {
            Some(token) => WindowSpec::from_token(token)
                .ok_or_else(|| AppError::InvalidInput(format!("unsupported window {}", token)))?,
            None => WindowSpec::All,
        };
        let start = non_empty(params.start.as_deref())
            .map(|value| parse_datetime_input(value, tz))
            .transpose()?;
        let end = non_empty(params.end.as_deref())
            .map(|value| parse_datetime_input(value, tz))
            .transpose()?;
        let granularity = non_empty(params.granularity.as_deref())
            .map(|name| {
                Granularity::from_name(name).ok_or_else(|| {
                    AppError::InvalidInput(format!("unsupported granularity {}", name))
                })
            })
            .transpose()?;
        Ok(Self {
            window,
            start,
            end,
            granularity,
        })
    }
}

#[derive(Clone)]
pub struct UptimeService {
    config: SharedConfig,
}

impl UptimeService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    /// Report over the configured local sessions directory and synced sources.
    pub fn compute(&self, params: &UptimeParams) -> Result<UsageReport> {
        let roots = session_roots(&self.config);
        self.compute_for_roots(&roots, params)
    }

    /// Report over explicit roots, in the machine's local time zone.
    pub fn compute_for_roots(
        &self,
        roots: &[PathBuf],
        params: &UptimeParams,
    ) -> Result<UsageReport> {
        let query = UsageQuery::from_params(params, &Local)?;
        let pricing = load_pricing_table(&self.config.pricing_path);
        compute_usage(roots, &query, &pricing, Utc::now(), &Local)
    }
}

#[derive(Default)]
struct ModelAccumulator {
    usage: UsageTotals,
    cost_usd: f64,
    priced: bool,
}

/// Scans `roots`, resolves the window against `now` and builds the report.
/// Buckets are aligned to `tz`.
pub fn compute_usage<Tz: TimeZone>(
    roots: &[PathBuf],
    query: &UsageQuery,
    pricing: &PricingTable,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<UsageReport> {
    let existing: Vec<PathBuf> = roots.iter().filter(|root| root.is_dir()).cloned().collect();
    if existing.is_empty() {
        return Err(AppError::NoSessionRoots);
    }

    let scan = scan_roots(&existing);
    let window = resolve_window(query.window, now, scan.earliest, query.start, query.end);
    if !window.is_valid() {
        return Err(AppError::InvalidWindow {
            start: window.start.to_rfc3339(),
            end: window.end.to_rfc3339(),
        });
    }

    let clamped = clamp_intervals(&scan.intervals, &window);
    let merged = merge_intervals(&clamped);
    let summed_seconds = total_seconds(&clamped);
    let merged_seconds = total_seconds(&merged);
    let window_seconds = window.span_seconds();

    let granularity = query
        .granularity
        .unwrap_or_else(|| Granularity::auto(window_seconds));
    let spans = bucket_spans(&window, granularity, tz);
    let token_buckets = attribute_tokens(&spans, &scan.token_events);
    let activity_buckets = attribute_intervals(&spans, &merged);
    let tokens_total = token_buckets
        .iter()
        .fold(0u64, |acc, bucket| acc.saturating_add(bucket.tokens));

    let mut token_totals = UsageTotals::default();
    let mut per_model: BTreeMap<&str, ModelAccumulator> = BTreeMap::new();
    let mut unknown_models = BTreeSet::new();
    for event in &scan.token_events {
        if !window.contains_inclusive(event.timestamp) {
            continue;
        }
        token_totals.add(&event.usage);
        let entry = per_model.entry(event.model.as_str()).or_default();
        entry.usage.add(&event.usage);
        match pricing.lookup(&event.model) {
            Some(rate) => {
                entry.cost_usd += compute_cost_breakdown(&event.usage, &rate).total_cost_usd;
                entry.priced = true;
            }
            None => {
                unknown_models.insert(event.model.clone());
            }
        }
    }

    let cost_total_usd: f64 = per_model.values().map(|entry| entry.cost_usd).sum();
    let mut models: Vec<ModelUsage> = per_model
        .into_iter()
        .map(|(model, entry)| ModelUsage {
            model: model.to_string(),
            total_tokens: entry.usage.total_tokens,
            cost_usd: entry.priced.then_some(entry.cost_usd),
        })
        .collect();
    models.sort_by(|a, b| {
        b.total_tokens
            .cmp(&a.total_tokens)
            .then_with(|| a.model.cmp(&b.model))
    });

    let percent = |seconds: f64| {
        if window_seconds > 0.0 {
            seconds / window_seconds * 100.0
        } else {
            0.0
        }
    };

    tracing::info!(
        window = %window.label,
        granularity = granularity.as_str(),
        files = scan.files_scanned,
        bad_lines = scan.bad_lines,
        intervals_raw = clamped.len(),
        intervals_merged = merged.len(),
        tokens_total,
        cost_partial = !unknown_models.is_empty(),
        "computed uptime report"
    );

    Ok(UsageReport {
        window: window.label.clone(),
        window_start: window.start.to_rfc3339(),
        window_end: window.end.to_rfc3339(),
        granularity,
        token_buckets,
        activity_buckets,
        tokens_total,
        token_totals,
        models,
        cost_total_usd,
        cost_partial: !unknown_models.is_empty(),
        unknown_models: unknown_models.into_iter().collect(),
        pricing_version: pricing.version.clone(),
        files_scanned: scan.files_scanned,
        bad_lines: scan.bad_lines,
        intervals_raw: clamped.len(),
        intervals_merged: merged.len(),
        active_seconds_any_instance: merged_seconds,
        active_seconds_summed: summed_seconds,
        percent_any_instance: percent(merged_seconds),
        percent_summed: percent(summed_seconds),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn query_defaults_to_all_with_auto_granularity() {
        let query = UsageQuery::from_params(&UptimeParams::default(), &Utc).expect("query");
        assert_eq!(query, UsageQuery::default());

        let params = UptimeParams {
            window: Some(String::new()),
            start: Some("  ".to_string()),
            end: None,
            granularity: Some(String::new()),
        };
        let query = UsageQuery::from_params(&params, &Utc).expect("query");
        assert_eq!(query.window, WindowSpec::All);
        assert!(query.start.is_none());
        assert!(query.granularity.is_none());
    }

    #[test]
    fn query_parses_tokens_and_overrides() {
        let tz = FixedOffset::east_opt(3600).expect("offset");
        let params = UptimeParams {
            window: Some("1w".to_string()),
            start: Some("2026-01-15T12:00:00".to_string()),
            end: Some("2026-02-01T12:00:00Z".to_string()),
            granularity: Some("day".to_string()),
        };
        let query = UsageQuery::from_params(&params, &tz).expect("query");
        assert_eq!(query.window, WindowSpec::Week);
        assert_eq!(
            query.start.map(|value| value.to_rfc3339()),
            Some("2026-01-15T11:00:00+00:00".to_string())
        );
        assert_eq!(query.granularity, Some(Granularity::Day));
    }

    #[test]
    fn query_rejects_unknown_tokens() {
        for params in [
            UptimeParams {
                window: Some("2d".to_string()),
                ..UptimeParams::default()
            },
            UptimeParams {
                granularity: Some("minute".to_string()),
                ..UptimeParams::default()
            },
            UptimeParams {
                end: Some("tomorrow".to_string()),
                ..UptimeParams::default()
            },
        ] {
            let err = UsageQuery::from_params(&params, &Utc).expect_err("invalid");
            assert!(matches!(err, AppError::InvalidInput(_)));
        }
    }

    #[test]
    fn missing_roots_are_a_configuration_error() {
        let err = compute_usage(
            &[PathBuf::from("/definitely/not/a/sessions/dir")],
            &UsageQuery::default(),
            &PricingTable::builtin(),
            Utc::now(),
            &Utc,
        )
        .expect_err("no roots");
        assert!(matches!(err, AppError::NoSessionRoots));
    }
}
