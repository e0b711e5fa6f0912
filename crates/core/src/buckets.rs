use chrono::{DateTime, Duration, FixedOffset, LocalResult, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::TokenEvent;
use crate::interval::{Interval, seconds_between};
use crate::window::{Granularity, Window};

/// One calendar-aligned bucket.
///
/// `local_start`/`local_end` are the wall-clock boundaries in the viewer's
/// zone; `start`/`end` are the same boundaries clipped to the window and are
/// what contributions are measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketSpan {
    pub local_start: DateTime<FixedOffset>,
    pub local_end: DateTime<FixedOffset>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BucketSpan {
    pub fn span_seconds(&self) -> f64 {
        seconds_between(self.start, self.end)
    }

    fn labels(&self) -> (String, String) {
        (
            self.local_start.to_rfc3339_opts(SecondsFormat::Secs, false),
            self.local_end.to_rfc3339_opts(SecondsFormat::Secs, false),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityBucket {
    pub bucket_start: String,
    pub bucket_end: String,
    pub active_seconds_any_instance: f64,
    pub percent_any_instance: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBucket {
    pub bucket_start: String,
    pub bucket_end: String,
    pub tokens: u64,
}

/// Partitions the window into consecutive buckets aligned to `granularity`
/// in `tz`. Spans with no positive width after clipping are dropped.
pub fn bucket_spans<Tz: TimeZone>(
    window: &Window,
    granularity: Granularity,
    tz: &Tz,
) -> Vec<BucketSpan> {
    let mut spans = Vec::new();
    let mut cursor = granularity.floor(window.start.with_timezone(tz).naive_local());
    loop {
        let local_start = resolve_local(tz, cursor);
        if local_start.with_timezone(&Utc) >= window.end {
            break;
        }
        let next = granularity.advance(cursor);
        let local_end = resolve_local(tz, next);
        let start = local_start.with_timezone(&Utc).max(window.start);
        let end = local_end.with_timezone(&Utc).min(window.end);
        if end > start {
            spans.push(BucketSpan {
                local_start: local_start.fixed_offset(),
                local_end: local_end.fixed_offset(),
                start,
                end,
            });
        }
        cursor = next;
    }
    spans
}

// Ambiguous wall times take the earlier instant; skipped ones land on the
// first valid instant after the transition.
fn resolve_local<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => tz
            .from_local_datetime(&(local + Duration::hours(1)))
            .earliest()
            .unwrap_or_else(|| tz.from_utc_datetime(&local)),
    }
}

/// Active seconds per bucket over a sorted, non-overlapping cover.
///
/// `cursor` only moves past intervals that end before the current bucket, so
/// an interval spanning several buckets is visited once per bucket.
pub fn attribute_intervals(spans: &[BucketSpan], merged: &[Interval]) -> Vec<ActivityBucket> {
    let mut cursor = 0;
    spans
        .iter()
        .map(|span| {
            while cursor < merged.len() && merged[cursor].end() <= span.start {
                cursor += 1;
            }
            let active = merged[cursor..]
                .iter()
                .take_while(|interval| interval.start() < span.end)
                .map(|interval| interval.overlap_seconds(span.start, span.end))
                .sum::<f64>();
            let span_seconds = span.span_seconds();
            let percent = if span_seconds > 0.0 {
                active / span_seconds * 100.0
            } else {
                0.0
            };
            let (bucket_start, bucket_end) = span.labels();
            ActivityBucket {
                bucket_start,
                bucket_end,
                active_seconds_any_instance: active,
                percent_any_instance: percent,
            }
        })
        .collect()
}

/// Token totals per bucket. Each event lands in the bucket whose clipped
/// `[start, end)` contains its timestamp.
pub fn attribute_tokens(spans: &[BucketSpan], events: &[TokenEvent]) -> Vec<TokenBucket> {
    let mut ordered: Vec<&TokenEvent> = events.iter().collect();
    ordered.sort_by_key(|event| event.timestamp);

    let mut cursor = 0;
    spans
        .iter()
        .map(|span| {
            while cursor < ordered.len() && ordered[cursor].timestamp < span.start {
                cursor += 1;
            }
            let mut tokens = 0u64;
            while cursor < ordered.len() && ordered[cursor].timestamp < span.end {
                tokens = tokens.saturating_add(ordered[cursor].usage.total_tokens);
                cursor += 1;
            }
            let (bucket_start, bucket_end) = span.labels();
            TokenBucket {
                bucket_start,
                bucket_end,
                tokens,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UsageTotals;

    fn ts(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw)
            .expect("timestamp")
            .with_timezone(&Utc)
    }

    fn window(start: &str, end: &str) -> Window {
        Window {
            start: ts(start),
            end: ts(end),
            label: "custom".to_string(),
        }
    }

    fn offset(hours: i32, minutes: i32) -> FixedOffset {
        FixedOffset::east_opt(hours * 3600 + minutes * 60).expect("offset")
    }

    fn event(raw: &str, tokens: u64) -> TokenEvent {
        TokenEvent::new(
            ts(raw),
            "gpt-5",
            UsageTotals {
                total_tokens: tokens,
                ..UsageTotals::default()
            },
        )
    }

    #[test]
    fn buckets_cover_window_exactly() {
        let window = window("2024-01-30T17:23:11Z", "2025-03-02T04:05:06Z");
        for tz in [offset(0, 0), offset(5, 30), offset(-8, 0)] {
            for granularity in [
                Granularity::Hour,
                Granularity::Day,
                Granularity::Week,
                Granularity::Month,
            ] {
                let spans = bucket_spans(&window, granularity, &tz);
                assert!(!spans.is_empty());
                assert_eq!(spans[0].start, window.start);
                assert_eq!(spans[spans.len() - 1].end, window.end);
                for pair in spans.windows(2) {
                    assert_eq!(pair[0].end, pair[1].start);
                }
                let covered = spans.iter().map(BucketSpan::span_seconds).sum::<f64>();
                assert!((covered - window.span_seconds()).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn buckets_align_to_local_calendar() {
        let tz = offset(2, 0);
        // 2025-06-05T23:30 local is a Thursday.
        let window = window("2025-06-05T21:30:00Z", "2025-06-20T00:00:00Z");
        let spans = bucket_spans(&window, Granularity::Week, &tz);
        assert_eq!(
            spans[0].local_start.to_rfc3339(),
            "2025-06-02T00:00:00+02:00"
        );
        assert_eq!(spans[0].start, window.start);
        assert_eq!(spans[0].end, ts("2025-06-08T22:00:00Z"));

        let months = bucket_spans(&window, Granularity::Month, &tz);
        assert_eq!(months.len(), 1);
        assert_eq!(
            months[0].local_start.to_rfc3339(),
            "2025-06-01T00:00:00+02:00"
        );
        assert_eq!(
            months[0].local_end.to_rfc3339(),
            "2025-07-01T00:00:00+02:00"
        );
    }

    #[test]
    fn buckets_follow_daylight_saving_transitions() {
        let tz = chrono_tz::America::New_York;
        let window = window("2025-03-08T00:00:00Z", "2025-11-04T12:00:00Z");
        for granularity in [
            Granularity::Hour,
            Granularity::Day,
            Granularity::Week,
            Granularity::Month,
        ] {
            let spans = bucket_spans(&window, granularity, &tz);
            assert_eq!(spans[0].start, window.start);
            assert_eq!(spans[spans.len() - 1].end, window.end);
            for pair in spans.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
        }

        let hours = bucket_spans(&window, Granularity::Hour, &tz);
        let find = |label: &str| {
            hours
                .iter()
                .find(|span| span.local_start.to_rfc3339() == label)
                .copied()
        };
        // 02:00 does not exist on the spring-forward night.
        let before_gap = find("2025-03-09T01:00:00-05:00").expect("bucket before gap");
        assert_eq!(before_gap.end, ts("2025-03-09T07:00:00Z"));
        assert!(find("2025-03-09T02:00:00-05:00").is_none());
        assert!(find("2025-03-09T03:00:00-04:00").is_some());
        // The repeated 01:00 hour folds into one two-hour bucket.
        let repeated = find("2025-11-02T01:00:00-04:00").expect("repeated hour");
        assert_eq!(repeated.span_seconds(), 7200.0);

        let days = bucket_spans(&window, Granularity::Day, &tz);
        let day = |label: &str| {
            days.iter()
                .find(|span| span.local_start.to_rfc3339() == label)
                .map(BucketSpan::span_seconds)
        };
        assert_eq!(day("2025-03-09T00:00:00-05:00"), Some(23.0 * 3600.0));
        assert_eq!(day("2025-11-02T00:00:00-04:00"), Some(25.0 * 3600.0));
    }

    #[test]
    fn interval_spanning_buckets_is_split() {
        let window = window("2025-01-01T10:30:00Z", "2025-01-01T14:00:00Z");
        let spans = bucket_spans(&window, Granularity::Hour, &Utc);
        assert_eq!(spans.len(), 4);
        let merged = vec![
            Interval::new(ts("2025-01-01T10:30:00Z"), ts("2025-01-01T12:15:00Z"))
                .expect("interval"),
            Interval::new(ts("2025-01-01T13:00:00Z"), ts("2025-01-01T13:06:00Z"))
                .expect("interval"),
        ];
        let buckets = attribute_intervals(&spans, &merged);
        let seconds: Vec<f64> = buckets
            .iter()
            .map(|bucket| bucket.active_seconds_any_instance)
            .collect();
        assert_eq!(seconds, vec![1800.0, 3600.0, 900.0, 360.0]);
        // The first bucket is clipped to 30 minutes and fully active.
        assert!((buckets[0].percent_any_instance - 100.0).abs() < 1e-9);
        assert!((buckets[2].percent_any_instance - 25.0).abs() < 1e-9);
        assert!((buckets[3].percent_any_instance - 10.0).abs() < 1e-9);
        assert_eq!(buckets[0].bucket_start, "2025-01-01T10:00:00+00:00");
    }

    #[test]
    fn attribution_without_intervals_is_zero() {
        let window = window("2025-01-01T00:00:00Z", "2025-01-03T00:00:00Z");
        let spans = bucket_spans(&window, Granularity::Day, &Utc);
        let buckets = attribute_intervals(&spans, &[]);
        assert_eq!(buckets.len(), 2);
        assert!(
            buckets
                .iter()
                .all(|bucket| bucket.active_seconds_any_instance == 0.0)
        );
    }

    #[test]
    fn tokens_land_in_half_open_buckets() {
        let window = window("2025-01-01T00:00:00Z", "2025-01-01T03:00:00Z");
        let spans = bucket_spans(&window, Granularity::Hour, &Utc);
        let events = vec![
            event("2025-01-01T02:59:59Z", 7),
            event("2024-12-31T23:59:59Z", 1000),
            event("2025-01-01T00:00:00Z", 5),
            event("2025-01-01T01:00:00Z", 11),
            event("2025-01-01T00:30:00Z", 3),
            event("2025-01-01T03:00:00Z", 500),
        ];
        let buckets = attribute_tokens(&spans, &events);
        let tokens: Vec<u64> = buckets.iter().map(|bucket| bucket.tokens).collect();
        assert_eq!(tokens, vec![8, 11, 7]);
    }
}
