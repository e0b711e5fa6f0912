use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::seconds_between;

const HOUR_SECS: f64 = 3600.0;
const DAY_SECS: f64 = 24.0 * HOUR_SECS;

/// Named window requested by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowSpec {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "1d")]
    Day,
    #[serde(rename = "1w")]
    Week,
    #[serde(rename = "1m")]
    Month,
    #[serde(rename = "3m")]
    Quarter,
    #[serde(rename = "1y")]
    Year,
}

impl WindowSpec {
    pub const ALL: [WindowSpec; 6] = [
        WindowSpec::All,
        WindowSpec::Day,
        WindowSpec::Week,
        WindowSpec::Month,
        WindowSpec::Quarter,
        WindowSpec::Year,
    ];

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|spec| spec.label() == token)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Day => "1d",
            Self::Week => "1w",
            Self::Month => "1m",
            Self::Quarter => "3m",
            Self::Year => "1y",
        }
    }
}

/// Absolute time range a report covers. Callers must reject `end <= start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub label: String,
}

impl Window {
    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }

    pub fn span_seconds(&self) -> f64 {
        seconds_between(self.start, self.end)
    }

    /// Inclusive at both ends, matching how cost attribution filters events.
    pub fn contains_inclusive(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts <= self.end
    }
}

/// Resolves a window token or explicit overrides against `now`.
///
/// Overrides win over the token; a missing override side falls back to the
/// earliest observed timestamp (start) or `now` (end). The result may be
/// degenerate, e.g. `all` with no data yields a zero-width window.
pub fn resolve_window(
    spec: WindowSpec,
    now: DateTime<Utc>,
    earliest: Option<DateTime<Utc>>,
    start_override: Option<DateTime<Utc>>,
    end_override: Option<DateTime<Utc>>,
) -> Window {
    if start_override.is_some() || end_override.is_some() {
        return Window {
            start: start_override.or(earliest).unwrap_or(now),
            end: end_override.unwrap_or(now),
            label: "custom".to_string(),
        };
    }
    let start = match spec {
        WindowSpec::All => earliest.unwrap_or(now),
        WindowSpec::Day => now - Duration::days(1),
        WindowSpec::Week => now - Duration::days(7),
        WindowSpec::Month => shift_months(now.naive_utc(), -1).and_utc(),
        WindowSpec::Quarter => shift_months(now.naive_utc(), -3).and_utc(),
        WindowSpec::Year => shift_months(now.naive_utc(), -12).and_utc(),
    };
    Window {
        start,
        end: now,
        label: spec.label().to_string(),
    }
}

/// Moves by whole calendar months, clamping the day to the target month's length.
pub fn shift_months(dt: NaiveDateTime, months: i32) -> NaiveDateTime {
    let index = dt.year() * 12 + dt.month0() as i32 + months;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let day = dt.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
        .map(|date| date.and_time(dt.time()))
        .unwrap_or(dt)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hour,
    Day,
    Week,
    Month,
}

impl Granularity {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "hour" => Some(Self::Hour),
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// Picks a bucket size from the window span.
    pub fn auto(window_seconds: f64) -> Self {
        if window_seconds <= 2.0 * DAY_SECS {
            Self::Hour
        } else if window_seconds <= 120.0 * DAY_SECS {
            Self::Day
        } else if window_seconds <= 400.0 * DAY_SECS {
            Self::Week
        } else {
            Self::Month
        }
    }

    /// Floors a wall-clock time to the start of its bucket. Weeks start on Monday.
    pub fn floor(&self, local: NaiveDateTime) -> NaiveDateTime {
        let date = local.date();
        match self {
            Self::Hour => date.and_time(
                NaiveTime::from_hms_opt(local.hour(), 0, 0).unwrap_or(NaiveTime::MIN),
            ),
            Self::Day => date.and_time(NaiveTime::MIN),
            Self::Week => {
                let offset = date.weekday().num_days_from_monday() as i64;
                (date - Duration::days(offset)).and_time(NaiveTime::MIN)
            }
            Self::Month => date
                .with_day(1)
                .unwrap_or(date)
                .and_time(NaiveTime::MIN),
        }
    }

    pub fn advance(&self, local: NaiveDateTime) -> NaiveDateTime {
        match self {
            Self::Hour => local + Duration::hours(1),
            Self::Day => local + Duration::days(1),
            Self::Week => local + Duration::days(7),
            Self::Month => shift_months(local, 1),
        }
    }
}
