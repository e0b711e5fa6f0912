use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{AppError, Result};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Trims a raw parameter and drops it when blank.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Parses a user-supplied timestamp. Values with an offset are taken as-is;
/// zone-less values and bare dates are read in `tz`.
pub fn parse_datetime_input<Tz: TimeZone>(value: &str, tz: &Tz) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| AppError::InvalidInput(format!("invalid datetime: {}", value)))?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| {
            AppError::InvalidInput(format!("datetime does not exist in local time: {}", value))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw)
            .expect("timestamp")
            .with_timezone(&Utc)
    }

    #[test]
    fn zoned_values_ignore_local_zone() {
        let tz = FixedOffset::east_opt(2 * 3600).expect("offset");
        assert_eq!(
            parse_datetime_input("2026-01-15T12:00:00Z", &tz).expect("parse"),
            utc("2026-01-15T12:00:00Z")
        );
    }

    #[test]
    fn naive_values_are_local() {
        let tz = FixedOffset::east_opt(2 * 3600).expect("offset");
        assert_eq!(
            parse_datetime_input("2026-01-15T12:00", &tz).expect("parse"),
            utc("2026-01-15T10:00:00Z")
        );
        assert_eq!(
            parse_datetime_input(" 2026-01-15 12:30:00 ", &tz).expect("parse"),
            utc("2026-01-15T10:30:00Z")
        );
        assert_eq!(
            parse_datetime_input("2026-01-15", &tz).expect("parse"),
            utc("2026-01-14T22:00:00Z")
        );
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_datetime_input("last tuesday", &Utc).expect_err("invalid");
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn blank_params_are_absent() {
        assert_eq!(non_empty(Some("  ")), None);
        assert_eq!(non_empty(Some(" 1d ")), Some("1d"));
        assert_eq!(non_empty(None), None);
    }
}
