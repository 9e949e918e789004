//! Date-time and duration parsing

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::warn;

static DURATION_RE: OnceLock<Option<Regex>> = OnceLock::new();

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601-like instant. A trailing `Z` means UTC, values
/// without an offset are taken as UTC, and a bare date is midnight UTC.
pub fn parse_datetime(raw: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let zulu = trimmed
        .strip_suffix('Z')
        .or_else(|| trimmed.strip_suffix('z'));
    let normalized = match zulu {
        Some(prefix) => format!("{}+00:00", prefix),
        None => trimmed.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt);
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Some(dt);
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

fn duration_re() -> Option<&'static Regex> {
    DURATION_RE
        .get_or_init(|| {
            let number = r"\d+(?:[.,]\d+)?";
            let pattern = format!(
                r"^-?P(?:{n}Y)?(?:{n}M)?(?:{n}W)?(?:{n}D)?(?:T(?:{n}H)?(?:{n}M)?(?:{n}S)?)?$",
                n = number
            );
            match Regex::new(&pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(error = %e, "Failed to compile duration regex");
                    None
                }
            }
        })
        .as_ref()
}

/// Whether `raw` is an ISO-8601 duration with at least one component
pub fn is_valid_duration(raw: &str) -> bool {
    let value = raw.trim();
    let Some(re) = duration_re() else {
        return false;
    };
    re.is_match(value)
        && !value.ends_with('P')
        && !value.ends_with('T')
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_zulu_and_offset_forms() {
        let zulu = parse_datetime("2021-03-04T05:06:07Z").unwrap();
        let offset = parse_datetime("2021-03-04T06:06:07+01:00").unwrap();
        assert_eq!(zulu, offset);
        assert_eq!(
            zulu,
            Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap().fixed_offset()
        );
    }

    #[test]
    fn test_naive_values_are_utc() {
        let naive = parse_datetime("2021-03-04 05:06:07.250").unwrap();
        assert_eq!(naive.offset().local_minus_utc(), 0);
        assert!(parse_datetime("2021-03-04").is_some());
        assert!(parse_datetime("2021-03-04T05:06").is_some());
    }

    #[test]
    fn test_invalid_dates() {
        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("yesterday").is_none());
        assert!(parse_datetime("2021-13-40").is_none());
    }

    #[test]
    fn test_durations() {
        assert!(is_valid_duration("PT1H"));
        assert!(is_valid_duration("P1Y2M10DT2H30M"));
        assert!(is_valid_duration("PT0.5S"));
        assert!(!is_valid_duration("P"));
        assert!(!is_valid_duration("PT"));
        assert!(!is_valid_duration("1 hour"));
        assert!(!is_valid_duration(""));
    }
}
