//! Observation timestamp normalization (OBX-14).
//!
//! Accepted layouts, tried from most to least specific:
//!
//! | Layout           | Example          | Source                      |
//! |------------------|------------------|-----------------------------|
//! | `yyyyMMddHHmmss` | `20240101123005` | [`TimestampSource::Seconds`] |
//! | `yyyyMMddHHmm`   | `202401011230`   | [`TimestampSource::Minutes`] |
//! | `yyyyMMdd`       | `20240101`       | [`TimestampSource::Date`]    |
//!
//! Matching is exact over the whole text and every value is read as UTC.
//! Offsets and fractional seconds are not accepted. Empty or unmatched text
//! resolves to the processing time and is marked
//! [`TimestampSource::ProcessingTime`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use oru_model::TimestampSource;

/// Source of the processing time used for the fallback.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A normalized observation time and how it was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationTime {
    pub at: DateTime<Utc>,
    pub source: TimestampSource,
}

struct Layout {
    format: &'static str,
    len: usize,
    source: TimestampSource,
}

const LAYOUTS: [Layout; 3] = [
    Layout {
        format: "%Y%m%d%H%M%S",
        len: 14,
        source: TimestampSource::Seconds,
    },
    Layout {
        format: "%Y%m%d%H%M",
        len: 12,
        source: TimestampSource::Minutes,
    },
    Layout {
        format: "%Y%m%d",
        len: 8,
        source: TimestampSource::Date,
    },
];

/// Parses OBX-14 text against the accepted layouts. First match wins.
pub fn parse_observation_time(text: &str) -> Option<ObservationTime> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    LAYOUTS
        .iter()
        .filter(|layout| layout.len == text.len())
        .find_map(|layout| {
            let naive = match layout.source {
                TimestampSource::Date => NaiveDate::parse_from_str(text, layout.format)
                    .ok()
                    .map(|date| date.and_time(NaiveTime::MIN)),
                _ => NaiveDateTime::parse_from_str(text, layout.format).ok(),
            }?;
            Some(ObservationTime {
                at: naive.and_utc(),
                source: layout.source,
            })
        })
}

/// Normalizes OBX-14 text, substituting `processing_time` when the text is
/// empty or matches no layout.
pub fn normalize_observation_time(text: &str, processing_time: DateTime<Utc>) -> ObservationTime {
    parse_observation_time(text).unwrap_or(ObservationTime {
        at: processing_time,
        source: TimestampSource::ProcessingTime,
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_parses_each_layout() {
        let seconds = parse_observation_time("20240101123005").unwrap();
        assert_eq!(seconds.at, utc(2024, 1, 1, 12, 30, 5));
        assert_eq!(seconds.source, TimestampSource::Seconds);

        let minutes = parse_observation_time("202401011230").unwrap();
        assert_eq!(minutes.at, utc(2024, 1, 1, 12, 30, 0));
        assert_eq!(minutes.source, TimestampSource::Minutes);

        let date = parse_observation_time("20240101").unwrap();
        assert_eq!(date.at, utc(2024, 1, 1, 0, 0, 0));
        assert_eq!(date.source, TimestampSource::Date);
    }

    #[test]
    fn test_rejects_other_shapes() {
        for text in [
            "",
            "2024",
            "2024010",
            "2024-01-01",
            "20241301",
            "20240230",
            "202401011260",
            "20240101123000.123",
            "20240101123000+0100",
            "not a date",
        ] {
            assert!(parse_observation_time(text).is_none(), "{text}");
        }
    }

    #[test]
    fn test_falls_back_to_processing_time() {
        let now = utc(2025, 6, 30, 9, 0, 0);
        for text in ["", "   ", "yesterday"] {
            let time = normalize_observation_time(text, now);
            assert_eq!(time.at, now);
            assert_eq!(time.source, TimestampSource::ProcessingTime);
            assert!(time.source.is_fallback());
        }
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let time = normalize_observation_time(" 20240101 ", utc(2025, 1, 1, 0, 0, 0));
        assert_eq!(time.source, TimestampSource::Date);
    }

    #[test]
    fn test_fixed_clock_is_stable() {
        let clock = FixedClock(utc(2024, 5, 5, 5, 5, 5));
        assert_eq!(clock.now(), clock.now());
    }
}
