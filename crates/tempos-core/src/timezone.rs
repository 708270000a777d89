use crate::error::CoreError;
use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use chrono_english::{parse_date_string, Dialect};
use chrono_tz::Tz;
use std::str::FromStr;

/// Zone assumed for wall-clock times the model returns without an offset.
pub const DEFAULT_TIMEZONE: &str = "Africa/Casablanca";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %I:%M %p",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

/// Month/day forms that carry no year; the reference year is appended before parsing.
const MONTH_DAY_FORMATS: &[&str] = &["%B %d %Y", "%b %d %Y", "%d %B %Y", "%d %b %Y"];

const TIME_FORMATS: &[&str] = &["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M%p"];

/// Validate IANA timezone name
pub fn validate_timezone(timezone: &str) -> Result<Tz, CoreError> {
    Tz::from_str(timezone)
        .map_err(|_| CoreError::InvalidTimezone(format!("Invalid timezone: {}", timezone)))
}

/// Turns loosely formatted, zone-less date/time strings into UTC instants.
///
/// Components missing from the input are taken from the reference instant's
/// local date at midnight, so `"Sept 10"` resolves to midnight rather than the
/// current time of day. Parse failures yield `None`; callers treat that as
/// "unknown", never as an error.
#[derive(Debug, Clone, Copy)]
pub struct TimestampNormalizer {
    timezone: Tz,
}

impl Default for TimestampNormalizer {
    fn default() -> Self {
        Self { timezone: chrono_tz::Africa::Casablanca }
    }
}

impl TimestampNormalizer {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    pub fn from_name(timezone: &str) -> Result<Self, CoreError> {
        validate_timezone(timezone).map(Self::new)
    }

    pub fn normalize(&self, raw: Option<&str>, reference: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let raw = raw?.trim();
        if raw.is_empty() {
            return None;
        }

        // Already absolute: honour the offset instead of the assumed zone.
        if let Ok(absolute) = DateTime::parse_from_rfc3339(raw) {
            return Some(absolute.with_timezone(&Utc));
        }

        let template = reference
            .with_timezone(&self.timezone)
            .date_naive()
            .and_time(NaiveTime::MIN);

        let naive = parse_naive(raw, template)?;
        self.localize(naive)
    }

    /// Interprets a wall-clock time in the assumed zone.
    fn localize(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self.timezone.from_local_datetime(&naive) {
            LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
            LocalResult::None => {
                // Inside a spring-forward gap
                let shifted = naive + Duration::hours(1);
                self.timezone
                    .from_local_datetime(&shifted)
                    .earliest()
                    .map(|dt| dt.with_timezone(&Utc))
            }
        }
    }
}

/// Parses `raw` into a naive local date-time, filling gaps from `template`.
fn parse_naive(raw: &str, template: NaiveDateTime) -> Option<NaiveDateTime> {
    let cleaned = normalize_month_names(raw);
    let text = cleaned.as_str();

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }

    let with_year = format!("{} {}", text.trim_end_matches(','), template.year());
    for format in MONTH_DAY_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&with_year, format) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }

    for format in TIME_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(text, format) {
            return Some(template.date().and_time(time));
        }
    }
    if let Some(time) = parse_bare_hour(text) {
        return Some(template.date().and_time(time));
    }

    // Relative phrases ("tomorrow 3pm", "next friday"). The template is wrapped as
    // UTC only so the result can be unwrapped back into a naive wall-clock time.
    let base = Utc.from_utc_datetime(&template);
    parse_date_string(text, base, Dialect::Uk)
        .ok()
        .map(|dt| dt.naive_utc())
}

/// `9am`, `11 PM`: chrono cannot parse a time without minutes.
fn parse_bare_hour(text: &str) -> Option<NaiveTime> {
    let lower = text.to_ascii_lowercase();
    let (digits, pm) = if let Some(rest) = lower.strip_suffix("am") {
        (rest, false)
    } else if let Some(rest) = lower.strip_suffix("pm") {
        (rest, true)
    } else {
        return None;
    };
    let hour: u32 = digits.trim().parse().ok()?;
    if !(1..=12).contains(&hour) {
        return None;
    }
    let hour = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    };
    NaiveTime::from_hms_opt(hour, 0, 0)
}

/// chrono only knows three-letter abbreviations, so `Sept` becomes `Sep`.
fn normalize_month_names(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let lower = word.to_ascii_lowercase();
            if lower == "sept" || lower == "sept." {
                "Sep".to_string()
            } else if lower.starts_with("sept,") {
                "Sep,".to_string()
            } else {
                word.trim_end_matches('.').to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
