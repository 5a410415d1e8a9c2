//! Date/time helpers for mapwatch.
//!
//! All catalog times are pinned to the Asia/Shanghai zone: ranked instants
//! are converted right after parsing, and the watermark file stores its
//! value in the same zone.

use chrono::{DateTime, ParseError, TimeZone, Utc};
use chrono_tz::Asia::Shanghai;
use chrono_tz::Tz;

/// Current time in the fixed display timezone.
pub fn now_local() -> DateTime<Tz> {
    Utc::now().with_timezone(&Shanghai)
}

/// Parse an RFC3339 instant and convert it to the display timezone.
pub fn parse_instant(value: &str) -> Result<DateTime<Tz>, ParseError> {
    DateTime::parse_from_rfc3339(value.trim()).map(|dt| dt.with_timezone(&Shanghai))
}

/// Initial watermark value, used on first run and after state corruption.
pub fn epoch_default() -> DateTime<Tz> {
    Shanghai
        .with_ymd_and_hms(2019, 1, 1, 0, 0, 0)
        .single()
        .expect("epoch default is a valid local time")
}
