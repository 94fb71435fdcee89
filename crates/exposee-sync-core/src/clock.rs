//! Server/client clock-skew detection.
//!
//! Exposure windows are computed from local time downstream, so a response
//! is only trusted when the server `Date` is within a fixed tolerance of the
//! local clock. The guard fails closed and never corrects the local clock.

use std::time::Duration;

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// IMF-fixdate, the preferred HTTP-date format (RFC 9110 §5.6.7).
const IMF_FIXDATE: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

/// Compares server and local time and returns the absolute shift when it exceeds `threshold`.
///
/// A shift exactly equal to the threshold is accepted.
pub fn check_time_shift(
    server_time: OffsetDateTime,
    local_time: OffsetDateTime,
    threshold: Duration,
) -> Result<(), Duration> {
    let shift = (local_time - server_time).unsigned_abs();
    if shift > threshold {
        return Err(shift);
    }
    Ok(())
}

/// Parses an IMF-fixdate header value such as `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn parse_http_date(value: &str) -> Option<OffsetDateTime> {
    PrimitiveDateTime::parse(value.trim(), IMF_FIXDATE)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

/// Renders a timestamp as an IMF-fixdate header value.
pub fn format_http_date(at: OffsetDateTime) -> Option<String> {
    let utc = at.to_offset(time::UtcOffset::UTC);
    utc.format(IMF_FIXDATE).ok()
}
