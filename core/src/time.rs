//! Time related utils.

use chrono::Utc;

use crate::Error;
use crate::Result;

/// DateTime is the alias for chrono::DateTime<Utc>.
pub type DateTime = chrono::DateTime<Utc>;

/// Create datetime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into http date: `Sun, 06 Nov 1994 08:49:37 GMT`
///
/// ## Note
///
/// HTTP date is slightly different from RFC2822.
///
/// - Timezone is fixed to GMT.
/// - Day must be 2 digit.
pub fn format_http_date(t: DateTime) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parse http date like `Sun, 06 Nov 1994 08:49:37 GMT` into datetime.
pub fn parse_http_date(s: &str) -> Result<DateTime> {
    chrono::NaiveDateTime::parse_from_str(s, "%a, %d %b %Y %H:%M:%S GMT")
        .map(|t| t.and_utc())
        .map_err(|e| Error::unexpected(format!("parse {s} into http date failed")).with_source(e))
}
