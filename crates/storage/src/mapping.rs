//! Lenient parsing of stored enum strings shared by both backends.

use std::str::FromStr;

/// Parses an optional stored enum value. Unknown values are logged and treated as absent so
/// one malformed row does not fail the whole page.
pub(crate) fn parse_stored<T: FromStr>(column: &'static str, raw: Option<&str>) -> Option<T> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(column, value = %raw, "unrecognized stored value, ignoring");
            None
        },
    }
}
