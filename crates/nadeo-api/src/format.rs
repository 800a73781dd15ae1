//! Trackmania format-code stripping
//!
//! Display names coming off the APIs carry `$`-prefixed format codes
//! (colors, style toggles, links). `clean` removes them so names render
//! as plain text in logs and tables.

use std::sync::LazyLock;

use regex::Regex;

/// One format code: a three-digit hex color, a single-letter style
/// toggle, a link bracket, or an escaped `$$`.
static FORMAT_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([0-9a-fA-F]{3}|[iIswntgzjGLS<>]|[oO]|\$)").unwrap());

/// Strip every format code from a display string.
pub fn clean(raw: &str) -> String {
    FORMAT_CODE.replace_all(raw, "").into_owned()
}
