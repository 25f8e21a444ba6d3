use std::sync::LazyLock;

use regex::Regex;

static NON_DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9]").unwrap());
static NON_SIZE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9.]").unwrap());
static DOUBLE_DOT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.\.").unwrap());

/// Strip everything but digits: "₹4,700" → "4700", "$128.00" → "12800".
pub fn digits_only(s: &str) -> String {
    NON_DIGIT_RE.replace_all(s, "").into_owned()
}

/// Normalize a size string: keep digits and periods, then collapse each
/// run of two consecutive periods to nothing. Unit suffixes like
/// "FL. OZ." leave a trailing ".." behind, which the collapse removes:
/// "1.7 FL. OZ." → "1.7". Idempotent on already-clean input.
pub fn clean_size(s: &str) -> String {
    let kept = NON_SIZE_RE.replace_all(s, "");
    DOUBLE_DOT_RE.replace_all(&kept, "").into_owned()
}

// ── Tests ──
