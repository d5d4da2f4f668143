use std::sync::LazyLock;

use regex::Regex;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[+-]?\d+(?:\.\d+)?").expect("number pattern"));

/// Parses a trimmed decimal string, rejecting NaN and infinities.
pub fn parse_finite(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// All signed decimal numbers appearing in `text`, in order.
pub fn extract_numbers(text: &str) -> Vec<f64> {
    NUMBER_RE
        .find_iter(text)
        .filter_map(|m| parse_finite(m.as_str()))
        .collect()
}

pub fn first_number(text: &str) -> Option<f64> {
    extract_numbers(text).into_iter().next()
}

/// Replaces every number in `text` with `#`, the placeholder used by stat templates.
pub fn to_stat_template(text: &str) -> String {
    NUMBER_RE.replace_all(text, "#").into_owned()
}

/// Truncates towards negative infinity at two decimals.
pub fn round_down_2(value: f64) -> f64 {
    (value * 100.0).floor() / 100.0
}
