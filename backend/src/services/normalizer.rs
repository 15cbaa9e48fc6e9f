//! Helpers shared by every metadata provider to turn upstream JSON into
//! [`VideoMetadata`](crate::models::VideoMetadata) fields.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

pub const MAX_HASHTAGS: usize = 10;

const SHORTS_MARKER: &str = "/shorts/";
const SHORT_MAX_SECONDS: u64 = 60;

lazy_static! {
    static ref HASHTAG_RE: Regex =
        Regex::new(r"#[0-9A-Za-z_\x{00C0}-\x{024F}\x{1E00}-\x{1EFF}]+").unwrap();
    static ref DURATION_RE: Regex = Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").unwrap();
}

/// Hashtags in order of first appearance, without the leading `#`, capped at
/// [`MAX_HASHTAGS`].
pub fn extract_hashtags(text: &str) -> Vec<String> {
    HASHTAG_RE
        .find_iter(text)
        .take(MAX_HASHTAGS)
        .map(|m| m.as_str()[1..].to_string())
        .collect()
}

/// Splits a user-typed hashtag list ("design, #ui inspiration") into tags.
pub fn parse_hashtag_input(input: &str) -> Vec<String> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(|tag| tag.trim().trim_start_matches('#').trim())
        .filter(|tag| !tag.is_empty())
        .take(MAX_HASHTAGS)
        .map(String::from)
        .collect()
}

fn duration_seconds(duration: &str) -> Option<u64> {
    let captures = DURATION_RE.captures(duration)?;
    let part = |idx: usize, scale: u64| -> Option<u64> {
        match captures.get(idx) {
            Some(m) => m.as_str().parse::<u64>().ok()?.checked_mul(scale),
            None => Some(0),
        }
    };
    part(1, 3600)?
        .checked_add(part(2, 60)?)?
        .checked_add(part(3, 1)?)
}

/// Parse ISO8601 duration string (PT1H2M3S) to total seconds. Anything that
/// does not match yields 0.
pub fn parse_iso8601_duration_to_seconds(duration: &str) -> u64 {
    duration_seconds(duration).unwrap_or(0)
}

/// A YouTube video counts as a Short when its URL says so or when it lasts at
/// most a minute.
pub fn is_youtube_short(original_url: Option<&str>, duration: Option<&str>) -> bool {
    if let Some(url) = original_url {
        let on_shorts_path = match url::Url::parse(url) {
            Ok(parsed) => parsed.path().contains(SHORTS_MARKER),
            Err(_) => url.contains(SHORTS_MARKER),
        };
        if on_shorts_path {
            return true;
        }
    }

    duration
        .and_then(duration_seconds)
        .is_some_and(|seconds| seconds <= SHORT_MAX_SECONDS)
}

/// Compact counter formatting: `500`, `1.5K`, `2.0M`.
pub fn format_number(number: u64) -> String {
    if number >= 1_000_000 {
        compact(number, 1_000_000, 'M')
    } else if number >= 1_000 {
        compact(number, 1_000, 'K')
    } else {
        number.to_string()
    }
}

// Rounds half up to one decimal place using integer math.
fn compact(number: u64, unit: u64, suffix: char) -> String {
    let tenths = (number as u128 * 10 + unit as u128 / 2) / unit as u128;
    format!("{}.{}{}", tenths / 10, tenths % 10, suffix)
}

/// Reads a counter that may arrive as a JSON number or a numeric string.
/// Missing, negative or malformed values count as 0.
pub fn count_field(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    }
}

/// First candidate that holds a non-empty string.
pub fn first_string(candidates: &[&Value]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|value| value.as_str())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(String::from)
}

/// Prefixes a TikTok handle with `@` unless it already carries one.
pub fn tiktok_handle(name: &str) -> String {
    if name.starts_with('@') {
        name.to_string()
    } else {
        format!("@{name}")
    }
}
