//! Media list normalization
//!
//! Image and video lists are stored as text. Most rows hold a JSON array,
//! older rows hold a Postgres array literal such as `{a.jpg,b.jpg}`.

use serde_json::Value;

/// Turn a stored media list into an ordered list of URLs.
///
/// - missing or blank text gives an empty list
/// - a JSON array gives its string items, in order
/// - a JSON string gives a single item
/// - anything else is read as the legacy `{url1,url2}` form
pub fn normalize_media_list(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(url) => Some(url),
                _ => None,
            })
            .collect(),
        Ok(Value::String(url)) if !url.trim().is_empty() => vec![url],
        Ok(_) => Vec::new(),
        Err(_) => parse_legacy_list(raw),
    }
}

fn parse_legacy_list(raw: &str) -> Vec<String> {
    let inner = raw.trim_start_matches('{').trim_end_matches('}');
    inner
        .split(',')
        .map(|item| item.trim().trim_matches('"').trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
