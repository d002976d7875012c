// src/jobs/links.rs
// Slug and URL rewriting inside translated job payloads.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Replace every occurrence of the old slug with the new one.
pub fn rewrite_slug(text: &str, old_slug: &str, new_slug: &str) -> String {
    if old_slug.is_empty() || old_slug == new_slug {
        return text.to_string();
    }
    text.replace(old_slug, new_slug)
}

/// Replace the site root with the per-language home URL.
pub fn rewrite_home(text: &str, home: &str, lang_home: &str) -> String {
    if home.is_empty() || home == lang_home {
        return text.to_string();
    }
    text.replace(home, lang_home)
}

/// Prefix-replace a single URL: `https://site/x` -> `https://site/en/x`.
fn rewrite_url(url: &str, home: &str, lang_home: &str) -> String {
    if !home.is_empty() && url.starts_with(home) {
        format!("{}{}", lang_home, &url[home.len()..])
    } else {
        url.to_string()
    }
}

/// Rewrite a JSON-LD payload for a target language: set the title, move the
/// url under the language home, and keep everything else intact. A payload
/// that fails to parse gets plain text rewriting instead of being dropped.
pub fn rewrite_json_ld(
    raw: &str,
    title: &str,
    old_slug: &str,
    new_slug: &str,
    home: &str,
    lang_home: &str,
) -> String {
    let Ok(mut value) = serde_json::from_str::<Value>(raw) else {
        let rewritten = rewrite_slug(raw, old_slug, new_slug);
        return rewrite_home(&rewritten, home, lang_home);
    };

    if let Some(obj) = value.as_object_mut() {
        if !title.is_empty() {
            obj.insert("title".to_string(), Value::String(title.to_string()));
        }
        if let Some(url) = obj.get("url").and_then(|v| v.as_str()) {
            let rewritten = rewrite_slug(&rewrite_url(url, home, lang_home), old_slug, new_slug);
            obj.insert("url".to_string(), Value::String(rewritten));
        }
    }

    serde_json::to_string(&value).unwrap_or_else(|_| raw.to_string())
}

/// Extract `datePosted` from a JSON-LD payload, if present and parseable.
pub fn json_ld_date_posted(raw: &str) -> Option<DateTime<Utc>> {
    let value = serde_json::from_str::<Value>(raw).ok()?;
    let date = value.get("datePosted")?.as_str()?;
    parse_flexible_date(date)
}

/// Parse the date formats that show up in feeds: RFC 3339, SQL datetime,
/// bare date.
pub fn parse_flexible_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(ndt.and_utc());
    }
    if let Ok(nd) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return nd.and_hms_opt(0, 0, 0).map(|ndt| ndt.and_utc());
    }
    None
}
