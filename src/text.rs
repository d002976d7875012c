// src/text.rs
// Visible-text normalization: tag stripping, entity decoding, word/char
// metrics, and slug generation.

use regex::Regex;
use std::sync::OnceLock;

#[allow(clippy::expect_used)]
fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("static pattern"))
}

#[allow(clippy::expect_used)]
fn entity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&(?:#x?[0-9a-fA-F]+|[a-zA-Z]+);").expect("static pattern"))
}

/// Remove HTML/XML tags, leaving only visible text.
pub fn strip_tags(input: &str) -> String {
    tag_re().replace_all(input, "").into_owned()
}

/// Decode the common HTML entities plus numeric references.
/// Unknown named entities are left untouched.
pub fn decode_entities(input: &str) -> String {
    entity_re()
        .replace_all(input, |caps: &regex::Captures| {
            let m = &caps[0];
            match m {
                "&amp;" => "&".to_string(),
                "&lt;" => "<".to_string(),
                "&gt;" => ">".to_string(),
                "&quot;" => "\"".to_string(),
                "&apos;" | "&#39;" => "'".to_string(),
                "&nbsp;" => " ".to_string(),
                _ => decode_numeric(m).unwrap_or_else(|| m.to_string()),
            }
        })
        .into_owned()
}

fn decode_numeric(entity: &str) -> Option<String> {
    let inner = entity.strip_prefix("&#")?.strip_suffix(';')?;
    let code = if let Some(hex) = inner.strip_prefix('x').or_else(|| inner.strip_prefix('X')) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        inner.parse::<u32>().ok()?
    };
    char::from_u32(code).map(|c| c.to_string())
}

/// Normalize to visible text: strip tags, decode entities, collapse all
/// whitespace and control characters to single spaces, trim.
pub fn visible_text(input: &str) -> String {
    let stripped = strip_tags(input);
    let decoded = decode_entities(&stripped);
    let mut out = String::with_capacity(decoded.len());
    let mut in_gap = true;
    for c in decoded.chars() {
        if c.is_whitespace() || c.is_control() {
            if !in_gap {
                out.push(' ');
                in_gap = true;
            }
        } else {
            out.push(c);
            in_gap = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Count words in the visible text of an HTML fragment.
pub fn count_words(input: &str) -> u64 {
    let text = visible_text(input);
    if text.is_empty() {
        0
    } else {
        text.split(' ').count() as u64
    }
}

/// Count characters in the visible text of an HTML fragment
/// (whitespace collapsed, tags and entities resolved).
pub fn count_chars(input: &str) -> u64 {
    visible_text(input).chars().count() as u64
}

/// Build a URL slug: lowercase, German umlauts transliterated, diacritics
/// folded to ASCII where possible, everything else collapsed to hyphens.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_hyphen = true;
    for c in input.chars() {
        let mapped: &str = match c {
            'ä' | 'Ä' => "ae",
            'ö' | 'Ö' => "oe",
            'ü' | 'Ü' => "ue",
            'ß' => "ss",
            'à'..='å' | 'À'..='Å' => "a",
            'è'..='ë' | 'È'..='Ë' => "e",
            'ì'..='ï' | 'Ì'..='Ï' => "i",
            'ò'..='õ' | 'Ò'..='Õ' => "o",
            'ù' | 'ú' | 'û' | 'Ù' | 'Ú' | 'Û' => "u",
            'ç' | 'Ç' => "c",
            'ñ' | 'Ñ' => "n",
            _ => {
                if c.is_ascii_alphanumeric() {
                    out.extend(c.to_lowercase());
                    last_hyphen = false;
                    continue;
                }
                if !last_hyphen {
                    out.push('-');
                    last_hyphen = true;
                }
                continue;
            }
        };
        out.push_str(mapped);
        last_hyphen = false;
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================================================
    // strip_tags / decode_entities
    // ============================================================================

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>Hello <b>world</b></p>"), "Hello world");
        assert_eq!(strip_tags("no tags"), "no tags");
    }

    #[test]
    fn test_decode_entities_named() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt;"), "a & b <c>");
        assert_eq!(decode_entities("&quot;x&quot; &nbsp;y"), "\"x\"  y");
    }

    #[test]
    fn test_decode_entities_numeric() {
        assert_eq!(decode_entities("&#228;"), "ä");
        assert_eq!(decode_entities("&#xE4;"), "ä");
    }

    #[test]
    fn test_decode_entities_unknown_left_alone() {
        assert_eq!(decode_entities("&bogus; stays"), "&bogus; stays");
    }

    // ============================================================================
    // metrics
    // ============================================================================

    #[test]
    fn test_count_words_html() {
        assert_eq!(count_words("<p>Hello   brave <b>new</b>\nworld</p>"), 4);
    }

    #[test]
    fn test_count_words_empty() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("<p>  </p>"), 0);
    }

    #[test]
    fn test_count_chars_collapses_whitespace() {
        // "Hello world" after collapsing -> 11 chars
        assert_eq!(count_chars("<p>Hello\n\n  world</p>"), 11);
    }

    #[test]
    fn test_count_chars_decodes_entities() {
        assert_eq!(count_chars("a&amp;b"), 3);
    }

    // ============================================================================
    // slugify
    // ============================================================================

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Baker-10115-Berlin"), "baker-10115-berlin");
        assert_eq!(slugify("Hello World!"), "hello-world");
    }

    #[test]
    fn test_slugify_umlauts() {
        assert_eq!(slugify("Bäcker in Köln"), "baecker-in-koeln");
        assert_eq!(slugify("Straße"), "strasse");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("a -- b / c"), "a-b-c");
        assert_eq!(slugify("  trimmed  "), "trimmed");
    }

    #[test]
    fn test_slugify_non_latin_dropped() {
        assert_eq!(slugify("café №5"), "cafe-5");
    }
}
