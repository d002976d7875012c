// src/guard.rs
// Masks non-translatable bracket shortcodes before provider calls and
// restores them verbatim afterwards.

use regex::Regex;
use std::sync::OnceLock;

#[allow(clippy::expect_used)]
fn shortcode_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Opening, closing and self-closing bracket shortcodes, attributes included.
    RE.get_or_init(|| Regex::new(r"\[/?[A-Za-z0-9_-]+(?:\s[^\[\]]*)?\]").expect("static pattern"))
}

/// Result of masking a text: the provider-safe string plus the token map
/// needed to restore the original substrings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guarded {
    pub masked: String,
    tokens: Vec<(String, String)>,
}

impl Guarded {
    /// Replace every shortcode with a unique opaque placeholder.
    pub fn mask(input: &str) -> Self {
        let mut tokens = Vec::new();
        let masked = shortcode_re()
            .replace_all(input, |caps: &regex::Captures| {
                let token = format!("__GUARD_{}__", tokens.len());
                tokens.push((token.clone(), caps[0].to_string()));
                token
            })
            .into_owned();
        Self { masked, tokens }
    }

    /// Substitute the placeholders in (possibly translated) text back with
    /// the original shortcodes. Tokens absent from the text are ignored.
    pub fn restore(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (token, original) in &self.tokens {
            out = out.replace(token, original);
        }
        out
    }

    /// Number of masked shortcodes.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_and_restore_round_trip() {
        let input = "<p>Hello [shortcode attr=\"x\"] world</p>";
        let guarded = Guarded::mask(input);
        assert!(!guarded.masked.contains("[shortcode"));
        assert!(guarded.masked.contains("__GUARD_0__"));
        assert_eq!(guarded.restore(&guarded.masked), input);
    }

    #[test]
    fn test_mask_multiple_shortcodes() {
        let input = "[a]x[b foo=1]y[/b]";
        let guarded = Guarded::mask(input);
        assert_eq!(guarded.len(), 3);
        assert_eq!(guarded.masked, "__GUARD_0__x__GUARD_1__y__GUARD_2__");
        assert_eq!(guarded.restore(&guarded.masked), input);
    }

    #[test]
    fn test_mask_no_shortcodes_is_identity() {
        let input = "<p>plain text, [ stray bracket</p>";
        let guarded = Guarded::mask(input);
        assert!(guarded.is_empty());
        assert_eq!(guarded.masked, input);
        assert_eq!(guarded.restore(&guarded.masked), input);
    }

    #[test]
    fn test_restore_survives_surrounding_edits() {
        // Providers rewrite text around the tokens but must not touch them
        let guarded = Guarded::mask("Hallo [form id=\"7\"] Welt");
        let translated = guarded.masked.replace("Hallo", "Hello").replace("Welt", "world");
        assert_eq!(guarded.restore(&translated), "Hello [form id=\"7\"] world");
    }

    #[test]
    fn test_self_closing_and_attributes() {
        let input = "x [gallery ids=\"1,2,3\" /] y";
        let guarded = Guarded::mask(input);
        assert_eq!(guarded.len(), 1);
        assert_eq!(guarded.restore(&guarded.masked), input);
    }
}
