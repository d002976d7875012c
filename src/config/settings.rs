// src/config/settings.rs
// Persisted run settings, stored as a JSON blob in the options table.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_provider() -> String {
    "google".to_string()
}

fn default_source_lang() -> String {
    "de".to_string()
}

fn default_true() -> bool {
    true
}

/// Everything an operator can configure. Loaded once per run and passed
/// explicitly; nothing reads global state after startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Provider tried first for every language without an override.
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Per-language provider override, e.g. {"pl": "deepl"}.
    #[serde(default)]
    pub provider_override: HashMap<String, String>,

    /// Fallback credentials when the environment does not set them.
    #[serde(default)]
    pub google_api_key: String,
    #[serde(default)]
    pub deepl_api_key: String,

    /// Language all source content is written in.
    #[serde(default = "default_source_lang")]
    pub source_lang: String,

    /// Target languages to reconcile.
    #[serde(default)]
    pub active_langs: Vec<String>,

    /// Entity whitelists per content group.
    #[serde(default)]
    pub page_whitelist: Vec<i64>,
    #[serde(default)]
    pub extra_page_whitelist: Vec<i64>,
    #[serde(default)]
    pub block_whitelist: Vec<i64>,

    /// Re-translate page slugs from the translated title.
    #[serde(default)]
    pub translate_slugs: bool,

    /// Create translated entities as drafts pending review.
    #[serde(default = "default_true")]
    pub review_as_draft: bool,

    /// Cap on job records per full run (None = unbounded).
    #[serde(default)]
    pub job_limit: Option<usize>,

    /// Site root and per-language home URLs for link rewriting.
    #[serde(default)]
    pub site_url: String,
    #[serde(default)]
    pub lang_home_urls: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            provider_override: HashMap::new(),
            google_api_key: String::new(),
            deepl_api_key: String::new(),
            source_lang: default_source_lang(),
            active_langs: Vec::new(),
            page_whitelist: Vec::new(),
            extra_page_whitelist: Vec::new(),
            block_whitelist: Vec::new(),
            translate_slugs: false,
            review_as_draft: true,
            job_limit: None,
            site_url: String::new(),
            lang_home_urls: HashMap::new(),
        }
    }
}

impl Settings {
    /// Home URL for a target language, falling back to the site root.
    pub fn home_url_for(&self, lang: &str) -> &str {
        self.lang_home_urls
            .get(lang)
            .map(|s| s.as_str())
            .unwrap_or(self.site_url.as_str())
    }

    /// Provider name configured for a language, if overridden.
    pub fn override_for(&self, lang: &str) -> Option<&str> {
        self.provider_override.get(lang).map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.default_provider, "google");
        assert_eq!(s.source_lang, "de");
        assert!(s.review_as_draft);
        assert!(!s.translate_slugs);
        assert!(s.job_limit.is_none());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s: Settings = serde_json::from_str(r#"{"active_langs":["en","pl"]}"#).unwrap();
        assert_eq!(s.active_langs, vec!["en", "pl"]);
        assert_eq!(s.default_provider, "google");
        assert!(s.review_as_draft);
    }

    #[test]
    fn test_home_url_fallback() {
        let mut s = Settings {
            site_url: "https://example.com".to_string(),
            ..Default::default()
        };
        s.lang_home_urls
            .insert("en".to_string(), "https://example.com/en".to_string());
        assert_eq!(s.home_url_for("en"), "https://example.com/en");
        assert_eq!(s.home_url_for("pl"), "https://example.com");
    }

    #[test]
    fn test_override_for() {
        let mut s = Settings::default();
        s.provider_override
            .insert("pl".to_string(), "deepl".to_string());
        assert_eq!(s.override_for("pl"), Some("deepl"));
        assert_eq!(s.override_for("en"), None);
    }
}
