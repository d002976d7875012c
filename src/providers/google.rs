// src/providers/google.rs
// Google Cloud Translation backend (v2 REST, HTML format)

use crate::providers::chunk::{CHUNK_LIMIT, chunk_html};
use crate::providers::http::TranslateHttpClient;
use crate::providers::langmap;
use crate::providers::provider::TranslationProvider;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const GOOGLE_API_URL: &str = "https://translation.googleapis.com/language/translate/v2";

/// Google Cloud Translation client. Large documents are split at paragraph
/// boundaries because v2 rejects oversized payloads.
pub struct GoogleProvider {
    api_key: Option<String>,
    http: TranslateHttpClient,
}

impl GoogleProvider {
    pub fn new(api_key: Option<String>) -> Self {
        let http = TranslateHttpClient::new(Duration::from_secs(60), Duration::from_secs(10));
        Self { api_key, http }
    }

    async fn translate_chunk(&self, key: &str, text: &str, target: &str, source: &str) -> String {
        let body = json!({
            "q": text,
            "target": langmap::google_code(target),
            "source": langmap::google_code(source),
            "format": "html",
        });

        let request = self
            .http
            .client()
            .post(GOOGLE_API_URL)
            .query(&[("key", key)])
            .json(&body);

        let Some(value) = self.http.execute_json("google", request).await else {
            return String::new();
        };

        value
            .pointer("/data/translations/0/translatedText")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TranslationProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn translate(&self, text: &str, target: &str, source: &str) -> String {
        let Some(ref key) = self.api_key else {
            return String::new();
        };

        let chunks = chunk_html(text, CHUNK_LIMIT);
        debug!(chunks = chunks.len(), target, "google translate request");

        let mut out = String::with_capacity(text.len());
        for chunk in &chunks {
            let translated = self.translate_chunk(key, chunk, target, source).await;
            if translated.is_empty() {
                // One failed chunk poisons the document; report failure
                // rather than stitching a partial translation together.
                return String::new();
            }
            out.push_str(&translated);
        }
        out
    }
}
