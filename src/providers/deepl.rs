// src/providers/deepl.rs
// DeepL backend (v2 REST, tag_handling=html)

use crate::providers::http::TranslateHttpClient;
use crate::providers::langmap;
use crate::providers::provider::TranslationProvider;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

const DEEPL_API_URL: &str = "https://api.deepl.com/v2/translate";
const DEEPL_FREE_API_URL: &str = "https://api-free.deepl.com/v2/translate";

/// DeepL client. Keys issued for the free tier end in `:fx` and must hit
/// the api-free host; everything else goes to the paid endpoint.
pub struct DeepLProvider {
    api_key: Option<String>,
    http: TranslateHttpClient,
}

impl DeepLProvider {
    pub fn new(api_key: Option<String>) -> Self {
        let http = TranslateHttpClient::new(Duration::from_secs(60), Duration::from_secs(10));
        Self { api_key, http }
    }

    fn endpoint(key: &str) -> &'static str {
        if key.ends_with(":fx") {
            DEEPL_FREE_API_URL
        } else {
            DEEPL_API_URL
        }
    }
}

#[async_trait]
impl TranslationProvider for DeepLProvider {
    fn name(&self) -> &'static str {
        "deepl"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn translate(&self, text: &str, target: &str, source: &str) -> String {
        let Some(ref key) = self.api_key else {
            return String::new();
        };

        debug!(target, "deepl translate request");

        let params = [
            ("text", text.to_string()),
            ("target_lang", langmap::deepl_target(target)),
            ("source_lang", langmap::deepl_source(source)),
            ("tag_handling", "html".to_string()),
        ];

        let request = self
            .http
            .client()
            .post(Self::endpoint(key))
            .header("Authorization", format!("DeepL-Auth-Key {}", key))
            .form(&params);

        let Some(value) = self.http.execute_json("deepl", request).await else {
            return String::new();
        };

        value
            .pointer("/translations/0/text")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_selection() {
        assert_eq!(DeepLProvider::endpoint("abc123:fx"), DEEPL_FREE_API_URL);
        assert_eq!(DeepLProvider::endpoint("abc123"), DEEPL_API_URL);
    }

    #[test]
    fn test_unconfigured_without_key() {
        let provider = DeepLProvider::new(None);
        assert!(!provider.is_configured());
        assert_eq!(provider.name(), "deepl");
    }

    #[tokio::test]
    async fn test_translate_without_key_returns_empty() {
        let provider = DeepLProvider::new(None);
        assert_eq!(provider.translate("x", "en", "de").await, "");
    }
}
