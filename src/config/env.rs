// src/config/env.rs
// Environment-based configuration - single source of truth for all env vars

use tracing::{debug, warn};

/// API keys loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// Google Cloud Translation key (GOOGLE_TRANSLATE_API_KEY)
    pub google: Option<String>,
    /// DeepL key (DEEPL_API_KEY); a `:fx` suffix selects the free-tier host
    pub deepl: Option<String>,
}

impl ApiKeys {
    /// Load API keys from environment variables (single source of truth)
    pub fn from_env() -> Self {
        let keys = Self {
            google: Self::read_key("GOOGLE_TRANSLATE_API_KEY"),
            deepl: Self::read_key("DEEPL_API_KEY"),
        };
        keys.log_status();
        keys
    }

    /// Read a single API key from environment, filtering empty values
    fn read_key(name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|k| !k.trim().is_empty())
    }

    /// Fill in keys that are not set in the environment from persisted
    /// settings. Environment always wins.
    pub fn merged_with(mut self, google: &str, deepl: &str) -> Self {
        if self.google.is_none() && !google.trim().is_empty() {
            self.google = Some(google.to_string());
        }
        if self.deepl.is_none() && !deepl.trim().is_empty() {
            self.deepl = Some(deepl.to_string());
        }
        self
    }

    /// Check if any translation backend is usable
    pub fn has_provider(&self) -> bool {
        self.google.is_some() || self.deepl.is_some()
    }

    /// Log which API keys are available (without exposing values)
    fn log_status(&self) {
        let mut available = Vec::new();
        if self.google.is_some() {
            available.push("Google");
        }
        if self.deepl.is_some() {
            available.push("DeepL");
        }

        if available.is_empty() {
            warn!("No API keys configured - translations will be skipped");
        } else {
            debug!(keys = ?available, "API keys loaded");
        }
    }

    /// Get a summary of available backends
    pub fn summary(&self) -> String {
        let mut providers = Vec::new();
        if self.google.is_some() {
            providers.push("Google");
        }
        if self.deepl.is_some() {
            providers.push("DeepL");
        }
        if providers.is_empty() {
            "None".to_string()
        } else {
            providers.join(", ")
        }
    }
}
