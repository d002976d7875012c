// src/providers/provider.rs
// Translation backend trait and chain outcome types

use async_trait::async_trait;

/// A machine-translation backend.
///
/// `translate` returns the translated text, or an empty string when the
/// backend cannot produce one (missing key, HTTP failure, malformed
/// response). Ordinary backend failure is never an error: it is logged as
/// a diagnostic and the chain moves on to the next candidate.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Stable registry name ("google", "deepl").
    fn name(&self) -> &'static str;

    /// Whether credentials are present. Unconfigured providers are skipped
    /// without a network call.
    fn is_configured(&self) -> bool;

    /// Translate `text` from `source` into `target` language.
    async fn translate(&self, text: &str, target: &str, source: &str) -> String;
}

/// Result of walking the provider chain for one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainOutcome {
    /// A provider produced a non-empty translation.
    Translated { provider: String, text: String },
    /// Configured providers were tried, all came back empty.
    Empty { tried: Vec<String> },
    /// No configured provider exists for this language at all.
    NoProvider,
}

impl ChainOutcome {
    /// Translated text, empty otherwise.
    pub fn text(&self) -> &str {
        match self {
            ChainOutcome::Translated { text, .. } => text,
            _ => "",
        }
    }

    /// Name of the provider that produced the text, if any.
    pub fn provider(&self) -> Option<&str> {
        match self {
            ChainOutcome::Translated { provider, .. } => Some(provider),
            _ => None,
        }
    }

    pub fn is_translated(&self) -> bool {
        matches!(self, ChainOutcome::Translated { .. })
    }
}
