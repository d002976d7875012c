// src/providers/chain.rs
// Ordered provider fallback chain with per-language overrides

use crate::config::{ApiKeys, Settings};
use crate::providers::deepl::DeepLProvider;
use crate::providers::google::GoogleProvider;
use crate::providers::provider::{ChainOutcome, TranslationProvider};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Holds every registered backend and resolves which ones to try, in which
/// order, for a given target language.
pub struct ProviderChain {
    /// Registration order doubles as the fallback order.
    providers: Vec<Arc<dyn TranslationProvider>>,
    default_provider: String,
    overrides: Vec<(String, String)>,
}

impl ProviderChain {
    /// Build the standard chain from settings and credentials.
    /// Registration order: Google, then DeepL.
    pub fn from_settings(settings: &Settings, keys: &ApiKeys) -> Self {
        let keys = keys
            .clone()
            .merged_with(&settings.google_api_key, &settings.deepl_api_key);

        let mut chain = Self::empty(&settings.default_provider);
        for (lang, provider) in &settings.provider_override {
            chain.overrides.push((lang.clone(), provider.clone()));
        }
        chain.overrides.sort();

        chain.register(Arc::new(GoogleProvider::new(keys.google.clone())));
        chain.register(Arc::new(DeepLProvider::new(keys.deepl.clone())));

        let configured: Vec<_> = chain
            .providers
            .iter()
            .filter(|p| p.is_configured())
            .map(|p| p.name())
            .collect();
        info!(providers = ?configured, "translation providers configured");

        chain
    }

    /// Chain with no registered providers (tests build these directly).
    pub fn empty(default_provider: &str) -> Self {
        Self {
            providers: Vec::new(),
            default_provider: default_provider.to_string(),
            overrides: Vec::new(),
        }
    }

    /// Register a backend at the end of the fallback order.
    pub fn register(&mut self, provider: Arc<dyn TranslationProvider>) {
        self.providers.push(provider);
    }

    /// Set or replace the per-language override.
    pub fn set_override(&mut self, lang: &str, provider: &str) {
        self.overrides.retain(|(l, _)| l != lang);
        self.overrides.push((lang.to_string(), provider.to_string()));
    }

    fn by_name(&self, name: &str) -> Option<Arc<dyn TranslationProvider>> {
        self.providers.iter().find(|p| p.name() == name).cloned()
    }

    fn override_for(&self, lang: &str) -> Option<&str> {
        self.overrides
            .iter()
            .find(|(l, _)| l == lang)
            .map(|(_, p)| p.as_str())
    }

    /// Candidate providers for a language: override first, then the global
    /// default, then every registered provider in registration order,
    /// de-duplicated by name. Unregistered names are dropped with a warning.
    pub fn candidates(&self, lang: &str) -> Vec<Arc<dyn TranslationProvider>> {
        let mut names: Vec<&str> = Vec::new();

        if let Some(name) = self.override_for(lang) {
            if self.by_name(name).is_some() {
                names.push(name);
            } else {
                warn!(lang, provider = name, "override names unknown provider");
            }
        }
        if self.by_name(&self.default_provider).is_some() {
            names.push(self.default_provider.as_str());
        }
        for p in &self.providers {
            names.push(p.name());
        }

        let mut seen = Vec::new();
        let mut out = Vec::new();
        for name in names {
            if seen.contains(&name) {
                continue;
            }
            seen.push(name);
            if let Some(p) = self.by_name(name) {
                out.push(p);
            }
        }
        out
    }

    /// First configured candidate for a language, by name.
    pub fn provider_for(&self, lang: &str) -> Option<String> {
        self.candidates(lang)
            .into_iter()
            .find(|p| p.is_configured())
            .map(|p| p.name().to_string())
    }

    /// Whether any configured provider exists for the language.
    pub fn has_provider_for(&self, lang: &str) -> bool {
        self.provider_for(lang).is_some()
    }

    /// Walk the chain: the first non-empty translation wins. Distinguishes
    /// "everything failed" from "nothing was even configured".
    pub async fn translate(&self, text: &str, target: &str, source: &str) -> ChainOutcome {
        let configured: Vec<_> = self
            .candidates(target)
            .into_iter()
            .filter(|p| p.is_configured())
            .collect();

        if configured.is_empty() {
            return ChainOutcome::NoProvider;
        }

        let mut tried = Vec::new();
        for provider in configured {
            let result = provider.translate(text, target, source).await;
            if !result.is_empty() {
                return ChainOutcome::Translated {
                    provider: provider.name().to_string(),
                    text: result,
                };
            }
            debug!(
                provider = provider.name(),
                target, "provider returned empty, falling back"
            );
            tried.push(provider.name().to_string());
        }

        ChainOutcome::Empty { tried }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeProvider {
        name: &'static str,
        configured: bool,
        reply: &'static str,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn new(name: &'static str, configured: bool, reply: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                configured,
                reply,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TranslationProvider for FakeProvider {
        fn name(&self) -> &'static str {
            self.name
        }
        fn is_configured(&self) -> bool {
            self.configured
        }
        async fn translate(&self, _text: &str, _target: &str, _source: &str) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.to_string()
        }
    }

    fn chain_with(default: &str, providers: Vec<Arc<FakeProvider>>) -> ProviderChain {
        let mut chain = ProviderChain::empty(default);
        for p in providers {
            chain.register(p);
        }
        chain
    }

    // ============================================================================
    // Candidate ordering
    // ============================================================================

    #[test]
    fn test_candidates_default_first_then_registration_order() {
        let a = FakeProvider::new("a", true, "x");
        let b = FakeProvider::new("b", true, "y");
        let chain = chain_with("b", vec![a, b]);
        let names: Vec<_> = chain.candidates("en").iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_candidates_override_wins() {
        let a = FakeProvider::new("a", true, "x");
        let b = FakeProvider::new("b", true, "y");
        let mut chain = chain_with("a", vec![a, b]);
        chain.set_override("pl", "b");
        let names: Vec<_> = chain.candidates("pl").iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
        // Other languages keep the default-first order
        let names: Vec<_> = chain.candidates("en").iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_candidates_unknown_override_ignored() {
        let a = FakeProvider::new("a", true, "x");
        let mut chain = chain_with("a", vec![a]);
        chain.set_override("pl", "nope");
        let names: Vec<_> = chain.candidates("pl").iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["a"]);
    }

    // ============================================================================
    // Chain walking
    // ============================================================================

    #[tokio::test]
    async fn test_first_non_empty_wins() {
        let a = FakeProvider::new("a", true, "");
        let b = FakeProvider::new("b", true, "hello");
        let a2 = a.clone();
        let chain = chain_with("a", vec![a, b]);

        let outcome = chain.translate("text", "en", "de").await;
        assert_eq!(
            outcome,
            ChainOutcome::Translated {
                provider: "b".to_string(),
                text: "hello".to_string()
            }
        );
        assert_eq!(a2.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_override_falls_back_to_default() {
        let a = FakeProvider::new("a", true, "from-a");
        let b = FakeProvider::new("b", false, "never");
        let b2 = b.clone();
        let mut chain = chain_with("a", vec![a, b]);
        chain.set_override("pl", "b");

        let outcome = chain.translate("text", "pl", "de").await;
        assert_eq!(outcome.provider(), Some("a"));
        // Unconfigured providers must not be called at all
        assert_eq!(b2.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_all_empty_reports_tried() {
        let a = FakeProvider::new("a", true, "");
        let b = FakeProvider::new("b", true, "");
        let chain = chain_with("a", vec![a, b]);

        let outcome = chain.translate("text", "en", "de").await;
        assert_eq!(
            outcome,
            ChainOutcome::Empty {
                tried: vec!["a".to_string(), "b".to_string()]
            }
        );
    }

    #[tokio::test]
    async fn test_no_configured_provider() {
        let a = FakeProvider::new("a", false, "x");
        let chain = chain_with("a", vec![a]);
        assert_eq!(
            chain.translate("text", "en", "de").await,
            ChainOutcome::NoProvider
        );
        assert!(!chain.has_provider_for("en"));
    }

    #[tokio::test]
    async fn test_empty_chain_is_no_provider() {
        let chain = ProviderChain::empty("google");
        assert_eq!(
            chain.translate("text", "en", "de").await,
            ChainOutcome::NoProvider
        );
        assert_eq!(chain.provider_for("en"), None);
    }
}
