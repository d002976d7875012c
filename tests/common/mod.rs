// tests/common/mod.rs
// Shared fixtures: in-memory pool, seeded entities, stub providers.

#![allow(dead_code)]

use async_trait::async_trait;
use langsync::config::Settings;
use langsync::db::DatabasePool;
use langsync::providers::{ProviderChain, TranslationProvider};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub async fn pool() -> Arc<DatabasePool> {
    Arc::new(
        DatabasePool::open_in_memory()
            .await
            .expect("in-memory pool"),
    )
}

/// Settings with German sources and the given target languages.
pub fn settings(targets: &[&str]) -> Settings {
    let mut s = Settings::default();
    s.active_langs = targets.iter().map(|t| t.to_string()).collect();
    s
}

/// Insert a source page, returning its id.
pub async fn seed_page(pool: &Arc<DatabasePool>, title: &str, body: &str, slug: &str) -> i64 {
    let title = title.to_string();
    let body = body.to_string();
    let slug = slug.to_string();
    pool.interact(move |conn| {
        conn.execute(
            "INSERT INTO content_items (kind, lang, title, body, slug, status)
             VALUES ('page', 'de', ?1, ?2, ?3, 'publish')",
            rusqlite::params![title, body, slug],
        )?;
        Ok(conn.last_insert_rowid())
    })
    .await
    .expect("seed page")
}

enum StubBehaviour {
    /// Return the input unchanged.
    Echo,
    /// Return "" for everything (backend failure).
    Empty,
    /// Fixed replies; unmapped inputs echo.
    Mapped(HashMap<String, String>),
}

/// Scriptable provider that records what it was asked to translate.
pub struct StubProvider {
    name: &'static str,
    configured: bool,
    behaviour: StubBehaviour,
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<String>>,
}

impl StubProvider {
    fn new(name: &'static str, behaviour: StubBehaviour) -> Arc<Self> {
        Arc::new(Self {
            name,
            configured: true,
            behaviour,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn echo(name: &'static str) -> Arc<Self> {
        Self::new(name, StubBehaviour::Echo)
    }

    pub fn empty(name: &'static str) -> Arc<Self> {
        Self::new(name, StubBehaviour::Empty)
    }

    pub fn mapped(name: &'static str, pairs: &[(&str, &str)]) -> Arc<Self> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self::new(name, StubBehaviour::Mapped(map))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inputs(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranslationProvider for StubProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn translate(&self, text: &str, _target: &str, _source: &str) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(text.to_string());
        match &self.behaviour {
            StubBehaviour::Echo => text.to_string(),
            StubBehaviour::Empty => String::new(),
            StubBehaviour::Mapped(map) => {
                map.get(text).cloned().unwrap_or_else(|| text.to_string())
            }
        }
    }
}

/// Chain with the given providers registered in order.
pub fn chain_of(default: &str, providers: Vec<Arc<StubProvider>>) -> Arc<ProviderChain> {
    let mut chain = ProviderChain::empty(default);
    for p in providers {
        chain.register(p);
    }
    Arc::new(chain)
}
