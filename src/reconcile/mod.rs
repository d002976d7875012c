// src/reconcile/mod.rs
// CMS entity reconciler: drives each (entity, target language) pair through
// the missing/stale/ok state machine and writes translated counterparts.

use crate::config::Settings;
use crate::db::DatabasePool;
use crate::db::content::{self, NewTranslation};
use crate::db::logs;
use crate::db::types::{ContentItem, LogAction, LogStatus, NewLogEntry, TextMetrics};
use crate::error::Result;
use crate::fingerprint::fingerprint_cms;
use crate::guard::Guarded;
use crate::providers::{ChainOutcome, ProviderChain};
use crate::text::{count_chars, count_words, slugify};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Classification of one (entity, language) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No translated counterpart linked yet.
    Missing,
    /// Counterpart exists but its stored fingerprint differs from the source.
    Stale,
    /// Counterpart exists and fingerprints match.
    Ok,
}

/// Per-group outcome totals.
#[derive(Debug, Clone, Default)]
pub struct GroupTotals {
    pub created: u64,
    pub updated: u64,
    pub skipped: u64,
    pub errors: u64,
    pub metrics: TextMetrics,
}

impl GroupTotals {
    pub fn add(&mut self, other: &GroupTotals) {
        self.created += other.created;
        self.updated += other.updated;
        self.skipped += other.skipped;
        self.errors += other.errors;
        self.metrics.add(&other.metrics);
    }
}

fn metrics_for(title: &str, body: &str) -> TextMetrics {
    TextMetrics {
        words_title: count_words(title),
        chars_title: count_chars(title),
        words_content: count_words(body),
        chars_content: count_chars(body),
    }
}

/// Reconciles whitelisted CMS entities against the active target languages.
pub struct Reconciler {
    pool: Arc<DatabasePool>,
    chain: Arc<ProviderChain>,
    settings: Settings,
}

impl Reconciler {
    pub fn new(pool: Arc<DatabasePool>, chain: Arc<ProviderChain>, settings: Settings) -> Self {
        Self {
            pool,
            chain,
            settings,
        }
    }

    /// Classify one pair from the stored fingerprint.
    pub async fn classify(&self, group_id: i64, lang: &str, src_hash: &str) -> Result<SyncState> {
        let lang_owned = lang.to_string();
        let hash_owned = src_hash.to_string();
        self.pool
            .run(move |conn| {
                let Some(linked) = content::linked_translation(conn, group_id, &lang_owned)? else {
                    return Ok::<_, crate::error::SyncError>(SyncState::Missing);
                };
                match content::get_fingerprint(conn, linked, &lang_owned)? {
                    Some(stored) if stored == hash_owned => Ok(SyncState::Ok),
                    _ => Ok(SyncState::Stale),
                }
            })
            .await
    }

    /// Reconcile a whitelist of entity ids. `kind_label` tags audit rows
    /// ("menu-page", "extra-page", "block").
    pub async fn reconcile_ids(
        &self,
        run_id: &str,
        force: bool,
        kind_label: &str,
        ids: &[i64],
    ) -> Result<GroupTotals> {
        // Without translation groups nothing below makes sense; abort.
        self.pool
            .run(content::ensure_translation_capability)
            .await?;

        let ids = ids.to_vec();
        let items = self
            .pool
            .run(move |conn| content::get_whitelisted(conn, &ids))
            .await?;

        let mut totals = GroupTotals::default();
        for item in &items {
            let item_totals = self.reconcile_item(run_id, force, kind_label, item).await?;
            totals.add(&item_totals);
        }
        Ok(totals)
    }

    async fn reconcile_item(
        &self,
        run_id: &str,
        force: bool,
        kind_label: &str,
        item: &ContentItem,
    ) -> Result<GroupTotals> {
        let mut totals = GroupTotals::default();
        let src_hash = fingerprint_cms(&item.title, &item.body);
        let source_metrics = metrics_for(&item.title, &item.body);

        debug!(id = item.id, kind = kind_label, "reconciling entity");

        for lang in &self.settings.active_langs {
            if lang == &self.settings.source_lang || lang == &item.lang {
                continue;
            }

            let state = self.classify(item.id, lang, &src_hash).await?;

            if state == SyncState::Ok && !force {
                self.log_pair(
                    run_id,
                    item,
                    kind_label,
                    lang,
                    "",
                    LogAction::Skip,
                    LogStatus::Ok,
                    source_metrics,
                    &src_hash,
                    "up to date",
                )
                .await;
                totals.skipped += 1;
                continue;
            }

            if !self.chain.has_provider_for(lang) {
                warn!(lang, "no translation provider configured, skipping");
                self.log_pair(
                    run_id,
                    item,
                    kind_label,
                    lang,
                    "",
                    LogAction::Skip,
                    LogStatus::Error,
                    TextMetrics::default(),
                    &src_hash,
                    "no translation provider available",
                )
                .await;
                totals.errors += 1;
                continue;
            }

            let outcome = self.translate_pair(item, lang).await;
            let (title_out, body_out) = outcome;

            if title_out.is_empty() && body_out.text.is_empty() {
                // Providers produced nothing at all. Keep any existing link
                // and do NOT store the fingerprint, so the pair is retried
                // next run.
                self.log_pair(
                    run_id,
                    item,
                    kind_label,
                    lang,
                    "",
                    LogAction::Skip,
                    LogStatus::Empty,
                    TextMetrics::default(),
                    &src_hash,
                    "provider returned empty translation",
                )
                .await;
                totals.skipped += 1;
                continue;
            }

            // A single empty field falls back to the source text; a record
            // is never half-emptied.
            let final_title = if title_out.is_empty() {
                item.title.clone()
            } else {
                title_out.clone()
            };
            let final_body = if body_out.text.is_empty() {
                item.body.clone()
            } else {
                body_out.text.clone()
            };
            let provider = body_out.provider.clone();
            let written_metrics = metrics_for(&final_title, &final_body);

            let write_result = match state {
                SyncState::Missing => {
                    self.create_pair(item, lang, &final_title, &final_body, &src_hash)
                        .await
                        .map(|_| LogAction::Create)
                }
                SyncState::Stale | SyncState::Ok => {
                    self.update_pair(item, lang, &final_title, &final_body, &src_hash)
                        .await
                        .map(|_| LogAction::Update)
                }
            };

            match write_result {
                Ok(action) => {
                    if action == LogAction::Create {
                        totals.created += 1;
                    } else {
                        totals.updated += 1;
                    }
                    totals.metrics.add(&written_metrics);
                    self.log_pair(
                        run_id,
                        item,
                        kind_label,
                        lang,
                        &provider,
                        action,
                        LogStatus::Stale,
                        written_metrics,
                        &src_hash,
                        "",
                    )
                    .await;
                }
                Err(e) => {
                    if e.is_fatal() {
                        return Err(e);
                    }
                    warn!(id = item.id, lang, error = %e, "persisting translation failed");
                    self.log_pair(
                        run_id,
                        item,
                        kind_label,
                        lang,
                        &provider,
                        LogAction::Error,
                        LogStatus::Error,
                        TextMetrics::default(),
                        &src_hash,
                        &e.to_string(),
                    )
                    .await;
                    totals.errors += 1;
                }
            }
        }

        self.ensure_source_link(item).await;

        info!(
            id = item.id,
            created = totals.created,
            updated = totals.updated,
            skipped = totals.skipped,
            "entity reconciled"
        );
        Ok(totals)
    }

    /// Translate title and body for one target language. The body is masked
    /// before the provider call so shortcodes survive verbatim.
    async fn translate_pair(&self, item: &ContentItem, lang: &str) -> (String, TranslatedBody) {
        let title = if item.title.trim().is_empty() {
            String::new()
        } else {
            self.chain
                .translate(&item.title, lang, &self.settings.source_lang)
                .await
                .text()
                .to_string()
        };

        let body = if item.body.trim().is_empty() {
            TranslatedBody::default()
        } else {
            let guarded = Guarded::mask(&item.body);
            match self
                .chain
                .translate(&guarded.masked, lang, &self.settings.source_lang)
                .await
            {
                ChainOutcome::Translated { provider, text } => TranslatedBody {
                    text: guarded.restore(&text),
                    provider,
                },
                _ => TranslatedBody::default(),
            }
        };

        (title, body)
    }

    async fn create_pair(
        &self,
        item: &ContentItem,
        lang: &str,
        title: &str,
        body: &str,
        src_hash: &str,
    ) -> Result<i64> {
        let status = if self.settings.review_as_draft {
            "draft".to_string()
        } else {
            item.status.clone()
        };
        let slug = if title.is_empty() {
            item.slug.clone()
        } else {
            slugify(title)
        };
        let new_item = NewTranslation {
            kind: item.kind,
            lang: lang.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            slug,
            status,
            parent_id: item.parent_id,
        };
        let group_id = item.id;
        let hash = src_hash.to_string();
        self.pool
            .run_with_retry(move |conn| content::create_translation(conn, group_id, &new_item, &hash))
            .await
    }

    async fn update_pair(
        &self,
        item: &ContentItem,
        lang: &str,
        title: &str,
        body: &str,
        src_hash: &str,
    ) -> Result<()> {
        // Slug regeneration on update is opt-in and pages only; blocks keep
        // their slug because it is referenced by markup.
        let slug = if self.settings.translate_slugs
            && item.kind == crate::db::types::ContentKind::Page
            && !title.is_empty()
        {
            Some(slugify(title))
        } else {
            None
        };

        let group_id = item.id;
        let lang_owned = lang.to_string();
        let title = title.to_string();
        let body = body.to_string();
        let hash = src_hash.to_string();
        self.pool
            .run_with_retry(move |conn| {
                let Some(linked) = content::linked_translation(conn, group_id, &lang_owned)? else {
                    return Err(crate::error::SyncError::Other(
                        "translation link disappeared mid-run".to_string(),
                    ));
                };
                content::update_translation(
                    conn,
                    linked,
                    &lang_owned,
                    &title,
                    &body,
                    slug.as_deref(),
                    &hash,
                )
            })
            .await
    }

    /// The source entity belongs to its own translation group.
    async fn ensure_source_link(&self, item: &ContentItem) {
        let group_id = item.id;
        let lang = item.lang.clone();
        self.pool
            .try_interact("ensure source link", move |conn| {
                let map = content::group_map(conn, group_id)?;
                if !map.is_empty() && !map.contains_key(&lang) {
                    content::set_link(conn, group_id, &lang, group_id)?;
                }
                Ok(())
            })
            .await;
    }

    #[allow(clippy::too_many_arguments)]
    async fn log_pair(
        &self,
        run_id: &str,
        item: &ContentItem,
        kind_label: &str,
        lang: &str,
        provider: &str,
        action: LogAction,
        status: LogStatus,
        metrics: TextMetrics,
        src_hash: &str,
        message: &str,
    ) {
        let mut entry = NewLogEntry::new(run_id, action, status);
        entry.content_id = item.id;
        entry.content_kind = kind_label.to_string();
        entry.source_lang = self.settings.source_lang.clone();
        entry.target_lang = lang.to_string();
        entry.provider = provider.to_string();
        entry.metrics = metrics;
        entry.src_hash = src_hash.to_string();
        entry.message = message.to_string();
        self.pool
            .try_interact("append audit row", move |conn| {
                logs::append(conn, &entry)?;
                Ok(())
            })
            .await;
    }
}

/// Body translation plus the provider that produced it.
#[derive(Debug, Clone, Default)]
struct TranslatedBody {
    text: String,
    provider: String,
}
