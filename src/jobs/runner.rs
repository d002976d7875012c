// src/jobs/runner.rs
// Batch pipeline for job records: pick candidates, translate field by
// field, regenerate slugs, rewrite links, upsert per-language payloads.

use crate::config::Settings;
use crate::db::DatabasePool;
use crate::db::jobs as jobs_db;
use crate::db::logs;
use crate::db::types::{JobRecord, JobTranslation, LogAction, LogStatus, NewLogEntry, TextMetrics};
use crate::error::Result;
use crate::fingerprint::fingerprint_job;
use crate::guard::Guarded;
use crate::jobs::fields::{HTML_FIELDS, META_DESCRIPTION_MAX, PLAIN_FIELDS, counts_toward_metrics};
use crate::jobs::links;
use crate::jobs::selector::select_candidates;
use crate::text::{count_chars, count_words, slugify};
use crate::utils::{truncate, truncate_chars};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How many picked ids the batch audit row lists before eliding.
const BATCH_LOG_ID_CAP: usize = 100;

/// Totals for one batch pass.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub picked: u64,
    pub created: u64,
    pub updated: u64,
    pub skipped: u64,
    pub errors: u64,
    pub metrics: TextMetrics,
}

/// Drives job records through translation and persistence.
pub struct BatchRunner {
    pool: Arc<DatabasePool>,
    chain: Arc<crate::providers::ProviderChain>,
    settings: Settings,
}

impl BatchRunner {
    pub fn new(
        pool: Arc<DatabasePool>,
        chain: Arc<crate::providers::ProviderChain>,
        settings: Settings,
    ) -> Self {
        Self {
            pool,
            chain,
            settings,
        }
    }

    fn targets(&self) -> Vec<String> {
        self.settings
            .active_langs
            .iter()
            .filter(|l| **l != self.settings.source_lang)
            .cloned()
            .collect()
    }

    /// Run the batch: everything needing work, up to `limit` records.
    pub async fn run(
        &self,
        run_id: &str,
        force: bool,
        limit: Option<usize>,
        only_job_id: Option<&str>,
    ) -> Result<BatchSummary> {
        let mut rows = self.pool.run(jobs_db::list_all).await?;
        if let Some(id) = only_job_id {
            rows.retain(|r| r.job_id == id);
        }
        let existing = self.pool.run(jobs_db::existing_hashes).await?;
        let targets = self.targets();

        let picked = select_candidates(&rows, &targets, limit, force, &existing);
        self.log_batch(run_id, &picked, limit).await;

        let mut summary = BatchSummary {
            picked: picked.len() as u64,
            ..Default::default()
        };

        let picked: Vec<JobRecord> = picked.into_iter().cloned().collect();
        for record in &picked {
            self.process_record(run_id, force, record, &targets, &mut summary)
                .await?;
        }

        self.log_summary(run_id, &summary).await;
        Ok(summary)
    }

    async fn process_record(
        &self,
        run_id: &str,
        force: bool,
        record: &JobRecord,
        targets: &[String],
        summary: &mut BatchSummary,
    ) -> Result<()> {
        let src_hash = fingerprint_job(&record.name, &record.fields);
        let source_metrics = record_metrics(&record.name, &record.fields);

        self.log_job(
            run_id,
            record,
            "",
            "",
            LogAction::Begin,
            LogStatus::Info,
            source_metrics,
            &src_hash,
            &format!(
                "job_id={}; title=\"{}\"",
                record.job_id,
                truncate(&record.name, 180)
            ),
        )
        .await;

        for lang in targets {
            let job_id = record.job_id.clone();
            let lang_owned = lang.clone();
            let stored = self
                .pool
                .run(move |conn| jobs_db::get_translation(conn, &job_id, &lang_owned))
                .await?;

            let up_to_date = stored
                .as_ref()
                .is_some_and(|t| !t.src_hash.is_empty() && t.src_hash == src_hash);
            if up_to_date && !force {
                self.log_job(
                    run_id,
                    record,
                    lang,
                    "",
                    LogAction::Skip,
                    LogStatus::Ok,
                    source_metrics,
                    &src_hash,
                    "up to date",
                )
                .await;
                summary.skipped += 1;
                continue;
            }

            if !self.chain.has_provider_for(lang) {
                warn!(lang, job_id = %record.job_id, "no translation provider configured");
                self.log_job(
                    run_id,
                    record,
                    lang,
                    "",
                    LogAction::Skip,
                    LogStatus::Error,
                    TextMetrics::default(),
                    &src_hash,
                    "no translation provider available",
                )
                .await;
                summary.errors += 1;
                continue;
            }

            let translated = self.translate_record(record, lang).await;
            let Some(translated) = translated else {
                // Nothing came back at all: keep whatever is stored and do
                // not write the fingerprint, so the pair is retried.
                self.log_job(
                    run_id,
                    record,
                    lang,
                    "",
                    LogAction::Skip,
                    LogStatus::Empty,
                    TextMetrics::default(),
                    &src_hash,
                    "provider returned empty translation",
                )
                .await;
                summary.skipped += 1;
                continue;
            };

            let payload = self.assemble_payload(record, lang, &translated, stored.as_ref(), &src_hash);
            let metrics = record_metrics(&payload.name, &payload.fields);

            let to_store = payload.clone();
            let write = self
                .pool
                .run_with_retry(move |conn| jobs_db::upsert_translation(conn, &to_store))
                .await;

            match write {
                Ok(created) => {
                    let action = if created {
                        summary.created += 1;
                        LogAction::Create
                    } else {
                        summary.updated += 1;
                        LogAction::Update
                    };
                    summary.metrics.add(&metrics);
                    self.log_job(
                        run_id,
                        record,
                        lang,
                        &translated.provider,
                        action,
                        LogStatus::Stale,
                        metrics,
                        &src_hash,
                        "",
                    )
                    .await;
                }
                Err(e) => {
                    if e.is_fatal() {
                        return Err(e);
                    }
                    warn!(job_id = %record.job_id, lang, error = %e, "persisting job translation failed");
                    self.log_job(
                        run_id,
                        record,
                        lang,
                        &translated.provider,
                        LogAction::Error,
                        LogStatus::Error,
                        TextMetrics::default(),
                        &src_hash,
                        &e.to_string(),
                    )
                    .await;
                    summary.errors += 1;
                }
            }
        }

        Ok(())
    }

    /// Translate every registered field. Returns None when not a single
    /// provider call produced text (record-level failure).
    async fn translate_record(&self, record: &JobRecord, lang: &str) -> Option<TranslatedRecord> {
        let source = &self.settings.source_lang;
        let mut out = TranslatedRecord::default();
        let mut any_translated = false;

        let name_result = self.translate_plain(&record.name, lang, source).await;
        if let Some((text, provider)) = name_result {
            out.name = text;
            out.provider = provider;
            any_translated = true;
        } else {
            out.name = record.name.clone();
        }

        for field in PLAIN_FIELDS {
            let src = record.field(field);
            if src.is_empty() {
                continue;
            }
            match self.translate_plain(src, lang, source).await {
                Some((mut text, provider)) => {
                    if *field == "meta_description" {
                        text = truncate_chars(&text, META_DESCRIPTION_MAX);
                    }
                    out.provider = provider;
                    out.values.push((field.to_string(), text));
                    any_translated = true;
                }
                None => {
                    // Keep the source value rather than half-emptying the record.
                    out.values.push((field.to_string(), src.to_string()));
                }
            }
        }

        for field in HTML_FIELDS {
            let src = record.field(field);
            if src.is_empty() {
                continue;
            }
            let guarded = Guarded::mask(src);
            match self
                .chain
                .translate(&guarded.masked, lang, source)
                .await
            {
                crate::providers::ChainOutcome::Translated { provider, text } => {
                    out.provider = provider;
                    out.values.push((field.to_string(), guarded.restore(&text)));
                    any_translated = true;
                }
                _ => {
                    out.values.push((field.to_string(), src.to_string()));
                }
            }
        }

        if any_translated { Some(out) } else { None }
    }

    async fn translate_plain(
        &self,
        text: &str,
        lang: &str,
        source: &str,
    ) -> Option<(String, String)> {
        if text.trim().is_empty() {
            return None;
        }
        match self.chain.translate(text, lang, source).await {
            crate::providers::ChainOutcome::Translated { provider, text } => {
                Some((text, provider))
            }
            _ => None,
        }
    }

    /// Merge translated values into the full field map, regenerate the slug
    /// and rewrite links and the JSON-LD payload.
    fn assemble_payload(
        &self,
        record: &JobRecord,
        lang: &str,
        translated: &TranslatedRecord,
        stored: Option<&JobTranslation>,
        src_hash: &str,
    ) -> JobTranslation {
        let mut fields = record.fields.clone();
        for (name, value) in &translated.values {
            fields.insert(name.clone(), Value::String(value.clone()));
        }

        // Slug: translated title, postal code and city. The old slug (feed
        // slug, or one derived from the source name) is rewritten wherever
        // it appears in the payload.
        let base_title = translated
            .values
            .iter()
            .find(|(n, _)| n == "title")
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
            .unwrap_or(&translated.name);
        let old_slug = {
            let feed_slug = record.field("link_slug");
            if feed_slug.is_empty() {
                slugify(&record.name)
            } else {
                feed_slug.to_string()
            }
        };
        let new_slug = slugify(&format!(
            "{}-{}-{}",
            base_title,
            record.field("postal_code"),
            record.field("city")
        ));

        let home = self.settings.site_url.clone();
        let lang_home = self.settings.home_url_for(lang).to_string();

        for (name, value) in fields.iter_mut() {
            if name == "json_ld" {
                continue;
            }
            if let Value::String(s) = value {
                let rewritten = links::rewrite_slug(s, &old_slug, &new_slug);
                *value = Value::String(links::rewrite_home(&rewritten, &home, &lang_home));
            }
        }

        let json_ld_raw = record.field("json_ld");
        if !json_ld_raw.is_empty() {
            let rewritten = links::rewrite_json_ld(
                json_ld_raw,
                base_title,
                &old_slug,
                &new_slug,
                &home,
                &lang_home,
            );
            fields.insert("json_ld".to_string(), Value::String(rewritten));
        }
        fields.insert("link_slug".to_string(), Value::String(new_slug.clone()));

        // Publication timestamp: keep the stored one, otherwise fall back
        // through the feed fields to the JSON-LD date, then to now.
        let created_at = stored
            .map(|t| t.created_at)
            .or(record.created_at)
            .or_else(|| links::parse_flexible_date(record.field("published_from")))
            .or_else(|| links::parse_flexible_date(record.field("date_from")))
            .or_else(|| links::json_ld_date_posted(json_ld_raw))
            .unwrap_or_else(Utc::now);

        debug!(job_id = %record.job_id, lang, slug = %new_slug, "assembled job payload");

        JobTranslation {
            job_id: record.job_id.clone(),
            lang: lang.to_string(),
            name: translated.name.clone(),
            fields,
            slug: new_slug,
            src_hash: src_hash.to_string(),
            created_at,
            updated_at: Utc::now(),
        }
    }

    async fn log_batch(&self, run_id: &str, picked: &[&JobRecord], limit: Option<usize>) {
        let mut ids: Vec<&str> = picked
            .iter()
            .take(BATCH_LOG_ID_CAP)
            .map(|r| r.job_id.as_str())
            .collect();
        if picked.len() > BATCH_LOG_ID_CAP {
            ids.push("...");
        }
        let limit_str = limit.map_or("none".to_string(), |l| l.to_string());
        let message = format!(
            "Picked {} jobs (limit={}): {}",
            picked.len(),
            limit_str,
            ids.join(",")
        );
        info!("{}", message);

        let mut entry = NewLogEntry::new(run_id, LogAction::Batch, LogStatus::Info);
        entry.content_kind = "job".to_string();
        entry.source_lang = self.settings.source_lang.clone();
        entry.message = message;
        self.append(entry).await;
    }

    async fn log_summary(&self, run_id: &str, summary: &BatchSummary) {
        let message = format!(
            "jobs done: picked={} created={} updated={} skipped={} errors={} words={} chars={}",
            summary.picked,
            summary.created,
            summary.updated,
            summary.skipped,
            summary.errors,
            summary.metrics.total_words(),
            summary.metrics.total_chars(),
        );
        info!("{}", message);

        let mut entry = NewLogEntry::new(run_id, LogAction::Summary, LogStatus::Info);
        entry.content_kind = "job".to_string();
        entry.source_lang = self.settings.source_lang.clone();
        entry.metrics = summary.metrics;
        entry.message = message;
        self.append(entry).await;
    }

    #[allow(clippy::too_many_arguments)]
    async fn log_job(
        &self,
        run_id: &str,
        record: &JobRecord,
        lang: &str,
        provider: &str,
        action: LogAction,
        status: LogStatus,
        metrics: TextMetrics,
        src_hash: &str,
        message: &str,
    ) {
        let mut entry = NewLogEntry::new(run_id, action, status);
        entry.content_id = record.job_id.parse().unwrap_or(0);
        entry.content_kind = "job".to_string();
        entry.source_lang = self.settings.source_lang.clone();
        entry.target_lang = lang.to_string();
        entry.provider = provider.to_string();
        entry.metrics = metrics;
        entry.src_hash = src_hash.to_string();
        entry.message = message.to_string();
        self.append(entry).await;
    }

    async fn append(&self, entry: NewLogEntry) {
        self.pool
            .try_interact("append audit row", move |conn| {
                logs::append(conn, &entry)?;
                Ok(())
            })
            .await;
    }
}

/// Field values produced for one target language.
#[derive(Debug, Clone, Default)]
struct TranslatedRecord {
    name: String,
    values: Vec<(String, String)>,
    provider: String,
}

/// Word/char metrics over a record's countable fields. The name feeds the
/// title metrics, everything else the content metrics.
fn record_metrics(name: &str, fields: &serde_json::Map<String, Value>) -> TextMetrics {
    let mut metrics = TextMetrics {
        words_title: count_words(name),
        chars_title: count_chars(name),
        ..Default::default()
    };
    for field in PLAIN_FIELDS.iter().chain(HTML_FIELDS) {
        if !counts_toward_metrics(field) {
            continue;
        }
        let value = fields
            .get(*field)
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        metrics.words_content += count_words(value);
        metrics.chars_content += count_chars(value);
    }
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_metrics_counts_countable_fields() {
        let mut fields = serde_json::Map::new();
        fields.insert("benefits".to_string(), json!("<p>good pay here</p>"));
        fields.insert("link_slug".to_string(), json!("never-counted-slug"));
        let metrics = record_metrics("Baker Job", &fields);
        assert_eq!(metrics.words_title, 2);
        assert_eq!(metrics.words_content, 3);
    }
}
