// src/run/mod.rs
// Run orchestrator: wires the reconciler and the batch runner into one
// pass over the configured content groups, under a shared run id.

use crate::config::Settings;
use crate::db::DatabasePool;
use crate::db::logs;
use crate::db::types::{LogAction, LogStatus, NewLogEntry, TextMetrics};
use crate::error::Result;
use crate::jobs::BatchRunner;
use crate::providers::ProviderChain;
use crate::reconcile::{GroupTotals, Reconciler};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Test runs cap every group at this many entities and run inline.
const TEST_MODE_CAP: usize = 2;

/// Full runs yield briefly before starting so the caller's request cycle
/// (webhook, cron tick) finishes first.
const FULL_MODE_DEFER: Duration = Duration::from_secs(1);

/// How a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Small capped pass, no defer. For verifying configuration.
    Test,
    /// Everything the whitelists and job limit allow, after a short defer.
    Full,
}

/// Which content groups a run covers.
#[derive(Debug, Clone, Copy)]
pub struct RunGroups {
    pub menu_pages: bool,
    pub extra_pages: bool,
    pub blocks: bool,
    pub jobs: bool,
}

impl Default for RunGroups {
    fn default() -> Self {
        Self {
            menu_pages: true,
            extra_pages: true,
            blocks: true,
            jobs: true,
        }
    }
}

/// Parameters for one run.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub mode: RunMode,
    pub force: bool,
    pub groups: RunGroups,
    /// Restrict CMS groups to a single entity id.
    pub only_id: Option<i64>,
    /// Restrict the job group to a single record.
    pub only_job_id: Option<String>,
    /// Overrides the configured job limit when set.
    pub limit: Option<usize>,
}

impl RunContext {
    pub fn new(mode: RunMode, force: bool) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            mode,
            force,
            groups: RunGroups::default(),
            only_id: None,
            only_job_id: None,
            limit: None,
        }
    }
}

/// Aggregate outcome of a run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub created: u64,
    pub updated: u64,
    pub skipped: u64,
    pub errors: u64,
    pub metrics: TextMetrics,
}

impl RunSummary {
    fn absorb(&mut self, totals: &GroupTotals) {
        self.created += totals.created;
        self.updated += totals.updated;
        self.skipped += totals.skipped;
        self.errors += totals.errors;
        self.metrics.add(&totals.metrics);
    }
}

/// Bounded in-memory trace of run steps, for verbose CLI output.
#[derive(Debug, Default)]
pub struct DebugTrace {
    lines: VecDeque<String>,
}

impl DebugTrace {
    const CAP: usize = 200;

    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() >= Self::CAP {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }
}

/// Runs the configured groups in a fixed order under one run id.
pub struct RunOrchestrator {
    pool: Arc<DatabasePool>,
    chain: Arc<ProviderChain>,
    settings: Settings,
    trace: Mutex<DebugTrace>,
}

impl RunOrchestrator {
    pub fn new(pool: Arc<DatabasePool>, chain: Arc<ProviderChain>, settings: Settings) -> Self {
        Self {
            pool,
            chain,
            settings,
            trace: Mutex::new(DebugTrace::default()),
        }
    }

    pub fn trace_lines(&self) -> Vec<String> {
        match self.trace.lock() {
            Ok(trace) => trace.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }

    fn note(&self, line: impl Into<String>) {
        if let Ok(mut trace) = self.trace.lock() {
            trace.push(line);
        }
    }

    /// Execute one run. Precondition failures abort; anything else is
    /// logged per pair and the run continues.
    pub async fn run(&self, ctx: &RunContext) -> Result<RunSummary> {
        let mode_label = match ctx.mode {
            RunMode::Test => "test",
            RunMode::Full => "full",
        };
        info!(run_id = %ctx.run_id, mode = mode_label, force = ctx.force, "run starting");
        self.note(format!("run {} starting ({})", ctx.run_id, mode_label));

        self.log_run(
            &ctx.run_id,
            LogAction::Begin,
            LogStatus::Info,
            &format!("run started mode={} force={}", mode_label, ctx.force),
            TextMetrics::default(),
        )
        .await;

        if ctx.mode == RunMode::Full {
            tokio::time::sleep(FULL_MODE_DEFER).await;
        }

        let mut summary = RunSummary::default();
        let reconciler = Reconciler::new(
            Arc::clone(&self.pool),
            Arc::clone(&self.chain),
            self.settings.clone(),
        );

        let cms_groups: [(&str, bool, &[i64]); 3] = [
            (
                "menu-page",
                ctx.groups.menu_pages,
                self.settings.page_whitelist.as_slice(),
            ),
            (
                "extra-page",
                ctx.groups.extra_pages,
                self.settings.extra_page_whitelist.as_slice(),
            ),
            (
                "block",
                ctx.groups.blocks,
                self.settings.block_whitelist.as_slice(),
            ),
        ];

        for (label, enabled, whitelist) in cms_groups {
            if !enabled {
                continue;
            }
            let ids = self.group_ids(ctx, whitelist);
            if ids.is_empty() {
                self.note(format!("{}: nothing whitelisted", label));
                continue;
            }
            self.note(format!("{}: reconciling {} entities", label, ids.len()));
            match reconciler.reconcile_ids(&ctx.run_id, ctx.force, label, &ids).await {
                Ok(totals) => summary.absorb(&totals),
                Err(e) if e.is_fatal() => {
                    warn!(group = label, error = %e, "run aborted");
                    self.log_run(
                        &ctx.run_id,
                        LogAction::Error,
                        LogStatus::Error,
                        &e.to_string(),
                        TextMetrics::default(),
                    )
                    .await;
                    return Err(e);
                }
                Err(e) => {
                    warn!(group = label, error = %e, "group failed, continuing");
                    self.log_run(
                        &ctx.run_id,
                        LogAction::Error,
                        LogStatus::Error,
                        &format!("group {}: {}", label, e),
                        TextMetrics::default(),
                    )
                    .await;
                    summary.errors += 1;
                }
            }
        }

        if ctx.groups.jobs {
            let limit = self.job_limit(ctx);
            self.note(format!("jobs: running batch (limit={:?})", limit));
            let runner = BatchRunner::new(
                Arc::clone(&self.pool),
                Arc::clone(&self.chain),
                self.settings.clone(),
            );
            match runner
                .run(&ctx.run_id, ctx.force, limit, ctx.only_job_id.as_deref())
                .await
            {
                Ok(batch) => {
                    summary.created += batch.created;
                    summary.updated += batch.updated;
                    summary.skipped += batch.skipped;
                    summary.errors += batch.errors;
                    summary.metrics.add(&batch.metrics);
                }
                Err(e) if e.is_fatal() => {
                    warn!(error = %e, "run aborted");
                    self.log_run(
                        &ctx.run_id,
                        LogAction::Error,
                        LogStatus::Error,
                        &e.to_string(),
                        TextMetrics::default(),
                    )
                    .await;
                    return Err(e);
                }
                Err(e) => {
                    warn!(error = %e, "job batch failed, continuing");
                    self.log_run(
                        &ctx.run_id,
                        LogAction::Error,
                        LogStatus::Error,
                        &format!("jobs: {}", e),
                        TextMetrics::default(),
                    )
                    .await;
                    summary.errors += 1;
                }
            }
        }

        let message = format!(
            "run done: created={} updated={} skipped={} errors={} words={} chars={}",
            summary.created,
            summary.updated,
            summary.skipped,
            summary.errors,
            summary.metrics.total_words(),
            summary.metrics.total_chars(),
        );
        info!(run_id = %ctx.run_id, "{}", message);
        self.note(message.clone());
        self.log_run(
            &ctx.run_id,
            LogAction::Summary,
            LogStatus::Info,
            &message,
            summary.metrics,
        )
        .await;

        Ok(summary)
    }

    /// Whitelist for one CMS group, after test-mode cap and only-id filter.
    fn group_ids(&self, ctx: &RunContext, whitelist: &[i64]) -> Vec<i64> {
        let mut ids: Vec<i64> = match ctx.only_id {
            Some(only) => whitelist.iter().copied().filter(|id| *id == only).collect(),
            None => whitelist.to_vec(),
        };
        if ctx.mode == RunMode::Test {
            ids.truncate(TEST_MODE_CAP);
        }
        ids
    }

    fn job_limit(&self, ctx: &RunContext) -> Option<usize> {
        match ctx.mode {
            RunMode::Test => Some(TEST_MODE_CAP),
            RunMode::Full => ctx.limit.or(self.settings.job_limit),
        }
    }

    async fn log_run(
        &self,
        run_id: &str,
        action: LogAction,
        status: LogStatus,
        message: &str,
        metrics: TextMetrics,
    ) {
        let mut entry = NewLogEntry::new(run_id, action, status);
        entry.content_kind = "run".to_string();
        entry.source_lang = self.settings.source_lang.clone();
        entry.message = message.to_string();
        entry.metrics = metrics;
        self.pool
            .try_interact("append audit row", move |conn| {
                logs::append(conn, &entry)?;
                Ok(())
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_trace_is_bounded() {
        let mut trace = DebugTrace::default();
        for i in 0..250 {
            trace.push(format!("line {}", i));
        }
        let lines: Vec<_> = trace.lines().collect();
        assert_eq!(lines.len(), DebugTrace::CAP);
        assert_eq!(lines[0], "line 50");
    }

    #[test]
    fn test_run_context_defaults() {
        let ctx = RunContext::new(RunMode::Test, false);
        assert!(ctx.groups.menu_pages && ctx.groups.jobs);
        assert!(ctx.only_id.is_none());
        assert!(!ctx.run_id.is_empty());
    }
}
