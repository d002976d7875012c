// src/main.rs
// CLI entry point: runs a sync pass, shows status, exports the audit log.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use langsync::config::ApiKeys;
use langsync::db::{DatabasePool, jobs, logs, options};
use langsync::providers::ProviderChain;
use langsync::run::{RunContext, RunGroups, RunMode, RunOrchestrator};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;

#[derive(Parser)]
#[command(name = "langsync", version, about = "Keeps translated content in step with its source language")]
struct Cli {
    /// Database file (default: ~/.langsync/langsync.db)
    #[arg(long, global = true, env = "LANGSYNC_DB")]
    db: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a sync pass over the configured content groups
    Run {
        /// Retranslate even when fingerprints match
        #[arg(long)]
        force: bool,

        /// Capped test pass: two entities per group, no defer
        #[arg(long)]
        test_mode: bool,

        /// Comma-separated groups to run (menu-pages,extra-pages,blocks,jobs)
        #[arg(long)]
        groups: Option<String>,

        /// Restrict CMS groups to one entity id
        #[arg(long)]
        only_id: Option<i64>,

        /// Restrict the job group to one record
        #[arg(long)]
        only_job_id: Option<String>,

        /// Override the configured job limit
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show configuration and translation status
    Status,
    /// Export audit log rows as CSV
    ExportLog {
        /// Only rows from this run (default: the most recent run)
        #[arg(long)]
        run_id: Option<String>,

        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn parse_groups(raw: &str) -> Result<RunGroups> {
    let mut groups = RunGroups {
        menu_pages: false,
        extra_pages: false,
        blocks: false,
        jobs: false,
    };
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match name {
            "menu-pages" => groups.menu_pages = true,
            "extra-pages" => groups.extra_pages = true,
            "blocks" => groups.blocks = true,
            "jobs" => groups.jobs = true,
            other => anyhow::bail!(
                "unknown group '{}' (expected menu-pages, extra-pages, blocks, jobs)",
                other
            ),
        }
    }
    Ok(groups)
}

fn default_db_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("could not determine home directory")?;
    Ok(home.join(".langsync").join("langsync.db"))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let db_path = match cli.db {
        Some(p) => p,
        None => default_db_path()?,
    };
    let pool = Arc::new(DatabasePool::open(&db_path).await?);

    match cli.command {
        Command::Run {
            force,
            test_mode,
            groups,
            only_id,
            only_job_id,
            limit,
        } => {
            let settings = pool.run(options::load_settings).await?;
            let keys = ApiKeys::from_env();
            let chain = Arc::new(ProviderChain::from_settings(&settings, &keys));

            let mode = if test_mode { RunMode::Test } else { RunMode::Full };
            let mut ctx = RunContext::new(mode, force);
            if let Some(raw) = groups {
                ctx.groups = parse_groups(&raw)?;
            }
            ctx.only_id = only_id;
            ctx.only_job_id = only_job_id;
            ctx.limit = limit;

            let orchestrator = RunOrchestrator::new(pool, chain, settings);
            let summary = orchestrator.run(&ctx).await?;

            println!(
                "run {}: created={} updated={} skipped={} errors={} words={} chars={}",
                ctx.run_id,
                summary.created,
                summary.updated,
                summary.skipped,
                summary.errors,
                summary.metrics.total_words(),
                summary.metrics.total_chars(),
            );
            if cli.verbose {
                for line in orchestrator.trace_lines() {
                    eprintln!("  {}", line);
                }
            }
            if summary.errors > 0 {
                std::process::exit(1);
            }
        }
        Command::Status => {
            let settings = pool.run(options::load_settings).await?;
            let keys = ApiKeys::from_env()
                .merged_with(&settings.google_api_key, &settings.deepl_api_key);

            println!("database: {}", db_path.display());
            println!("providers: {}", keys.summary());
            println!("default provider: {}", settings.default_provider);
            println!("source language: {}", settings.source_lang);
            println!("target languages: {}", settings.active_langs.join(", "));
            println!(
                "whitelists: {} menu pages, {} extra pages, {} blocks",
                settings.page_whitelist.len(),
                settings.extra_page_whitelist.len(),
                settings.block_whitelist.len(),
            );

            let counts = pool.run(jobs::translation_counts).await?;
            if counts.is_empty() {
                println!("job translations: none");
            } else {
                for (lang, count) in counts {
                    println!("job translations [{}]: {}", lang, count);
                }
            }

            match pool.run(logs::last_run_id).await? {
                Some(run_id) => {
                    let sums = pool
                        .run(move |conn| {
                            logs::sums(
                                conn,
                                &logs::LogFilter {
                                    run_id: Some(run_id.clone()),
                                    ..Default::default()
                                },
                            )
                            .map(|s| (run_id, s))
                        })
                        .await?;
                    let (run_id, sums) = sums;
                    println!(
                        "last run {}: {} rows, created={} updated={} skipped={} errors={}",
                        run_id, sums.entries, sums.created, sums.updated, sums.skipped, sums.errors
                    );
                }
                None => println!("last run: none"),
            }
        }
        Command::ExportLog { run_id, out } => {
            let run_id = match run_id {
                Some(id) => Some(id),
                None => pool.run(logs::last_run_id).await?,
            };
            let Some(run_id) = run_id else {
                anyhow::bail!("no runs recorded yet");
            };

            let filter = logs::LogFilter {
                run_id: Some(run_id),
                limit: Some(100_000),
                ..Default::default()
            };
            let entries = pool.run(move |conn| logs::query(conn, &filter)).await?;
            let csv = logs::to_csv(&entries);

            match out {
                Some(path) => {
                    std::fs::write(&path, csv)
                        .with_context(|| format!("writing {}", path.display()))?;
                    eprintln!("wrote {} rows to {}", entries.len(), path.display());
                }
                None => print!("{}", csv),
            }
        }
    }

    Ok(())
}
