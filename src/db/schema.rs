// src/db/schema.rs
// Schema and migrations. Everything here is idempotent: CREATE IF NOT
// EXISTS plus additive ALTERs guarded by a column probe.

use anyhow::Result;
use rusqlite::Connection;

const SCHEMA: &str = r#"
-- CMS entities (sources and their translated counterparts)
CREATE TABLE IF NOT EXISTS content_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    kind TEXT NOT NULL,
    lang TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    body TEXT NOT NULL DEFAULT '',
    slug TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'publish',
    parent_id INTEGER,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Translation group membership: one row per (source entity, language)
CREATE TABLE IF NOT EXISTS translation_links (
    group_id INTEGER NOT NULL,
    lang TEXT NOT NULL,
    content_id INTEGER NOT NULL,
    UNIQUE(group_id, lang)
);

-- Source fingerprint stored per translated counterpart
CREATE TABLE IF NOT EXISTS fingerprints (
    content_id INTEGER NOT NULL,
    lang TEXT NOT NULL,
    hash TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(content_id, lang)
);

-- Structured source records for the batch pipeline
CREATE TABLE IF NOT EXISTS jobs (
    job_id TEXT PRIMARY KEY,
    name TEXT NOT NULL DEFAULT '',
    fields TEXT NOT NULL DEFAULT '{}',
    created_at TEXT
);

-- Per-language translated job payloads
CREATE TABLE IF NOT EXISTS jobs_i18n (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    job_id TEXT NOT NULL,
    lang TEXT NOT NULL,
    name TEXT NOT NULL DEFAULT '',
    fields TEXT NOT NULL DEFAULT '{}',
    slug TEXT NOT NULL DEFAULT '',
    src_hash TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(job_id, lang)
);

-- Append-only audit log; rows are never updated or deleted
CREATE TABLE IF NOT EXISTS translation_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id TEXT NOT NULL,
    content_id INTEGER NOT NULL DEFAULT 0,
    content_kind TEXT NOT NULL DEFAULT '',
    source_lang TEXT NOT NULL DEFAULT '',
    target_lang TEXT NOT NULL DEFAULT '',
    provider TEXT NOT NULL DEFAULT '',
    action TEXT NOT NULL,
    status TEXT NOT NULL,
    words_title INTEGER NOT NULL DEFAULT 0,
    chars_title INTEGER NOT NULL DEFAULT 0,
    words_content INTEGER NOT NULL DEFAULT 0,
    chars_content INTEGER NOT NULL DEFAULT 0,
    src_hash TEXT NOT NULL DEFAULT '',
    message TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_log_run ON translation_log(run_id);
CREATE INDEX IF NOT EXISTS idx_log_created ON translation_log(created_at);
CREATE INDEX IF NOT EXISTS idx_links_group ON translation_links(group_id);
CREATE INDEX IF NOT EXISTS idx_jobs_i18n_job ON jobs_i18n(job_id);

-- Key/value options (settings live under the 'settings' key as JSON)
CREATE TABLE IF NOT EXISTS options (
    name TEXT PRIMARY KEY,
    value TEXT NOT NULL DEFAULT ''
);
"#;

/// Run all migrations. Safe to call on every startup.
pub fn run_all_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    migrate_job_translation_hash_version(conn)?;
    Ok(())
}

/// Check whether a column exists on a table.
fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// The job fingerprint field set is versioned; stored hashes record which
/// version produced them so a field-set change can be migrated instead of
/// silently marking every record stale.
fn migrate_job_translation_hash_version(conn: &Connection) -> Result<()> {
    if !column_exists(conn, "jobs_i18n", "hash_version")? {
        conn.execute_batch(
            "ALTER TABLE jobs_i18n ADD COLUMN hash_version INTEGER NOT NULL DEFAULT 2;",
        )?;
        tracing::debug!("added jobs_i18n.hash_version");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_all_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn test_migrations_idempotent() {
        let conn = open();
        // Running twice must not fail
        run_all_migrations(&conn).unwrap();
    }

    #[test]
    fn test_tables_created() {
        let conn = open();
        for table in [
            "content_items",
            "translation_links",
            "fingerprints",
            "jobs",
            "jobs_i18n",
            "translation_log",
            "options",
        ] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {}", table);
        }
    }

    #[test]
    fn test_link_uniqueness() {
        let conn = open();
        conn.execute(
            "INSERT INTO translation_links (group_id, lang, content_id) VALUES (1, 'en', 2)",
            [],
        )
        .unwrap();
        let dup = conn.execute(
            "INSERT INTO translation_links (group_id, lang, content_id) VALUES (1, 'en', 3)",
            [],
        );
        assert!(dup.is_err());
    }

    #[test]
    fn test_hash_version_column_present() {
        let conn = open();
        assert!(column_exists(&conn, "jobs_i18n", "hash_version").unwrap());
    }
}
