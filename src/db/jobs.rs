// src/db/jobs.rs
// Job record store: source records plus per-language translated payloads.

use crate::db::types::{JobRecord, JobTranslation};
use crate::error::Result;
use crate::fingerprint::JOB_FINGERPRINT_VERSION;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashMap;

fn parse_fields(raw: &str) -> serde_json::Map<String, serde_json::Value> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn parse_ts(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|ndt| ndt.and_utc())
        })
}

/// All source records, unordered (the selector imposes ordering).
pub fn list_all(conn: &Connection) -> Result<Vec<JobRecord>> {
    let mut stmt = conn.prepare("SELECT job_id, name, fields, created_at FROM jobs")?;
    let rows = stmt.query_map([], |row| {
        let fields: String = row.get(2)?;
        let created_at: Option<String> = row.get(3)?;
        Ok(JobRecord {
            job_id: row.get(0)?,
            name: row.get(1)?,
            fields: parse_fields(&fields),
            created_at: created_at.and_then(|s| parse_ts(&s)),
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Insert or replace a source record (ingest path and tests).
pub fn upsert_record(conn: &Connection, record: &JobRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO jobs (job_id, name, fields, created_at) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(job_id) DO UPDATE
         SET name = excluded.name, fields = excluded.fields, created_at = excluded.created_at",
        params![
            record.job_id,
            record.name,
            serde_json::to_string(&record.fields)?,
            record.created_at.map(|dt| dt.to_rfc3339()),
        ],
    )?;
    Ok(())
}

/// Stored translation for (job, lang), if any.
pub fn get_translation(
    conn: &Connection,
    job_id: &str,
    lang: &str,
) -> Result<Option<JobTranslation>> {
    let row = conn
        .query_row(
            "SELECT job_id, lang, name, fields, slug, src_hash, created_at, updated_at
             FROM jobs_i18n WHERE job_id = ?1 AND lang = ?2",
            params![job_id, lang],
            |row| {
                let fields: String = row.get(3)?;
                let created_at: String = row.get(6)?;
                let updated_at: String = row.get(7)?;
                Ok((
                    JobTranslation {
                        job_id: row.get(0)?,
                        lang: row.get(1)?,
                        name: row.get(2)?,
                        fields: parse_fields(&fields),
                        slug: row.get(4)?,
                        src_hash: row.get(5)?,
                        created_at: Utc::now(),
                        updated_at: Utc::now(),
                    },
                    created_at,
                    updated_at,
                ))
            },
        )
        .optional()?;

    Ok(row.map(|(mut t, created, updated)| {
        if let Some(ts) = parse_ts(&created) {
            t.created_at = ts;
        }
        if let Some(ts) = parse_ts(&updated) {
            t.updated_at = ts;
        }
        t
    }))
}

/// Source-hash lookup across all stored translations, keyed (job_id, lang).
/// The candidate selector works off this map without further queries.
pub fn existing_hashes(conn: &Connection) -> Result<HashMap<(String, String), String>> {
    let mut stmt = conn.prepare("SELECT job_id, lang, src_hash FROM jobs_i18n")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;
    let mut out = HashMap::new();
    for row in rows {
        let (job_id, lang, hash) = row?;
        out.insert((job_id, lang), hash);
    }
    Ok(out)
}

/// Write a translated payload for (job, lang). Returns true when a new row
/// was created, false when an existing one was updated.
pub fn upsert_translation(conn: &Connection, translation: &JobTranslation) -> Result<bool> {
    let existed: Option<i64> = conn
        .query_row(
            "SELECT id FROM jobs_i18n WHERE job_id = ?1 AND lang = ?2",
            params![translation.job_id, translation.lang],
            |row| row.get(0),
        )
        .optional()?;

    conn.execute(
        "INSERT INTO jobs_i18n
         (job_id, lang, name, fields, slug, src_hash, hash_version, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(job_id, lang) DO UPDATE
         SET name = excluded.name, fields = excluded.fields, slug = excluded.slug,
             src_hash = excluded.src_hash, hash_version = excluded.hash_version,
             updated_at = excluded.updated_at",
        params![
            translation.job_id,
            translation.lang,
            translation.name,
            serde_json::to_string(&translation.fields)?,
            translation.slug,
            translation.src_hash,
            JOB_FINGERPRINT_VERSION,
            translation.created_at.to_rfc3339(),
            translation.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(existed.is_none())
}

/// Count of stored translations per language.
pub fn translation_counts(conn: &Connection) -> Result<Vec<(String, u64)>> {
    let mut stmt =
        conn.prepare("SELECT lang, COUNT(*) FROM jobs_i18n GROUP BY lang ORDER BY lang")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
