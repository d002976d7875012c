// src/db/content.rs
// CMS entity store: whitelisted entities, translation groups, fingerprints.
//
// Translated content and its fingerprint always land in one transaction;
// a crash between the two would otherwise leave a translation that looks
// permanently stale or permanently fresh.

use crate::db::types::{ContentItem, ContentKind};
use crate::error::{Result, SyncError};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashMap;

/// Verify that the translation-group capability exists. Reconciliation is
/// meaningless without it, so this failure aborts the pass.
pub fn ensure_translation_capability(conn: &Connection) -> Result<()> {
    let present: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='translation_links'",
        [],
        |row| row.get(0),
    )?;
    if present == 0 {
        return Err(SyncError::Precondition(
            "translation groups unavailable".to_string(),
        ));
    }
    Ok(())
}

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<ContentItem> {
    let kind: String = row.get(1)?;
    let created_at: Option<String> = row.get(8)?;
    Ok(ContentItem {
        id: row.get(0)?,
        kind: ContentKind::parse(&kind).unwrap_or(ContentKind::Page),
        lang: row.get(2)?,
        title: row.get(3)?,
        body: row.get(4)?,
        slug: row.get(5)?,
        status: row.get(6)?,
        parent_id: row.get(7)?,
        created_at: created_at.and_then(|s| parse_ts(&s)),
    })
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

const ITEM_COLUMNS: &str = "id, kind, lang, title, body, slug, status, parent_id, created_at";

/// Fetch a single entity.
pub fn get_item(conn: &Connection, id: i64) -> Result<Option<ContentItem>> {
    let sql = format!("SELECT {} FROM content_items WHERE id = ?1", ITEM_COLUMNS);
    let item = conn.query_row(&sql, params![id], row_to_item).optional()?;
    Ok(item)
}

/// Fetch whitelisted entities of one kind, in whitelist order.
/// Ids absent from the table are skipped silently.
pub fn get_whitelisted(conn: &Connection, ids: &[i64]) -> Result<Vec<ContentItem>> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(item) = get_item(conn, *id)? {
            out.push(item);
        }
    }
    Ok(out)
}

/// Linked translated entity for (group, lang), if one exists.
pub fn linked_translation(conn: &Connection, group_id: i64, lang: &str) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT content_id FROM translation_links WHERE group_id = ?1 AND lang = ?2",
            params![group_id, lang],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Register (or move) the translated entity for (group, lang).
pub fn set_link(conn: &Connection, group_id: i64, lang: &str, content_id: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO translation_links (group_id, lang, content_id) VALUES (?1, ?2, ?3)
         ON CONFLICT(group_id, lang) DO UPDATE SET content_id = excluded.content_id",
        params![group_id, lang, content_id],
    )?;
    Ok(())
}

/// The full language -> entity map for a group.
pub fn group_map(conn: &Connection, group_id: i64) -> Result<HashMap<String, i64>> {
    let mut stmt =
        conn.prepare("SELECT lang, content_id FROM translation_links WHERE group_id = ?1")?;
    let rows = stmt.query_map(params![group_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;
    let mut out = HashMap::new();
    for row in rows {
        let (lang, id) = row?;
        out.insert(lang, id);
    }
    Ok(out)
}

/// Stored fingerprint for (content, lang), if any.
pub fn get_fingerprint(conn: &Connection, content_id: i64, lang: &str) -> Result<Option<String>> {
    let hash = conn
        .query_row(
            "SELECT hash FROM fingerprints WHERE content_id = ?1 AND lang = ?2",
            params![content_id, lang],
            |row| row.get(0),
        )
        .optional()?;
    Ok(hash)
}

fn set_fingerprint(conn: &Connection, content_id: i64, lang: &str, hash: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO fingerprints (content_id, lang, hash, updated_at)
         VALUES (?1, ?2, ?3, datetime('now'))
         ON CONFLICT(content_id, lang) DO UPDATE
         SET hash = excluded.hash, updated_at = excluded.updated_at",
        params![content_id, lang, hash],
    )?;
    Ok(())
}

/// Fields written when creating a translated counterpart.
#[derive(Debug, Clone)]
pub struct NewTranslation {
    pub kind: ContentKind,
    pub lang: String,
    pub title: String,
    pub body: String,
    pub slug: String,
    pub status: String,
    pub parent_id: Option<i64>,
}

/// Create a translated entity, link it into the group and store the source
/// fingerprint, all in one transaction. Returns the new entity id.
pub fn create_translation(
    conn: &Connection,
    group_id: i64,
    item: &NewTranslation,
    src_hash: &str,
) -> Result<i64> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO content_items (kind, lang, title, body, slug, status, parent_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            item.kind.as_str(),
            item.lang,
            item.title,
            item.body,
            item.slug,
            item.status,
            item.parent_id,
        ],
    )?;
    let new_id = tx.last_insert_rowid();
    set_link(&tx, group_id, &item.lang, new_id)?;
    set_fingerprint(&tx, new_id, &item.lang, src_hash)?;
    tx.commit()?;
    Ok(new_id)
}

/// Update a translated entity in place and refresh its fingerprint,
/// atomically.
pub fn update_translation(
    conn: &Connection,
    content_id: i64,
    lang: &str,
    title: &str,
    body: &str,
    slug: Option<&str>,
    src_hash: &str,
) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    match slug {
        Some(slug) => {
            tx.execute(
                "UPDATE content_items SET title = ?1, body = ?2, slug = ?3 WHERE id = ?4",
                params![title, body, slug, content_id],
            )?;
        }
        None => {
            tx.execute(
                "UPDATE content_items SET title = ?1, body = ?2 WHERE id = ?3",
                params![title, body, content_id],
            )?;
        }
    }
    set_fingerprint(&tx, content_id, lang, src_hash)?;
    tx.commit()?;
    Ok(())
}
