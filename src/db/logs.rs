// src/db/logs.rs
// Append-only audit log: every (entity, language) decision lands here.
// Rows are inserted and read, never updated or deleted.

use crate::db::types::{LogEntry, NewLogEntry, TextMetrics};
use crate::error::Result;
use rusqlite::{Connection, OptionalExtension, params};

/// Append one audit row.
pub fn append(conn: &Connection, entry: &NewLogEntry) -> Result<i64> {
    conn.execute(
        "INSERT INTO translation_log
         (run_id, content_id, content_kind, source_lang, target_lang, provider,
          action, status, words_title, chars_title, words_content, chars_content,
          src_hash, message)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            entry.run_id,
            entry.content_id,
            entry.content_kind,
            entry.source_lang,
            entry.target_lang,
            entry.provider,
            entry.action.as_str(),
            entry.status.as_str(),
            entry.metrics.words_title as i64,
            entry.metrics.chars_title as i64,
            entry.metrics.words_content as i64,
            entry.metrics.chars_content as i64,
            entry.src_hash,
            entry.message,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Filters for querying the log.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub run_id: Option<String>,
    pub search: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

fn filter_clause(filter: &LogFilter, params_out: &mut Vec<Box<dyn rusqlite::ToSql>>) -> String {
    let mut clauses = Vec::new();
    if let Some(ref run_id) = filter.run_id {
        params_out.push(Box::new(run_id.clone()));
        clauses.push(format!("run_id = ?{}", params_out.len()));
    }
    if let Some(ref search) = filter.search {
        params_out.push(Box::new(format!("%{}%", search)));
        clauses.push(format!("message LIKE ?{}", params_out.len()));
    }
    if let Some(ref from) = filter.from {
        params_out.push(Box::new(from.clone()));
        clauses.push(format!("created_at >= ?{}", params_out.len()));
    }
    if let Some(ref to) = filter.to {
        params_out.push(Box::new(to.clone()));
        clauses.push(format!("created_at <= ?{}", params_out.len()));
    }
    if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    }
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<LogEntry> {
    Ok(LogEntry {
        id: row.get(0)?,
        run_id: row.get(1)?,
        content_id: row.get(2)?,
        content_kind: row.get(3)?,
        source_lang: row.get(4)?,
        target_lang: row.get(5)?,
        provider: row.get(6)?,
        action: row.get(7)?,
        status: row.get(8)?,
        metrics: TextMetrics {
            words_title: row.get::<_, i64>(9)? as u64,
            chars_title: row.get::<_, i64>(10)? as u64,
            words_content: row.get::<_, i64>(11)? as u64,
            chars_content: row.get::<_, i64>(12)? as u64,
        },
        src_hash: row.get(13)?,
        message: row.get(14)?,
        created_at: row.get(15)?,
    })
}

const ENTRY_COLUMNS: &str = "id, run_id, content_id, content_kind, source_lang, target_lang, \
     provider, action, status, words_title, chars_title, words_content, chars_content, \
     src_hash, message, created_at";

/// Query log rows, newest first.
pub fn query(conn: &Connection, filter: &LogFilter) -> Result<Vec<LogEntry>> {
    let mut bound: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
    let where_clause = filter_clause(filter, &mut bound);
    let limit = filter.limit.unwrap_or(200);
    let offset = filter.offset.unwrap_or(0);
    let sql = format!(
        "SELECT {} FROM translation_log{} ORDER BY id DESC LIMIT {} OFFSET {}",
        ENTRY_COLUMNS, where_clause, limit, offset
    );

    let mut stmt = conn.prepare(&sql)?;
    let refs: Vec<&dyn rusqlite::ToSql> = bound.iter().map(|b| b.as_ref()).collect();
    let rows = stmt.query_map(refs.as_slice(), row_to_entry)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Aggregate view over a filtered slice of the log.
#[derive(Debug, Clone, Default)]
pub struct LogSums {
    pub entries: u64,
    pub words: u64,
    pub chars: u64,
    pub created: u64,
    pub updated: u64,
    pub skipped: u64,
    pub errors: u64,
    pub by_provider: Vec<(String, u64)>,
}

/// Aggregate totals over matching rows.
pub fn sums(conn: &Connection, filter: &LogFilter) -> Result<LogSums> {
    let mut bound: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
    let where_clause = filter_clause(filter, &mut bound);
    let refs: Vec<&dyn rusqlite::ToSql> = bound.iter().map(|b| b.as_ref()).collect();

    let sql = format!(
        "SELECT COUNT(*),
                COALESCE(SUM(words_title + words_content), 0),
                COALESCE(SUM(chars_title + chars_content), 0),
                COALESCE(SUM(action = 'create'), 0),
                COALESCE(SUM(action = 'update'), 0),
                COALESCE(SUM(action = 'skip'), 0),
                COALESCE(SUM(status = 'error'), 0)
         FROM translation_log{}",
        where_clause
    );
    let mut result = conn.query_row(&sql, refs.as_slice(), |row| {
        Ok(LogSums {
            entries: row.get::<_, i64>(0)? as u64,
            words: row.get::<_, i64>(1)? as u64,
            chars: row.get::<_, i64>(2)? as u64,
            created: row.get::<_, i64>(3)? as u64,
            updated: row.get::<_, i64>(4)? as u64,
            skipped: row.get::<_, i64>(5)? as u64,
            errors: row.get::<_, i64>(6)? as u64,
            by_provider: Vec::new(),
        })
    })?;

    let sql = format!(
        "SELECT provider, COUNT(*) FROM translation_log{} AND provider != '' \
         GROUP BY provider ORDER BY provider",
        if where_clause.is_empty() {
            " WHERE 1=1".to_string()
        } else {
            where_clause
        }
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(refs.as_slice(), |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
    })?;
    for row in rows {
        result.by_provider.push(row?);
    }

    Ok(result)
}

/// The most recent run id, if any rows exist.
pub fn last_run_id(conn: &Connection) -> Result<Option<String>> {
    let id = conn
        .query_row(
            "SELECT run_id FROM translation_log ORDER BY id DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Render entries as CSV (header row included). Fields containing commas,
/// quotes or newlines are quoted per RFC 4180.
pub fn to_csv(entries: &[LogEntry]) -> String {
    let mut out = String::from(
        "id,run_id,content_id,content_kind,source_lang,target_lang,provider,action,status,\
         words_title,chars_title,words_content,chars_content,src_hash,message,created_at\n",
    );
    for e in entries {
        let fields = [
            e.id.to_string(),
            e.run_id.clone(),
            e.content_id.to_string(),
            e.content_kind.clone(),
            e.source_lang.clone(),
            e.target_lang.clone(),
            e.provider.clone(),
            e.action.clone(),
            e.status.clone(),
            e.metrics.words_title.to_string(),
            e.metrics.chars_title.to_string(),
            e.metrics.words_content.to_string(),
            e.metrics.chars_content.to_string(),
            e.src_hash.clone(),
            e.message.clone(),
            e.created_at.clone(),
        ];
        let row: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
