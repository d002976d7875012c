// src/db/options.rs
// Key/value option store; Settings persist as one JSON blob.

use crate::config::Settings;
use crate::error::Result;
use rusqlite::{Connection, OptionalExtension, params};

const SETTINGS_KEY: &str = "settings";

/// Read a raw option value.
pub fn get_option(conn: &Connection, name: &str) -> Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM options WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

/// Write a raw option value (upsert).
pub fn set_option(conn: &Connection, name: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO options (name, value) VALUES (?1, ?2)
         ON CONFLICT(name) DO UPDATE SET value = excluded.value",
        params![name, value],
    )?;
    Ok(())
}

/// Load settings, merging stored JSON over defaults. Unknown or missing
/// keys fall back to their default values, so partial blobs from older
/// versions keep working.
pub fn load_settings(conn: &Connection) -> Result<Settings> {
    match get_option(conn, SETTINGS_KEY)? {
        Some(raw) => {
            let settings = serde_json::from_str(&raw)?;
            Ok(settings)
        }
        None => Ok(Settings::default()),
    }
}

/// Persist settings as JSON.
pub fn save_settings(conn: &Connection, settings: &Settings) -> Result<()> {
    let raw = serde_json::to_string(settings)?;
    set_option(conn, SETTINGS_KEY, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::run_all_migrations;

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_all_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn test_option_round_trip() {
        let conn = open();
        assert!(get_option(&conn, "x").unwrap().is_none());
        set_option(&conn, "x", "1").unwrap();
        assert_eq!(get_option(&conn, "x").unwrap().as_deref(), Some("1"));
        set_option(&conn, "x", "2").unwrap();
        assert_eq!(get_option(&conn, "x").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_settings_default_when_missing() {
        let conn = open();
        let settings = load_settings(&conn).unwrap();
        assert_eq!(settings.default_provider, "google");
    }

    #[test]
    fn test_settings_round_trip() {
        let conn = open();
        let mut settings = Settings::default();
        settings.active_langs = vec!["en".to_string(), "pl".to_string()];
        settings.translate_slugs = true;
        save_settings(&conn, &settings).unwrap();

        let loaded = load_settings(&conn).unwrap();
        assert_eq!(loaded.active_langs, vec!["en", "pl"]);
        assert!(loaded.translate_slugs);
    }

    #[test]
    fn test_settings_partial_blob_merges_defaults() {
        let conn = open();
        set_option(&conn, SETTINGS_KEY, r#"{"source_lang":"en"}"#).unwrap();
        let loaded = load_settings(&conn).unwrap();
        assert_eq!(loaded.source_lang, "en");
        assert_eq!(loaded.default_provider, "google");
    }
}
