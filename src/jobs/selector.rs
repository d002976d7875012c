// src/jobs/selector.rs
// Candidate selection for the batch pipeline. Pure function: ordering and
// limit semantics are testable without a database or providers.

use crate::db::types::JobRecord;
use crate::fingerprint::fingerprint_job;
use crate::utils::natural_cmp;
use std::collections::HashMap;

/// Pick the records a run will process.
///
/// Two passes: first the full set is natural-sorted by job id (so "job2"
/// precedes "job10"), then the first `limit` records that actually need
/// work are taken. A record needs work when `force` is set or when any
/// target language has no stored translation or a stale source hash.
/// Records beyond the limit are left untouched for the next run.
pub fn select_candidates<'a>(
    rows: &'a [JobRecord],
    targets: &[String],
    limit: Option<usize>,
    force: bool,
    existing: &HashMap<(String, String), String>,
) -> Vec<&'a JobRecord> {
    let mut sorted: Vec<&JobRecord> = rows.iter().collect();
    sorted.sort_by(|a, b| natural_cmp(&a.job_id, &b.job_id));

    let cap = limit.unwrap_or(usize::MAX);
    let mut picked = Vec::new();
    for record in sorted {
        if picked.len() >= cap {
            break;
        }
        if force || needs_work(record, targets, existing) {
            picked.push(record);
        }
    }
    picked
}

/// Whether any target language is missing or stale for this record.
pub fn needs_work(
    record: &JobRecord,
    targets: &[String],
    existing: &HashMap<(String, String), String>,
) -> bool {
    let src_hash = fingerprint_job(&record.name, &record.fields);
    targets.iter().any(|lang| {
        match existing.get(&(record.job_id.clone(), lang.clone())) {
            Some(stored) => stored.is_empty() || *stored != src_hash,
            None => true,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(job_id: &str, title: &str) -> JobRecord {
        let mut fields = serde_json::Map::new();
        fields.insert("title".to_string(), json!(title));
        JobRecord {
            job_id: job_id.to_string(),
            name: title.to_string(),
            fields,
            created_at: None,
        }
    }

    fn hash_of(record: &JobRecord) -> String {
        fingerprint_job(&record.name, &record.fields)
    }

    fn targets(langs: &[&str]) -> Vec<String> {
        langs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_natural_order() {
        let rows = vec![record("10", "c"), record("2", "a"), record("9", "b")];
        let picked = select_candidates(&rows, &targets(&["en"]), None, false, &HashMap::new());
        let ids: Vec<_> = picked.iter().map(|r| r.job_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "9", "10"]);
    }

    #[test]
    fn test_limit_counts_only_records_needing_work() {
        let rows = vec![record("1", "a"), record("2", "b"), record("3", "c")];
        let mut existing = HashMap::new();
        // Record 1 is fully up to date for the only target
        existing.insert(("1".to_string(), "en".to_string()), hash_of(&rows[0]));

        let picked = select_candidates(&rows, &targets(&["en"]), Some(1), false, &existing);
        let ids: Vec<_> = picked.iter().map(|r| r.job_id.as_str()).collect();
        // The up-to-date record does not consume the limit slot
        assert_eq!(ids, vec!["2"]);
    }

    #[test]
    fn test_stale_hash_needs_work() {
        let rows = vec![record("1", "a")];
        let mut existing = HashMap::new();
        existing.insert(("1".to_string(), "en".to_string()), "old-hash".to_string());
        assert!(needs_work(&rows[0], &targets(&["en"]), &existing));
    }

    #[test]
    fn test_any_stale_target_selects_record() {
        let rows = vec![record("42", "Baker")];
        let mut existing = HashMap::new();
        existing.insert(("42".to_string(), "pl".to_string()), hash_of(&rows[0]));
        existing.insert(("42".to_string(), "en".to_string()), "stale".to_string());
        // pl is fine, en is stale: the record is picked
        let picked =
            select_candidates(&rows, &targets(&["en", "pl"]), Some(1), false, &existing);
        assert_eq!(picked.len(), 1);
    }

    #[test]
    fn test_up_to_date_not_selected() {
        let rows = vec![record("1", "a")];
        let mut existing = HashMap::new();
        existing.insert(("1".to_string(), "en".to_string()), hash_of(&rows[0]));
        let picked = select_candidates(&rows, &targets(&["en"]), None, false, &existing);
        assert!(picked.is_empty());
    }

    #[test]
    fn test_force_selects_everything() {
        let rows = vec![record("1", "a")];
        let mut existing = HashMap::new();
        existing.insert(("1".to_string(), "en".to_string()), hash_of(&rows[0]));
        let picked = select_candidates(&rows, &targets(&["en"]), None, true, &existing);
        assert_eq!(picked.len(), 1);
    }

    #[test]
    fn test_empty_stored_hash_is_stale() {
        let rows = vec![record("1", "a")];
        let mut existing = HashMap::new();
        existing.insert(("1".to_string(), "en".to_string()), String::new());
        assert!(needs_work(&rows[0], &targets(&["en"]), &existing));
    }
}
