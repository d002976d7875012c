// src/fingerprint.rs
// Deterministic content fingerprints used for staleness detection.
//
// A translation is up to date exactly when the fingerprint stored next to it
// equals the current fingerprint of its source. Fingerprints cover the
// translated field subset only; unrelated edits never mark content stale.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Version of the job fingerprint field set. Any change to
/// [`JOB_FINGERPRINT_FIELDS`] must bump this and migrate stored hashes,
/// otherwise every record flips to stale at once.
pub const JOB_FINGERPRINT_VERSION: u32 = 2;

/// Ordered field subset hashed for job records (v2, header fields included).
pub const JOB_FINGERPRINT_FIELDS: &[&str] = &[
    "title",
    "title_listing",
    "benefits",
    "tasks",
    "requirements",
    "contact_text",
    "intro_header",
    "company_header",
    "benefits_header",
    "tasks_header",
    "requirements_header",
    "contact_header",
    "profile_header",
    "process_header",
    "apply_header",
    "meta_description",
    "link_slug",
    "postal_code",
    "city",
];

fn hex_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

/// Fingerprint for a CMS entity: title and body only.
pub fn fingerprint_cms(title: &str, body: &str) -> String {
    let mut input = String::with_capacity(title.len() + body.len() + 1);
    input.push_str(title);
    input.push('|');
    input.push_str(body);
    hex_digest(input.as_bytes())
}

/// Fingerprint for a job record: the record name followed by the versioned
/// field subset, serialized as an ordered list of (field, value) pairs.
/// Missing fields hash as empty strings so adding a blank field later does
/// not change existing hashes.
pub fn fingerprint_job(name: &str, fields: &serde_json::Map<String, Value>) -> String {
    let mut pick: Vec<(&str, String)> = Vec::with_capacity(JOB_FINGERPRINT_FIELDS.len() + 1);
    pick.push(("name", name.to_string()));
    for field in JOB_FINGERPRINT_FIELDS {
        pick.push((field, field_as_string(fields.get(*field))));
    }
    // serde_json keeps tuple order, so the serialization is stable.
    let serialized = serde_json::to_string(&pick).unwrap_or_default();
    hex_digest(serialized.as_bytes())
}

fn field_as_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(pairs: &[(&str, &str)]) -> serde_json::Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect()
    }

    // ============================================================================
    // CMS fingerprints
    // ============================================================================

    #[test]
    fn test_cms_fingerprint_deterministic() {
        let a = fingerprint_cms("Title", "<p>Body</p>");
        let b = fingerprint_cms("Title", "<p>Body</p>");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_cms_fingerprint_changes_with_content() {
        let a = fingerprint_cms("Title", "body");
        assert_ne!(a, fingerprint_cms("Title", "body2"));
        assert_ne!(a, fingerprint_cms("Title2", "body"));
    }

    #[test]
    fn test_cms_fingerprint_separator_matters() {
        // ("ab", "c") and ("a", "bc") must not collide
        assert_ne!(fingerprint_cms("ab", "c"), fingerprint_cms("a", "bc"));
    }

    // ============================================================================
    // Job fingerprints
    // ============================================================================

    #[test]
    fn test_job_fingerprint_deterministic() {
        let f = fields(&[("title", "Baker"), ("city", "Berlin")]);
        assert_eq!(fingerprint_job("Job", &f), fingerprint_job("Job", &f));
    }

    #[test]
    fn test_job_fingerprint_covers_subset_only() {
        let mut f = fields(&[("title", "Baker")]);
        let before = fingerprint_job("Job", &f);
        // A field outside the versioned subset must not affect the hash
        f.insert("internal_note".to_string(), json!("changed"));
        assert_eq!(fingerprint_job("Job", &f), before);
        // A field inside the subset must
        f.insert("city".to_string(), json!("Berlin"));
        assert_ne!(fingerprint_job("Job", &f), before);
    }

    #[test]
    fn test_job_fingerprint_missing_equals_empty() {
        let with_empty = fields(&[("title", "Baker"), ("city", "")]);
        let without = fields(&[("title", "Baker")]);
        assert_eq!(
            fingerprint_job("Job", &with_empty),
            fingerprint_job("Job", &without)
        );
    }

    #[test]
    fn test_job_fingerprint_name_included() {
        let f = fields(&[("title", "Baker")]);
        assert_ne!(fingerprint_job("Job A", &f), fingerprint_job("Job B", &f));
    }

    #[test]
    fn test_field_set_version() {
        assert_eq!(JOB_FINGERPRINT_VERSION, 2);
        // v2 includes the nine header fields
        assert!(JOB_FINGERPRINT_FIELDS.contains(&"benefits_header"));
        assert_eq!(
            JOB_FINGERPRINT_FIELDS
                .iter()
                .filter(|f| f.ends_with("_header"))
                .count(),
            9
        );
    }
}
