// src/jobs/fields.rs
// Field registry for job records: which fields get translated and how.

/// Plain-text fields, translated without masking. Includes the listing
/// title variant, the meta description and the section header strings.
pub const PLAIN_FIELDS: &[&str] = &[
    "title",
    "title_listing",
    "meta_description",
    "intro_header",
    "company_header",
    "benefits_header",
    "tasks_header",
    "requirements_header",
    "contact_header",
    "profile_header",
    "process_header",
    "apply_header",
];

/// HTML body fields, masked before provider calls so embedded shortcodes
/// survive translation verbatim.
pub const HTML_FIELDS: &[&str] = &["benefits", "tasks", "requirements", "contact_text"];

/// Meta descriptions longer than this are cut after translation
/// (search engines truncate around here anyway).
pub const META_DESCRIPTION_MAX: usize = 170;

/// Fields that never feed word/char metrics: identifiers, location data
/// and machine-readable payloads.
pub const METRIC_EXEMPT_FIELDS: &[&str] = &["link_slug", "postal_code", "city", "json_ld"];

/// Whether a field contributes to word/char metrics.
pub fn counts_toward_metrics(name: &str) -> bool {
    !METRIC_EXEMPT_FIELDS.contains(&name) && !name.starts_with('@')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::JOB_FINGERPRINT_FIELDS;

    #[test]
    fn test_field_groups_disjoint() {
        for f in PLAIN_FIELDS {
            assert!(!HTML_FIELDS.contains(f), "{} in both groups", f);
        }
    }

    #[test]
    fn test_translated_fields_are_fingerprinted() {
        // Every field we translate must be part of the fingerprint; an edit
        // to it has to mark the record stale.
        for f in PLAIN_FIELDS.iter().chain(HTML_FIELDS) {
            assert!(
                JOB_FINGERPRINT_FIELDS.contains(f),
                "{} translated but not fingerprinted",
                f
            );
        }
    }

    #[test]
    fn test_metric_exemptions() {
        assert!(counts_toward_metrics("benefits"));
        assert!(counts_toward_metrics("title"));
        assert!(!counts_toward_metrics("link_slug"));
        assert!(!counts_toward_metrics("json_ld"));
        assert!(!counts_toward_metrics("@context"));
    }
}
