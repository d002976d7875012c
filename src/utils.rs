// src/utils.rs
// Small shared helpers

use std::cmp::Ordering;

/// Truncate a string to `max_chars`, appending an ellipsis when shortened.
/// Operates on character boundaries, never inside a code point.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let cut: String = s.chars().take(max_chars).collect();
    format!("{}...", cut)
}

/// Truncate to at most `max_chars` characters with no suffix.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Natural ordering for identifiers with embedded digit runs, so that
/// "job2" sorts before "job10".
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ai = a.chars().peekable();
    let mut bi = b.chars().peekable();

    loop {
        match (ai.peek().copied(), bi.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ac), Some(bc)) => {
                if ac.is_ascii_digit() && bc.is_ascii_digit() {
                    let an = take_digits(&mut ai);
                    let bn = take_digits(&mut bi);
                    // Compare numerically: longer (trimmed) digit run wins,
                    // then lexicographic on equal length.
                    let at = an.trim_start_matches('0');
                    let bt = bn.trim_start_matches('0');
                    let ord = at
                        .len()
                        .cmp(&bt.len())
                        .then_with(|| at.cmp(bt))
                        .then_with(|| an.len().cmp(&bn.len()));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                } else {
                    let ord = ac.cmp(&bc);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                    ai.next();
                    bi.next();
                }
            }
        }
    }
}

fn take_digits(it: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut out = String::new();
    while let Some(c) = it.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        out.push(c);
        it.next();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================================================
    // truncate tests
    // ============================================================================

    #[test]
    fn test_truncate_short_string_unchanged() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate("hello world", 5), "hello...");
    }

    #[test]
    fn test_truncate_multibyte_safe() {
        let s = "äöüäöü";
        assert_eq!(truncate(s, 3), "äöü...");
    }

    #[test]
    fn test_truncate_chars_no_suffix() {
        assert_eq!(truncate_chars("hello world", 5), "hello");
        assert_eq!(truncate_chars("hi", 5), "hi");
    }

    // ============================================================================
    // natural_cmp tests
    // ============================================================================

    #[test]
    fn test_natural_cmp_numeric_runs() {
        assert_eq!(natural_cmp("job2", "job10"), Ordering::Less);
        assert_eq!(natural_cmp("job10", "job2"), Ordering::Greater);
        assert_eq!(natural_cmp("job10", "job10"), Ordering::Equal);
    }

    #[test]
    fn test_natural_cmp_plain_strings() {
        assert_eq!(natural_cmp("abc", "abd"), Ordering::Less);
        assert_eq!(natural_cmp("abc", "abc"), Ordering::Equal);
    }

    #[test]
    fn test_natural_cmp_mixed() {
        assert_eq!(natural_cmp("a1b2", "a1b10"), Ordering::Less);
        assert_eq!(natural_cmp("9", "10"), Ordering::Less);
    }

    #[test]
    fn test_natural_cmp_leading_zeros() {
        // Numerically equal; longer literal run breaks the tie
        assert_eq!(natural_cmp("007", "7"), Ordering::Greater);
        assert_eq!(natural_cmp("07", "8"), Ordering::Less);
    }

    #[test]
    fn test_natural_cmp_prefix() {
        assert_eq!(natural_cmp("job", "job1"), Ordering::Less);
    }
}
