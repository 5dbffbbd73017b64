//! Utility functions for subject handling.
//!
//! This module contains the small helpers shared by the resolver and the
//! record parser.

use crate::error::WhoisError;

/// Check that a subject can be put on the wire, returning it trimmed.
///
/// This is not syntax validation: the server decides what it accepts. It
/// only rejects subjects that can't form a single query line.
///
/// # Errors
///
/// `InvalidSubject` when the subject is empty after trimming, or contains
/// a line break.
pub fn validate_subject(subject: &str) -> Result<&str, WhoisError> {
    let trimmed = subject.trim();

    if trimmed.is_empty() {
        return Err(WhoisError::invalid_subject(
            trimmed,
            "query subject cannot be empty",
        ));
    }

    if trimmed.contains(['\r', '\n']) {
        return Err(WhoisError::invalid_subject(
            trimmed,
            "query subject must be a single line",
        ));
    }

    Ok(trimmed)
}

/// Split a domain into its first label and the remaining suffix.
///
/// ("example.co.uk" -> ("example", "co.uk")). The suffix is `None` when the
/// domain has no dot.
pub fn split_domain(domain: &str) -> (String, Option<String>) {
    let domain = domain.trim().trim_end_matches('.');
    match domain.split_once('.') {
        Some((name, rest)) if !rest.is_empty() => (name.to_string(), Some(rest.to_string())),
        _ => (domain.to_string(), None),
    }
}

/// Trim, drop blanks and remove repeats while keeping first-seen order.
pub fn dedup_subjects(subjects: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    subjects
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_subject() {
        assert_eq!(validate_subject("example.com").unwrap(), "example.com");
        assert_eq!(validate_subject("  AS15169 \n").unwrap(), "AS15169");
        assert!(validate_subject("").is_err());
        assert!(validate_subject("   ").is_err());
        assert!(validate_subject("example.com\r\nsecond line").is_err());
    }

    #[test]
    fn test_validate_subject_passes_unusual_input_through() {
        // Malformed subjects are the server's problem
        assert_eq!(validate_subject("not a domain!").unwrap(), "not a domain!");
        assert_eq!(validate_subject("-T dn example.de").unwrap(), "-T dn example.de");
    }

    #[test]
    fn test_split_domain() {
        assert_eq!(
            split_domain("example.com"),
            ("example".to_string(), Some("com".to_string()))
        );
        assert_eq!(
            split_domain("example.co.uk."),
            ("example".to_string(), Some("co.uk".to_string()))
        );
        assert_eq!(split_domain("localhost"), ("localhost".to_string(), None));
    }

    #[test]
    fn test_dedup_subjects() {
        let input = vec![
            "example.com".to_string(),
            " ".to_string(),
            "EXAMPLE.COM".to_string(),
            "8.8.8.8".to_string(),
        ];
        assert_eq!(dedup_subjects(&input), vec!["example.com", "8.8.8.8"]);
    }
}
