//! Internal helpers for input validation.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every operation enforces the same rules.

use chrono::{NaiveDate, Utc};

use crate::{EngineError, ResultEngine};

/// Today's date in UTC.
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Reject dates after today.
pub(crate) fn ensure_not_future(date: NaiveDate, label: &str) -> ResultEngine<()> {
    if date > today() {
        return Err(EngineError::InvalidInput(format!(
            "{label} must not be in the future"
        )));
    }
    Ok(())
}

/// Trim and lowercase an email, rejecting obviously malformed ones.
pub(crate) fn normalize_email(value: &str) -> ResultEngine<String> {
    let email = value.trim().to_lowercase();
    let invalid = || EngineError::InvalidInput(format!("invalid email: {}", value.trim()));

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !host.starts_with('.') && tld.len() >= 2 => {
            Ok(email)
        }
        _ => Err(invalid()),
    }
}

/// Trim `value` and check its length in characters against `min..=max`.
pub(crate) fn bounded_text(value: &str, label: &str, min: usize, max: usize) -> ResultEngine<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len < min || len > max {
        return Err(EngineError::InvalidInput(format!(
            "{label} must be between {min} and {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Reject `from > to` when both bounds are set.
pub(crate) fn ensure_date_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (from, to)
        && from > to
    {
        return Err(EngineError::InvalidInput(
            "invalid range: from must be <= to".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_lowercased_and_trimmed() {
        assert_eq!(
            normalize_email("  Ana.Souza@Example.COM ").unwrap(),
            "ana.souza@example.com"
        );
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for email in ["", "ana", "@example.com", "ana@", "ana@example", "a b@x.com", "a@b@c.com"] {
            assert!(normalize_email(email).is_err(), "{email} should be rejected");
        }
    }

    #[test]
    fn bounded_text_counts_chars() {
        assert_eq!(bounded_text(" Zé ", "name", 2, 100).unwrap(), "Zé");
        assert!(bounded_text("Z", "name", 2, 100).is_err());
        assert!(bounded_text(&"x".repeat(101), "name", 2, 100).is_err());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let from = NaiveDate::from_ymd_opt(2024, 2, 1);
        let to = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert!(ensure_date_range(from, to).is_err());
        assert!(ensure_date_range(to, from).is_ok());
        assert!(ensure_date_range(None, to).is_ok());
    }
}
