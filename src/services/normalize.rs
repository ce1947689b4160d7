//! Field canonicalization for landlord records
//!
//! Phones are stored as `+234` followed by exactly ten digits. Birthday
//! and anniversary dates are stored year-less as zero-padded `MM-DD`.
//! Every write path (bulk import and single-record CRUD) goes through
//! these helpers so the store only ever sees canonical values.

use thiserror::Error;

use crate::types::OptInValue;

/// Canonicalize a phone number to `+234` form.
///
/// Whitespace and hyphens are dropped. A leading `+` is trusted as an
/// explicit country code; otherwise leading zeros are stripped and the
/// Nigerian prefix applied. Idempotent over its own output.
pub fn normalize_phone(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    if cleaned.starts_with('+') {
        return cleaned;
    }

    let digits = cleaned.trim_start_matches('0');
    match digits.strip_prefix("234") {
        Some(rest) => format!("+234{}", rest),
        None => format!("+234{}", digits),
    }
}

/// True iff the number is in canonical form: the `+234` prefix (the `+`
/// optional) followed by exactly ten ASCII digits.
pub fn is_valid_phone(phone: &str) -> bool {
    let rest = match phone.strip_prefix("+234").or_else(|| phone.strip_prefix("234")) {
        Some(rest) => rest,
        None => return false,
    };
    rest.len() == 10 && rest.chars().all(|c| c.is_ascii_digit())
}

fn split_month_day(raw: &str) -> Option<(u32, u32)> {
    let mut parts = raw.trim().splitn(2, '-');
    let first = parts.next()?.trim().parse::<u32>().ok()?;
    let second = parts.next()?.trim().parse::<u32>().ok()?;
    Some((first, second))
}

/// True iff the value reads as a month-day pair in either order:
/// `DD-MM` or `MM-DD`.
pub fn is_valid_month_day(raw: &str) -> bool {
    match split_month_day(raw) {
        Some((first, second)) => {
            ((1..=31).contains(&first) && (1..=12).contains(&second))
                || ((1..=12).contains(&first) && (1..=31).contains(&second))
        }
        None => false,
    }
}

/// Canonicalize a month-day value to zero-padded `MM-DD`.
///
/// The order is only swapped when the first number cannot be a month.
/// A value like `05-07` is ambiguous and passes through as month-first;
/// callers own that interpretation. Unparseable input is returned
/// unchanged.
pub fn format_month_day(raw: &str) -> String {
    match split_month_day(raw) {
        Some((first, second)) if first > 12 => format!("{:02}-{:02}", second, first),
        Some((first, second)) => format!("{:02}-{:02}", first, second),
        None => raw.to_string(),
    }
}

/// A celebrate_opt_in value outside the accepted spellings
#[derive(Debug, Error)]
#[error("unrecognized opt-in value: {value:?}")]
pub struct OptInParseError {
    pub value: String,
}

/// Interpret an opt-in flag from CSV text or JSON.
pub fn parse_opt_in(value: &OptInValue) -> Result<bool, OptInParseError> {
    match value {
        OptInValue::Bool(b) => Ok(*b),
        OptInValue::Text(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(OptInParseError { value: s.clone() }),
        },
    }
}

/// Structural email check: one `@`, non-empty local part, a dot inside
/// the domain, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let (local, domain) = match email.split_once('@') {
        Some(parts) => parts,
        None => return false,
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain.len() >= 3 && domain[1..domain.len() - 1].contains('.')
}
