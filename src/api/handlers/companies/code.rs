//! Company code derivation.
//!
//! The code is the tenant's immutable slug: uppercase alphanumeric runs
//! joined by single underscores, so `"Tech Corp"` becomes `TECH_CORP`. The
//! mailbox form strips underscores and lowercases, giving the domain part of
//! derived login addresses (`admin@techcorp.com`).

/// Derive the company code from a display name.
///
/// Returns `None` when the name contains no alphanumeric characters at all.
pub(crate) fn derive_code(name: &str) -> Option<String> {
    let mut code = String::with_capacity(name.len());
    let mut pending_separator = false;

    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !code.is_empty() {
                code.push('_');
            }
            pending_separator = false;
            code.push(ch.to_ascii_uppercase());
        } else {
            pending_separator = true;
        }
    }

    if code.is_empty() {
        None
    } else {
        Some(code)
    }
}

/// Mailbox form of a company code, used as the login email domain label.
pub(crate) fn mailbox_code(code: &str) -> String {
    code.chars()
        .filter(|ch| *ch != '_')
        .collect::<String>()
        .to_lowercase()
}

/// Department codes are 3-4 alphanumeric characters, stored uppercase.
pub(crate) fn normalize_department_code(code: &str) -> Option<String> {
    let trimmed = code.trim();
    let length = trimmed.chars().count();
    if !(3..=4).contains(&length) {
        return None;
    }
    if !trimmed.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        return None;
    }
    Some(trimmed.to_ascii_uppercase())
}
