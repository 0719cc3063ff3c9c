//! Small presence/format checks used by request handlers.

/// Reject missing or whitespace-only values for a required field.
pub fn require_non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("'{field}' is required"));
    }
    Ok(())
}

/// Optional fields may be absent but must not be blank when present.
pub fn reject_blank(field: &str, value: Option<&str>) -> Result<(), String> {
    match value {
        Some(v) => require_non_empty(field, v),
        None => Ok(()),
    }
}

/// Emails are compared case-insensitively and stored trimmed + lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
