//! Client approval decision constants and validation.
//!
//! A client assigned to a project with approval rights records exactly one
//! decision per prescription. The decision may be changed while the
//! prescription is still awaiting review.

/// The client accepts the prescribed item.
pub const DECISION_APPROVED: &str = "approved";

/// The client refuses the prescribed item.
pub const DECISION_REJECTED: &str = "rejected";

/// All valid decision values.
pub const VALID_DECISIONS: &[&str] = &[DECISION_APPROVED, DECISION_REJECTED];

/// Validate that a decision string is one of the accepted values.
pub fn validate_decision(decision: &str) -> Result<(), String> {
    if VALID_DECISIONS.contains(&decision) {
        Ok(())
    } else {
        Err(format!(
            "Invalid decision '{decision}'. Must be one of: {}",
            VALID_DECISIONS.join(", ")
        ))
    }
}

/// A rejection must tell the agency what to change.
pub fn validate_rejection_has_comment(
    decision: &str,
    comment: Option<&str>,
) -> Result<(), String> {
    let has_comment = comment.is_some_and(|c| !c.trim().is_empty());
    if decision == DECISION_REJECTED && !has_comment {
        return Err("A comment is required when rejecting a prescription".to_string());
    }
    Ok(())
}
