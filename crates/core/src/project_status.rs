//! Project lifecycle status values.

pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_ARCHIVED: &str = "archived";

pub const VALID_PROJECT_STATUSES: &[&str] =
    &[STATUS_DRAFT, STATUS_ACTIVE, STATUS_COMPLETED, STATUS_ARCHIVED];

/// Validate that a status string is one of the accepted project statuses.
pub fn validate_project_status(status: &str) -> Result<(), String> {
    if VALID_PROJECT_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "Invalid project status '{status}'. Must be one of: {}",
            VALID_PROJECT_STATUSES.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_every_known_status() {
        for status in VALID_PROJECT_STATUSES {
            assert!(validate_project_status(status).is_ok());
        }
    }

    #[test]
    fn rejects_unknown_status() {
        let err = validate_project_status("paused").unwrap_err();
        assert!(err.contains("Invalid project status"));
    }
}
