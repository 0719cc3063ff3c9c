//! Notification kinds.
//!
//! Each kind doubles as the platform event type that triggered it, so the
//! activity log and the notification bell use the same vocabulary.

pub const PROJECT_CREATED: &str = "project.created";
pub const PROJECT_SHARED: &str = "project.shared";
pub const SPACE_CREATED: &str = "space.created";
pub const PRESCRIPTION_CREATED: &str = "prescription.created";
pub const PRESCRIPTION_SUBMITTED: &str = "prescription.submitted";
pub const PRESCRIPTION_APPROVED: &str = "prescription.approved";
pub const PRESCRIPTION_REJECTED: &str = "prescription.rejected";
pub const PRESCRIPTION_COMMENTED: &str = "prescription.commented";
pub const PHOTO_UPLOADED: &str = "photo.uploaded";
pub const FILE_UPLOADED: &str = "file.uploaded";

/// Kinds that only feed the activity log and never reach a user's inbox.
pub const ACTIVITY_ONLY: &[&str] = &[PROJECT_CREATED, SPACE_CREATED, PRESCRIPTION_CREATED];

pub fn is_activity_only(kind: &str) -> bool {
    ACTIVITY_ONLY.contains(&kind)
}

/// Kind emitted when a client records `decision` on a prescription.
pub fn for_decision(decision: &str) -> &'static str {
    if decision == crate::approval::DECISION_REJECTED {
        PRESCRIPTION_REJECTED
    } else {
        PRESCRIPTION_APPROVED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_maps_to_kind() {
        assert_eq!(for_decision("approved"), PRESCRIPTION_APPROVED);
        assert_eq!(for_decision("rejected"), PRESCRIPTION_REJECTED);
    }

    #[test]
    fn creation_events_stay_out_of_inbox() {
        assert!(is_activity_only(PROJECT_CREATED));
        assert!(!is_activity_only(PROJECT_SHARED));
    }
}
