//! Prescription status rules and budget arithmetic.

use serde::Serialize;

use crate::approval::{DECISION_APPROVED, DECISION_REJECTED};
use crate::types::{Cents, DbId};

pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";

pub const VALID_PRESCRIPTION_STATUSES: &[&str] =
    &[STATUS_DRAFT, STATUS_PENDING, STATUS_APPROVED, STATUS_REJECTED];

/// Upper bound on a single line quantity.
pub const MAX_QUANTITY: i32 = 100_000;

pub fn validate_status(status: &str) -> Result<(), String> {
    if VALID_PRESCRIPTION_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "Invalid prescription status '{status}'. Must be one of: {}",
            VALID_PRESCRIPTION_STATUSES.join(", ")
        ))
    }
}

pub fn validate_quantity(quantity: i32) -> Result<(), String> {
    if quantity <= 0 {
        return Err("Quantity must be greater than zero".to_string());
    }
    if quantity > MAX_QUANTITY {
        return Err(format!("Quantity must not exceed {MAX_QUANTITY}"));
    }
    Ok(())
}

pub fn validate_unit_price(unit_price_cents: Cents) -> Result<(), String> {
    if unit_price_cents < 0 {
        return Err("Unit price must not be negative".to_string());
    }
    Ok(())
}

/// Line total in cents, saturating instead of overflowing.
pub fn line_total_cents(quantity: i32, unit_price_cents: Cents) -> Cents {
    unit_price_cents.saturating_mul(i64::from(quantity))
}

/// Whether a prescription in `status` may be (re)submitted for approval.
pub fn can_submit(status: &str) -> bool {
    status == STATUS_DRAFT || status == STATUS_REJECTED
}

/// Whether editing the content of a prescription in `status` invalidates
/// the decisions recorded against it, sending it back to draft.
pub fn edit_resets_review(status: &str) -> bool {
    status != STATUS_DRAFT
}

/// Derive the status of a pending prescription from the recorded decisions.
///
/// `decisions` pairs each deciding user with their decision; only decisions
/// from users listed in `approver_ids` count. A single rejection rejects the
/// item, unanimous approval approves it, anything else stays pending.
pub fn aggregate_status(decisions: &[(DbId, &str)], approver_ids: &[DbId]) -> &'static str {
    let relevant = decisions
        .iter()
        .filter(|(user_id, _)| approver_ids.contains(user_id));

    let mut approved = 0usize;
    for (_, decision) in relevant {
        if *decision == DECISION_REJECTED {
            return STATUS_REJECTED;
        }
        if *decision == DECISION_APPROVED {
            approved += 1;
        }
    }

    if !approver_ids.is_empty() && approved >= approver_ids.len() {
        STATUS_APPROVED
    } else {
        STATUS_PENDING
    }
}

/// Budget roll-up over a set of prescription lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BudgetSummary {
    pub item_count: i64,
    pub total_cents: Cents,
    pub approved_cents: Cents,
    pub draft_count: i64,
    pub pending_count: i64,
    pub approved_count: i64,
    pub rejected_count: i64,
}

impl BudgetSummary {
    /// Add one line (`status`, `quantity`, `unit_price_cents`) to the summary.
    pub fn add(&mut self, status: &str, quantity: i32, unit_price_cents: Cents) {
        let line = line_total_cents(quantity, unit_price_cents);
        self.item_count += 1;
        self.total_cents = self.total_cents.saturating_add(line);
        match status {
            STATUS_APPROVED => {
                self.approved_count += 1;
                self.approved_cents = self.approved_cents.saturating_add(line);
            }
            STATUS_PENDING => self.pending_count += 1,
            STATUS_REJECTED => self.rejected_count += 1,
            _ => self.draft_count += 1,
        }
    }

    pub fn from_lines<'a>(lines: impl IntoIterator<Item = (&'a str, i32, Cents)>) -> Self {
        let mut summary = Self::default();
        for (status, quantity, price) in lines {
            summary.add(status, quantity, price);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_must_be_positive() {
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_QUANTITY + 1).is_err());
    }

    #[test]
    fn negative_price_is_rejected() {
        assert!(validate_unit_price(-1).is_err());
        assert!(validate_unit_price(0).is_ok());
    }

    #[test]
    fn line_total_saturates() {
        assert_eq!(line_total_cents(3, 1250), 3750);
        assert_eq!(line_total_cents(2, i64::MAX), i64::MAX);
    }

    #[test]
    fn any_rejection_rejects() {
        let decisions = [(1, DECISION_APPROVED), (2, DECISION_REJECTED)];
        assert_eq!(aggregate_status(&decisions, &[1, 2]), STATUS_REJECTED);
    }

    #[test]
    fn unanimous_approval_approves() {
        let decisions = [(1, DECISION_APPROVED), (2, DECISION_APPROVED)];
        assert_eq!(aggregate_status(&decisions, &[1, 2]), STATUS_APPROVED);
    }

    #[test]
    fn partial_approval_stays_pending() {
        let decisions = [(1, DECISION_APPROVED)];
        assert_eq!(aggregate_status(&decisions, &[1, 2]), STATUS_PENDING);
    }

    #[test]
    fn decisions_from_removed_clients_are_ignored() {
        let decisions = [(9, DECISION_REJECTED), (1, DECISION_APPROVED)];
        assert_eq!(aggregate_status(&decisions, &[1]), STATUS_APPROVED);
    }

    #[test]
    fn no_approvers_stays_pending() {
        assert_eq!(aggregate_status(&[], &[]), STATUS_PENDING);
    }

    #[test]
    fn submit_allowed_from_draft_and_rejected_only() {
        assert!(can_submit(STATUS_DRAFT));
        assert!(can_submit(STATUS_REJECTED));
        assert!(!can_submit(STATUS_PENDING));
        assert!(!can_submit(STATUS_APPROVED));
    }

    #[test]
    fn editing_reviewed_content_resets_review() {
        assert!(!edit_resets_review(STATUS_DRAFT));
        assert!(edit_resets_review(STATUS_PENDING));
        assert!(edit_resets_review(STATUS_APPROVED));
    }

    #[test]
    fn budget_summary_rolls_up_lines() {
        let summary = BudgetSummary::from_lines([
            (STATUS_APPROVED, 2, 10_000),
            (STATUS_PENDING, 1, 5_000),
            (STATUS_DRAFT, 4, 250),
            (STATUS_REJECTED, 1, 99),
        ]);
        assert_eq!(summary.item_count, 4);
        assert_eq!(summary.total_cents, 20_000 + 5_000 + 1_000 + 99);
        assert_eq!(summary.approved_cents, 20_000);
        assert_eq!(summary.approved_count, 1);
        assert_eq!(summary.pending_count, 1);
        assert_eq!(summary.draft_count, 1);
        assert_eq!(summary.rejected_count, 1);
    }
}
