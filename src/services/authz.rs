//! Ownership rules for expense records.
//!
//! Pure predicates over already-loaded values: no IO, no panics. Evaluated
//! synchronously on every write path; a violation surfaces to the boundary
//! layer as `AppError::Forbidden`.

use crate::models::{Expense, Principal, RoleType};

/// An expense may be modified by its owner or by an admin.
pub fn can_mutate(principal: &Principal, expense: &Expense) -> bool {
    principal.role == RoleType::Admin || expense.member_id == principal.id
}

/// Deletion follows the same rule as modification.
pub fn can_delete(principal: &Principal, expense: &Expense) -> bool {
    can_mutate(principal, expense)
}

/// Only admins may list every member's expenses.
pub fn can_list_all(principal: &Principal) -> bool {
    principal.role == RoleType::Admin
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::Category;

    fn principal(id: i64, role: RoleType) -> Principal {
        Principal {
            id,
            username: format!("member{id}"),
            role,
        }
    }

    fn expense(owner: i64) -> Expense {
        Expense {
            id: 42,
            title: "Taxi".to_string(),
            content: "Airport run".to_string(),
            amount: 35.0,
            category: Category::Transport,
            member_id: owner,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn owner_can_mutate_own_expense() {
        assert!(can_mutate(&principal(1, RoleType::User), &expense(1)));
    }

    #[test]
    fn non_owner_cannot_mutate() {
        assert!(!can_mutate(&principal(2, RoleType::User), &expense(1)));
        assert!(!can_delete(&principal(2, RoleType::User), &expense(1)));
    }

    #[test]
    fn admin_can_mutate_any_expense() {
        let admin = principal(99, RoleType::Admin);
        assert!(can_mutate(&admin, &expense(1)));
        assert!(can_mutate(&admin, &expense(2)));
        assert!(can_delete(&admin, &expense(1)));
    }

    #[test]
    fn only_admin_can_list_all() {
        assert!(can_list_all(&principal(99, RoleType::Admin)));
        assert!(!can_list_all(&principal(1, RoleType::User)));
    }
}
