//! Store memberships and the onboarding/approval state machine.
//!
//! A user holds at most one manager row and one employee row per store.
//! Employees join a store immediately with its join code. Managers join by
//! request: the request starts `pending` and an approved manager of the store
//! approves or rejects it. Exactly one approved manager is the store's
//! primary; that flag moves only by explicit transfer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreRole {
    Manager,
    Employee,
}

impl StoreRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Employee => "employee",
        }
    }
}

impl std::fmt::Display for StoreRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerMembership {
    pub status: ApprovalStatus,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmployeeMembership {
    pub status: ApprovalStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OnboardingError {
    #[error("already an employee of this store")]
    AlreadyEmployee,
    #[error("already a manager of this store")]
    AlreadyManager,
    #[error("a manager request is already pending")]
    RequestPending,
    #[error("request is {status}, not pending")]
    NotPending { status: ApprovalStatus },
    #[error("not a member of this store")]
    NotAMember,
    #[error("store manager access required")]
    NotAManager,
    #[error("only the primary manager can do this")]
    NotPrimary,
    #[error("the primary manager must transfer primary status before leaving")]
    PrimaryCannotLeave,
    #[error("cannot transfer primary status to yourself")]
    TransferToSelf,
    #[error("target user is not an approved manager of this store")]
    TargetNotApprovedManager,
    #[error("cannot decide your own manager request")]
    CannotDecideOwnRequest,
    #[error("no manager request found")]
    NoRequest,
    #[error("user is not a manager of this store")]
    NoManagerRow,
    #[error("user is not an employee of this store")]
    NotAnEmployee,
}

/// Everything one user holds in one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreAccess {
    pub manager: Option<ManagerMembership>,
    pub employee: Option<EmployeeMembership>,
}

impl StoreAccess {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_approved_manager(&self) -> bool {
        matches!(
            self.manager,
            Some(ManagerMembership {
                status: ApprovalStatus::Approved,
                ..
            })
        )
    }

    pub fn is_primary(&self) -> bool {
        matches!(
            self.manager,
            Some(ManagerMembership {
                status: ApprovalStatus::Approved,
                is_primary: true,
            })
        )
    }

    pub fn is_approved_employee(&self) -> bool {
        matches!(
            self.employee,
            Some(EmployeeMembership {
                status: ApprovalStatus::Approved
            })
        )
    }

    /// Approved in at least one role.
    pub fn is_member(&self) -> bool {
        self.is_approved_manager() || self.is_approved_employee()
    }

    /// Holds any row at all, including pending or rejected requests.
    pub fn has_any_row(&self) -> bool {
        self.manager.is_some() || self.employee.is_some()
    }

    /// The role this user acts in. Manager wins when both are approved.
    pub fn effective_role(&self) -> Option<StoreRole> {
        if self.is_approved_manager() {
            Some(StoreRole::Manager)
        } else if self.is_approved_employee() {
            Some(StoreRole::Employee)
        } else {
            None
        }
    }

    pub fn require_member(&self) -> Result<(), OnboardingError> {
        if self.is_member() {
            Ok(())
        } else {
            Err(OnboardingError::NotAMember)
        }
    }

    pub fn require_manager(&self) -> Result<(), OnboardingError> {
        if self.is_approved_manager() {
            Ok(())
        } else {
            Err(OnboardingError::NotAManager)
        }
    }

    pub fn require_primary(&self) -> Result<(), OnboardingError> {
        if self.is_primary() {
            Ok(())
        } else {
            Err(OnboardingError::NotPrimary)
        }
    }
}

/// What a join-by-code request turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinAction {
    /// Insert an approved employee row.
    InsertEmployee,
    /// Insert a pending manager row.
    InsertManagerRequest,
    /// A rejected manager asks again: flip the row back to pending.
    ReopenManagerRequest,
}

impl JoinAction {
    pub fn role(&self) -> StoreRole {
        match self {
            Self::InsertEmployee => StoreRole::Employee,
            Self::InsertManagerRequest | Self::ReopenManagerRequest => StoreRole::Manager,
        }
    }

    /// Status of the row after the action is applied.
    pub fn resulting_status(&self) -> ApprovalStatus {
        match self {
            Self::InsertEmployee => ApprovalStatus::Approved,
            Self::InsertManagerRequest | Self::ReopenManagerRequest => ApprovalStatus::Pending,
        }
    }
}

pub fn plan_join(access: &StoreAccess, role: StoreRole) -> Result<JoinAction, OnboardingError> {
    match role {
        StoreRole::Employee => match access.employee {
            None => Ok(JoinAction::InsertEmployee),
            Some(_) => Err(OnboardingError::AlreadyEmployee),
        },
        StoreRole::Manager => match access.manager.map(|m| m.status) {
            None => Ok(JoinAction::InsertManagerRequest),
            Some(ApprovalStatus::Pending) => Err(OnboardingError::RequestPending),
            Some(ApprovalStatus::Approved) => Err(OnboardingError::AlreadyManager),
            Some(ApprovalStatus::Rejected) => Ok(JoinAction::ReopenManagerRequest),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

/// Decide a manager request. `decider` must be an approved manager and may
/// not decide their own request.
pub fn decide_request(
    decider: &StoreAccess,
    decider_id: &str,
    requester_id: &str,
    current: Option<ApprovalStatus>,
    decision: Decision,
) -> Result<ApprovalStatus, OnboardingError> {
    decider.require_manager()?;
    if decider_id == requester_id {
        return Err(OnboardingError::CannotDecideOwnRequest);
    }
    match current {
        None => Err(OnboardingError::NoRequest),
        Some(ApprovalStatus::Pending) => Ok(match decision {
            Decision::Approve => ApprovalStatus::Approved,
            Decision::Reject => ApprovalStatus::Rejected,
        }),
        Some(status) => Err(OnboardingError::NotPending { status }),
    }
}

/// Validate a primary-manager transfer from `actor` to `target`.
pub fn check_transfer(
    actor: &StoreAccess,
    actor_id: &str,
    target: &StoreAccess,
    target_id: &str,
) -> Result<(), OnboardingError> {
    actor.require_primary()?;
    if actor_id == target_id {
        return Err(OnboardingError::TransferToSelf);
    }
    if !target.is_approved_manager() {
        return Err(OnboardingError::TargetNotApprovedManager);
    }
    Ok(())
}

/// Validate removing `target`'s manager row (or the actor leaving).
pub fn check_manager_removal(
    actor: &StoreAccess,
    actor_id: &str,
    target: &StoreAccess,
    target_id: &str,
) -> Result<(), OnboardingError> {
    let Some(target_row) = target.manager else {
        return Err(OnboardingError::NoManagerRow);
    };
    if target_row.is_primary {
        return Err(OnboardingError::PrimaryCannotLeave);
    }
    if actor_id == target_id {
        return Ok(());
    }
    actor.require_primary()
}

/// Validate removing `target_id`'s employee row. Managers remove anyone;
/// employees may only leave.
pub fn check_employee_removal(
    actor: &StoreAccess,
    actor_id: &str,
    target: &StoreAccess,
    target_id: &str,
) -> Result<(), OnboardingError> {
    if target.employee.is_none() {
        return Err(OnboardingError::NotAnEmployee);
    }
    if actor_id == target_id || actor.is_approved_manager() {
        Ok(())
    } else {
        Err(OnboardingError::NotAManager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(status: ApprovalStatus, is_primary: bool) -> StoreAccess {
        StoreAccess {
            manager: Some(ManagerMembership { status, is_primary }),
            employee: None,
        }
    }

    fn employee() -> StoreAccess {
        StoreAccess {
            manager: None,
            employee: Some(EmployeeMembership {
                status: ApprovalStatus::Approved,
            }),
        }
    }

    #[test]
    fn employee_join_is_immediate() {
        let action = plan_join(&StoreAccess::none(), StoreRole::Employee).unwrap();
        assert_eq!(action, JoinAction::InsertEmployee);
        assert_eq!(action.resulting_status(), ApprovalStatus::Approved);
        assert_eq!(
            plan_join(&employee(), StoreRole::Employee),
            Err(OnboardingError::AlreadyEmployee)
        );
    }

    #[test]
    fn manager_join_goes_through_request() {
        assert_eq!(
            plan_join(&StoreAccess::none(), StoreRole::Manager),
            Ok(JoinAction::InsertManagerRequest)
        );
        assert_eq!(
            plan_join(&manager(ApprovalStatus::Pending, false), StoreRole::Manager),
            Err(OnboardingError::RequestPending)
        );
        assert_eq!(
            plan_join(&manager(ApprovalStatus::Approved, false), StoreRole::Manager),
            Err(OnboardingError::AlreadyManager)
        );
        assert_eq!(
            plan_join(&manager(ApprovalStatus::Rejected, false), StoreRole::Manager),
            Ok(JoinAction::ReopenManagerRequest)
        );
    }

    #[test]
    fn employee_may_also_request_manager() {
        assert_eq!(
            plan_join(&employee(), StoreRole::Manager),
            Ok(JoinAction::InsertManagerRequest)
        );
    }

    #[test]
    fn only_pending_requests_are_decided() {
        let boss = manager(ApprovalStatus::Approved, true);
        assert_eq!(
            decide_request(&boss, "boss", "u1", Some(ApprovalStatus::Pending), Decision::Approve),
            Ok(ApprovalStatus::Approved)
        );
        assert_eq!(
            decide_request(&boss, "boss", "u1", Some(ApprovalStatus::Pending), Decision::Reject),
            Ok(ApprovalStatus::Rejected)
        );
        assert_eq!(
            decide_request(&boss, "boss", "u1", Some(ApprovalStatus::Rejected), Decision::Approve),
            Err(OnboardingError::NotPending {
                status: ApprovalStatus::Rejected
            })
        );
        assert_eq!(
            decide_request(&boss, "boss", "u1", None, Decision::Approve),
            Err(OnboardingError::NoRequest)
        );
    }

    #[test]
    fn deciding_requires_approved_manager() {
        let pending = manager(ApprovalStatus::Pending, false);
        assert_eq!(
            decide_request(&pending, "p", "u1", Some(ApprovalStatus::Pending), Decision::Approve),
            Err(OnboardingError::NotAManager)
        );
        assert_eq!(
            decide_request(&employee(), "e", "u1", Some(ApprovalStatus::Pending), Decision::Approve),
            Err(OnboardingError::NotAManager)
        );
    }

    #[test]
    fn cannot_decide_own_request() {
        let boss = manager(ApprovalStatus::Approved, false);
        assert_eq!(
            decide_request(&boss, "same", "same", Some(ApprovalStatus::Pending), Decision::Approve),
            Err(OnboardingError::CannotDecideOwnRequest)
        );
    }

    #[test]
    fn transfer_constraints() {
        let primary = manager(ApprovalStatus::Approved, true);
        let approved = manager(ApprovalStatus::Approved, false);
        let pending = manager(ApprovalStatus::Pending, false);

        assert_eq!(check_transfer(&primary, "a", &approved, "b"), Ok(()));
        assert_eq!(
            check_transfer(&approved, "b", &primary, "a"),
            Err(OnboardingError::NotPrimary)
        );
        assert_eq!(
            check_transfer(&primary, "a", &primary, "a"),
            Err(OnboardingError::TransferToSelf)
        );
        assert_eq!(
            check_transfer(&primary, "a", &pending, "c"),
            Err(OnboardingError::TargetNotApprovedManager)
        );
        assert_eq!(
            check_transfer(&primary, "a", &employee(), "d"),
            Err(OnboardingError::TargetNotApprovedManager)
        );
    }

    #[test]
    fn primary_can_never_be_removed() {
        let primary = manager(ApprovalStatus::Approved, true);
        assert_eq!(
            check_manager_removal(&primary, "a", &primary, "a"),
            Err(OnboardingError::PrimaryCannotLeave)
        );
    }

    #[test]
    fn managers_leave_themselves_or_are_removed_by_primary() {
        let primary = manager(ApprovalStatus::Approved, true);
        let other = manager(ApprovalStatus::Approved, false);
        let pending = manager(ApprovalStatus::Pending, false);

        assert_eq!(check_manager_removal(&other, "b", &other, "b"), Ok(()));
        assert_eq!(check_manager_removal(&primary, "a", &other, "b"), Ok(()));
        assert_eq!(check_manager_removal(&pending, "c", &pending, "c"), Ok(()));
        assert_eq!(
            check_manager_removal(&other, "b", &pending, "c"),
            Err(OnboardingError::NotPrimary)
        );
        assert_eq!(
            check_manager_removal(&primary, "a", &employee(), "e"),
            Err(OnboardingError::NoManagerRow)
        );
    }

    #[test]
    fn employee_removal() {
        let boss = manager(ApprovalStatus::Approved, false);
        let worker = employee();
        assert_eq!(check_employee_removal(&boss, "m", &worker, "e"), Ok(()));
        assert_eq!(check_employee_removal(&worker, "e", &worker, "e"), Ok(()));
        assert_eq!(
            check_employee_removal(&worker, "x", &worker, "e"),
            Err(OnboardingError::NotAManager)
        );
        assert_eq!(
            check_employee_removal(&boss, "m", &StoreAccess::none(), "e"),
            Err(OnboardingError::NotAnEmployee)
        );
    }

    #[test]
    fn effective_role_prefers_manager() {
        let both = StoreAccess {
            manager: Some(ManagerMembership {
                status: ApprovalStatus::Approved,
                is_primary: false,
            }),
            employee: Some(EmployeeMembership {
                status: ApprovalStatus::Approved,
            }),
        };
        assert_eq!(both.effective_role(), Some(StoreRole::Manager));

        let pending_and_employee = StoreAccess {
            manager: Some(ManagerMembership {
                status: ApprovalStatus::Pending,
                is_primary: false,
            }),
            ..employee()
        };
        assert_eq!(
            pending_and_employee.effective_role(),
            Some(StoreRole::Employee)
        );
        assert!(pending_and_employee.require_manager().is_err());
        assert_eq!(manager(ApprovalStatus::Rejected, false).effective_role(), None);
        assert!(manager(ApprovalStatus::Rejected, false).has_any_row());
    }
}
