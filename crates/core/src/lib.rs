//! ShiftTrack domain core.
//!
//! Pure types and rules shared by the server and clients: store memberships
//! and their onboarding transitions, week banding, shift time ranges,
//! availability, and the week view-model. Nothing here touches storage.

pub mod availability;
pub mod clock;
pub mod join_code;
pub mod membership;
pub mod roster;
pub mod week;

pub use availability::{Availability, AvailabilityError, AvailabilityStatus};
pub use clock::{ClockError, TimeRange};
pub use membership::{
    ApprovalStatus, Decision, EmployeeMembership, JoinAction, ManagerMembership, OnboardingError,
    StoreAccess, StoreRole,
};
pub use roster::{RosterMember, WeekView};
pub use week::WeekStart;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
