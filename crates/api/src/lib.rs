//! Shared API types, crypto, and SQL builders for ShiftTrack
//!
//! This crate is the **single source of truth** for all API request/response types.
//! TypeScript types are generated via `ts-rs` and consumed by the web frontend.
//!
//! To regenerate TypeScript types:
//!   cargo test -p shifttrack-api --features ts -- export_typescript --nocapture

use serde::{Deserialize, Serialize};

#[cfg(feature = "backend")]
pub mod crypto;
#[cfg(feature = "backend")]
pub mod db;
#[cfg(feature = "backend")]
pub mod service;

// Re-export the core domain types that travel over the wire
pub use shifttrack_core::roster::{
    AvailabilityMark, DayCell, DayTotal, RosterRow, ShiftSlot, UnassignedShift,
};
pub use shifttrack_core::{
    ApprovalStatus, AvailabilityStatus, Decision, StoreRole, WeekStart, WeekView,
};

use shifttrack_core::{
    AvailabilityError, ClockError, OnboardingError, join_code::JoinCodeError,
};

// ─── Auth ────────────────────────────────────────────────────────────────────

/// Email + password registration.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct AuthRegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

/// Email + password login.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned on successful login / register / refresh.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct AuthTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub user_id: String,
    pub display_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Logout request (invalidate refresh token).
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct LogoutRequest {
    pub refresh_token: String,
}

/// Returned by `GET /api/auth/me`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct UserProfileResponse {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub created_at: String,
}

/// Request body for `PUT /api/auth/me`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct UpdateProfileRequest {
    pub display_name: String,
}

/// Generic success response for operations that don't return data.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct OkResponse {
    pub ok: bool,
}

// ─── Stores ─────────────────────────────────────────────────────────────────

/// Request body for `POST /api/stores`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct CreateStoreRequest {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
}

/// Request body for `PUT /api/stores/:id`: partial update.
#[derive(Debug, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct UpdateStoreRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Single store record. `join_code` is only filled in for managers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct StoreResponse {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub join_code: Option<String>,
    pub created_by: String,
    pub created_at: String,
}

/// One entry of `GET /api/stores`: a store plus the caller's standing in it.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct StoreMembershipSummary {
    #[serde(flatten)]
    #[cfg_attr(feature = "ts", ts(flatten))]
    pub store: StoreResponse,
    /// Role the caller acts in; `None` while only a request is on file.
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub role: Option<StoreRole>,
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub manager_status: Option<ApprovalStatus>,
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub employee_status: Option<ApprovalStatus>,
    pub is_primary: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ListStoresResponse {
    pub stores: Vec<StoreMembershipSummary>,
}

/// Returned by `GET /api/stores/:id`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct StoreDetailResponse {
    #[serde(flatten)]
    #[cfg_attr(feature = "ts", ts(flatten))]
    pub store: StoreResponse,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub your_role: StoreRole,
    pub is_primary: bool,
    pub manager_count: i64,
    pub employee_count: i64,
    /// Pending manager requests; managers only.
    pub pending_request_count: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct JoinCodeResponse {
    pub join_code: String,
}

/// Request body for `POST /api/stores/join`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct JoinStoreRequest {
    pub join_code: String,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub role: StoreRole,
}

/// Employees come back `approved`, managers `pending`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct JoinStoreResponse {
    pub store_id: String,
    pub store_name: String,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub role: StoreRole,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub status: ApprovalStatus,
}

// ─── Members ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ManagerResponse {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub status: ApprovalStatus,
    pub is_primary: bool,
    pub requested_at: String,
    pub decided_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct EmployeeResponse {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub status: ApprovalStatus,
    pub joined_at: String,
}

/// Returned by `GET /api/stores/:id/members`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ListMembersResponse {
    pub managers: Vec<ManagerResponse>,
    pub employees: Vec<EmployeeResponse>,
}

/// Returned by `GET /api/stores/:id/manager-requests`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ListManagerRequestsResponse {
    pub requests: Vec<ManagerResponse>,
}

/// Outcome of approving or rejecting a manager request.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct DecisionResponse {
    pub store_id: String,
    pub user_id: String,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub status: ApprovalStatus,
}

/// Request body for `POST /api/stores/:id/primary`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct TransferPrimaryRequest {
    pub user_id: String,
}

// ─── Schedules & Shifts ─────────────────────────────────────────────────────

/// Request body for `POST /api/stores/:id/schedules`.
///
/// Any date inside the wanted week is accepted; it is moved back to the
/// configured first day of the week.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct CreateScheduleRequest {
    pub week_start: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ScheduleResponse {
    pub id: String,
    pub store_id: String,
    pub week_start: String,
    pub week_end: String,
    pub published: bool,
    pub created_by: String,
    pub created_at: String,
    pub shift_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ListSchedulesResponse {
    pub schedules: Vec<ScheduleResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct PublishScheduleRequest {
    pub published: bool,
}

/// Request body for `POST /api/schedules/:id/shifts`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct CreateShiftRequest {
    pub user_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request body for `PUT /api/shifts/:id`. Omitted fields keep their value.
#[derive(Debug, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct UpdateShiftRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ShiftResponse {
    pub id: String,
    pub schedule_id: String,
    pub store_id: String,
    pub user_id: String,
    pub display_name: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Returned by `GET /api/stores/:id/weeks/:date`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct WeekViewResponse {
    pub store_id: String,
    /// The schedule backing this week, if one exists and is visible.
    pub schedule: Option<ScheduleResponse>,
    #[cfg_attr(feature = "ts", ts(type = "any"))]
    pub view: WeekView,
}

/// One of the caller's own shifts, as listed by `GET /api/me/shifts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct MyShift {
    pub id: String,
    pub store_id: String,
    pub store_name: String,
    pub schedule_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct MyShiftsResponse {
    pub shifts: Vec<MyShift>,
}

/// Query parameters for date-bounded listings. Both bounds are inclusive.
#[derive(Debug, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct DateRangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

// ─── Availability ───────────────────────────────────────────────────────────

/// Request body for `PUT /api/availability`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct UpsertAvailabilityRequest {
    pub date: String,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub status: AvailabilityStatus,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct AvailabilityResponse {
    pub date: String,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub status: AvailabilityStatus,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ListAvailabilityResponse {
    pub availability: Vec<AvailabilityResponse>,
}

// ─── Health ─────────────────────────────────────────────────────────────────

/// Returned by `GET /api/health`: server liveness check.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// ─── Service Error ───────────────────────────────────────────────────────────

/// Framework-agnostic service error.
///
/// Each variant maps to an HTTP status code; the server converts it into
/// its response type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ServiceError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl ServiceError {
    /// HTTP status code as a `u16`.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(m)
            | Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::Conflict(m)
            | Self::Internal(m) => m,
        }
    }

    /// Build a closure that wraps a DB/IO error into `Internal`.
    pub fn from_db<E: std::fmt::Display>(context: &str) -> impl FnOnce(E) -> Self + '_ {
        move |e| Self::Internal(format!("{context}: {e}"))
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ServiceError {}

// ─── From impls: core errors → ServiceError ─────────────────────────────────

impl From<OnboardingError> for ServiceError {
    fn from(e: OnboardingError) -> Self {
        let msg = e.to_string();
        match e {
            OnboardingError::AlreadyEmployee
            | OnboardingError::AlreadyManager
            | OnboardingError::RequestPending
            | OnboardingError::NotPending { .. }
            | OnboardingError::PrimaryCannotLeave => Self::Conflict(msg),
            OnboardingError::NotAMember
            | OnboardingError::NotAManager
            | OnboardingError::NotPrimary
            | OnboardingError::CannotDecideOwnRequest => Self::Forbidden(msg),
            OnboardingError::TransferToSelf | OnboardingError::TargetNotApprovedManager => {
                Self::BadRequest(msg)
            }
            OnboardingError::NoRequest
            | OnboardingError::NoManagerRow
            | OnboardingError::NotAnEmployee => Self::NotFound(msg),
        }
    }
}

impl From<ClockError> for ServiceError {
    fn from(e: ClockError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<AvailabilityError> for ServiceError {
    fn from(e: AvailabilityError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<JoinCodeError> for ServiceError {
    fn from(e: JoinCodeError) -> Self {
        match e {
            JoinCodeError::Malformed(_) => Self::BadRequest(e.to_string()),
            JoinCodeError::InvalidLength(_) => Self::Internal(e.to_string()),
        }
    }
}

// ─── Error (JSON shape) ─────────────────────────────────────────────────────

/// JSON error shape `{ "error": "..." }` returned by all error responses.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ApiError {
    pub error: String,
}

impl From<&ServiceError> for ApiError {
    fn from(e: &ServiceError) -> Self {
        Self {
            error: e.message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn onboarding_errors_map_to_statuses() {
        let cases = [
            (OnboardingError::RequestPending, 409),
            (OnboardingError::PrimaryCannotLeave, 409),
            (OnboardingError::NotAManager, 403),
            (OnboardingError::NotPrimary, 403),
            (OnboardingError::TransferToSelf, 400),
            (OnboardingError::NoManagerRow, 404),
            (OnboardingError::NotAnEmployee, 404),
        ];
        for (err, status) in cases {
            assert_eq!(ServiceError::from(err.clone()).status_code(), status, "{err}");
        }
    }

    #[test]
    fn clock_errors_are_bad_requests() {
        let err: ServiceError = ClockError::InvalidTime("25:00".into()).into();
        assert_eq!(err.status_code(), 400);
        assert!(err.message().contains("25:00"));
    }

    #[test]
    fn join_store_request_parses_role() {
        let req: JoinStoreRequest =
            serde_json::from_str(r#"{"join_code":"abc234","role":"manager"}"#).unwrap();
        assert_eq!(req.role, StoreRole::Manager);
    }

    #[test]
    fn membership_summary_flattens_store() {
        let summary = StoreMembershipSummary {
            store: StoreResponse {
                id: "s1".into(),
                name: "Downtown".into(),
                address: None,
                join_code: None,
                created_by: "u1".into(),
                created_at: "2026-10-18 09:00:00".into(),
            },
            role: Some(StoreRole::Employee),
            manager_status: Some(ApprovalStatus::Pending),
            employee_status: Some(ApprovalStatus::Approved),
            is_primary: false,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["name"], "Downtown");
        assert_eq!(json["role"], "employee");
        assert_eq!(json["manager_status"], "pending");
    }

    #[test]
    fn api_error_shape() {
        let body = ApiError::from(&ServiceError::NotFound("store not found".into()));
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"error":"store not found"}"#
        );
    }
}

// ─── TypeScript generation ───────────────────────────────────────────────────

#[cfg(all(test, feature = "ts"))]
mod ts_export {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use ts_rs::TS;

    /// Run with: cargo test -p shifttrack-api --features ts -- export_typescript --nocapture
    #[test]
    fn export_typescript() {
        let out_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../web/src/lib/api-types.generated.ts");

        let cfg = ts_rs::Config::new().with_large_int("number");
        let mut parts: Vec<String> = Vec::new();
        parts.push("// AUTO-GENERATED by shifttrack-api. DO NOT EDIT".to_string());
        parts.push(
            "// Regenerate with: cargo test -p shifttrack-api --features ts -- export_typescript"
                .to_string(),
        );
        parts.push(String::new());

        // Structs: `type X = {...}` → `export interface X {...}`
        macro_rules! collect_ts {
            ($($t:ty),+ $(,)?) => {
                $(
                    let decl = <$t>::decl(&cfg);
                    let decl = if decl.contains(" = {") {
                        decl
                            .replacen("type ", "export interface ", 1)
                            .replace(" = {", " {")
                            .trim_end_matches(';')
                            .to_string()
                    } else {
                        decl
                            .replacen("type ", "export type ", 1)
                            .trim_end_matches(';')
                            .to_string()
                    };
                    parts.push(decl);
                    parts.push(String::new());
                )+
            };
        }

        collect_ts!(
            // Auth
            AuthRegisterRequest,
            LoginRequest,
            AuthTokenResponse,
            RefreshRequest,
            LogoutRequest,
            UserProfileResponse,
            UpdateProfileRequest,
            OkResponse,
            // Stores
            CreateStoreRequest,
            UpdateStoreRequest,
            StoreResponse,
            StoreMembershipSummary,
            ListStoresResponse,
            StoreDetailResponse,
            JoinCodeResponse,
            JoinStoreRequest,
            JoinStoreResponse,
            // Members
            ManagerResponse,
            EmployeeResponse,
            ListMembersResponse,
            ListManagerRequestsResponse,
            DecisionResponse,
            TransferPrimaryRequest,
            // Schedules
            CreateScheduleRequest,
            ScheduleResponse,
            ListSchedulesResponse,
            PublishScheduleRequest,
            CreateShiftRequest,
            UpdateShiftRequest,
            ShiftResponse,
            WeekViewResponse,
            MyShift,
            MyShiftsResponse,
            DateRangeQuery,
            // Availability
            UpsertAvailabilityRequest,
            AvailabilityResponse,
            ListAvailabilityResponse,
            // Health
            HealthResponse,
            ApiError,
        );

        let content = parts.join("\n");

        if let Some(parent) = out_dir.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let mut file = std::fs::File::create(&out_dir)
            .unwrap_or_else(|e| panic!("Failed to create {}: {}", out_dir.display(), e));
        file.write_all(content.as_bytes())
            .unwrap_or_else(|e| panic!("Failed to write {}: {}", out_dir.display(), e));

        println!("Generated TypeScript types at: {}", out_dir.display());
    }
}
