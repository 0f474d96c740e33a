use axum::{
    Json,
    extract::{Path, State},
};

use shifttrack_api::{
    ApprovalStatus, DecisionResponse, ListManagerRequestsResponse, ListMembersResponse,
    OkResponse, TransferPrimaryRequest, db,
};
use shifttrack_core::membership::{self, Decision};

use crate::error::ApiErr;
use crate::routes::auth::AuthUser;
use crate::storage::{
    Db, employee_from_row, load_access, manager_from_row, require_store, sq_all, sq_run,
};

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// GET /api/stores/:id/members: managers and employees of a store.
///
/// Managers also see pending and rejected manager requests; everyone else
/// sees approved rows only.
pub async fn list_members(
    State(db): State<Db>,
    user: AuthUser,
    Path(store_id): Path<String>,
) -> Result<Json<ListMembersResponse>, ApiErr> {
    let conn = db.conn();
    require_store(&conn, &store_id)?;
    let access = load_access(&conn, &store_id, &user.user_id)?;
    access.require_member()?;

    let manager_filter = if access.is_approved_manager() {
        None
    } else {
        Some(ApprovalStatus::Approved.as_str())
    };

    let managers = sq_all(
        &conn,
        db::memberships::manager_list(&store_id, manager_filter),
        "list managers",
        manager_from_row,
    )?;
    let employees = sq_all(
        &conn,
        db::memberships::employee_list(&store_id, Some(ApprovalStatus::Approved.as_str())),
        "list employees",
        employee_from_row,
    )?;

    Ok(Json(ListMembersResponse {
        managers,
        employees,
    }))
}

/// GET /api/stores/:id/manager-requests: pending manager requests.
pub async fn list_manager_requests(
    State(db): State<Db>,
    user: AuthUser,
    Path(store_id): Path<String>,
) -> Result<Json<ListManagerRequestsResponse>, ApiErr> {
    let conn = db.conn();
    require_store(&conn, &store_id)?;
    load_access(&conn, &store_id, &user.user_id)?.require_manager()?;

    let requests = sq_all(
        &conn,
        db::memberships::manager_list(&store_id, Some(ApprovalStatus::Pending.as_str())),
        "list manager requests",
        manager_from_row,
    )?;

    Ok(Json(ListManagerRequestsResponse { requests }))
}

// ---------------------------------------------------------------------------
// Approve / reject
// ---------------------------------------------------------------------------

fn decide(
    db: &Db,
    user: &AuthUser,
    store_id: &str,
    requester_id: &str,
    decision: Decision,
) -> Result<DecisionResponse, ApiErr> {
    let conn = db.conn();
    require_store(&conn, store_id)?;
    let decider = load_access(&conn, store_id, &user.user_id)?;
    let requester = load_access(&conn, store_id, requester_id)?;

    let status = membership::decide_request(
        &decider,
        &user.user_id,
        requester_id,
        requester.manager.map(|m| m.status),
        decision,
    )?;

    let changed = sq_run(
        &conn,
        db::memberships::manager_decide(store_id, requester_id, status.as_str(), &user.user_id),
        "decide manager request",
    )?;
    if changed == 0 {
        // Decided concurrently by someone else.
        return Err(ApiErr::conflict("request is no longer pending"));
    }

    tracing::info!(
        store_id = %store_id,
        user_id = %requester_id,
        decided_by = %user.user_id,
        status = %status,
        "manager request decided"
    );

    Ok(DecisionResponse {
        store_id: store_id.to_string(),
        user_id: requester_id.to_string(),
        status,
    })
}

/// POST /api/stores/:id/manager-requests/:user_id/approve
pub async fn approve_manager_request(
    State(db): State<Db>,
    user: AuthUser,
    Path((store_id, requester_id)): Path<(String, String)>,
) -> Result<Json<DecisionResponse>, ApiErr> {
    decide(&db, &user, &store_id, &requester_id, Decision::Approve).map(Json)
}

/// POST /api/stores/:id/manager-requests/:user_id/reject
pub async fn reject_manager_request(
    State(db): State<Db>,
    user: AuthUser,
    Path((store_id, requester_id)): Path<(String, String)>,
) -> Result<Json<DecisionResponse>, ApiErr> {
    decide(&db, &user, &store_id, &requester_id, Decision::Reject).map(Json)
}

// ---------------------------------------------------------------------------
// Primary transfer
// ---------------------------------------------------------------------------

/// POST /api/stores/:id/primary: hand the primary flag to another approved manager.
pub async fn transfer_primary(
    State(db): State<Db>,
    user: AuthUser,
    Path(store_id): Path<String>,
    Json(req): Json<TransferPrimaryRequest>,
) -> Result<Json<OkResponse>, ApiErr> {
    let conn = db.conn();
    require_store(&conn, &store_id)?;
    let actor = load_access(&conn, &store_id, &user.user_id)?;
    let target = load_access(&conn, &store_id, &req.user_id)?;
    membership::check_transfer(&actor, &user.user_id, &target, &req.user_id)?;

    // The partial unique index allows one primary row at a time, so clear first.
    let tx = conn
        .unchecked_transaction()
        .map_err(ApiErr::from_db("begin primary transfer"))?;
    sq_run(
        &tx,
        db::memberships::manager_set_primary(&store_id, &user.user_id, false),
        "clear primary",
    )?;
    sq_run(
        &tx,
        db::memberships::manager_set_primary(&store_id, &req.user_id, true),
        "set primary",
    )?;
    tx.commit().map_err(ApiErr::from_db("commit primary transfer"))?;

    tracing::info!(store_id = %store_id, from = %user.user_id, to = %req.user_id, "primary transferred");
    Ok(Json(OkResponse { ok: true }))
}

// ---------------------------------------------------------------------------
// Removal
// ---------------------------------------------------------------------------

/// DELETE /api/stores/:id/managers/:user_id: remove a manager, withdraw a
/// request, or leave.
pub async fn remove_manager(
    State(db): State<Db>,
    user: AuthUser,
    Path((store_id, target_id)): Path<(String, String)>,
) -> Result<Json<OkResponse>, ApiErr> {
    let conn = db.conn();
    require_store(&conn, &store_id)?;
    let actor = load_access(&conn, &store_id, &user.user_id)?;
    let target = load_access(&conn, &store_id, &target_id)?;
    membership::check_manager_removal(&actor, &user.user_id, &target, &target_id)?;

    sq_run(
        &conn,
        db::memberships::manager_delete(&store_id, &target_id),
        "remove manager",
    )?;
    tracing::info!(store_id = %store_id, user_id = %target_id, by = %user.user_id, "manager removed");

    Ok(Json(OkResponse { ok: true }))
}

/// DELETE /api/stores/:id/employees/:user_id: remove an employee, or leave.
pub async fn remove_employee(
    State(db): State<Db>,
    user: AuthUser,
    Path((store_id, target_id)): Path<(String, String)>,
) -> Result<Json<OkResponse>, ApiErr> {
    let conn = db.conn();
    require_store(&conn, &store_id)?;
    let actor = load_access(&conn, &store_id, &user.user_id)?;
    let target = load_access(&conn, &store_id, &target_id)?;
    membership::check_employee_removal(&actor, &user.user_id, &target, &target_id)?;

    sq_run(
        &conn,
        db::memberships::employee_delete(&store_id, &target_id),
        "remove employee",
    )?;
    tracing::info!(store_id = %store_id, user_id = %target_id, by = %user.user_id, "employee removed");

    Ok(Json(OkResponse { ok: true }))
}
