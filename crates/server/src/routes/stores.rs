use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rusqlite::Connection;
use uuid::Uuid;

use shifttrack_api::{
    ApprovalStatus, CreateStoreRequest, JoinCodeResponse, JoinStoreRequest, JoinStoreResponse,
    ListStoresResponse, StoreDetailResponse, StoreMembershipSummary, StoreResponse,
    UpdateStoreRequest, db, service,
};
use shifttrack_core::membership::{self, JoinAction};
use shifttrack_core::{StoreAccess, join_code};

use crate::AppConfig;
use crate::error::ApiErr;
use crate::routes::auth::AuthUser;
use crate::storage::{
    Db, load_access, require_store, sq_first, sq_all, sq_run, status_col, store_from_row,
};

const ADDRESS_MAX_LEN: usize = 200;
const JOIN_CODE_ATTEMPTS: usize = 8;

/// Pick a join code no store uses yet.
fn unique_join_code(conn: &Connection, len: usize) -> Result<String, ApiErr> {
    for _ in 0..JOIN_CODE_ATTEMPTS {
        let code = join_code::generate(len)?;
        let taken: bool = sq_first(
            conn,
            db::stores::join_code_exists(&code),
            "probe join code",
            |row| row.get(0),
        )?
        .unwrap_or(false);
        if !taken {
            return Ok(code);
        }
    }
    tracing::error!("no free join code after {JOIN_CODE_ATTEMPTS} attempts (length {len})");
    Err(ApiErr::internal("could not allocate a join code"))
}

/// Only managers get to see the join code.
fn visible_to(mut store: StoreResponse, access: &StoreAccess) -> StoreResponse {
    if !access.is_approved_manager() {
        store.join_code = None;
    }
    store
}

// ---------------------------------------------------------------------------
// Create store
// ---------------------------------------------------------------------------

/// POST /api/stores: create a store. The creator becomes its primary manager.
pub async fn create_store(
    State(db): State<Db>,
    State(config): State<AppConfig>,
    user: AuthUser,
    Json(req): Json<CreateStoreRequest>,
) -> Result<(StatusCode, Json<StoreResponse>), ApiErr> {
    let name = service::validate_store_name(&req.name)?;
    let address = service::normalize_optional_text(req.address.as_deref(), "address", ADDRESS_MAX_LEN)?;

    let store_id = Uuid::new_v4().to_string();
    let conn = db.conn();
    let code = unique_join_code(&conn, config.join_code_length)?;

    let tx = conn
        .unchecked_transaction()
        .map_err(ApiErr::from_db("begin create store"))?;
    sq_run(
        &tx,
        db::stores::insert(&store_id, &name, address.as_deref(), &code, &user.user_id),
        "insert store",
    )?;
    sq_run(
        &tx,
        db::memberships::manager_insert(
            &store_id,
            &user.user_id,
            ApprovalStatus::Approved.as_str(),
            true,
        ),
        "insert primary manager",
    )?;
    tx.commit().map_err(ApiErr::from_db("commit create store"))?;
    tracing::info!(store_id = %store_id, user_id = %user.user_id, "store created");

    let store = require_store(&conn, &store_id)?;
    Ok((StatusCode::CREATED, Json(store)))
}

// ---------------------------------------------------------------------------
// List my stores
// ---------------------------------------------------------------------------

/// GET /api/stores: every store the caller holds a membership row in.
pub async fn list_my_stores(
    State(db): State<Db>,
    user: AuthUser,
) -> Result<Json<ListStoresResponse>, ApiErr> {
    let conn = db.conn();
    let stores = sq_all(
        &conn,
        db::stores::list_for_user(&user.user_id),
        "list stores",
        |row| {
            let store = store_from_row(row)?;
            let manager_status = row
                .get::<_, Option<String>>(6)?
                .map(|_| status_col(row, 6))
                .transpose()?;
            let is_primary: Option<bool> = row.get(7)?;
            let employee_status = row
                .get::<_, Option<String>>(8)?
                .map(|_| status_col(row, 8))
                .transpose()?;
            Ok((store, manager_status, is_primary.unwrap_or(false), employee_status))
        },
    )?;

    let stores = stores
        .into_iter()
        .map(|(store, manager_status, is_primary, employee_status)| {
            let access = StoreAccess {
                manager: manager_status.map(|status| membership::ManagerMembership {
                    status,
                    is_primary,
                }),
                employee: employee_status.map(|status| membership::EmployeeMembership { status }),
            };
            StoreMembershipSummary {
                store: visible_to(store, &access),
                role: access.effective_role(),
                manager_status,
                employee_status,
                is_primary: access.is_primary(),
            }
        })
        .collect();

    Ok(Json(ListStoresResponse { stores }))
}

// ---------------------------------------------------------------------------
// Store detail
// ---------------------------------------------------------------------------

/// GET /api/stores/:id: store detail for approved members.
pub async fn get_store(
    State(db): State<Db>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<StoreDetailResponse>, ApiErr> {
    let conn = db.conn();
    let store = require_store(&conn, &id)?;
    let access = load_access(&conn, &id, &user.user_id)?;
    access.require_member()?;

    let (manager_count, employee_count, pending): (i64, i64, i64) = sq_first(
        &conn,
        db::stores::member_counts(&id),
        "count members",
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?
    .unwrap_or((0, 0, 0));

    let your_role = access
        .effective_role()
        .ok_or_else(|| ApiErr::forbidden("not a member of this store"))?;
    let is_manager = access.is_approved_manager();

    Ok(Json(StoreDetailResponse {
        store: visible_to(store, &access),
        your_role,
        is_primary: access.is_primary(),
        manager_count,
        employee_count,
        pending_request_count: is_manager.then_some(pending),
    }))
}

// ---------------------------------------------------------------------------
// Update store (managers)
// ---------------------------------------------------------------------------

/// PUT /api/stores/:id: rename or change the address. An empty address clears it.
pub async fn update_store(
    State(db): State<Db>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateStoreRequest>,
) -> Result<Json<StoreResponse>, ApiErr> {
    let conn = db.conn();
    require_store(&conn, &id)?;
    load_access(&conn, &id, &user.user_id)?.require_manager()?;

    if let Some(ref name) = req.name {
        let name = service::validate_store_name(name)?;
        sq_run(&conn, db::stores::update_name(&id, &name), "update store name")?;
    }

    if let Some(ref address) = req.address {
        let address = service::normalize_optional_text(Some(address), "address", ADDRESS_MAX_LEN)?;
        sq_run(
            &conn,
            db::stores::update_address(&id, address.as_deref()),
            "update store address",
        )?;
    }

    require_store(&conn, &id).map(Json)
}

/// POST /api/stores/:id/join-code: issue a new join code. The old one stops working.
pub async fn regenerate_join_code(
    State(db): State<Db>,
    State(config): State<AppConfig>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<JoinCodeResponse>, ApiErr> {
    let conn = db.conn();
    require_store(&conn, &id)?;
    load_access(&conn, &id, &user.user_id)?.require_manager()?;

    let code = unique_join_code(&conn, config.join_code_length)?;
    sq_run(&conn, db::stores::update_join_code(&id, &code), "update join code")?;
    tracing::info!(store_id = %id, "join code regenerated");

    Ok(Json(JoinCodeResponse { join_code: code }))
}

// ---------------------------------------------------------------------------
// Join with code
// ---------------------------------------------------------------------------

/// POST /api/stores/join: join as employee (immediate) or request to manage (pending).
pub async fn join_store(
    State(db): State<Db>,
    user: AuthUser,
    Json(req): Json<JoinStoreRequest>,
) -> Result<Json<JoinStoreResponse>, ApiErr> {
    let code = join_code::parse(&req.join_code)?;

    let conn = db.conn();
    let store = sq_first(
        &conn,
        db::stores::get_by_join_code(&code),
        "lookup join code",
        store_from_row,
    )?
    .ok_or_else(|| ApiErr::not_found("no store uses that join code"))?;

    let access = load_access(&conn, &store.id, &user.user_id)?;
    let action = membership::plan_join(&access, req.role)?;

    let built = match action {
        JoinAction::InsertEmployee => db::memberships::employee_insert(
            &store.id,
            &user.user_id,
            action.resulting_status().as_str(),
        ),
        JoinAction::InsertManagerRequest => db::memberships::manager_insert(
            &store.id,
            &user.user_id,
            action.resulting_status().as_str(),
            false,
        ),
        JoinAction::ReopenManagerRequest => {
            db::memberships::manager_reopen(&store.id, &user.user_id)
        }
    };
    sq_run(&conn, built, "apply join")?;
    tracing::info!(
        store_id = %store.id,
        user_id = %user.user_id,
        role = %action.role(),
        "joined store"
    );

    Ok(Json(JoinStoreResponse {
        store_id: store.id,
        store_name: store.name,
        role: action.role(),
        status: action.resulting_status(),
    }))
}
