use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rusqlite::Connection;
use uuid::Uuid;

use shifttrack_api::{
    CreateScheduleRequest, ListSchedulesResponse, OkResponse, PublishScheduleRequest,
    ScheduleResponse, WeekViewResponse, db, service,
};
use shifttrack_core::roster::{self, WeekViewInput};
use shifttrack_core::{Availability, StoreAccess, week};

use crate::AppConfig;
use crate::error::ApiErr;
use crate::routes::auth::AuthUser;
use crate::storage::{
    Db, availability_record_from_row, is_constraint_violation, load_access, require_schedule,
    require_store, roster_rows, schedule_from_row, shift_record_from_row, sq_all, sq_execute,
    sq_first, sq_run,
};

/// Load a schedule and the caller's access to its store.
///
/// Drafts are invisible to non-managers, so they get the same 404 as a
/// schedule that does not exist.
pub(crate) fn visible_schedule(
    conn: &Connection,
    schedule_id: &str,
    user_id: &str,
) -> Result<(ScheduleResponse, StoreAccess), ApiErr> {
    let schedule = require_schedule(conn, schedule_id)?;
    let access = load_access(conn, &schedule.store_id, user_id)?;
    access.require_member()?;
    if !schedule.published && !access.is_approved_manager() {
        return Err(ApiErr::not_found("schedule not found"));
    }
    Ok((schedule, access))
}

// ---------------------------------------------------------------------------
// Create / list
// ---------------------------------------------------------------------------

/// POST /api/stores/:id/schedules: open the schedule for a week.
///
/// Any date is accepted and snapped back to the configured first day of its week.
pub async fn create_schedule(
    State(db): State<Db>,
    State(config): State<AppConfig>,
    user: AuthUser,
    Path(store_id): Path<String>,
    Json(req): Json<CreateScheduleRequest>,
) -> Result<(StatusCode, Json<ScheduleResponse>), ApiErr> {
    let date = service::parse_date_param(&req.week_start, "week_start")?;
    let week_start = week::week_start_of(date, config.week_starts_on).to_string();

    let conn = db.conn();
    require_store(&conn, &store_id)?;
    load_access(&conn, &store_id, &user.user_id)?.require_manager()?;

    let schedule_id = Uuid::new_v4().to_string();
    match sq_execute(
        &conn,
        db::schedules::insert(&schedule_id, &store_id, &week_start, &user.user_id),
    ) {
        Ok(_) => {}
        Err(e) if is_constraint_violation(&e) => {
            return Err(ApiErr::conflict(format!(
                "a schedule for the week of {week_start} already exists"
            )));
        }
        Err(e) => return Err(ApiErr::from_db("insert schedule")(e)),
    }
    tracing::info!(store_id = %store_id, schedule_id = %schedule_id, week_start = %week_start, "schedule created");

    let schedule = require_schedule(&conn, &schedule_id)?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

/// GET /api/stores/:id/schedules: newest week first.
pub async fn list_schedules(
    State(db): State<Db>,
    user: AuthUser,
    Path(store_id): Path<String>,
) -> Result<Json<ListSchedulesResponse>, ApiErr> {
    let conn = db.conn();
    require_store(&conn, &store_id)?;
    let access = load_access(&conn, &store_id, &user.user_id)?;
    access.require_member()?;

    let schedules = sq_all(
        &conn,
        db::schedules::list_for_store(&store_id, !access.is_approved_manager()),
        "list schedules",
        schedule_from_row,
    )?;

    Ok(Json(ListSchedulesResponse { schedules }))
}

// ---------------------------------------------------------------------------
// Single schedule
// ---------------------------------------------------------------------------

/// GET /api/schedules/:id
pub async fn get_schedule(
    State(db): State<Db>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ScheduleResponse>, ApiErr> {
    let conn = db.conn();
    let (schedule, _) = visible_schedule(&conn, &id, &user.user_id)?;
    Ok(Json(schedule))
}

/// DELETE /api/schedules/:id: drops the schedule and all of its shifts.
pub async fn delete_schedule(
    State(db): State<Db>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ApiErr> {
    let conn = db.conn();
    let (schedule, access) = visible_schedule(&conn, &id, &user.user_id)?;
    access.require_manager()?;

    sq_run(&conn, db::schedules::delete(&id), "delete schedule")?;
    tracing::info!(
        store_id = %schedule.store_id,
        schedule_id = %id,
        shifts = schedule.shift_count,
        "schedule deleted"
    );

    Ok(Json(OkResponse { ok: true }))
}

/// POST /api/schedules/:id/publish: publish or unpublish.
pub async fn publish_schedule(
    State(db): State<Db>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<PublishScheduleRequest>,
) -> Result<Json<ScheduleResponse>, ApiErr> {
    let conn = db.conn();
    let (_, access) = visible_schedule(&conn, &id, &user.user_id)?;
    access.require_manager()?;

    sq_run(
        &conn,
        db::schedules::set_published(&id, req.published),
        "publish schedule",
    )?;
    tracing::info!(schedule_id = %id, published = req.published, "schedule visibility changed");

    require_schedule(&conn, &id).map(Json)
}

// ---------------------------------------------------------------------------
// Week view
// ---------------------------------------------------------------------------

/// GET /api/stores/:id/weeks/:date: roster × days grid for the week holding `date`.
///
/// Employees only see shifts once the schedule is published, and only their
/// own availability. Without a visible schedule the roster comes back with
/// no shifts.
pub async fn week_view(
    State(db): State<Db>,
    State(config): State<AppConfig>,
    user: AuthUser,
    Path((store_id, date)): Path<(String, String)>,
) -> Result<Json<WeekViewResponse>, ApiErr> {
    let date = service::parse_date_param(&date, "date")?;
    let week_start = week::week_start_of(date, config.week_starts_on);
    let week_start_str = week_start.to_string();
    let week_end_str = week::week_end(week_start).to_string();

    let conn = db.conn();
    require_store(&conn, &store_id)?;
    let access = load_access(&conn, &store_id, &user.user_id)?;
    access.require_member()?;
    let is_manager = access.is_approved_manager();

    let schedule = sq_first(
        &conn,
        db::schedules::get_by_store_week(&store_id, &week_start_str),
        "get week schedule",
        schedule_from_row,
    )?
    .filter(|s| s.published || is_manager);

    let shifts = match &schedule {
        Some(s) => sq_all(
            &conn,
            db::shifts::list_for_schedule(&s.id),
            "list week shifts",
            shift_record_from_row,
        )?,
        None => Vec::new(),
    };

    let (managers, employees) = roster_rows(&conn, &store_id)?;

    let availability: Vec<Availability> = if is_manager {
        let user_ids: Vec<String> = managers
            .iter()
            .map(|m| m.user_id.clone())
            .chain(employees.iter().map(|e| e.user_id.clone()))
            .collect();
        sq_all(
            &conn,
            db::availability::list_for_users(&user_ids, &week_start_str, &week_end_str),
            "list roster availability",
            availability_record_from_row,
        )?
    } else {
        sq_all(
            &conn,
            db::availability::list_for_user(&user.user_id, &week_start_str, &week_end_str),
            "list own availability",
            availability_record_from_row,
        )?
    };

    let view = roster::build_week_view(WeekViewInput {
        week_start,
        managers: &managers,
        employees: &employees,
        shifts: &shifts,
        availability: &availability,
    });

    Ok(Json(WeekViewResponse {
        store_id,
        schedule,
        view,
    }))
}
