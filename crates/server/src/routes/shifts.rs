use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use rusqlite::Connection;
use uuid::Uuid;

use shifttrack_api::db::shifts::ShiftFields;
use shifttrack_api::{
    CreateShiftRequest, DateRangeQuery, MyShiftsResponse, OkResponse, ScheduleResponse,
    ShiftResponse, UpdateShiftRequest, db, service,
};
use shifttrack_core::{TimeRange, roster, week};

use crate::error::ApiErr;
use crate::routes::auth::AuthUser;
use crate::routes::schedules::visible_schedule;
use crate::storage::{Db, my_shift_from_row, require_shift, roster_rows, sq_all, sq_run};

/// A shift after validation, ready to be written.
struct ValidShift {
    user_id: String,
    date: NaiveDate,
    range: TimeRange,
    notes: Option<String>,
}

impl ValidShift {
    fn check_in_week(&self, schedule: &ScheduleResponse) -> Result<(), ApiErr> {
        let week_start = service::parse_date_param(&schedule.week_start, "week_start")?;
        if !week::week_contains(week_start, self.date) {
            return Err(ApiErr::bad_request(format!(
                "date must fall between {} and {}",
                schedule.week_start, schedule.week_end
            )));
        }
        Ok(())
    }

    fn write(&self, conn: &Connection, shift_id: Option<&str>, schedule_id: &str) -> Result<String, ApiErr> {
        let date = self.date.to_string();
        let start = self.range.start_str();
        let end = self.range.end_str();
        let fields = ShiftFields {
            user_id: &self.user_id,
            date: &date,
            start_time: &start,
            end_time: &end,
            notes: self.notes.as_deref(),
        };
        match shift_id {
            Some(id) => {
                sq_run(conn, db::shifts::update(id, &fields), "update shift")?;
                Ok(id.to_string())
            }
            None => {
                let id = Uuid::new_v4().to_string();
                sq_run(conn, db::shifts::insert(&id, schedule_id, &fields), "insert shift")?;
                Ok(id)
            }
        }
    }
}

fn require_on_roster(conn: &Connection, store_id: &str, user_id: &str) -> Result<(), ApiErr> {
    let (managers, employees) = roster_rows(conn, store_id)?;
    let members = roster::RosterMember::from_memberships(&managers, &employees);
    if !roster::can_be_scheduled(&members, user_id) {
        return Err(ApiErr::bad_request(
            "assignee is not an approved member of this store",
        ));
    }
    Ok(())
}

fn normalize_notes(notes: Option<&str>) -> Result<Option<String>, ApiErr> {
    Ok(service::normalize_optional_text(
        notes,
        "notes",
        service::NOTES_MAX_LEN,
    )?)
}

// ---------------------------------------------------------------------------
// Create / update / delete (managers)
// ---------------------------------------------------------------------------

/// POST /api/schedules/:id/shifts: add a shift to a week.
pub async fn create_shift(
    State(db): State<Db>,
    user: AuthUser,
    Path(schedule_id): Path<String>,
    Json(req): Json<CreateShiftRequest>,
) -> Result<(StatusCode, Json<ShiftResponse>), ApiErr> {
    let shift = ValidShift {
        date: service::parse_date_param(&req.date, "date")?,
        range: TimeRange::parse(&req.start_time, &req.end_time)?,
        notes: normalize_notes(req.notes.as_deref())?,
        user_id: req.user_id,
    };

    let conn = db.conn();
    let (schedule, access) = visible_schedule(&conn, &schedule_id, &user.user_id)?;
    access.require_manager()?;
    shift.check_in_week(&schedule)?;
    require_on_roster(&conn, &schedule.store_id, &shift.user_id)?;

    let id = shift.write(&conn, None, &schedule_id)?;
    tracing::info!(schedule_id = %schedule_id, shift_id = %id, user_id = %shift.user_id, "shift created");

    let created = require_shift(&conn, &id)?;
    Ok((StatusCode::CREATED, Json(created.shift)))
}

/// PUT /api/shifts/:id: change any subset of a shift's fields.
///
/// An empty `notes` string clears the notes. Reassigning requires the new
/// assignee to be on the roster; a shift left behind by someone who has
/// since left the store can still be edited in place.
pub async fn update_shift(
    State(db): State<Db>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateShiftRequest>,
) -> Result<Json<ShiftResponse>, ApiErr> {
    let conn = db.conn();
    let current = require_shift(&conn, &id)?.shift;
    let (schedule, access) = visible_schedule(&conn, &current.schedule_id, &user.user_id)?;
    access.require_manager()?;

    let date = req.date.as_deref().unwrap_or(current.date.as_str());
    let start = req.start_time.as_deref().unwrap_or(current.start_time.as_str());
    let end = req.end_time.as_deref().unwrap_or(current.end_time.as_str());
    let notes = match req.notes.as_deref() {
        Some(n) => normalize_notes(Some(n))?,
        None => current.notes.clone(),
    };
    let shift = ValidShift {
        user_id: req.user_id.clone().unwrap_or_else(|| current.user_id.clone()),
        date: service::parse_date_param(date, "date")?,
        range: TimeRange::parse(start, end)?,
        notes,
    };

    shift.check_in_week(&schedule)?;
    if shift.user_id != current.user_id {
        require_on_roster(&conn, &schedule.store_id, &shift.user_id)?;
    }

    shift.write(&conn, Some(&id), &schedule.id)?;
    tracing::info!(shift_id = %id, "shift updated");

    require_shift(&conn, &id).map(|row| Json(row.shift))
}

/// DELETE /api/shifts/:id
pub async fn delete_shift(
    State(db): State<Db>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ApiErr> {
    let conn = db.conn();
    let current = require_shift(&conn, &id)?.shift;
    let (_, access) = visible_schedule(&conn, &current.schedule_id, &user.user_id)?;
    access.require_manager()?;

    sq_run(&conn, db::shifts::delete(&id), "delete shift")?;
    tracing::info!(shift_id = %id, schedule_id = %current.schedule_id, "shift deleted");

    Ok(Json(OkResponse { ok: true }))
}

// ---------------------------------------------------------------------------
// My shifts
// ---------------------------------------------------------------------------

/// GET /api/me/shifts?from=&to=: the caller's published shifts across all stores.
pub async fn my_shifts(
    State(db): State<Db>,
    user: AuthUser,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<MyShiftsResponse>, ApiErr> {
    let today = chrono::Utc::now().date_naive();
    let (from, to) = service::resolve_date_range(range.from.as_deref(), range.to.as_deref(), today)?;

    let conn = db.conn();
    let shifts = sq_all(
        &conn,
        db::shifts::list_published_for_user(&user.user_id, &from.to_string(), &to.to_string()),
        "list my shifts",
        my_shift_from_row,
    )?;

    Ok(Json(MyShiftsResponse { shifts }))
}
