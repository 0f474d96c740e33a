use axum::{
    Json,
    extract::{Path, Query, State},
};

use shifttrack_api::{
    AvailabilityResponse, DateRangeQuery, ListAvailabilityResponse, OkResponse,
    UpsertAvailabilityRequest, db, service,
};
use shifttrack_core::Availability;

use crate::error::ApiErr;
use crate::routes::auth::AuthUser;
use crate::storage::{Db, availability_from_row, sq_all, sq_first, sq_run};

/// GET /api/availability?from=&to=: the caller's own records.
pub async fn list_availability(
    State(db): State<Db>,
    user: AuthUser,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<ListAvailabilityResponse>, ApiErr> {
    let today = chrono::Utc::now().date_naive();
    let (from, to) = service::resolve_date_range(range.from.as_deref(), range.to.as_deref(), today)?;

    let conn = db.conn();
    let availability = sq_all(
        &conn,
        db::availability::list_for_user(&user.user_id, &from.to_string(), &to.to_string()),
        "list availability",
        availability_from_row,
    )?;

    Ok(Json(ListAvailabilityResponse { availability }))
}

/// PUT /api/availability: set the caller's availability for one date.
/// A second write for the same date replaces the first.
pub async fn upsert_availability(
    State(db): State<Db>,
    user: AuthUser,
    Json(req): Json<UpsertAvailabilityRequest>,
) -> Result<Json<AvailabilityResponse>, ApiErr> {
    let date = service::parse_date_param(&req.date, "date")?;
    let record = Availability::from_parts(
        user.user_id.as_str(),
        date,
        req.status,
        req.start_time.as_deref(),
        req.end_time.as_deref(),
    )?;

    let date = record.date.to_string();
    let (start, end) = match &record.window {
        Some(w) => (Some(w.start_str()), Some(w.end_str())),
        None => (None, None),
    };

    let conn = db.conn();
    sq_run(
        &conn,
        db::availability::upsert(
            &record.user_id,
            &date,
            record.status.as_str(),
            start.as_deref(),
            end.as_deref(),
        ),
        "upsert availability",
    )?;

    sq_first(
        &conn,
        db::availability::get(&user.user_id, &date),
        "reload availability",
        availability_from_row,
    )?
    .map(Json)
    .ok_or_else(|| ApiErr::internal("availability row vanished after write"))
}

/// DELETE /api/availability/:date
pub async fn delete_availability(
    State(db): State<Db>,
    user: AuthUser,
    Path(date): Path<String>,
) -> Result<Json<OkResponse>, ApiErr> {
    let date = service::parse_date_param(&date, "date")?.to_string();

    let conn = db.conn();
    let removed = sq_run(
        &conn,
        db::availability::delete(&user.user_id, &date),
        "delete availability",
    )?;
    if removed == 0 {
        return Err(ApiErr::not_found("no availability recorded for that date"));
    }

    Ok(Json(OkResponse { ok: true }))
}
