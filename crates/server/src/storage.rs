use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};

use shifttrack_api::db::{self as dbq, Built, migrations::MIGRATIONS};
use shifttrack_api::{
    AvailabilityResponse, EmployeeResponse, ManagerResponse, MyShift, ScheduleResponse,
    ShiftResponse, StoreResponse,
};
use shifttrack_core::roster::{EmployeeRow, ManagerRow, ShiftRecord};
use shifttrack_core::{
    ApprovalStatus, Availability, AvailabilityStatus, EmployeeMembership, ManagerMembership,
    StoreAccess, TimeRange, week,
};

use crate::error::ApiErr;

/// Shared database state
#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
}

impl Db {
    pub fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }
}

/// Initialize the database: open connection, enable WAL, run migrations
pub fn init_db(data_dir: &Path) -> Result<Db> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("creating data directory {}", data_dir.display()))?;
    let db_path = data_dir.join("shifttrack.db");
    let conn = Connection::open(&db_path).context("opening SQLite database")?;

    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;

    run_migrations(&conn)?;

    let purged = sq_execute(&conn, dbq::users::purge_expired_refresh_tokens())
        .context("purging expired refresh tokens")?;
    if purged > 0 {
        tracing::info!("purged {purged} expired refresh tokens");
    }

    Ok(Db {
        conn: Arc::new(Mutex::new(conn)),
    })
}

fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    for (name, sql) in MIGRATIONS {
        let already_applied: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?1",
            [name],
            |row| row.get(0),
        )?;

        if !already_applied {
            conn.execute_batch(sql)
                .with_context(|| format!("running migration {name}"))?;
            conn.execute("INSERT INTO _migrations (name) VALUES (?1)", [name])?;
            tracing::info!("Applied migration: {name}");
        }
    }

    Ok(())
}

// ── sea-query execution ───────────────────────────────────────────────────

/// Convert `sea_query::Values` into rusqlite bind params.
fn values_to_sql(values: &sea_query::Values) -> Vec<rusqlite::types::Value> {
    use rusqlite::types::Value as Sql;
    use sea_query::Value as Sq;

    values
        .0
        .iter()
        .map(|v| match v {
            Sq::String(Some(s)) => Sql::Text(s.to_string()),
            Sq::Bool(Some(b)) => Sql::Integer(i64::from(*b)),
            Sq::Int(Some(i)) => Sql::Integer(i64::from(*i)),
            Sq::BigInt(Some(i)) => Sql::Integer(*i),
            Sq::Unsigned(Some(u)) => Sql::Integer(i64::from(*u)),
            Sq::Double(Some(f)) => Sql::Real(*f),
            _ => Sql::Null,
        })
        .collect()
}

pub fn sq_execute(conn: &Connection, built: Built) -> rusqlite::Result<usize> {
    let (sql, values) = built;
    conn.execute(&sql, rusqlite::params_from_iter(values_to_sql(&values)))
}

pub fn sq_query_row<T, F>(conn: &Connection, built: Built, f: F) -> rusqlite::Result<Option<T>>
where
    F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
{
    let (sql, values) = built;
    conn.query_row(&sql, rusqlite::params_from_iter(values_to_sql(&values)), f)
        .optional()
}

pub fn sq_query_map<T, F>(conn: &Connection, built: Built, f: F) -> rusqlite::Result<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let (sql, values) = built;
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(values_to_sql(&values)), f)?;
    rows.collect()
}

/// Run a write and log + map failures to `500`.
pub fn sq_run(conn: &Connection, built: Built, context: &str) -> Result<usize, ApiErr> {
    sq_execute(conn, built).map_err(ApiErr::from_db(context))
}

pub fn sq_first<T, F>(conn: &Connection, built: Built, context: &str, f: F) -> Result<Option<T>, ApiErr>
where
    F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
{
    sq_query_row(conn, built, f).map_err(ApiErr::from_db(context))
}

pub fn sq_all<T, F>(conn: &Connection, built: Built, context: &str, f: F) -> Result<Vec<T>, ApiErr>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    sq_query_map(conn, built, f).map_err(ApiErr::from_db(context))
}

pub fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _) if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ── Column decoding ───────────────────────────────────────────────────────

fn conversion_error(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        msg.into(),
    )
}

pub fn status_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<ApprovalStatus> {
    let raw: String = row.get(idx)?;
    ApprovalStatus::parse(&raw).ok_or_else(|| conversion_error(idx, format!("unknown status '{raw}'")))
}

fn availability_status_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<AvailabilityStatus> {
    let raw: String = row.get(idx)?;
    AvailabilityStatus::parse(&raw)
        .ok_or_else(|| conversion_error(idx, format!("unknown availability '{raw}'")))
}

fn date_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<chrono::NaiveDate> {
    let raw: String = row.get(idx)?;
    week::parse_date(&raw).ok_or_else(|| conversion_error(idx, format!("bad date '{raw}'")))
}

fn range_col(row: &Row<'_>, start: usize, end: usize) -> rusqlite::Result<TimeRange> {
    let s: String = row.get(start)?;
    let e: String = row.get(end)?;
    TimeRange::parse(&s, &e).map_err(|err| conversion_error(start, err.to_string()))
}

// ── Row mappers ───────────────────────────────────────────────────────────

/// Map a row from the store column list. The join code is always filled
/// in; callers hide it from non-managers.
pub fn store_from_row(row: &Row<'_>) -> rusqlite::Result<StoreResponse> {
    Ok(StoreResponse {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        join_code: row.get(3)?,
        created_by: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub fn manager_from_row(row: &Row<'_>) -> rusqlite::Result<ManagerResponse> {
    Ok(ManagerResponse {
        user_id: row.get(0)?,
        display_name: row.get(1)?,
        email: row.get(2)?,
        status: status_col(row, 3)?,
        is_primary: row.get(4)?,
        requested_at: row.get(5)?,
        decided_at: row.get(6)?,
    })
}

pub fn employee_from_row(row: &Row<'_>) -> rusqlite::Result<EmployeeResponse> {
    Ok(EmployeeResponse {
        user_id: row.get(0)?,
        display_name: row.get(1)?,
        email: row.get(2)?,
        status: status_col(row, 3)?,
        joined_at: row.get(4)?,
    })
}

pub fn schedule_from_row(row: &Row<'_>) -> rusqlite::Result<ScheduleResponse> {
    let week_start = date_col(row, 2)?;
    Ok(ScheduleResponse {
        id: row.get(0)?,
        store_id: row.get(1)?,
        week_start: week_start.to_string(),
        week_end: week::week_end(week_start).to_string(),
        published: row.get(3)?,
        created_by: row.get(4)?,
        created_at: row.get(5)?,
        shift_count: row.get(6)?,
    })
}

/// A shift row plus whether its schedule is published.
pub struct ShiftRow {
    pub shift: ShiftResponse,
    pub published: bool,
}

pub fn shift_from_row(row: &Row<'_>) -> rusqlite::Result<ShiftRow> {
    Ok(ShiftRow {
        shift: ShiftResponse {
            id: row.get(0)?,
            schedule_id: row.get(1)?,
            store_id: row.get(2)?,
            user_id: row.get(3)?,
            display_name: row.get(4)?,
            date: row.get(5)?,
            start_time: row.get(6)?,
            end_time: row.get(7)?,
            notes: row.get(8)?,
            created_at: row.get(9)?,
        },
        published: row.get(10)?,
    })
}

/// Same columns as [`shift_from_row`], decoded for the week view.
pub fn shift_record_from_row(row: &Row<'_>) -> rusqlite::Result<ShiftRecord> {
    Ok(ShiftRecord {
        id: row.get(0)?,
        user_id: row.get(3)?,
        date: date_col(row, 5)?,
        range: range_col(row, 6, 7)?,
        notes: row.get(8)?,
    })
}

pub fn my_shift_from_row(row: &Row<'_>) -> rusqlite::Result<MyShift> {
    Ok(MyShift {
        id: row.get(0)?,
        store_id: row.get(1)?,
        store_name: row.get(2)?,
        schedule_id: row.get(3)?,
        date: row.get(4)?,
        start_time: row.get(5)?,
        end_time: row.get(6)?,
        notes: row.get(7)?,
    })
}

pub fn availability_from_row(row: &Row<'_>) -> rusqlite::Result<AvailabilityResponse> {
    Ok(AvailabilityResponse {
        date: row.get(1)?,
        status: availability_status_col(row, 2)?,
        start_time: row.get(3)?,
        end_time: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

pub fn availability_record_from_row(row: &Row<'_>) -> rusqlite::Result<Availability> {
    let user_id: String = row.get(0)?;
    let date = date_col(row, 1)?;
    let status = availability_status_col(row, 2)?;
    let start: Option<String> = row.get(3)?;
    let end: Option<String> = row.get(4)?;
    Availability::from_parts(user_id, date, status, start.as_deref(), end.as_deref())
        .map_err(|e| conversion_error(3, e.to_string()))
}

/// Manager rows (from `memberships::manager_list`) reduced to roster input.
pub fn manager_row_from_row(row: &Row<'_>) -> rusqlite::Result<ManagerRow> {
    Ok(ManagerRow {
        user_id: row.get(0)?,
        display_name: row.get(1)?,
        status: status_col(row, 3)?,
        is_primary: row.get(4)?,
    })
}

pub fn employee_row_from_row(row: &Row<'_>) -> rusqlite::Result<EmployeeRow> {
    Ok(EmployeeRow {
        user_id: row.get(0)?,
        display_name: row.get(1)?,
        status: status_col(row, 3)?,
    })
}

// ── Lookups shared by handlers ────────────────────────────────────────────

/// Everything `user_id` holds in `store_id`.
pub fn load_access(conn: &Connection, store_id: &str, user_id: &str) -> Result<StoreAccess, ApiErr> {
    let manager = sq_first(
        conn,
        dbq::memberships::manager_get(store_id, user_id),
        "load manager row",
        |row| {
            Ok(ManagerMembership {
                status: status_col(row, 0)?,
                is_primary: row.get(1)?,
            })
        },
    )?;
    let employee = sq_first(
        conn,
        dbq::memberships::employee_get(store_id, user_id),
        "load employee row",
        |row| {
            Ok(EmployeeMembership {
                status: status_col(row, 0)?,
            })
        },
    )?;
    Ok(StoreAccess { manager, employee })
}

pub fn require_store(conn: &Connection, store_id: &str) -> Result<StoreResponse, ApiErr> {
    sq_first(conn, dbq::stores::get_by_id(store_id), "get store", store_from_row)?
        .ok_or_else(|| ApiErr::not_found("store not found"))
}

pub fn require_schedule(conn: &Connection, schedule_id: &str) -> Result<ScheduleResponse, ApiErr> {
    sq_first(
        conn,
        dbq::schedules::get_by_id(schedule_id),
        "get schedule",
        schedule_from_row,
    )?
    .ok_or_else(|| ApiErr::not_found("schedule not found"))
}

pub fn require_shift(conn: &Connection, shift_id: &str) -> Result<ShiftRow, ApiErr> {
    sq_first(conn, dbq::shifts::get_by_id(shift_id), "get shift", shift_from_row)?
        .ok_or_else(|| ApiErr::not_found("shift not found"))
}

pub fn roster_rows(
    conn: &Connection,
    store_id: &str,
) -> Result<(Vec<ManagerRow>, Vec<EmployeeRow>), ApiErr> {
    let managers = sq_all(
        conn,
        dbq::memberships::manager_list(store_id, Some(ApprovalStatus::Approved.as_str())),
        "list roster managers",
        manager_row_from_row,
    )?;
    let employees = sq_all(
        conn,
        dbq::memberships::employee_list(store_id, Some(ApprovalStatus::Approved.as_str())),
        "list roster employees",
        employee_row_from_row,
    )?;
    Ok((managers, employees))
}
