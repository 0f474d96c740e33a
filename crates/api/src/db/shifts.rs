//! Shift query builders.

use sea_query::{Expr, Order, Query, SqliteQueryBuilder};

use super::tables::{Schedules, Shifts, Stores, Users};
use super::{Built, now_expr};

pub struct ShiftFields<'a> {
    pub user_id: &'a str,
    pub date: &'a str,
    pub start_time: &'a str,
    pub end_time: &'a str,
    pub notes: Option<&'a str>,
}

pub fn insert(id: &str, schedule_id: &str, f: &ShiftFields<'_>) -> Built {
    Query::insert()
        .into_table(Shifts::Table)
        .columns([
            Shifts::Id,
            Shifts::ScheduleId,
            Shifts::UserId,
            Shifts::ShiftDate,
            Shifts::StartTime,
            Shifts::EndTime,
            Shifts::Notes,
        ])
        .values_panic([
            id.into(),
            schedule_id.into(),
            f.user_id.into(),
            f.date.into(),
            f.start_time.into(),
            f.end_time.into(),
            f.notes.map(|s| s.to_string()).into(),
        ])
        .build(SqliteQueryBuilder)
}

/// Replace every editable column of a shift.
pub fn update(id: &str, f: &ShiftFields<'_>) -> Built {
    Query::update()
        .table(Shifts::Table)
        .value(Shifts::UserId, f.user_id)
        .value(Shifts::ShiftDate, f.date)
        .value(Shifts::StartTime, f.start_time)
        .value(Shifts::EndTime, f.end_time)
        .value(Shifts::Notes, f.notes.map(|s| s.to_string()))
        .value(Shifts::UpdatedAt, now_expr())
        .and_where(Expr::col(Shifts::Id).eq(id))
        .build(SqliteQueryBuilder)
}

pub fn delete(id: &str) -> Built {
    Query::delete()
        .from_table(Shifts::Table)
        .and_where(Expr::col(Shifts::Id).eq(id))
        .build(SqliteQueryBuilder)
}

/// id, schedule_id, store_id, user_id, display_name, shift_date,
/// start_time, end_time, notes, created_at, published.
fn shift_select() -> sea_query::SelectStatement {
    Query::select()
        .column((Shifts::Table, Shifts::Id))
        .column((Shifts::Table, Shifts::ScheduleId))
        .column((Schedules::Table, Schedules::StoreId))
        .column((Shifts::Table, Shifts::UserId))
        .column((Users::Table, Users::DisplayName))
        .column((Shifts::Table, Shifts::ShiftDate))
        .column((Shifts::Table, Shifts::StartTime))
        .column((Shifts::Table, Shifts::EndTime))
        .column((Shifts::Table, Shifts::Notes))
        .column((Shifts::Table, Shifts::CreatedAt))
        .column((Schedules::Table, Schedules::Published))
        .from(Shifts::Table)
        .inner_join(
            Schedules::Table,
            Expr::col((Schedules::Table, Schedules::Id)).equals((Shifts::Table, Shifts::ScheduleId)),
        )
        .inner_join(
            Users::Table,
            Expr::col((Users::Table, Users::Id)).equals((Shifts::Table, Shifts::UserId)),
        )
        .to_owned()
}

pub fn get_by_id(id: &str) -> Built {
    shift_select()
        .and_where(Expr::col((Shifts::Table, Shifts::Id)).eq(id))
        .build(SqliteQueryBuilder)
}

/// All shifts of a schedule in day/time order.
pub fn list_for_schedule(schedule_id: &str) -> Built {
    shift_select()
        .and_where(Expr::col((Shifts::Table, Shifts::ScheduleId)).eq(schedule_id))
        .order_by((Shifts::Table, Shifts::ShiftDate), Order::Asc)
        .order_by((Shifts::Table, Shifts::StartTime), Order::Asc)
        .build(SqliteQueryBuilder)
}

/// A user's shifts in published schedules between two dates (inclusive):
/// id, store_id, store name, schedule_id, shift_date, start_time, end_time, notes.
pub fn list_published_for_user(user_id: &str, from: &str, to: &str) -> Built {
    Query::select()
        .column((Shifts::Table, Shifts::Id))
        .column((Stores::Table, Stores::Id))
        .column((Stores::Table, Stores::Name))
        .column((Shifts::Table, Shifts::ScheduleId))
        .column((Shifts::Table, Shifts::ShiftDate))
        .column((Shifts::Table, Shifts::StartTime))
        .column((Shifts::Table, Shifts::EndTime))
        .column((Shifts::Table, Shifts::Notes))
        .from(Shifts::Table)
        .inner_join(
            Schedules::Table,
            Expr::col((Schedules::Table, Schedules::Id)).equals((Shifts::Table, Shifts::ScheduleId)),
        )
        .inner_join(
            Stores::Table,
            Expr::col((Stores::Table, Stores::Id)).equals((Schedules::Table, Schedules::StoreId)),
        )
        .and_where(Expr::col((Shifts::Table, Shifts::UserId)).eq(user_id))
        .and_where(Expr::col((Schedules::Table, Schedules::Published)).eq(true))
        .and_where(Expr::col((Shifts::Table, Shifts::ShiftDate)).between(from, to))
        .order_by((Shifts::Table, Shifts::ShiftDate), Order::Asc)
        .order_by((Shifts::Table, Shifts::StartTime), Order::Asc)
        .build(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> ShiftFields<'static> {
        ShiftFields {
            user_id: "u1",
            date: "2026-10-19",
            start_time: "09:00",
            end_time: "17:00",
            notes: None,
        }
    }

    #[test]
    fn update_stamps_updated_at() {
        let (sql, _) = update("sh1", &fields());
        assert!(sql.contains(r#""updated_at" = datetime('now')"#), "{sql}");
    }

    #[test]
    fn my_shifts_are_published_and_bounded() {
        let (sql, values) = list_published_for_user("u1", "2026-10-19", "2026-10-25");
        assert!(sql.contains("BETWEEN ? AND ?"), "{sql}");
        assert!(sql.contains(r#"INNER JOIN "stores""#), "{sql}");
        assert_eq!(values.0.len(), 4);
    }
}
