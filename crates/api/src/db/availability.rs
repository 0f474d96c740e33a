//! Availability query builders. One row per (user, date).

use sea_query::{Expr, OnConflict, Order, Query, SqliteQueryBuilder};

use super::tables::Availability;
use super::{Built, now_expr};

/// Insert or replace the record for `(user_id, date)`.
pub fn upsert(
    user_id: &str,
    date: &str,
    status: &str,
    start_time: Option<&str>,
    end_time: Option<&str>,
) -> Built {
    Query::insert()
        .into_table(Availability::Table)
        .columns([
            Availability::UserId,
            Availability::AvailDate,
            Availability::Status,
            Availability::StartTime,
            Availability::EndTime,
            Availability::UpdatedAt,
        ])
        .values_panic([
            user_id.into(),
            date.into(),
            status.into(),
            start_time.map(|s| s.to_string()).into(),
            end_time.map(|s| s.to_string()).into(),
            now_expr(),
        ])
        .on_conflict(
            OnConflict::columns([Availability::UserId, Availability::AvailDate])
                .update_columns([
                    Availability::Status,
                    Availability::StartTime,
                    Availability::EndTime,
                    Availability::UpdatedAt,
                ])
                .to_owned(),
        )
        .build(SqliteQueryBuilder)
}

/// user_id, avail_date, status, start_time, end_time, updated_at.
fn availability_select() -> sea_query::SelectStatement {
    Query::select()
        .columns([
            Availability::UserId,
            Availability::AvailDate,
            Availability::Status,
            Availability::StartTime,
            Availability::EndTime,
            Availability::UpdatedAt,
        ])
        .from(Availability::Table)
        .to_owned()
}

pub fn get(user_id: &str, date: &str) -> Built {
    availability_select()
        .and_where(Expr::col(Availability::UserId).eq(user_id))
        .and_where(Expr::col(Availability::AvailDate).eq(date))
        .build(SqliteQueryBuilder)
}

/// One user's records between two dates (inclusive).
pub fn list_for_user(user_id: &str, from: &str, to: &str) -> Built {
    availability_select()
        .and_where(Expr::col(Availability::UserId).eq(user_id))
        .and_where(Expr::col(Availability::AvailDate).between(from, to))
        .order_by(Availability::AvailDate, Order::Asc)
        .build(SqliteQueryBuilder)
}

/// Records of several users between two dates (inclusive).
pub fn list_for_users(user_ids: &[String], from: &str, to: &str) -> Built {
    availability_select()
        .and_where(Expr::col(Availability::UserId).is_in(user_ids.iter().map(String::as_str)))
        .and_where(Expr::col(Availability::AvailDate).between(from, to))
        .order_by(Availability::UserId, Order::Asc)
        .order_by(Availability::AvailDate, Order::Asc)
        .build(SqliteQueryBuilder)
}

pub fn delete(user_id: &str, date: &str) -> Built {
    Query::delete()
        .from_table(Availability::Table)
        .and_where(Expr::col(Availability::UserId).eq(user_id))
        .and_where(Expr::col(Availability::AvailDate).eq(date))
        .build(SqliteQueryBuilder)
}
