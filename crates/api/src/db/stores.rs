//! Store query builders.

use sea_query::{Asterisk, Expr, Func, Order, Query, SqliteQueryBuilder};

use super::Built;
use super::tables::{StoreEmployees, StoreManagers, Stores};

/// Column list for store SELECT queries:
/// id, name, address, join_code, created_by, created_at.
fn store_columns(q: &mut sea_query::SelectStatement) -> &mut sea_query::SelectStatement {
    q.column((Stores::Table, Stores::Id))
        .column((Stores::Table, Stores::Name))
        .column((Stores::Table, Stores::Address))
        .column((Stores::Table, Stores::JoinCode))
        .column((Stores::Table, Stores::CreatedBy))
        .column((Stores::Table, Stores::CreatedAt))
}

pub fn insert(
    id: &str,
    name: &str,
    address: Option<&str>,
    join_code: &str,
    created_by: &str,
) -> Built {
    Query::insert()
        .into_table(Stores::Table)
        .columns([
            Stores::Id,
            Stores::Name,
            Stores::Address,
            Stores::JoinCode,
            Stores::CreatedBy,
        ])
        .values_panic([
            id.into(),
            name.into(),
            address.map(|s| s.to_string()).into(),
            join_code.into(),
            created_by.into(),
        ])
        .build(SqliteQueryBuilder)
}

pub fn get_by_id(id: &str) -> Built {
    let mut q = Query::select().to_owned();
    store_columns(&mut q);
    q.from(Stores::Table)
        .and_where(Expr::col((Stores::Table, Stores::Id)).eq(id))
        .build(SqliteQueryBuilder)
}

/// Look up a store by its (normalized) join code.
pub fn get_by_join_code(join_code: &str) -> Built {
    let mut q = Query::select().to_owned();
    store_columns(&mut q);
    q.from(Stores::Table)
        .and_where(Expr::col((Stores::Table, Stores::JoinCode)).eq(join_code))
        .build(SqliteQueryBuilder)
}

pub fn join_code_exists(join_code: &str) -> Built {
    Query::select()
        .expr(Expr::expr(Func::count(Expr::col(Asterisk))).gt(0))
        .from(Stores::Table)
        .and_where(Expr::col(Stores::JoinCode).eq(join_code))
        .build(SqliteQueryBuilder)
}

/// Stores where `user_id` holds any manager or employee row.
///
/// Columns: store columns, then manager status, manager is_primary and
/// employee status (each NULL when the row is missing).
pub fn list_for_user(user_id: &str) -> Built {
    let mut q = Query::select().to_owned();
    store_columns(&mut q);
    q.column((StoreManagers::Table, StoreManagers::Status))
        .column((StoreManagers::Table, StoreManagers::IsPrimary))
        .column((StoreEmployees::Table, StoreEmployees::Status))
        .from(Stores::Table)
        .left_join(
            StoreManagers::Table,
            Expr::col((StoreManagers::Table, StoreManagers::StoreId))
                .equals((Stores::Table, Stores::Id))
                .and(Expr::col((StoreManagers::Table, StoreManagers::UserId)).eq(user_id)),
        )
        .left_join(
            StoreEmployees::Table,
            Expr::col((StoreEmployees::Table, StoreEmployees::StoreId))
                .equals((Stores::Table, Stores::Id))
                .and(Expr::col((StoreEmployees::Table, StoreEmployees::UserId)).eq(user_id)),
        )
        .cond_where(
            Expr::col((StoreManagers::Table, StoreManagers::UserId))
                .is_not_null()
                .or(Expr::col((StoreEmployees::Table, StoreEmployees::UserId)).is_not_null()),
        )
        .order_by((Stores::Table, Stores::Name), Order::Asc)
        .order_by((Stores::Table, Stores::Id), Order::Asc)
        .build(SqliteQueryBuilder)
}

// ── Updates ───────────────────────────────────────────────────────────────

pub fn update_name(id: &str, name: &str) -> Built {
    Query::update()
        .table(Stores::Table)
        .value(Stores::Name, name)
        .and_where(Expr::col(Stores::Id).eq(id))
        .build(SqliteQueryBuilder)
}

/// `None` clears the address.
pub fn update_address(id: &str, address: Option<&str>) -> Built {
    Query::update()
        .table(Stores::Table)
        .value(Stores::Address, address.map(|s| s.to_string()))
        .and_where(Expr::col(Stores::Id).eq(id))
        .build(SqliteQueryBuilder)
}

pub fn update_join_code(id: &str, join_code: &str) -> Built {
    Query::update()
        .table(Stores::Table)
        .value(Stores::JoinCode, join_code)
        .and_where(Expr::col(Stores::Id).eq(id))
        .build(SqliteQueryBuilder)
}

// ── Counts ────────────────────────────────────────────────────────────────

/// Approved managers, approved employees and pending manager requests.
pub fn member_counts(id: &str) -> Built {
    // Three scalar subqueries; kept as raw SQL with sea-query values.
    let sql = "SELECT \
        (SELECT COUNT(*) FROM \"store_managers\" WHERE \"store_id\" = ? AND \"status\" = 'approved'), \
        (SELECT COUNT(*) FROM \"store_employees\" WHERE \"store_id\" = ? AND \"status\" = 'approved'), \
        (SELECT COUNT(*) FROM \"store_managers\" WHERE \"store_id\" = ? AND \"status\" = 'pending')"
        .to_string();
    let values = sea_query::Values(vec![id.into(), id.into(), id.into()]);
    (sql, values)
}
