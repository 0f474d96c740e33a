//! Manager / employee membership query builders.

use sea_query::{Expr, Order, Query, SqliteQueryBuilder};

use super::tables::{StoreEmployees, StoreManagers, Users};
use super::{Built, now_expr};

// ── Access lookups ────────────────────────────────────────────────────────

/// status, is_primary of one manager row.
pub fn manager_get(store_id: &str, user_id: &str) -> Built {
    Query::select()
        .columns([StoreManagers::Status, StoreManagers::IsPrimary])
        .from(StoreManagers::Table)
        .and_where(Expr::col(StoreManagers::StoreId).eq(store_id))
        .and_where(Expr::col(StoreManagers::UserId).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// status of one employee row.
pub fn employee_get(store_id: &str, user_id: &str) -> Built {
    Query::select()
        .column(StoreEmployees::Status)
        .from(StoreEmployees::Table)
        .and_where(Expr::col(StoreEmployees::StoreId).eq(store_id))
        .and_where(Expr::col(StoreEmployees::UserId).eq(user_id))
        .build(SqliteQueryBuilder)
}

// ── Manager rows ──────────────────────────────────────────────────────────

pub fn manager_insert(store_id: &str, user_id: &str, status: &str, is_primary: bool) -> Built {
    Query::insert()
        .into_table(StoreManagers::Table)
        .columns([
            StoreManagers::StoreId,
            StoreManagers::UserId,
            StoreManagers::Status,
            StoreManagers::IsPrimary,
        ])
        .values_panic([
            store_id.into(),
            user_id.into(),
            status.into(),
            is_primary.into(),
        ])
        .build(SqliteQueryBuilder)
}

/// A rejected request asked again: back to pending with the decision cleared.
pub fn manager_reopen(store_id: &str, user_id: &str) -> Built {
    Query::update()
        .table(StoreManagers::Table)
        .value(StoreManagers::Status, "pending")
        .value(StoreManagers::RequestedAt, now_expr())
        .value(StoreManagers::DecidedAt, Option::<String>::None)
        .value(StoreManagers::DecidedBy, Option::<String>::None)
        .and_where(Expr::col(StoreManagers::StoreId).eq(store_id))
        .and_where(Expr::col(StoreManagers::UserId).eq(user_id))
        .and_where(Expr::col(StoreManagers::Status).eq("rejected"))
        .build(SqliteQueryBuilder)
}

/// Record a decision on a pending request. Matches nothing unless the
/// row is still pending.
pub fn manager_decide(store_id: &str, user_id: &str, status: &str, decided_by: &str) -> Built {
    Query::update()
        .table(StoreManagers::Table)
        .value(StoreManagers::Status, status)
        .value(StoreManagers::DecidedAt, now_expr())
        .value(StoreManagers::DecidedBy, decided_by)
        .and_where(Expr::col(StoreManagers::StoreId).eq(store_id))
        .and_where(Expr::col(StoreManagers::UserId).eq(user_id))
        .and_where(Expr::col(StoreManagers::Status).eq("pending"))
        .build(SqliteQueryBuilder)
}

pub fn manager_set_primary(store_id: &str, user_id: &str, is_primary: bool) -> Built {
    Query::update()
        .table(StoreManagers::Table)
        .value(StoreManagers::IsPrimary, is_primary)
        .and_where(Expr::col(StoreManagers::StoreId).eq(store_id))
        .and_where(Expr::col(StoreManagers::UserId).eq(user_id))
        .build(SqliteQueryBuilder)
}

pub fn manager_delete(store_id: &str, user_id: &str) -> Built {
    Query::delete()
        .from_table(StoreManagers::Table)
        .and_where(Expr::col(StoreManagers::StoreId).eq(store_id))
        .and_where(Expr::col(StoreManagers::UserId).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// Manager rows joined with users:
/// user_id, display_name, email, status, is_primary, requested_at, decided_at.
///
/// `status` narrows the list to one approval status.
pub fn manager_list(store_id: &str, status: Option<&str>) -> Built {
    Query::select()
        .column((StoreManagers::Table, StoreManagers::UserId))
        .column((Users::Table, Users::DisplayName))
        .column((Users::Table, Users::Email))
        .column((StoreManagers::Table, StoreManagers::Status))
        .column((StoreManagers::Table, StoreManagers::IsPrimary))
        .column((StoreManagers::Table, StoreManagers::RequestedAt))
        .column((StoreManagers::Table, StoreManagers::DecidedAt))
        .from(StoreManagers::Table)
        .inner_join(
            Users::Table,
            Expr::col((Users::Table, Users::Id))
                .equals((StoreManagers::Table, StoreManagers::UserId)),
        )
        .and_where(Expr::col((StoreManagers::Table, StoreManagers::StoreId)).eq(store_id))
        .and_where_option(
            status.map(|s| Expr::col((StoreManagers::Table, StoreManagers::Status)).eq(s)),
        )
        .order_by((StoreManagers::Table, StoreManagers::IsPrimary), Order::Desc)
        .order_by((StoreManagers::Table, StoreManagers::RequestedAt), Order::Asc)
        .build(SqliteQueryBuilder)
}

// ── Employee rows ─────────────────────────────────────────────────────────

pub fn employee_insert(store_id: &str, user_id: &str, status: &str) -> Built {
    Query::insert()
        .into_table(StoreEmployees::Table)
        .columns([
            StoreEmployees::StoreId,
            StoreEmployees::UserId,
            StoreEmployees::Status,
        ])
        .values_panic([store_id.into(), user_id.into(), status.into()])
        .build(SqliteQueryBuilder)
}

pub fn employee_delete(store_id: &str, user_id: &str) -> Built {
    Query::delete()
        .from_table(StoreEmployees::Table)
        .and_where(Expr::col(StoreEmployees::StoreId).eq(store_id))
        .and_where(Expr::col(StoreEmployees::UserId).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// Employee rows joined with users:
/// user_id, display_name, email, status, joined_at.
pub fn employee_list(store_id: &str, status: Option<&str>) -> Built {
    Query::select()
        .column((StoreEmployees::Table, StoreEmployees::UserId))
        .column((Users::Table, Users::DisplayName))
        .column((Users::Table, Users::Email))
        .column((StoreEmployees::Table, StoreEmployees::Status))
        .column((StoreEmployees::Table, StoreEmployees::JoinedAt))
        .from(StoreEmployees::Table)
        .inner_join(
            Users::Table,
            Expr::col((Users::Table, Users::Id))
                .equals((StoreEmployees::Table, StoreEmployees::UserId)),
        )
        .and_where(Expr::col((StoreEmployees::Table, StoreEmployees::StoreId)).eq(store_id))
        .and_where_option(
            status.map(|s| Expr::col((StoreEmployees::Table, StoreEmployees::Status)).eq(s)),
        )
        .order_by((Users::Table, Users::DisplayName), Order::Asc)
        .build(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decide_only_touches_pending_rows() {
        let (sql, values) = manager_decide("s1", "u2", "approved", "u1");
        assert!(sql.contains(r#""status" = ?"#), "{sql}");
        assert!(sql.contains("datetime('now')"), "{sql}");
        // status, decided_by, store_id, user_id, 'pending'
        assert_eq!(values.0.len(), 5);
    }

    #[test]
    fn manager_list_status_filter_is_optional() {
        let (all, all_values) = manager_list("s1", None);
        let (pending, pending_values) = manager_list("s1", Some("pending"));
        assert_eq!(all_values.0.len(), 1);
        assert_eq!(pending_values.0.len(), 2);
        assert!(pending.len() > all.len());
        assert!(all.contains(r#"ORDER BY "store_managers"."is_primary" DESC"#), "{all}");
    }
}
