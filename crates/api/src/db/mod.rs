//! Database schema, migrations, and query builders.
//!
//! Builders return `(sql, values)` pairs for SQLite; the server binds and
//! executes them.

pub mod availability;
pub mod memberships;
pub mod migrations;
pub mod schedules;
pub mod shifts;
pub mod stores;
pub mod tables;
pub mod users;

// Re-export tables for convenience
pub use tables::*;

pub type Built = (String, sea_query::Values);

/// SQL expression for the current UTC time in SQLite's `datetime` format.
pub(crate) fn now_expr() -> sea_query::SimpleExpr {
    sea_query::Expr::cust("datetime('now')")
}
