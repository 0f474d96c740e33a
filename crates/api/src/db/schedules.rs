//! Weekly schedule query builders.

use sea_query::{Alias, Expr, Func, Order, Query, SqliteQueryBuilder};

use super::Built;
use super::tables::{Schedules, Shifts};

/// id, store_id, week_start, published, created_by, created_at, shift_count.
fn schedule_select() -> sea_query::SelectStatement {
    Query::select()
        .column((Schedules::Table, Schedules::Id))
        .column((Schedules::Table, Schedules::StoreId))
        .column((Schedules::Table, Schedules::WeekStart))
        .column((Schedules::Table, Schedules::Published))
        .column((Schedules::Table, Schedules::CreatedBy))
        .column((Schedules::Table, Schedules::CreatedAt))
        .expr_as(
            Func::count(Expr::col((Shifts::Table, Shifts::Id))),
            Alias::new("shift_count"),
        )
        .from(Schedules::Table)
        .left_join(
            Shifts::Table,
            Expr::col((Shifts::Table, Shifts::ScheduleId)).equals((Schedules::Table, Schedules::Id)),
        )
        .group_by_col((Schedules::Table, Schedules::Id))
        .to_owned()
}

pub fn insert(id: &str, store_id: &str, week_start: &str, created_by: &str) -> Built {
    Query::insert()
        .into_table(Schedules::Table)
        .columns([
            Schedules::Id,
            Schedules::StoreId,
            Schedules::WeekStart,
            Schedules::CreatedBy,
        ])
        .values_panic([
            id.into(),
            store_id.into(),
            week_start.into(),
            created_by.into(),
        ])
        .build(SqliteQueryBuilder)
}

pub fn get_by_id(id: &str) -> Built {
    schedule_select()
        .and_where(Expr::col((Schedules::Table, Schedules::Id)).eq(id))
        .build(SqliteQueryBuilder)
}

pub fn get_by_store_week(store_id: &str, week_start: &str) -> Built {
    schedule_select()
        .and_where(Expr::col((Schedules::Table, Schedules::StoreId)).eq(store_id))
        .and_where(Expr::col((Schedules::Table, Schedules::WeekStart)).eq(week_start))
        .build(SqliteQueryBuilder)
}

/// Newest week first. `published_only` hides drafts.
pub fn list_for_store(store_id: &str, published_only: bool) -> Built {
    schedule_select()
        .and_where(Expr::col((Schedules::Table, Schedules::StoreId)).eq(store_id))
        .and_where_option(
            published_only.then(|| Expr::col((Schedules::Table, Schedules::Published)).eq(true)),
        )
        .order_by((Schedules::Table, Schedules::WeekStart), Order::Desc)
        .build(SqliteQueryBuilder)
}

pub fn set_published(id: &str, published: bool) -> Built {
    Query::update()
        .table(Schedules::Table)
        .value(Schedules::Published, published)
        .and_where(Expr::col(Schedules::Id).eq(id))
        .build(SqliteQueryBuilder)
}

pub fn delete(id: &str) -> Built {
    Query::delete()
        .from_table(Schedules::Table)
        .and_where(Expr::col(Schedules::Id).eq(id))
        .build(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_counts_shifts() {
        let (sql, _) = get_by_id("sch1");
        assert!(sql.contains(r#"COUNT("shifts"."id") AS "shift_count""#), "{sql}");
        assert!(sql.contains(r#"GROUP BY "schedules"."id""#), "{sql}");
    }

    #[test]
    fn published_filter() {
        let (_, all) = list_for_store("s1", false);
        let (sql, published) = list_for_store("s1", true);
        assert_eq!(all.0.len(), 1);
        assert_eq!(published.0.len(), 2);
        assert!(sql.contains(r#""schedules"."published" = ?"#), "{sql}");
    }
}
