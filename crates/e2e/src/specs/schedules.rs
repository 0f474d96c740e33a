use anyhow::{Context, Result, ensure};

use shifttrack_api::{
    CreateScheduleRequest, DateRangeQuery, ScheduleResponse, StoreRole, UpdateShiftRequest,
};
use shifttrack_api_client::{ApiClient, status_of};

use crate::client::{TestContext, TestStore};
use crate::fixtures::{self, day};

fn expect_status(err: anyhow::Error, expected: u16) -> Result<()> {
    let got = status_of(&err).map(|s| s.as_u16());
    ensure!(got == Some(expected), "expected {expected}, got {err:#}");
    Ok(())
}

async fn open_week(api: &ApiClient, store: &TestStore) -> Result<ScheduleResponse> {
    api.create_schedule(
        &store.id,
        &CreateScheduleRequest {
            week_start: day(0),
        },
    )
    .await
    .context("create schedule")
}

/// A mid-week date is normalized; a second schedule for that week → 409.
pub async fn create_schedule_snaps_to_week_start(ctx: &TestContext) -> Result<()> {
    let store = ctx.setup_store().await?;
    let owner = ctx.client_for(&store.owner);

    let schedule = owner
        .create_schedule(
            &store.id,
            &CreateScheduleRequest {
                week_start: day(3),
            },
        )
        .await?;
    ensure!(schedule.week_start == day(0), "got {}", schedule.week_start);
    ensure!(schedule.week_end == day(6), "got {}", schedule.week_end);
    ensure!(!schedule.published);
    ensure!(schedule.shift_count == 0);

    let err = open_week(&owner, &store)
        .await
        .err()
        .context("duplicate week must fail")?;
    expect_status(err, 409)?;

    let (employee, _) = ctx.join(&store, StoreRole::Employee).await?;
    let err = ctx
        .client_for(&employee)
        .create_schedule(
            &store.id,
            &CreateScheduleRequest {
                week_start: day(7),
            },
        )
        .await
        .err()
        .context("employee must not create schedules")?;
    expect_status(err, 403)
}

/// Unpublished schedules and their shifts stay invisible to employees.
pub async fn drafts_hidden_from_employees(ctx: &TestContext) -> Result<()> {
    let store = ctx.setup_store().await?;
    let (employee, _) = ctx.join(&store, StoreRole::Employee).await?;
    let owner = ctx.client_for(&store.owner);
    let staff = ctx.client_for(&employee);

    let schedule = open_week(&owner, &store).await?;
    owner
        .create_shift(
            &schedule.id,
            &fixtures::shift(&employee.user_id, 1, "09:00", "17:00"),
        )
        .await?;

    ensure!(staff.list_schedules(&store.id).await?.schedules.is_empty());
    let err = staff
        .get_schedule(&schedule.id)
        .await
        .err()
        .context("draft must be hidden")?;
    expect_status(err, 404)?;

    let view = staff.week_view(&store.id, &day(2)).await?;
    ensure!(view.schedule.is_none());
    ensure!(view.view.total_minutes == 0);
    ensure!(
        view.view.rows.iter().any(|r| r.user_id == employee.user_id),
        "roster should still list the employee"
    );

    let published = owner.publish_schedule(&schedule.id, true).await?;
    ensure!(published.published);
    ensure!(staff.list_schedules(&store.id).await?.schedules.len() == 1);
    let view = staff.week_view(&store.id, &day(2)).await?;
    ensure!(view.view.total_minutes == 8 * 60);
    Ok(())
}

/// Shifts must fit the week, run forward and go to roster members.
pub async fn shift_validation(ctx: &TestContext) -> Result<()> {
    let store = ctx.setup_store().await?;
    let (employee, _) = ctx.join(&store, StoreRole::Employee).await?;
    let outsider = ctx.register_user().await?;
    let owner = ctx.client_for(&store.owner);
    let schedule = open_week(&owner, &store).await?;

    let cases = [
        (fixtures::shift(&employee.user_id, 7, "09:00", "17:00"), "outside the week"),
        (fixtures::shift(&employee.user_id, 1, "17:00", "09:00"), "overnight"),
        (fixtures::shift(&employee.user_id, 1, "9am", "5pm"), "bad time"),
        (fixtures::shift(&outsider.user_id, 1, "09:00", "17:00"), "not on roster"),
    ];
    for (req, label) in cases {
        let err = owner
            .create_shift(&schedule.id, &req)
            .await
            .err()
            .with_context(|| format!("{label} must fail"))?;
        expect_status(err, 400).with_context(|| label.to_string())?;
    }

    let err = ctx
        .client_for(&employee)
        .create_shift(
            &schedule.id,
            &fixtures::shift(&employee.user_id, 1, "09:00", "17:00"),
        )
        .await
        .err()
        .context("employee must not create shifts")?;
    expect_status(err, 404)?;

    // The primary manager is on the roster too.
    let own = owner
        .create_shift(
            &schedule.id,
            &fixtures::shift(&store.owner.user_id, 0, "06:00", "10:00"),
        )
        .await?;
    let moved = owner
        .update_shift(
            &own.id,
            &UpdateShiftRequest {
                user_id: Some(employee.user_id.clone()),
                date: None,
                start_time: None,
                end_time: Some("11:30".into()),
                notes: Some("opening".into()),
            },
        )
        .await?;
    ensure!(moved.user_id == employee.user_id);
    ensure!(moved.end_time == "11:30");
    ensure!(moved.notes.as_deref() == Some("opening"));

    owner.delete_shift(&own.id).await?;
    ensure!(owner.get_schedule(&schedule.id).await?.shift_count == 0);
    Ok(())
}

/// Week view flags clashes with availability and double bookings.
pub async fn week_view_flags(ctx: &TestContext) -> Result<()> {
    let store = ctx.setup_store().await?;
    let (employee, _) = ctx.join(&store, StoreRole::Employee).await?;
    let owner = ctx.client_for(&store.owner);
    let staff = ctx.client_for(&employee);
    let schedule = open_week(&owner, &store).await?;

    staff
        .upsert_availability(&fixtures::available(1, Some(("08:00", "12:00"))))
        .await?;
    staff.upsert_availability(&fixtures::unavailable(2)).await?;

    for req in [
        fixtures::shift(&employee.user_id, 1, "09:00", "11:00"),
        fixtures::shift(&employee.user_id, 1, "10:00", "14:00"),
        fixtures::shift(&employee.user_id, 2, "09:00", "17:00"),
    ] {
        owner.create_shift(&schedule.id, &req).await?;
    }

    let view = owner.week_view(&store.id, &day(0)).await?;
    ensure!(view.schedule.as_ref().map(|s| s.id.as_str()) == Some(schedule.id.as_str()));
    let row = view
        .view
        .rows
        .iter()
        .find(|r| r.user_id == employee.user_id)
        .context("employee row missing")?;

    let tuesday = &row.days[1];
    ensure!(tuesday.shifts.len() == 2);
    ensure!(tuesday.shifts.iter().all(|s| s.overlaps), "both Tuesday shifts overlap");
    ensure!(!tuesday.shifts[0].outside_availability, "09-11 fits 08-12");
    ensure!(tuesday.shifts[1].outside_availability, "10-14 exceeds 08-12");

    let wednesday = &row.days[2];
    ensure!(wednesday.shifts[0].outside_availability, "unavailable day");
    ensure!(!wednesday.shifts[0].overlaps);

    ensure!(row.total_minutes == 2 * 60 + 4 * 60 + 8 * 60);
    ensure!(view.view.day_totals[1].shift_count == 2);

    // The owner's row carries no availability of its own.
    let owner_row = view
        .view
        .rows
        .first()
        .context("roster empty")?;
    ensure!(owner_row.user_id == store.owner.user_id, "primary sorts first");
    ensure!(owner_row.is_primary);
    Ok(())
}

/// Employees reading the week view see their own availability, nobody else's.
pub async fn week_view_hides_coworker_availability(ctx: &TestContext) -> Result<()> {
    let store = ctx.setup_store().await?;
    let (anna, _) = ctx.join(&store, StoreRole::Employee).await?;
    let (ben, _) = ctx.join(&store, StoreRole::Employee).await?;
    let staff = ctx.client_for(&anna);

    staff.upsert_availability(&fixtures::unavailable(1)).await?;
    ctx.client_for(&ben)
        .upsert_availability(&fixtures::available(2, Some(("10:00", "14:00"))))
        .await?;

    let view = staff.week_view(&store.id, &day(0)).await?;
    let row_for = |user_id: &str| {
        view.view
            .rows
            .iter()
            .find(|r| r.user_id == user_id)
            .with_context(|| format!("{user_id} missing from roster"))
    };
    ensure!(row_for(&anna.user_id)?.days[1].availability.is_some());
    ensure!(
        row_for(&ben.user_id)?.days.iter().all(|d| d.availability.is_none()),
        "coworker availability leaked"
    );

    let managed = ctx.client_for(&store.owner).week_view(&store.id, &day(0)).await?;
    ensure!(
        managed
            .view
            .rows
            .iter()
            .find(|r| r.user_id == ben.user_id)
            .is_some_and(|r| r.days[2].availability.is_some()),
        "managers see every member's availability"
    );
    Ok(())
}

/// GET /api/me/shifts lists published shifts across stores.
pub async fn my_shifts_after_publish(ctx: &TestContext) -> Result<()> {
    let first = ctx.setup_store().await?;
    let second = ctx.setup_store().await?;
    let (employee, _) = ctx.join(&first, StoreRole::Employee).await?;
    let staff = ctx.client_for(&employee);
    staff
        .join_store(&shifttrack_api::JoinStoreRequest {
            join_code: second.join_code.clone(),
            role: StoreRole::Employee,
        })
        .await?;

    for (store, offset) in [(&first, 1), (&second, 3)] {
        let owner = ctx.client_for(&store.owner);
        let schedule = open_week(&owner, store).await?;
        owner
            .create_shift(
                &schedule.id,
                &fixtures::shift(&employee.user_id, offset, "12:00", "18:00"),
            )
            .await?;
        if offset == 1 {
            owner.publish_schedule(&schedule.id, true).await?;
        }
    }

    let range = DateRangeQuery {
        from: Some(day(0)),
        to: Some(day(6)),
    };
    let mine = staff.my_shifts(&range).await?;
    ensure!(mine.shifts.len() == 1, "only the published store counts, got {}", mine.shifts.len());
    ensure!(mine.shifts[0].store_id == first.id);
    ensure!(mine.shifts[0].date == day(1));

    let err = staff
        .my_shifts(&DateRangeQuery {
            from: Some(day(6)),
            to: Some(day(0)),
        })
        .await
        .err()
        .context("inverted range must fail")?;
    expect_status(err, 400)
}
