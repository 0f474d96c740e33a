use anyhow::{Context, Result, ensure};

use shifttrack_api::{AvailabilityStatus, DateRangeQuery, UpsertAvailabilityRequest};
use shifttrack_api_client::status_of;

use crate::client::TestContext;
use crate::fixtures::{self, day};

fn this_week() -> DateRangeQuery {
    DateRangeQuery {
        from: Some(day(0)),
        to: Some(day(6)),
    }
}

/// PUT twice for the same date keeps one record, the latest.
pub async fn upsert_replaces(ctx: &TestContext) -> Result<()> {
    let user = ctx.register_user().await?;
    let api = ctx.client_for(&user);

    let first = api
        .upsert_availability(&fixtures::available(0, Some(("9:00", "13:00"))))
        .await?;
    ensure!(first.status == AvailabilityStatus::Available);
    ensure!(first.start_time.as_deref() == Some("09:00"), "got {:?}", first.start_time);

    api.upsert_availability(&fixtures::unavailable(0)).await?;
    api.upsert_availability(&fixtures::available(4, None)).await?;

    let listed = api.list_availability(&this_week()).await?;
    ensure!(listed.availability.len() == 2, "got {}", listed.availability.len());
    let monday = &listed.availability[0];
    ensure!(monday.date == day(0));
    ensure!(monday.status == AvailabilityStatus::Unavailable);
    ensure!(monday.start_time.is_none() && monday.end_time.is_none());
    ensure!(listed.availability[1].start_time.is_none(), "all-day availability");
    Ok(())
}

/// An unavailable day with a window, or a half-open window → 400.
pub async fn unavailable_rejects_window(ctx: &TestContext) -> Result<()> {
    let user = ctx.register_user().await?;
    let api = ctx.client_for(&user);

    let bad = [
        UpsertAvailabilityRequest {
            date: day(1),
            status: AvailabilityStatus::Unavailable,
            start_time: Some("09:00".into()),
            end_time: Some("12:00".into()),
        },
        UpsertAvailabilityRequest {
            date: day(1),
            status: AvailabilityStatus::Available,
            start_time: Some("09:00".into()),
            end_time: None,
        },
        UpsertAvailabilityRequest {
            date: "next tuesday".into(),
            status: AvailabilityStatus::Available,
            start_time: None,
            end_time: None,
        },
    ];
    for req in bad {
        let err = api
            .upsert_availability(&req)
            .await
            .err()
            .with_context(|| format!("{req:?} must fail"))?;
        ensure!(
            status_of(&err).map(|s| s.as_u16()) == Some(400),
            "expected 400, got {err:#}"
        );
    }

    ensure!(api.list_availability(&this_week()).await?.availability.is_empty());
    Ok(())
}

/// DELETE /api/availability/:date removes the record; a second delete → 404.
pub async fn delete_record(ctx: &TestContext) -> Result<()> {
    let user = ctx.register_user().await?;
    let api = ctx.client_for(&user);
    api.upsert_availability(&fixtures::unavailable(5)).await?;

    api.delete_availability(&day(5)).await?;
    ensure!(api.list_availability(&this_week()).await?.availability.is_empty());

    let err = api
        .delete_availability(&day(5))
        .await
        .err()
        .context("second delete must fail")?;
    ensure!(
        status_of(&err).map(|s| s.as_u16()) == Some(404),
        "expected 404, got {err:#}"
    );
    Ok(())
}
