use anyhow::{Context, Result, ensure};

use shifttrack_api::{
    ApprovalStatus, JoinStoreRequest, StoreRole, TransferPrimaryRequest, UpdateStoreRequest,
};
use shifttrack_api_client::status_of;

use crate::client::TestContext;

fn expect_status(err: anyhow::Error, expected: u16) -> Result<()> {
    let got = status_of(&err).map(|s| s.as_u16());
    ensure!(got == Some(expected), "expected {expected}, got {err:#}");
    Ok(())
}

/// POST /api/stores → creator is the approved primary manager.
pub async fn create_store_makes_primary(ctx: &TestContext) -> Result<()> {
    let store = ctx.setup_store().await?;
    let owner = ctx.client_for(&store.owner);

    let detail = owner.get_store(&store.id).await?;
    ensure!(detail.your_role == StoreRole::Manager);
    ensure!(detail.is_primary, "creator must be primary");
    ensure!(detail.manager_count == 1);
    ensure!(detail.employee_count == 0);
    ensure!(detail.pending_request_count == Some(0));

    let listed = owner.list_stores().await?;
    let entry = listed
        .stores
        .iter()
        .find(|s| s.store.id == store.id)
        .context("store missing from list")?;
    ensure!(entry.manager_status == Some(ApprovalStatus::Approved));
    ensure!(entry.store.join_code.as_deref() == Some(store.join_code.as_str()));

    let updated = owner
        .update_store(
            &store.id,
            &UpdateStoreRequest {
                name: None,
                address: Some("12 Market St".into()),
            },
        )
        .await?;
    ensure!(updated.address.as_deref() == Some("12 Market St"));
    Ok(())
}

/// Employees are approved on join; joining twice → 409.
pub async fn employee_joins_immediately(ctx: &TestContext) -> Result<()> {
    let store = ctx.setup_store().await?;
    let (user, joined) = ctx.join(&store, StoreRole::Employee).await?;
    ensure!(joined.status == ApprovalStatus::Approved);
    ensure!(joined.store_id == store.id);

    let err = ctx
        .client_for(&user)
        .join_store(&JoinStoreRequest {
            join_code: store.join_code.to_lowercase(),
            role: StoreRole::Employee,
        })
        .await
        .err()
        .context("second join must fail")?;
    expect_status(err, 409)
}

/// Non-managers never see the join code.
pub async fn join_code_hidden_from_employees(ctx: &TestContext) -> Result<()> {
    let store = ctx.setup_store().await?;
    let (user, _) = ctx.join(&store, StoreRole::Employee).await?;
    let api = ctx.client_for(&user);

    let detail = api.get_store(&store.id).await?;
    ensure!(detail.your_role == StoreRole::Employee);
    ensure!(detail.store.join_code.is_none(), "employee saw join code");
    ensure!(detail.pending_request_count.is_none());

    let listed = api.list_stores().await?;
    ensure!(listed.stores.iter().all(|s| s.store.join_code.is_none()));

    let err = api
        .regenerate_join_code(&store.id)
        .await
        .err()
        .context("employee must not regenerate")?;
    expect_status(err, 403)
}

/// Manager join → pending; outsiders can't see it; owner approves.
pub async fn manager_request_approval(ctx: &TestContext) -> Result<()> {
    let store = ctx.setup_store().await?;
    let (candidate, joined) = ctx.join(&store, StoreRole::Manager).await?;
    ensure!(joined.status == ApprovalStatus::Pending);

    let candidate_api = ctx.client_for(&candidate);
    let err = candidate_api
        .get_store(&store.id)
        .await
        .err()
        .context("pending manager must not read the store")?;
    expect_status(err, 403)?;

    // A pending request still shows up in the caller's own list.
    let listed = candidate_api.list_stores().await?;
    let entry = listed
        .stores
        .iter()
        .find(|s| s.store.id == store.id)
        .context("pending store missing from list")?;
    ensure!(entry.role.is_none());
    ensure!(entry.manager_status == Some(ApprovalStatus::Pending));

    let err = candidate_api
        .approve_manager_request(&store.id, &candidate.user_id)
        .await
        .err()
        .context("self-approval must fail")?;
    expect_status(err, 403)?;

    let owner = ctx.client_for(&store.owner);
    let requests = owner.list_manager_requests(&store.id).await?;
    ensure!(requests.requests.len() == 1);
    ensure!(requests.requests[0].user_id == candidate.user_id);

    let decided = owner
        .approve_manager_request(&store.id, &candidate.user_id)
        .await?;
    ensure!(decided.status == ApprovalStatus::Approved);

    let detail = candidate_api.get_store(&store.id).await?;
    ensure!(detail.your_role == StoreRole::Manager);
    ensure!(!detail.is_primary);
    ensure!(detail.store.join_code.is_some());
    Ok(())
}

/// Rejected requests can be reopened by joining again.
pub async fn rejected_manager_can_reapply(ctx: &TestContext) -> Result<()> {
    let store = ctx.setup_store().await?;
    let (candidate, _) = ctx.join(&store, StoreRole::Manager).await?;
    let owner = ctx.client_for(&store.owner);

    let decided = owner
        .reject_manager_request(&store.id, &candidate.user_id)
        .await?;
    ensure!(decided.status == ApprovalStatus::Rejected);

    let err = owner
        .approve_manager_request(&store.id, &candidate.user_id)
        .await
        .err()
        .context("deciding a rejected request must fail")?;
    expect_status(err, 409)?;

    let again = ctx
        .client_for(&candidate)
        .join_store(&JoinStoreRequest {
            join_code: store.join_code.clone(),
            role: StoreRole::Manager,
        })
        .await?;
    ensure!(again.status == ApprovalStatus::Pending);
    ensure!(owner.list_manager_requests(&store.id).await?.requests.len() == 1);
    Ok(())
}

/// Only the primary transfers; the target must be an approved manager.
pub async fn transfer_primary(ctx: &TestContext) -> Result<()> {
    let store = ctx.setup_store().await?;
    let manager = ctx.add_manager(&store).await?;
    let (employee, _) = ctx.join(&store, StoreRole::Employee).await?;
    let owner = ctx.client_for(&store.owner);

    let err = ctx
        .client_for(&manager)
        .transfer_primary(
            &store.id,
            &TransferPrimaryRequest {
                user_id: manager.user_id.clone(),
            },
        )
        .await
        .err()
        .context("non-primary must not transfer")?;
    expect_status(err, 403)?;

    let err = owner
        .transfer_primary(
            &store.id,
            &TransferPrimaryRequest {
                user_id: employee.user_id.clone(),
            },
        )
        .await
        .err()
        .context("transfer to an employee must fail")?;
    expect_status(err, 400)?;

    owner
        .transfer_primary(
            &store.id,
            &TransferPrimaryRequest {
                user_id: manager.user_id.clone(),
            },
        )
        .await?;

    let members = owner.list_members(&store.id).await?;
    let primaries: Vec<_> = members
        .managers
        .iter()
        .filter(|m| m.is_primary)
        .map(|m| m.user_id.as_str())
        .collect();
    ensure!(primaries == [manager.user_id.as_str()], "got {primaries:?}");
    Ok(())
}

/// Employees and non-primary managers can leave; the primary cannot.
pub async fn members_can_leave(ctx: &TestContext) -> Result<()> {
    let store = ctx.setup_store().await?;
    let manager = ctx.add_manager(&store).await?;
    let (employee, _) = ctx.join(&store, StoreRole::Employee).await?;
    let owner = ctx.client_for(&store.owner);

    let err = owner
        .remove_manager(&store.id, &store.owner.user_id)
        .await
        .err()
        .context("primary must not leave")?;
    expect_status(err, 409)?;

    let employee_api = ctx.client_for(&employee);
    let err = employee_api
        .remove_manager(&store.id, &manager.user_id)
        .await
        .err()
        .context("employee must not remove a manager")?;
    expect_status(err, 403)?;

    employee_api
        .remove_employee(&store.id, &employee.user_id)
        .await?;
    ctx.client_for(&manager)
        .remove_manager(&store.id, &manager.user_id)
        .await?;

    let members = owner.list_members(&store.id).await?;
    ensure!(members.managers.len() == 1);
    ensure!(members.employees.is_empty());

    let err = employee_api
        .get_store(&store.id)
        .await
        .err()
        .context("former employee must lose access")?;
    expect_status(err, 403)
}

/// The old code stops working after regeneration.
pub async fn regenerate_join_code(ctx: &TestContext) -> Result<()> {
    let store = ctx.setup_store().await?;
    let fresh = ctx
        .client_for(&store.owner)
        .regenerate_join_code(&store.id)
        .await?;
    ensure!(fresh.join_code != store.join_code);

    let user = ctx.register_user().await?;
    let api = ctx.client_for(&user);
    let err = api
        .join_store(&JoinStoreRequest {
            join_code: store.join_code.clone(),
            role: StoreRole::Employee,
        })
        .await
        .err()
        .context("stale code must not work")?;
    expect_status(err, 404)?;

    let joined = api
        .join_store(&JoinStoreRequest {
            join_code: fresh.join_code,
            role: StoreRole::Employee,
        })
        .await?;
    ensure!(joined.store_id == store.id);
    Ok(())
}
