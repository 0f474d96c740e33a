use anyhow::{Result, ensure};
use uuid::Uuid;

use shifttrack_api::{
    AuthRegisterRequest, AuthTokenResponse, LoginRequest, LogoutRequest, RefreshRequest,
    UpdateProfileRequest, UserProfileResponse,
};
use shifttrack_api_client::status_of;

use crate::client::TestContext;

/// POST /api/auth/register → 201, returns tokens.
pub async fn register_email(ctx: &TestContext) -> Result<()> {
    let user = ctx.register_user().await?;
    ensure!(!user.access_token.is_empty(), "expected access_token");
    ensure!(!user.refresh_token.is_empty(), "expected refresh_token");
    ensure!(!user.user_id.is_empty(), "expected user_id");
    Ok(())
}

/// Same email (any case) → 409.
pub async fn register_duplicate_email(ctx: &TestContext) -> Result<()> {
    let user = ctx.register_user().await?;
    let resp = ctx
        .post_json(
            "/auth/register",
            &AuthRegisterRequest {
                email: user.email.to_uppercase(),
                password: "testpass99".into(),
                display_name: "Someone Else".into(),
            },
        )
        .await?;
    ensure!(resp.status() == 409, "expected 409, got {}", resp.status());
    Ok(())
}

/// <8 or >72 chars → 400.
pub async fn register_bad_password(ctx: &TestContext) -> Result<()> {
    for password in ["short".to_string(), "x".repeat(73)] {
        let resp = ctx
            .post_json(
                "/auth/register",
                &AuthRegisterRequest {
                    email: format!("pw-{}@e2e.local", Uuid::new_v4()),
                    password: password.clone(),
                    display_name: "Password Test".into(),
                },
            )
            .await?;
        ensure!(
            resp.status() == 400,
            "expected 400 for {}-char password, got {}",
            password.len(),
            resp.status()
        );
    }
    Ok(())
}

/// POST /api/auth/login → tokens; wrong password → 401.
pub async fn login(ctx: &TestContext) -> Result<()> {
    let user = ctx.register_user().await?;

    let tokens: AuthTokenResponse = ctx
        .api
        .login(&LoginRequest {
            email: user.email.clone(),
            password: user.password.clone(),
        })
        .await?;
    ensure!(!tokens.access_token.is_empty());
    ensure!(tokens.user_id == user.user_id);

    let err = ctx
        .api
        .login(&LoginRequest {
            email: user.email.clone(),
            password: "wrongpass99".into(),
        })
        .await
        .err()
        .ok_or_else(|| anyhow::anyhow!("wrong password must not log in"))?;
    ensure!(
        status_of(&err).map(|s| s.as_u16()) == Some(401),
        "expected 401 for wrong pw, got {err}"
    );

    Ok(())
}

/// GET/PUT /api/auth/me
pub async fn me_and_update_profile(ctx: &TestContext) -> Result<()> {
    let user = ctx.register_user().await?;
    let resp = ctx.get_authed("/auth/me", &user.access_token).await?;
    ensure!(resp.status() == 200, "expected 200, got {}", resp.status());

    let body: UserProfileResponse = resp.json().await?;
    ensure!(body.user_id == user.user_id);
    ensure!(body.display_name == user.display_name);
    ensure!(body.email == user.email);

    let updated = ctx
        .client_for(&user)
        .update_me(&UpdateProfileRequest {
            display_name: "  Renamed  ".into(),
        })
        .await?;
    ensure!(updated.display_name == "Renamed", "got {}", updated.display_name);

    let resp = ctx
        .put_json_authed(
            "/auth/me",
            &user.access_token,
            &UpdateProfileRequest {
                display_name: "   ".into(),
            },
        )
        .await?;
    ensure!(resp.status() == 400, "expected 400 for blank name, got {}", resp.status());
    Ok(())
}

/// POST /api/auth/refresh → new tokens; old refresh invalidated.
pub async fn refresh_token(ctx: &TestContext) -> Result<()> {
    let user = ctx.register_user().await?;

    let resp = ctx
        .post_json(
            "/auth/refresh",
            &RefreshRequest {
                refresh_token: user.refresh_token.clone(),
            },
        )
        .await?;
    ensure!(resp.status() == 200, "expected 200, got {}", resp.status());
    let new_tokens: AuthTokenResponse = resp.json().await?;
    ensure!(!new_tokens.access_token.is_empty());
    ensure!(new_tokens.refresh_token != user.refresh_token);

    // Rotation: the old refresh token is spent.
    let resp = ctx
        .post_json(
            "/auth/refresh",
            &RefreshRequest {
                refresh_token: user.refresh_token.clone(),
            },
        )
        .await?;
    ensure!(
        resp.status() == 401,
        "expected old refresh token invalidated, got {}",
        resp.status()
    );

    Ok(())
}

/// POST /api/auth/logout → ok; refresh now fails 401.
pub async fn logout(ctx: &TestContext) -> Result<()> {
    let user = ctx.register_user().await?;

    let resp = ctx
        .post_json(
            "/auth/logout",
            &LogoutRequest {
                refresh_token: user.refresh_token.clone(),
            },
        )
        .await?;
    ensure!(resp.status() == 200, "expected 200, got {}", resp.status());

    let resp = ctx
        .post_json(
            "/auth/refresh",
            &RefreshRequest {
                refresh_token: user.refresh_token.clone(),
            },
        )
        .await?;
    ensure!(
        resp.status() == 401,
        "expected 401 after logout, got {}",
        resp.status()
    );
    Ok(())
}

/// Protected routes reject missing and malformed tokens.
pub async fn requires_bearer_token(ctx: &TestContext) -> Result<()> {
    for path in ["/stores", "/auth/me", "/me/shifts", "/availability"] {
        let resp = ctx.get(path).await?;
        ensure!(
            resp.status() == 401,
            "expected 401 for {path} without token, got {}",
            resp.status()
        );
    }

    let resp = ctx.get_authed("/stores", "not.a.jwt").await?;
    ensure!(resp.status() == 401, "expected 401 for bad token, got {}", resp.status());
    Ok(())
}
