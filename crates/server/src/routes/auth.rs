use axum::{
    Json,
    extract::{FromRef, FromRequestParts, State},
    http::{StatusCode, request::Parts},
};
use rusqlite::Connection;
use uuid::Uuid;

use shifttrack_api::{
    AuthRegisterRequest, AuthTokenResponse, LoginRequest, LogoutRequest, OkResponse,
    RefreshRequest, UpdateProfileRequest, UserProfileResponse, crypto, db, service,
};

use crate::AppConfig;
use crate::error::ApiErr;
use crate::storage::{Db, is_constraint_violation, sq_execute, sq_first, sq_run, unix_now};

// ---------------------------------------------------------------------------
// Auth extractor
// ---------------------------------------------------------------------------

/// Authenticated user extracted from the `Authorization: Bearer <jwt>` header.
pub struct AuthUser {
    pub user_id: String,
    pub display_name: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Db: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiErr;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let db = Db::from_ref(state);
        let config = AppConfig::from_ref(state);

        let token = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| ApiErr::unauthorized("missing or invalid Authorization header"))?;

        let user_id = service::resolve_auth_token(token, &config.jwt_secret, unix_now())?;

        let conn = db.conn();
        let display_name: String = sq_first(
            &conn,
            db::users::get_display_name(&user_id),
            "auth lookup",
            |row| row.get(0),
        )?
        .ok_or_else(|| ApiErr::unauthorized("user no longer exists"))?;

        Ok(AuthUser {
            user_id,
            display_name,
        })
    }
}

fn jwt_secret(config: &AppConfig) -> Result<&str, ApiErr> {
    if config.jwt_secret.is_empty() {
        return Err(ApiErr::internal("authentication is not configured"));
    }
    Ok(&config.jwt_secret)
}

/// Mint an access token and persist a fresh refresh token.
fn issue_tokens(
    conn: &Connection,
    secret: &str,
    user_id: &str,
    display_name: &str,
) -> Result<AuthTokenResponse, ApiErr> {
    let bundle = service::prepare_token_bundle(secret, user_id, display_name, unix_now())?;
    sq_run(
        conn,
        db::users::insert_refresh_token(
            &bundle.token_id,
            user_id,
            &bundle.token_hash,
            &bundle.expires_at,
        ),
        "insert refresh token",
    )?;
    Ok(bundle.response)
}

async fn hash_password(password: String) -> Result<(String, String), ApiErr> {
    tokio::task::spawn_blocking(move || crypto::hash_password(&password))
        .await
        .map_err(ApiErr::from_db("password hashing task"))?
        .map_err(ApiErr::from)
}

async fn verify_password(password: String, hash: String, salt: String) -> Result<bool, ApiErr> {
    tokio::task::spawn_blocking(move || crypto::verify_password(&password, &hash, &salt))
        .await
        .map_err(ApiErr::from_db("password verification task"))
}

// ---------------------------------------------------------------------------
// Register
// ---------------------------------------------------------------------------

/// POST /api/auth/register: create an account and sign in.
pub async fn register(
    State(db): State<Db>,
    State(config): State<AppConfig>,
    Json(req): Json<AuthRegisterRequest>,
) -> Result<(StatusCode, Json<AuthTokenResponse>), ApiErr> {
    if !config.registration_open {
        return Err(ApiErr::forbidden("registration is currently closed"));
    }
    let secret = jwt_secret(&config)?;

    let email = service::validate_email(&req.email)?;
    service::validate_password(&req.password)?;
    let display_name = service::validate_display_name(&req.display_name)?;

    let taken: bool = {
        let conn = db.conn();
        sq_first(&conn, db::users::email_exists(&email), "email lookup", |row| row.get(0))?
            .unwrap_or(false)
    };
    if taken {
        return Err(ApiErr::conflict("email already registered"));
    }

    let (hash, salt) = hash_password(req.password).await?;

    let user_id = Uuid::new_v4().to_string();
    let conn = db.conn();
    match sq_execute(
        &conn,
        db::users::insert(&user_id, &email, &display_name, &hash, &salt),
    ) {
        Ok(_) => {}
        Err(e) if is_constraint_violation(&e) => {
            return Err(ApiErr::conflict("email already registered"));
        }
        Err(e) => return Err(ApiErr::from_db("register user")(e)),
    }
    tracing::info!(user_id = %user_id, "registered new user");

    let tokens = issue_tokens(&conn, secret, &user_id, &display_name)?;
    Ok((StatusCode::CREATED, Json(tokens)))
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// POST /api/auth/login: email + password.
pub async fn login(
    State(db): State<Db>,
    State(config): State<AppConfig>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthTokenResponse>, ApiErr> {
    let secret = jwt_secret(&config)?;
    let invalid = || ApiErr::unauthorized("invalid email or password");

    let email = service::validate_email(&req.email).map_err(|_| invalid())?;

    let found: Option<(String, String, String, String)> = {
        let conn = db.conn();
        sq_first(
            &conn,
            db::users::get_by_email_for_login(&email),
            "login lookup",
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?
    };
    let Some((user_id, display_name, hash, salt)) = found else {
        return Err(invalid());
    };

    if !verify_password(req.password, hash, salt).await? {
        return Err(invalid());
    }

    let conn = db.conn();
    let tokens = issue_tokens(&conn, secret, &user_id, &display_name)?;
    Ok(Json(tokens))
}

// ---------------------------------------------------------------------------
// Refresh / logout
// ---------------------------------------------------------------------------

/// POST /api/auth/refresh: rotate a refresh token.
pub async fn refresh(
    State(db): State<Db>,
    State(config): State<AppConfig>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<AuthTokenResponse>, ApiErr> {
    let secret = jwt_secret(&config)?;
    let token_hash = crypto::hash_token(&req.refresh_token);

    let conn = db.conn();
    let (token_id, user_id, expires_at, display_name): (String, String, String, String) =
        sq_first(
            &conn,
            db::users::lookup_refresh_token(&token_hash),
            "lookup refresh token",
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?
        .ok_or_else(|| ApiErr::unauthorized("invalid refresh token"))?;

    // Single use: the presented token is gone whether or not it was still valid.
    sq_run(
        &conn,
        db::users::delete_refresh_token_by_id(&token_id),
        "delete refresh token",
    )?;

    let now = service::sqlite_datetime(unix_now())?;
    if expires_at <= now {
        return Err(ApiErr::unauthorized("refresh token expired"));
    }

    let tokens = issue_tokens(&conn, secret, &user_id, &display_name)?;
    Ok(Json(tokens))
}

/// POST /api/auth/logout: revoke a refresh token.
pub async fn logout(
    State(db): State<Db>,
    Json(req): Json<LogoutRequest>,
) -> Result<Json<OkResponse>, ApiErr> {
    let token_hash = crypto::hash_token(&req.refresh_token);
    let conn = db.conn();
    sq_run(
        &conn,
        db::users::delete_refresh_token(&token_hash),
        "logout",
    )?;
    Ok(Json(OkResponse { ok: true }))
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

fn load_profile(conn: &Connection, user_id: &str) -> Result<UserProfileResponse, ApiErr> {
    sq_first(conn, db::users::get_by_id(user_id), "load profile", |row| {
        Ok(UserProfileResponse {
            user_id: row.get(0)?,
            email: row.get(1)?,
            display_name: row.get(2)?,
            created_at: row.get(3)?,
        })
    })?
    .ok_or_else(|| ApiErr::not_found("user not found"))
}

/// GET /api/auth/me
pub async fn me(State(db): State<Db>, user: AuthUser) -> Result<Json<UserProfileResponse>, ApiErr> {
    let conn = db.conn();
    load_profile(&conn, &user.user_id).map(Json)
}

/// PUT /api/auth/me: change display name.
pub async fn update_me(
    State(db): State<Db>,
    user: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfileResponse>, ApiErr> {
    let display_name = service::validate_display_name(&req.display_name)?;
    let conn = db.conn();
    sq_run(
        &conn,
        db::users::update_display_name(&user.user_id, &display_name),
        "update display name",
    )?;
    load_profile(&conn, &user.user_id).map(Json)
}
