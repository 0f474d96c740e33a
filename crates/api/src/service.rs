//! Shared business logic: framework-agnostic pure functions.
//!
//! Route handlers stay thin adapters around these and the core crate.

use chrono::NaiveDate;
use shifttrack_core::week;

use crate::{AuthTokenResponse, ServiceError};

// ─── Validation ─────────────────────────────────────────────────────────────

pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 72;
pub const DISPLAY_NAME_MAX_LEN: usize = 64;
pub const STORE_NAME_MAX_LEN: usize = 100;
pub const NOTES_MAX_LEN: usize = 500;

/// Validate and normalize an email address. Returns the lowercased, trimmed email.
pub fn validate_email(email: &str) -> Result<String, ServiceError> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    };
    if !valid || email.len() > 254 {
        return Err(ServiceError::BadRequest("invalid email address".into()));
    }
    Ok(email)
}

pub fn validate_password(password: &str) -> Result<(), ServiceError> {
    let len = password.chars().count();
    if len < PASSWORD_MIN_LEN {
        return Err(ServiceError::BadRequest(format!(
            "password must be at least {PASSWORD_MIN_LEN} characters"
        )));
    }
    if len > PASSWORD_MAX_LEN {
        return Err(ServiceError::BadRequest(format!(
            "password must be at most {PASSWORD_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate and normalize a display name. Returns the trimmed name.
pub fn validate_display_name(name: &str) -> Result<String, ServiceError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > DISPLAY_NAME_MAX_LEN {
        return Err(ServiceError::BadRequest(format!(
            "display name must be 1-{DISPLAY_NAME_MAX_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

pub fn validate_store_name(name: &str) -> Result<String, ServiceError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > STORE_NAME_MAX_LEN {
        return Err(ServiceError::BadRequest(format!(
            "store name must be 1-{STORE_NAME_MAX_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Blank strings become `None`.
pub fn normalize_optional_text(
    value: Option<&str>,
    field: &str,
    max_len: usize,
) -> Result<Option<String>, ServiceError> {
    let Some(trimmed) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > max_len {
        return Err(ServiceError::BadRequest(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

pub fn parse_date_param(value: &str, field: &str) -> Result<NaiveDate, ServiceError> {
    week::parse_date(value).ok_or_else(|| {
        ServiceError::BadRequest(format!("{field} must be a YYYY-MM-DD date, got '{value}'"))
    })
}

/// Default window for date-bounded listings when the caller omits bounds.
pub const DEFAULT_RANGE_DAYS: i64 = 28;
pub const MAX_RANGE_DAYS: i64 = 366;

/// Resolve optional `from`/`to` query values into an inclusive range.
/// `from` defaults to `today`, `to` to `from + 28 days`.
pub fn resolve_date_range(
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), ServiceError> {
    let from = match from {
        Some(s) => parse_date_param(s, "from")?,
        None => today,
    };
    let to = match to {
        Some(s) => parse_date_param(s, "to")?,
        None => from + chrono::Duration::days(DEFAULT_RANGE_DAYS),
    };
    if to < from {
        return Err(ServiceError::BadRequest("'to' is before 'from'".into()));
    }
    if (to - from).num_days() > MAX_RANGE_DAYS {
        return Err(ServiceError::BadRequest(format!(
            "date range may span at most {MAX_RANGE_DAYS} days"
        )));
    }
    Ok((from, to))
}

// ─── Auth Token Resolution ──────────────────────────────────────────────────

/// Verify a bearer token and return the user id it was issued to.
pub fn resolve_auth_token(token: &str, jwt_secret: &str, now: u64) -> Result<String, ServiceError> {
    if jwt_secret.is_empty() {
        return Err(ServiceError::Unauthorized(
            "JWT authentication not configured".into(),
        ));
    }
    crate::crypto::verify_jwt(token, jwt_secret, now)
}

// ─── Token Bundle ───────────────────────────────────────────────────────────

/// Everything needed to persist a refresh token and answer the client.
/// The caller only performs the INSERT.
pub struct TokenBundle {
    /// Raw refresh token (sent to the client).
    pub refresh_token: String,
    /// SHA-256 hash of the refresh token (stored in DB).
    pub token_hash: String,
    /// Primary key for the refresh_tokens row.
    pub token_id: String,
    /// `datetime` string for the refresh token expiry.
    pub expires_at: String,
    pub response: AuthTokenResponse,
}

pub fn prepare_token_bundle(
    jwt_secret: &str,
    user_id: &str,
    display_name: &str,
    now_unix: u64,
) -> Result<TokenBundle, ServiceError> {
    use crate::crypto;

    let access_token = crypto::sign_jwt(user_id, jwt_secret, now_unix);
    let refresh_token = crypto::generate_token()?;
    let token_hash = crypto::hash_token(&refresh_token);
    let token_id = uuid::Uuid::new_v4().to_string();
    let expires_at = sqlite_datetime(now_unix + crypto::REFRESH_EXPIRY_SECS)?;

    let response = AuthTokenResponse {
        access_token,
        refresh_token: refresh_token.clone(),
        expires_in: crypto::JWT_EXPIRY_SECS,
        user_id: user_id.to_string(),
        display_name: display_name.to_string(),
    };

    Ok(TokenBundle {
        refresh_token,
        token_hash,
        token_id,
        expires_at,
        response,
    })
}

/// Format a unix timestamp the way SQLite's `datetime()` does.
pub fn sqlite_datetime(unix: u64) -> Result<String, ServiceError> {
    let secs = i64::try_from(unix)
        .map_err(|_| ServiceError::Internal("timestamp overflow".into()))?;
    let dt = chrono::DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| ServiceError::Internal("invalid timestamp".into()))?;
    Ok(dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        week::parse_date(s).unwrap()
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email("  Ana@Example.COM ").unwrap(), "ana@example.com");
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ana@").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("eight888").is_ok());
        assert!(validate_password(&"x".repeat(72)).is_ok());
        assert!(validate_password(&"x".repeat(73)).is_err());
    }

    #[test]
    fn test_validate_display_name() {
        assert_eq!(validate_display_name("  bob  ").unwrap(), "bob");
        assert!(validate_display_name("   ").is_err());
        assert!(validate_display_name(&"x".repeat(64)).is_ok());
        assert!(validate_display_name(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_store_name() {
        assert_eq!(validate_store_name(" Main St ").unwrap(), "Main St");
        assert!(validate_store_name("").is_err());
        assert!(validate_store_name(&"s".repeat(101)).is_err());
    }

    #[test]
    fn optional_text_blank_is_none() {
        assert_eq!(normalize_optional_text(Some("  "), "notes", 10).unwrap(), None);
        assert_eq!(normalize_optional_text(None, "notes", 10).unwrap(), None);
        assert_eq!(
            normalize_optional_text(Some(" close "), "notes", 10).unwrap(),
            Some("close".into())
        );
        assert!(normalize_optional_text(Some("way too long"), "notes", 5).is_err());
    }

    #[test]
    fn date_range_defaults_and_bounds() {
        let today = date("2026-10-18");
        let (from, to) = resolve_date_range(None, None, today).unwrap();
        assert_eq!(from, today);
        assert_eq!(to, date("2026-11-15"));

        let (from, to) = resolve_date_range(Some("2026-10-01"), Some("2026-10-07"), today).unwrap();
        assert_eq!((from, to), (date("2026-10-01"), date("2026-10-07")));

        assert!(resolve_date_range(Some("2026-10-07"), Some("2026-10-01"), today).is_err());
        assert!(resolve_date_range(Some("10/07/2026"), None, today).is_err());
        assert!(resolve_date_range(Some("2026-01-01"), Some("2027-06-01"), today).is_err());
    }

    #[test]
    fn token_bundle_is_consistent() {
        let bundle = prepare_token_bundle("secret", "u1", "Ana", 1_792_000_000).unwrap();
        assert_eq!(bundle.response.user_id, "u1");
        assert_eq!(bundle.response.display_name, "Ana");
        assert_eq!(bundle.response.refresh_token, bundle.refresh_token);
        assert_eq!(bundle.token_hash, crate::crypto::hash_token(&bundle.refresh_token));
        assert_eq!(
            resolve_auth_token(&bundle.response.access_token, "secret", 1_792_000_010).unwrap(),
            "u1"
        );
    }

    #[test]
    fn auth_requires_configured_secret() {
        let err = resolve_auth_token("anything", "", 0).unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn sqlite_datetime_format() {
        assert_eq!(sqlite_datetime(0).unwrap(), "1970-01-01 00:00:00");
    }
}
