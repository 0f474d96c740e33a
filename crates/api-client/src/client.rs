use std::time::Duration;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use shifttrack_api::*;

use crate::retry::{RetryConfig, retry_request};

const NO_QUERY: &[(&str, &str)] = &[];

/// A non-2xx answer from the server, carrying the `{"error": ..}` message.
#[derive(Debug, thiserror::Error)]
#[error("{status}: {message}")]
pub struct ApiStatusError {
    pub status: StatusCode,
    pub message: String,
}

/// HTTP status behind an error returned by [`ApiClient`], if the server answered.
pub fn status_of(err: &anyhow::Error) -> Option<StatusCode> {
    err.downcast_ref::<ApiStatusError>().map(|e| e.status)
}

/// Typed HTTP client for the ShiftTrack API.
///
/// High-level methods use the stored auth token. The `*_with_auth` raw
/// helpers take a token per call for callers juggling several users
/// (e.g. E2E tests).
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
    retry: RetryConfig,
}

impl ApiClient {
    /// Create a new client with the given base URL and timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create from an existing `reqwest::Client` (e.g. shared in tests).
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
            retry: RetryConfig::default(),
        }
    }

    /// Retry policy for GET requests. Writes are never retried.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn set_auth(&mut self, token: String) {
        self.auth_token = Some(token);
    }

    pub fn clear_auth(&mut self) {
        self.auth_token = None;
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Access the underlying `reqwest::Client`.
    pub fn reqwest_client(&self) -> &reqwest::Client {
        &self.client
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn token_or_bail(&self) -> Result<&str> {
        self.auth_token
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("auth token not set"))
    }

    async fn get_authed<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_authed_query(path, NO_QUERY).await
    }

    async fn get_authed_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T> {
        let token = self.token_or_bail()?;
        let url = self.url(path);
        let resp = retry_request(&self.retry, || {
            self.client.get(&url).bearer_auth(token).query(query)
        })
        .await?;
        parse_response(resp).await
    }

    async fn send_authed<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let token = self.token_or_bail()?;
        let mut req = self
            .client
            .request(method, self.url(path))
            .bearer_auth(token);
        if let Some(body) = body {
            req = req.json(body);
        }
        parse_response(req.send().await?).await
    }

    // ── Health ────────────────────────────────────────────────────────────

    pub async fn health(&self) -> Result<HealthResponse> {
        let url = self.url("/health");
        let resp = retry_request(&self.retry, || self.client.get(&url)).await?;
        parse_response(resp).await
    }

    // ── Auth ──────────────────────────────────────────────────────────────

    pub async fn register(&self, req: &AuthRegisterRequest) -> Result<AuthTokenResponse> {
        let resp = self
            .client
            .post(self.url("/auth/register"))
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<AuthTokenResponse> {
        let resp = self
            .client
            .post(self.url("/auth/login"))
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn refresh(&self, req: &RefreshRequest) -> Result<AuthTokenResponse> {
        let resp = self
            .client
            .post(self.url("/auth/refresh"))
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn logout(&self, req: &LogoutRequest) -> Result<OkResponse> {
        let resp = self
            .client
            .post(self.url("/auth/logout"))
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn me(&self) -> Result<UserProfileResponse> {
        self.get_authed("/auth/me").await
    }

    pub async fn update_me(&self, req: &UpdateProfileRequest) -> Result<UserProfileResponse> {
        self.send_authed(Method::PUT, "/auth/me", Some(req)).await
    }

    // ── Stores ────────────────────────────────────────────────────────────

    pub async fn create_store(&self, req: &CreateStoreRequest) -> Result<StoreResponse> {
        self.send_authed(Method::POST, "/stores", Some(req)).await
    }

    pub async fn list_stores(&self) -> Result<ListStoresResponse> {
        self.get_authed("/stores").await
    }

    pub async fn get_store(&self, id: &str) -> Result<StoreDetailResponse> {
        self.get_authed(&format!("/stores/{id}")).await
    }

    pub async fn update_store(&self, id: &str, req: &UpdateStoreRequest) -> Result<StoreResponse> {
        self.send_authed(Method::PUT, &format!("/stores/{id}"), Some(req))
            .await
    }

    pub async fn regenerate_join_code(&self, id: &str) -> Result<JoinCodeResponse> {
        self.send_authed::<_, ()>(Method::POST, &format!("/stores/{id}/join-code"), None)
            .await
    }

    pub async fn join_store(&self, req: &JoinStoreRequest) -> Result<JoinStoreResponse> {
        self.send_authed(Method::POST, "/stores/join", Some(req)).await
    }

    // ── Members ───────────────────────────────────────────────────────────

    pub async fn list_members(&self, store_id: &str) -> Result<ListMembersResponse> {
        self.get_authed(&format!("/stores/{store_id}/members"))
            .await
    }

    pub async fn list_manager_requests(&self, store_id: &str) -> Result<ListManagerRequestsResponse> {
        self.get_authed(&format!("/stores/{store_id}/manager-requests"))
            .await
    }

    pub async fn approve_manager_request(
        &self,
        store_id: &str,
        user_id: &str,
    ) -> Result<DecisionResponse> {
        self.send_authed::<_, ()>(
            Method::POST,
            &format!("/stores/{store_id}/manager-requests/{user_id}/approve"),
            None,
        )
        .await
    }

    pub async fn reject_manager_request(
        &self,
        store_id: &str,
        user_id: &str,
    ) -> Result<DecisionResponse> {
        self.send_authed::<_, ()>(
            Method::POST,
            &format!("/stores/{store_id}/manager-requests/{user_id}/reject"),
            None,
        )
        .await
    }

    pub async fn transfer_primary(
        &self,
        store_id: &str,
        req: &TransferPrimaryRequest,
    ) -> Result<OkResponse> {
        self.send_authed(Method::POST, &format!("/stores/{store_id}/primary"), Some(req))
            .await
    }

    pub async fn remove_manager(&self, store_id: &str, user_id: &str) -> Result<OkResponse> {
        self.send_authed::<_, ()>(
            Method::DELETE,
            &format!("/stores/{store_id}/managers/{user_id}"),
            None,
        )
        .await
    }

    pub async fn remove_employee(&self, store_id: &str, user_id: &str) -> Result<OkResponse> {
        self.send_authed::<_, ()>(
            Method::DELETE,
            &format!("/stores/{store_id}/employees/{user_id}"),
            None,
        )
        .await
    }

    // ── Schedules ─────────────────────────────────────────────────────────

    pub async fn create_schedule(
        &self,
        store_id: &str,
        req: &CreateScheduleRequest,
    ) -> Result<ScheduleResponse> {
        self.send_authed(Method::POST, &format!("/stores/{store_id}/schedules"), Some(req))
            .await
    }

    pub async fn list_schedules(&self, store_id: &str) -> Result<ListSchedulesResponse> {
        self.get_authed(&format!("/stores/{store_id}/schedules"))
            .await
    }

    pub async fn get_schedule(&self, id: &str) -> Result<ScheduleResponse> {
        self.get_authed(&format!("/schedules/{id}")).await
    }

    pub async fn delete_schedule(&self, id: &str) -> Result<OkResponse> {
        self.send_authed::<_, ()>(Method::DELETE, &format!("/schedules/{id}"), None)
            .await
    }

    pub async fn publish_schedule(&self, id: &str, published: bool) -> Result<ScheduleResponse> {
        self.send_authed(
            Method::POST,
            &format!("/schedules/{id}/publish"),
            Some(&PublishScheduleRequest { published }),
        )
        .await
    }

    /// Week view for the week holding `date` (`YYYY-MM-DD`).
    pub async fn week_view(&self, store_id: &str, date: &str) -> Result<WeekViewResponse> {
        self.get_authed(&format!("/stores/{store_id}/weeks/{date}"))
            .await
    }

    // ── Shifts ────────────────────────────────────────────────────────────

    pub async fn create_shift(
        &self,
        schedule_id: &str,
        req: &CreateShiftRequest,
    ) -> Result<ShiftResponse> {
        self.send_authed(
            Method::POST,
            &format!("/schedules/{schedule_id}/shifts"),
            Some(req),
        )
        .await
    }

    pub async fn update_shift(&self, id: &str, req: &UpdateShiftRequest) -> Result<ShiftResponse> {
        self.send_authed(Method::PUT, &format!("/shifts/{id}"), Some(req))
            .await
    }

    pub async fn delete_shift(&self, id: &str) -> Result<OkResponse> {
        self.send_authed::<_, ()>(Method::DELETE, &format!("/shifts/{id}"), None)
            .await
    }

    pub async fn my_shifts(&self, range: &DateRangeQuery) -> Result<MyShiftsResponse> {
        self.get_authed_query("/me/shifts", range).await
    }

    // ── Availability ──────────────────────────────────────────────────────

    pub async fn list_availability(&self, range: &DateRangeQuery) -> Result<ListAvailabilityResponse> {
        self.get_authed_query("/availability", range).await
    }

    pub async fn upsert_availability(
        &self,
        req: &UpsertAvailabilityRequest,
    ) -> Result<AvailabilityResponse> {
        self.send_authed(Method::PUT, "/availability", Some(req)).await
    }

    pub async fn delete_availability(&self, date: &str) -> Result<OkResponse> {
        self.send_authed::<_, ()>(Method::DELETE, &format!("/availability/{date}"), None)
            .await
    }

    // ── Raw helpers (for E2E / advanced usage) ────────────────────────────

    /// Unauthenticated GET returning the raw response.
    pub async fn get_raw(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    /// Authenticated GET returning the raw response.
    pub async fn get_with_auth(&self, path: &str, token: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    /// Authenticated POST (no body) returning the raw response.
    pub async fn post_with_auth(&self, path: &str, token: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    /// Authenticated POST with JSON body returning the raw response.
    pub async fn post_json_with_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    /// Authenticated PUT with JSON body returning the raw response.
    pub async fn put_json_with_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        Ok(self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    /// Authenticated DELETE returning the raw response.
    pub async fn delete_with_auth(&self, path: &str, token: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    /// Unauthenticated POST with JSON body returning the raw response.
    pub async fn post_json_raw<T: Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        Ok(self.client.post(self.url(path)).json(body).send().await?)
    }
}

/// Parse an HTTP response: the deserialized body on 2xx, otherwise an
/// [`ApiStatusError`] with the server's error message.
async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        return Err(ApiStatusError { status, message }.into());
    }
    Ok(resp.json().await?)
}
