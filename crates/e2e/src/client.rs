use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use uuid::Uuid;

use shifttrack_api::{
    AuthRegisterRequest, AuthTokenResponse, CreateStoreRequest, JoinStoreRequest,
    JoinStoreResponse, StoreResponse, StoreRole,
};
use shifttrack_api_client::{ApiClient, RetryConfig};

/// Holds connection info for a test run.
pub struct TestContext {
    pub api: ApiClient,
}

/// A registered test user with credentials.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
    pub password: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// A store created for one spec, with its primary manager.
#[derive(Debug, Clone)]
pub struct TestStore {
    pub id: String,
    pub join_code: String,
    pub owner: TestUser,
}

impl TestContext {
    pub fn new(base_url: String) -> Self {
        Self {
            api: ApiClient::with_client(reqwest::Client::new(), &base_url)
                .with_retry(RetryConfig::none()),
        }
    }

    /// Build a full API URL from a path like `/health`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.api.base_url(), path)
    }

    /// A typed client that acts as `user`.
    pub fn client_for(&self, user: &TestUser) -> ApiClient {
        let mut api = ApiClient::with_client(self.api.reqwest_client().clone(), self.api.base_url())
            .with_retry(RetryConfig::none());
        api.set_auth(user.access_token.clone());
        api
    }

    /// Register a fresh user with a unique email.
    pub async fn register_user(&self) -> Result<TestUser> {
        let id = Uuid::new_v4();
        let short = &id.to_string()[..8];
        let email = format!("test-{id}@e2e.local");
        let display_name = format!("e2e-{short}");
        let password = "testpass99".to_string();

        let resp = self
            .api
            .post_json_raw(
                "/auth/register",
                &AuthRegisterRequest {
                    email: email.clone(),
                    password: password.clone(),
                    display_name: display_name.clone(),
                },
            )
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("register failed ({status}): {body}"));
        }
        let tokens: AuthTokenResponse = resp.json().await?;

        Ok(TestUser {
            user_id: tokens.user_id,
            display_name: tokens.display_name,
            email,
            password,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        })
    }

    /// Register an owner and create a store with them as primary manager.
    pub async fn setup_store(&self) -> Result<TestStore> {
        let owner = self.register_user().await?;
        let store: StoreResponse = self
            .client_for(&owner)
            .create_store(&CreateStoreRequest {
                name: format!("e2e-store-{}", &Uuid::new_v4().to_string()[..8]),
                address: None,
            })
            .await
            .context("create store")?;
        let join_code = store
            .join_code
            .context("owner should see the join code")?;
        Ok(TestStore {
            id: store.id,
            join_code,
            owner,
        })
    }

    /// Register a user and join `store` in `role`.
    pub async fn join(&self, store: &TestStore, role: StoreRole) -> Result<(TestUser, JoinStoreResponse)> {
        let user = self.register_user().await?;
        let joined = self
            .client_for(&user)
            .join_store(&JoinStoreRequest {
                join_code: store.join_code.clone(),
                role,
            })
            .await
            .with_context(|| format!("join as {role}"))?;
        Ok((user, joined))
    }

    /// Register a user and make them an approved manager of `store`.
    pub async fn add_manager(&self, store: &TestStore) -> Result<TestUser> {
        let (user, _) = self.join(store, StoreRole::Manager).await?;
        self.client_for(&store.owner)
            .approve_manager_request(&store.id, &user.user_id)
            .await
            .context("approve manager")?;
        Ok(user)
    }

    // ── HTTP convenience methods (delegate to ApiClient) ──────────────

    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        self.api.get_raw(path).await
    }

    pub async fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<reqwest::Response> {
        self.api.post_json_raw(path, body).await
    }

    pub async fn get_authed(&self, path: &str, token: &str) -> Result<reqwest::Response> {
        self.api.get_with_auth(path, token).await
    }

    pub async fn post_authed(&self, path: &str, token: &str) -> Result<reqwest::Response> {
        self.api.post_with_auth(path, token).await
    }

    pub async fn post_json_authed<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        self.api.post_json_with_auth(path, token, body).await
    }

    pub async fn put_json_authed<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        self.api.put_json_with_auth(path, token, body).await
    }

    pub async fn delete_authed(&self, path: &str, token: &str) -> Result<reqwest::Response> {
        self.api.delete_with_auth(path, token).await
    }
}
