//! Hosted identity service client (GoTrue dialect).
//!
//! Every credential operation is delegated: this client never inspects or
//! stores a password or token beyond forwarding it. Failures collapse into
//! the small [`AuthError`] taxonomy; the HTTP layer maps those to 400/401.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::query::JsonObject;
use super::traits::BaseIdentityService;
use crate::domains::auth::{AuthError, AuthSession, AuthUser};

const AUTH_TIMEOUT_SECS: u64 = 10;

pub struct GoTrueClient {
    base_url: String,
    anon_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SessionPayload {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: UserPayload,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl From<SessionPayload> for AuthSession {
    fn from(payload: SessionPayload) -> Self {
        AuthSession {
            access_token: payload.access_token,
            refresh_token: payload.refresh_token,
            expires_in: payload.expires_in,
            user: AuthUser {
                id: payload.user.id,
                email: payload.user.email,
            },
        }
    }
}

impl GoTrueClient {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(AUTH_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.endpoint(path))
            .header("apikey", &self.anon_key)
    }

    /// Pull the service's error description out of a failure body, falling
    /// back to the raw text.
    fn error_message(body: &str) -> String {
        serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|value| {
                ["error_description", "msg", "message", "error"]
                    .iter()
                    .find_map(|key| value.get(key).and_then(Value::as_str).map(String::from))
            })
            .unwrap_or_else(|| body.to_string())
    }
}

#[async_trait]
impl BaseIdentityService for GoTrueClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let response = self
            .post("token")
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .context("Identity service sign-in request failed")?;

        if !response.status().is_success() {
            return Err(AuthError::InvalidCredentials);
        }

        let payload: SessionPayload = response
            .json()
            .await
            .context("Failed to parse identity service session")?;
        Ok(payload.into())
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: JsonObject,
    ) -> Result<AuthSession, AuthError> {
        let response = self
            .post("signup")
            .json(&json!({ "email": email, "password": password, "data": metadata }))
            .send()
            .await
            .context("Identity service sign-up request failed")?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::RegistrationFailed(Self::error_message(&body)));
        }

        let payload: SessionPayload = response
            .json()
            .await
            .context("Failed to parse identity service session")?;
        Ok(payload.into())
    }

    async fn verify_token(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let response = self
            .client
            .get(self.endpoint("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .context("Identity service verification request failed")?;

        if !response.status().is_success() {
            return Err(AuthError::InvalidToken);
        }

        let payload: UserPayload = response
            .json()
            .await
            .context("Failed to parse identity service user")?;
        Ok(AuthUser {
            id: payload.id,
            email: payload.email,
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        let response = self
            .post("token")
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .context("Identity service refresh request failed")?;

        if !response.status().is_success() {
            return Err(AuthError::InvalidToken);
        }

        let payload: SessionPayload = response
            .json()
            .await
            .context("Failed to parse identity service session")?;
        Ok(payload.into())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .post("logout")
            .bearer_auth(access_token)
            .send()
            .await
            .context("Identity service sign-out request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AuthError::Service(anyhow!(
                "Identity service sign-out error {}",
                status
            )));
        }
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let response = self
            .post("recover")
            .json(&json!({ "email": email }))
            .send()
            .await
            .context("Identity service recover request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AuthError::Service(anyhow!(
                "Identity service recover error {}",
                status
            )));
        }
        Ok(())
    }

    async fn update_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let response = self
            .client
            .put(self.endpoint("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .json(&json!({ "password": new_password }))
            .send()
            .await
            .context("Identity service password update request failed")?;

        if !response.status().is_success() {
            return Err(AuthError::InvalidToken);
        }
        Ok(())
    }
}
