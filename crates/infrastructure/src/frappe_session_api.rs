use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use smartpro_application::{
    AuthenticationApi, LoggedUserPayload, LoginPayload, SessionApi, UserPermissionsPayload,
    UserRolesPayload,
};
use smartpro_core::{AppError, AppResult};
use tracing::debug;
use url::Url;

const GET_USER_PERMISSIONS: &str = "smart_pro.smart_pro.api.projects.get_user_permissions";
const GET_USER_ROLES: &str = "smart_pro.smart_pro.api.projects.get_user_roles";
const GET_LOGGED_USER: &str = "frappe.auth.get_logged_user";
const LOGIN: &str = "login";
const LOGOUT: &str = "logout";

/// Whitelisted methods wrap their return value in `{"message": ...}`.
#[derive(Debug, Deserialize)]
struct MethodEnvelope<T> {
    message: Option<T>,
}

/// Session API adapter for a Frappe site exposing the Smart Pro app.
///
/// The session cookie is kept by the HTTP client, so one instance represents
/// one logged-in session.
pub struct FrappeSessionApi {
    http_client: reqwest::Client,
    base_url: Url,
}

impl FrappeSessionApi {
    /// Creates an adapter with its own cookie-keeping HTTP client.
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

        Self::with_client(http_client, base_url)
    }

    /// Creates an adapter around an existing HTTP client.
    ///
    /// The client must keep cookies for login to carry over to later calls.
    pub fn with_client(http_client: reqwest::Client, base_url: &str) -> AppResult<Self> {
        let base_url = Url::parse(base_url).map_err(|error| {
            AppError::Validation(format!("invalid site base url '{base_url}': {error}"))
        })?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    fn method_url(&self, method: &str) -> AppResult<Url> {
        self.base_url
            .join(&format!("/api/method/{method}"))
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to build url for method '{method}': {error}"
                ))
            })
    }

    async fn call_method<T>(&self, method: &str) -> AppResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let url = self.method_url(method)?;
        let response = self.http_client.get(url).send().await.map_err(|error| {
            AppError::Transport(format!("failed to call method '{method}': {error}"))
        })?;

        let body = read_success_body(method, response).await?;
        debug!(method, "remote method returned");
        decode_message(method, &body)
    }
}

#[async_trait]
impl SessionApi for FrappeSessionApi {
    async fn get_user_permissions(&self) -> AppResult<UserPermissionsPayload> {
        self.call_method(GET_USER_PERMISSIONS).await
    }

    async fn get_user_roles(&self) -> AppResult<UserRolesPayload> {
        self.call_method(GET_USER_ROLES).await
    }

    async fn get_logged_user(&self) -> AppResult<LoggedUserPayload> {
        let url = self.method_url(GET_LOGGED_USER)?;
        let response = self.http_client.get(url).send().await.map_err(|error| {
            AppError::Transport(format!(
                "failed to call method '{GET_LOGGED_USER}': {error}"
            ))
        })?;

        // The username is the envelope itself, so decode it whole.
        let body = read_success_body(GET_LOGGED_USER, response).await?;
        decode_json(GET_LOGGED_USER, &body)
    }
}

#[async_trait]
impl AuthenticationApi for FrappeSessionApi {
    async fn login(&self, username: &str, password: &str) -> AppResult<LoginPayload> {
        let url = self.method_url(LOGIN)?;
        let response = self
            .http_client
            .post(url)
            .json(&serde_json::json!({ "usr": username, "pwd": password }))
            .send()
            .await
            .map_err(|error| AppError::Transport(format!("failed to call login: {error}")))?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Err(AppError::Unauthorized(format!(
                "login rejected for user '{username}'"
            )));
        }

        let body = read_success_body(LOGIN, response).await?;
        decode_json(LOGIN, &body)
    }

    async fn logout(&self) -> AppResult<()> {
        let url = self.method_url(LOGOUT)?;
        let response = self
            .http_client
            .post(url)
            .send()
            .await
            .map_err(|error| AppError::Transport(format!("failed to call logout: {error}")))?;

        read_success_body(LOGOUT, response).await.map(|_| ())
    }
}

async fn read_success_body(method: &str, response: reqwest::Response) -> AppResult<String> {
    let status = response.status();
    let body = response.text().await.map_err(|error| {
        AppError::Transport(format!(
            "failed to read response body of method '{method}': {error}"
        ))
    })?;

    if !status.is_success() {
        return Err(AppError::Transport(format!(
            "method '{method}' returned status {}: {body}",
            status.as_u16()
        )));
    }

    Ok(body)
}

fn decode_json<T: DeserializeOwned>(method: &str, body: &str) -> AppResult<T> {
    serde_json::from_str(body).map_err(|error| {
        AppError::Transport(format!(
            "failed to parse response body of method '{method}': {error}"
        ))
    })
}

fn decode_message<T>(method: &str, body: &str) -> AppResult<T>
where
    T: DeserializeOwned + Default,
{
    let envelope: MethodEnvelope<T> = decode_json(method, body)?;
    Ok(envelope.message.unwrap_or_default())
}
