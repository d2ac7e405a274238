use crate::client::{StoreError, TaskStore};
use crate::dto;
use crate::routing_utils::{ApiResponse, ErrorBody};
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde_json::json;

/// Reads the success envelope out of an API response, or maps a failure
/// status onto a [StoreError].
async fn read_envelope<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, StoreError> {
    let status = response.status();
    if !status.is_success() {
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| "request failed".to_owned());
        return Err(StoreError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let envelope: ApiResponse<T> = response
        .json()
        .await
        .context("decoding API response body")?;

    Ok(envelope.data)
}

/// Client for the unauthenticated portion of the API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> ApiClient {
        ApiClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Creates an account and returns the registered user.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
    ) -> Result<dto::user::AuthenticatedUser, StoreError> {
        let response = self
            .http
            .post(format!("{}/auth/register", self.base_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .context("sending registration request")?;

        read_envelope(response).await
    }

    /// Exchanges credentials for a session token.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<dto::user::LoginData, StoreError> {
        let response = self
            .http
            .post(format!("{}/auth/login", self.base_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .context("sending login request")?;

        read_envelope(response).await
    }

    /// Builds the task store for a logged-in session using the token from
    /// [ApiClient::login].
    pub fn task_store(&self, token: impl Into<String>) -> RemoteTaskStore {
        RemoteTaskStore {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token: token.into(),
        }
    }
}

/// Task store backed by the remote API. Every request carries the session's
/// bearer token.
pub struct RemoteTaskStore {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl TaskStore for RemoteTaskStore {
    fn is_authenticated(&self) -> bool {
        true
    }

    async fn list(
        &self,
        params: &dto::task::TaskListParams,
    ) -> Result<dto::task::TaskPage, StoreError> {
        let response = self
            .http
            .get(format!("{}/tasks", self.base_url))
            .bearer_auth(&self.token)
            .query(params)
            .send()
            .await
            .context("sending task list request")?;

        read_envelope(response).await
    }

    async fn create(&self, new_task: &dto::task::NewTask) -> Result<dto::task::Task, StoreError> {
        let response = self
            .http
            .post(format!("{}/tasks", self.base_url))
            .bearer_auth(&self.token)
            .json(new_task)
            .send()
            .await
            .context("sending task creation request")?;

        read_envelope(response).await
    }

    async fn update(
        &self,
        task_id: i64,
        update: &dto::task::UpdateTask,
    ) -> Result<dto::task::Task, StoreError> {
        let response = self
            .http
            .put(format!("{}/tasks/{}", self.base_url, task_id))
            .bearer_auth(&self.token)
            .json(update)
            .send()
            .await
            .context("sending task update request")?;

        read_envelope(response).await
    }

    async fn delete(&self, task_id: i64) -> Result<(), StoreError> {
        let response = self
            .http
            .delete(format!("{}/tasks/{}", self.base_url, task_id))
            .bearer_auth(&self.token)
            .send()
            .await
            .context("sending task deletion request")?;

        read_envelope(response).await
    }
}
