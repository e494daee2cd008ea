use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::error::{ClientError, ErrorBody, ErrorMessages, GENERIC_ERROR};
use crate::models::{CreateTodo, Deleted, Envelope, FieldErrors, Todo, UpdateTodo};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_ERROR_DISPLAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL the `/todos` routes hang off.
    pub base_url: String,
    /// A request taking longer than this fails as a transport error.
    pub request_timeout: Duration,
    /// How long an error banner stays up before it is cleared.
    pub error_display: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            error_display: DEFAULT_ERROR_DISPLAY,
        }
    }

    /// Reads the base URL from `TASKBOARD_API_URL`.
    pub fn from_env() -> Self {
        std::env::var("TASKBOARD_API_URL")
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_error_display(mut self, display: Duration) -> Self {
        self.error_display = display;
        self
    }
}

/// Thin typed wrapper over the REST contract.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn list_todos(&self) -> Result<Vec<Todo>, ClientError> {
        decode(self.http.get(self.url("/todos")).send().await?).await
    }

    pub async fn get_todo(&self, id: i64) -> Result<Todo, ClientError> {
        decode(self.http.get(self.url(&format!("/todos/{id}"))).send().await?).await
    }

    pub async fn create_todo(&self, req: &CreateTodo) -> Result<Todo, ClientError> {
        decode(self.http.post(self.url("/todos")).json(req).send().await?).await
    }

    pub async fn update_todo(&self, id: i64, req: &UpdateTodo) -> Result<Todo, ClientError> {
        let resp = self
            .http
            .put(self.url(&format!("/todos/{id}")))
            .json(req)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn delete_todo(&self, id: i64) -> Result<i64, ClientError> {
        let resp = self
            .http
            .delete(self.url(&format!("/todos/{id}")))
            .send()
            .await?;
        let deleted: Deleted = decode(resp).await?;
        Ok(deleted.id)
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    if status.is_success() {
        let envelope: Envelope<T> = resp.json().await?;
        return Ok(envelope.data);
    }

    let body = resp.bytes().await?;
    let (messages, fields) = match serde_json::from_slice::<ErrorBody>(&body) {
        Ok(body) => (body.error, body.fields),
        Err(_) => (ErrorMessages::single(GENERIC_ERROR), FieldErrors::new()),
    };

    Err(match status {
        StatusCode::BAD_REQUEST => ClientError::Validation { messages, fields },
        StatusCode::NOT_FOUND => ClientError::NotFound(messages),
        _ => ClientError::Server {
            status: status.as_u16(),
            messages,
        },
    })
}
