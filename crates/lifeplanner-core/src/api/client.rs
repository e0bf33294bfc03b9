use reqwest::header::{HeaderMap, ACCEPT, CACHE_CONTROL, RETRY_AFTER};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::ApiError;
use crate::model::{
    NewProject, NewTask, Priority, Project, ProjectPatch, Task, TaskPatch, TaskStatus,
};
use crate::storage::ApiConfig;

/// Wait used when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(5);

/// Client for the `/lifeplanner` REST API.
///
/// Connection failures and 429 responses are retried, sharing one budget of
/// `max_retries` per call. 502 and 503 fail immediately as
/// [`ApiError::Unavailable`].
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base: Url,
    max_retries: u32,
    retry_delay: Duration,
}

impl BackendClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut root = Url::parse(&config.base_url)?;
        if !root.path().ends_with('/') {
            let path = format!("{}/", root.path());
            root.set_path(&path);
        }
        let base = root.join("lifeplanner/")?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base,
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// Root of every endpoint, e.g. `http://localhost:8000/lifeplanner/`.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub async fn health(&self) -> Result<(), ApiError> {
        self.send(Method::GET, "health", None).await.map(drop)
    }

    // ── Projects ────────────────────────────────────────────────────────

    pub async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        let projects: Vec<Project> = self.fetch(Method::GET, "projects/", None).await?;
        debug!(count = projects.len(), "projects listed");
        Ok(projects)
    }

    pub async fn get_project(&self, id: i64) -> Result<Project, ApiError> {
        self.fetch(Method::GET, &format!("projects/{id}"), None).await
    }

    pub async fn create_project(&self, project: &NewProject) -> Result<Project, ApiError> {
        self.fetch(Method::POST, "projects/", Some(encode(project)?)).await
    }

    pub async fn update_project(&self, id: i64, patch: &ProjectPatch) -> Result<Project, ApiError> {
        self.fetch(Method::PATCH, &format!("projects/{id}"), Some(encode(patch)?)).await
    }

    pub async fn delete_project(&self, id: i64) -> Result<(), ApiError> {
        self.send(Method::DELETE, &format!("projects/{id}"), None)
            .await
            .map(drop)
    }

    // ── Tasks ───────────────────────────────────────────────────────────

    pub async fn list_tasks(&self, project_id: i64) -> Result<Vec<Task>, ApiError> {
        self.fetch(Method::GET, &format!("tasks/?project_id={project_id}"), None).await
    }

    pub async fn create_task(&self, project_id: i64, task: &NewTask) -> Result<Task, ApiError> {
        self.fetch(
            Method::POST,
            &format!("tasks/project/{project_id}"),
            Some(encode(task)?),
        )
        .await
    }

    pub async fn update_task(&self, task_id: i64, patch: &TaskPatch) -> Result<Task, ApiError> {
        self.fetch(Method::PUT, &format!("tasks/{task_id}"), Some(encode(patch)?)).await
    }

    pub async fn update_task_priority(
        &self,
        task_id: i64,
        priority: Priority,
    ) -> Result<Task, ApiError> {
        self.fetch(
            Method::PATCH,
            &format!("tasks/{task_id}/priority"),
            Some(json!({ "priority": priority })),
        )
        .await
    }

    pub async fn set_task_status(
        &self,
        task_id: i64,
        status: TaskStatus,
    ) -> Result<Task, ApiError> {
        self.fetch(
            Method::PUT,
            &format!("tasks/{task_id}/status"),
            Some(json!({ "status": status })),
        )
        .await
    }

    /// Move the task to the next status in the pending/in-progress/completed cycle.
    pub async fn advance_task_status(&self, task: &Task) -> Result<Task, ApiError> {
        let next = task.status.next();
        debug!(task_id = task.id, from = ?task.status, to = ?next, "advancing task status");
        self.set_task_status(task.id, next).await
    }

    pub async fn delete_task(&self, task_id: i64) -> Result<(), ApiError> {
        self.send(Method::DELETE, &format!("tasks/{task_id}"), None)
            .await
            .map(drop)
    }

    // ── Transport ───────────────────────────────────────────────────────

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let response = self.send(method, path, body).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Response, ApiError> {
        let url = self.base.join(path)?;
        let mut retries_left = self.max_retries;

        loop {
            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .header(ACCEPT, "application/json")
                .header(CACHE_CONTROL, "no-cache");
            if let Some(body) = &body {
                request = request.json(body);
            }

            debug!(%method, %url, "backend request");
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(status = response.status().as_u16(), "backend response");
                    return Ok(response);
                }
                Ok(response) => match response.status() {
                    StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE => {
                        warn!(status = response.status().as_u16(), %url, "backend unavailable");
                        return Err(ApiError::Unavailable(response.status().as_u16()));
                    }
                    StatusCode::TOO_MANY_REQUESTS if retries_left > 0 => {
                        let wait = retry_after(response.headers());
                        warn!(wait_secs = wait.as_secs(), retries_left, "rate limited, retrying");
                        retries_left -= 1;
                        tokio::time::sleep(wait).await;
                    }
                    status => {
                        let body = response.text().await.unwrap_or_default();
                        warn!(status = status.as_u16(), %url, "backend rejected request");
                        return Err(ApiError::Status {
                            status: status.as_u16(),
                            body,
                        });
                    }
                },
                Err(e) if e.is_connect() && retries_left > 0 => {
                    warn!(retries_left, %url, "connection failed, retrying: {e}");
                    retries_left -= 1;
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

fn encode<T: Serialize>(payload: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(payload).map_err(|e| ApiError::Encode(e.to_string()))
}

fn retry_after(headers: &HeaderMap) -> Duration {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map_or(DEFAULT_RETRY_AFTER, Duration::from_secs)
}
