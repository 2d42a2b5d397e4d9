//! Wire types and HTTP client for the chat and resume service.
use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ServiceConfig;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Service returned status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Failed to read upload file: {0}")]
    File(#[from] std::io::Error),
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct Greeting {
    pub message: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    pub user_id: String,
    pub conversation_id: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct ChatReply {
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct ResumeUpload {
    #[serde(default)]
    pub resume_id: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub skills_detected: Option<Vec<String>>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct JobMatch {
    pub job_title: String,
    pub employer_name: String,
    #[serde(default)]
    pub job_city: Option<String>,
    #[serde(default)]
    pub job_country: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct JobMatches {
    #[serde(default)]
    pub matched_jobs: Option<Vec<JobMatch>>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Response of the signup and login endpoints. Failures carry a `detail` instead of a `message`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct AuthReply {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// A document selected for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content,
        }
    }

    /// Reads the file at `path`, keeping only its file name for the upload.
    pub async fn from_path(path: &Path) -> Result<Self, ServiceError> {
        let content = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resume".to_string());
        Ok(Self { file_name, content })
    }
}

/// The remote chat and resume service.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// `GET /`
    async fn greet(&self) -> Result<Greeting, ServiceError>;

    /// `POST /chat`
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ServiceError>;

    /// `POST /upload-resume/` as multipart with a single `file` field.
    async fn upload_resume(&self, file: UploadFile) -> Result<ResumeUpload, ServiceError>;

    /// `GET /match-jobs/{resume_id}`
    async fn match_jobs(&self, resume_id: &str) -> Result<JobMatches, ServiceError>;

    /// `POST /signup`
    async fn signup(&self, credentials: &Credentials) -> Result<AuthReply, ServiceError>;

    /// `POST /login`
    async fn login(&self, credentials: &Credentials) -> Result<AuthReply, ServiceError>;
}

/// [`ChatService`] over HTTP. No timeouts, retries or auth headers are applied.
#[derive(Debug, Clone)]
pub struct HttpChatService {
    base_url: Url,
    client: Client,
}

impl HttpChatService {
    pub fn new(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let mut builder = Client::builder();
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        let client = builder.build().map_err(|e| ServiceError::Transport {
            url: config.base_url.to_string(),
            source: e,
        })?;

        Ok(Self {
            base_url: config.base_url.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str], trailing_slash: bool) -> Result<Url, ServiceError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ServiceError::InvalidRequest(format!("{} cannot be a base url", self.base_url))
            })?;
            path.pop_if_empty().extend(segments);
            if trailing_slash {
                path.push("");
            }
        }
        Ok(url)
    }

    async fn send(
        &self,
        url: &Url,
        request: reqwest::RequestBuilder,
    ) -> Result<Response, ServiceError> {
        let response = request.send().await.map_err(|e| ServiceError::Transport {
            url: url.to_string(),
            source: e,
        })?;

        let status = response.status();
        debug!(%url, %status, "Service responded");
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ServiceError::Status { status, body });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(url: &Url, response: Response) -> Result<T, ServiceError> {
        response.json().await.map_err(|e| ServiceError::Decode {
            url: url.to_string(),
            source: e,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ServiceError> {
        let response = self.send(&url, self.client.get(url.clone())).await?;
        Self::decode(&url, response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, ServiceError> {
        let response = self
            .send(&url, self.client.post(url.clone()).json(body))
            .await?;
        Self::decode(&url, response).await
    }

    /// Auth endpoints report failures as `{detail}` bodies, so error statuses with such a body
    /// are returned as replies rather than errors.
    async fn post_auth(&self, url: Url, credentials: &Credentials) -> Result<AuthReply, ServiceError> {
        match self.post_json::<_, AuthReply>(url, credentials).await {
            Err(ServiceError::Status { status, body }) => {
                match serde_json::from_str::<AuthReply>(&body) {
                    Ok(reply) if reply.detail.is_some() => Ok(reply),
                    _ => Err(ServiceError::Status { status, body }),
                }
            }
            other => other,
        }
    }
}

#[async_trait]
impl ChatService for HttpChatService {
    #[instrument(skip(self))]
    async fn greet(&self) -> Result<Greeting, ServiceError> {
        let url = self.endpoint(&[], false)?;
        self.get_json(url).await
    }

    #[instrument(skip(self, request), fields(user_id = %request.user_id))]
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ServiceError> {
        let url = self.endpoint(&["chat"], false)?;
        self.post_json(url, request).await
    }

    #[instrument(skip(self, file), fields(file_name = %file.file_name, size = file.content.len()))]
    async fn upload_resume(&self, file: UploadFile) -> Result<ResumeUpload, ServiceError> {
        let url = self.endpoint(&["upload-resume"], true)?;
        let part = Part::bytes(file.content).file_name(file.file_name);
        let form = Form::new().part("file", part);
        let response = self
            .send(&url, self.client.post(url.clone()).multipart(form))
            .await?;
        Self::decode(&url, response).await
    }

    #[instrument(skip(self))]
    async fn match_jobs(&self, resume_id: &str) -> Result<JobMatches, ServiceError> {
        let url = self.endpoint(&["match-jobs", resume_id], false)?;
        self.get_json(url).await
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn signup(&self, credentials: &Credentials) -> Result<AuthReply, ServiceError> {
        let url = self.endpoint(&["signup"], false)?;
        self.post_auth(url, credentials).await
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn login(&self, credentials: &Credentials) -> Result<AuthReply, ServiceError> {
        let url = self.endpoint(&["login"], false)?;
        self.post_auth(url, credentials).await
    }
}
