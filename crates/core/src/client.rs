//! Request sequencing for the chat and resume upload flows.
//!
//! Each operation is independent: nothing here serializes concurrent calls, so two messages sent
//! back to back may have their replies rendered in either order.
use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::render::{Renderer, Role};
use crate::service::{ChatRequest, ChatService, Credentials, JobMatch, ResumeUpload, UploadFile};
use crate::session::SessionContext;
use crate::storage::{LocalStorage, StorageError};

pub const FAILED_REPLY_TEXT: &str = "⚠ Sorry, something went wrong. Please try again.";
pub const NO_FILE_ALERT: &str = "Please select a resume file to upload.";
pub const UPLOADING_TEXT: &str = "📤 Uploading resume...";
pub const UPLOAD_FAILED_TEXT: &str = "❌ Error uploading resume.";
pub const NO_RESUME_ID_TEXT: &str = "✅ Resume processed, but no resume ID was returned.";
pub const NO_JOBS_TEXT: &str = "⚠ No matching jobs found for your resume.";
pub const MATCH_FAILED_TEXT: &str = "❌ Error matching jobs.";
pub const MISSING_CREDENTIALS_ALERT: &str = "Please enter both email and password.";
pub const AUTH_FAILED_TEXT: &str = "❌ Could not reach the authentication service.";

const NOT_AVAILABLE: &str = "N/A";
const DEFAULT_CITY: &str = "Remote";

/// Final state of a chat exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatOutcome {
    /// Empty input, nothing was sent.
    Ignored,
    /// The service answered with a reply.
    Replied,
    /// The service answered without a reply.
    NoReply,
    /// The request failed or the response could not be decoded.
    Failed,
}

/// Final state of a resume upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// No file was selected, nothing was sent.
    NoFile,
    UploadFailed,
    NoIdReturned,
    /// Jobs were matched; zero means the "no jobs" message was shown.
    Matched { jobs: usize },
    MatchFailed,
}

/// Final state of a signup or login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Email or password missing, nothing was sent.
    Invalid,
    Succeeded,
    /// The service refused the credentials.
    Rejected,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthAction {
    Signup,
    Login,
}

impl AuthAction {
    fn default_message(self) -> &'static str {
        match self {
            AuthAction::Signup => "✅ User created successfully",
            AuthAction::Login => "✅ Login successful",
        }
    }
}

/// Chat client bound to one service, one output and one session identity.
pub struct ChatClient {
    service: Arc<dyn ChatService>,
    renderer: Arc<dyn Renderer>,
    session: RwLock<SessionContext>,
}

impl ChatClient {
    pub fn new(
        service: Arc<dyn ChatService>,
        renderer: Arc<dyn Renderer>,
        session: SessionContext,
    ) -> Self {
        Self {
            service,
            renderer,
            session: RwLock::new(session),
        }
    }

    /// Loads (or creates) the session identity from `storage` and shows the service greeting.
    ///
    /// Only storage failures are returned; a failed greeting is logged and otherwise ignored.
    pub async fn initialize(
        service: Arc<dyn ChatService>,
        renderer: Arc<dyn Renderer>,
        storage: Arc<dyn LocalStorage>,
    ) -> Result<Self, StorageError> {
        let session = SessionContext::load(storage)?;
        let client = Self::new(service, renderer, session);
        client.greet().await;
        Ok(client)
    }

    /// Fetches the greeting and writes it to the status area.
    pub async fn greet(&self) -> bool {
        match self.service.greet().await {
            Ok(greeting) => {
                self.renderer.show_status(&greeting.message);
                true
            }
            Err(e) => {
                error!(error = %e, "Error fetching greeting");
                false
            }
        }
    }

    pub async fn user_id(&self) -> String {
        self.session.read().await.user_id().to_string()
    }

    pub async fn conversation_id(&self) -> Option<String> {
        self.session
            .read()
            .await
            .conversation_id()
            .map(str::to_string)
    }

    /// Sends one chat message and renders the outcome.
    pub async fn send_message(&self, input: &str) -> ChatOutcome {
        let message = input.trim();
        if message.is_empty() {
            return ChatOutcome::Ignored;
        }

        self.renderer.append_message(Role::User, message);

        let request = {
            let session = self.session.read().await;
            ChatRequest {
                message: message.to_string(),
                user_id: session.user_id().to_string(),
                conversation_id: session.conversation_id().map(str::to_string),
            }
        };
        debug!(conversation_id = ?request.conversation_id, "Sending chat message");

        let reply = match self.service.chat(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, "Error sending message");
                self.renderer.append_message(Role::Bot, FAILED_REPLY_TEXT);
                return ChatOutcome::Failed;
            }
        };

        let outcome = match reply.reply.as_deref().filter(|r| !r.is_empty()) {
            Some(text) => {
                self.renderer.append_message(Role::Bot, text);
                ChatOutcome::Replied
            }
            None => ChatOutcome::NoReply,
        };

        if let Some(conversation_id) = reply.conversation_id.as_deref().filter(|c| !c.is_empty())
        {
            let mut session = self.session.write().await;
            if let Err(e) = session.set_conversation_id(conversation_id) {
                error!(error = %e, "Failed to persist conversation id");
            }
        }

        outcome
    }

    /// Uploads the resume at `file` and, when the service assigns it an id, renders matching jobs.
    pub async fn upload_resume(&self, file: Option<&Path>) -> UploadOutcome {
        let Some(path) = file else {
            self.renderer.alert(NO_FILE_ALERT);
            return UploadOutcome::NoFile;
        };

        self.renderer.append_message(Role::Bot, UPLOADING_TEXT);

        let upload = match UploadFile::from_path(path).await {
            Ok(file) => self.service.upload_resume(file).await,
            Err(e) => Err(e),
        };
        let upload = match upload {
            Ok(upload) => upload,
            Err(e) => {
                error!(error = %e, path = %path.display(), "Error uploading resume");
                self.renderer.append_message(Role::Bot, UPLOAD_FAILED_TEXT);
                return UploadOutcome::UploadFailed;
            }
        };
        info!(resume_id = ?upload.resume_id, "Resume uploaded");

        if let Some(analysis) = format_resume_analysis(&upload) {
            self.renderer.append_markup(Role::Bot, &analysis);
        }

        match upload.resume_id.as_deref().filter(|id| !id.is_empty()) {
            Some(resume_id) => self.match_jobs(resume_id).await,
            None => {
                self.renderer.append_message(Role::Bot, NO_RESUME_ID_TEXT);
                UploadOutcome::NoIdReturned
            }
        }
    }

    async fn match_jobs(&self, resume_id: &str) -> UploadOutcome {
        let matches = match self.service.match_jobs(resume_id).await {
            Ok(matches) => matches,
            Err(e) => {
                error!(error = %e, resume_id, "Error matching jobs");
                self.renderer.append_message(Role::Bot, MATCH_FAILED_TEXT);
                return UploadOutcome::MatchFailed;
            }
        };

        let jobs = matches.matched_jobs.unwrap_or_default();
        if jobs.is_empty() {
            self.renderer.append_message(Role::Bot, NO_JOBS_TEXT);
        } else {
            self.renderer.append_markup(Role::Bot, &format_job_matches(&jobs));
        }
        UploadOutcome::Matched { jobs: jobs.len() }
    }

    pub async fn signup(&self, email: &str, password: &str) -> AuthOutcome {
        self.authenticate(AuthAction::Signup, email, password).await
    }

    pub async fn login(&self, email: &str, password: &str) -> AuthOutcome {
        self.authenticate(AuthAction::Login, email, password).await
    }

    async fn authenticate(&self, action: AuthAction, email: &str, password: &str) -> AuthOutcome {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            self.renderer.alert(MISSING_CREDENTIALS_ALERT);
            return AuthOutcome::Invalid;
        }

        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let result = match action {
            AuthAction::Signup => self.service.signup(&credentials).await,
            AuthAction::Login => self.service.login(&credentials).await,
        };

        match result {
            Ok(reply) => match reply.detail {
                Some(detail) => {
                    info!(?action, %detail, "Authentication rejected");
                    self.renderer
                        .append_message(Role::Bot, &format!("❌ {detail}"));
                    AuthOutcome::Rejected
                }
                None => {
                    let message = reply
                        .message
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| action.default_message().to_string());
                    self.renderer.append_message(Role::Bot, &message);
                    AuthOutcome::Succeeded
                }
            },
            Err(e) => {
                error!(?action, error = %e, "Authentication request failed");
                self.renderer.append_message(Role::Bot, AUTH_FAILED_TEXT);
                AuthOutcome::Failed
            }
        }
    }
}

/// Summary and skills block for an uploaded resume, or `None` when the service sent neither.
pub fn format_resume_analysis(upload: &ResumeUpload) -> Option<String> {
    let summary = upload.summary.as_deref().filter(|s| !s.is_empty());
    if summary.is_none() && upload.skills_detected.is_none() {
        return None;
    }

    let skills = upload
        .skills_detected
        .as_ref()
        .map(|skills| skills.join(", "))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    Some(format!(
        "📄 **Summary:** {}\n🛠 **Skills:** {}",
        summary.unwrap_or(NOT_AVAILABLE),
        skills
    ))
}

/// One display line for a matched job.
pub fn format_job_line(job: &JobMatch) -> String {
    let city = job
        .job_city
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CITY);
    let country = job.job_country.as_deref().unwrap_or_default();
    format!(
        "✅ {} at {} ({}, {})",
        job.job_title, job.employer_name, city, country
    )
}

pub fn format_job_matches(jobs: &[JobMatch]) -> String {
    jobs.iter()
        .map(format_job_line)
        .collect::<Vec<_>>()
        .join("\n")
}
