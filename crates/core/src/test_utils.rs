//! Test utilities for asha-core crate
//!
//! Shared helpers for config files and a scripted in-process [`ChatService`].

use std::collections::VecDeque;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::Builder;

use crate::render::{RecordingRenderer, Rendered};
use crate::service::{
    AuthReply, ChatReply, ChatRequest, ChatService, Credentials, Greeting, JobMatches,
    ResumeUpload, ServiceError, UploadFile,
};

/// Creates a temporary config file with the given content.
/// Uses tempfile::Builder to ensure unique directories for parallel tests.
///
/// # Panics
/// Panics if temp directory creation or file writing fails.
pub fn create_temp_config(content: &str) -> PathBuf {
    let temp_dir = Builder::new()
        .prefix("asha-test")
        .rand_bytes(8)
        .tempdir()
        .unwrap();
    let config_path = temp_dir.path().join("asha.yml");
    File::create(&config_path)
        .unwrap()
        .write_all(content.as_bytes())
        .unwrap();
    // Keep the temp directory alive by leaking it (this is just for tests)
    let _ = Box::leak(Box::new(temp_dir));
    config_path
}

pub fn fake_error() -> ServiceError {
    ServiceError::InvalidRequest("simulated failure".to_string())
}

#[derive(Default)]
struct FakeState {
    greeting: Option<Result<String, ()>>,
    chat_replies: VecDeque<Result<ChatReply, ServiceError>>,
    chat_requests: Vec<ChatRequest>,
    upload: Option<Result<ResumeUpload, ServiceError>>,
    uploaded_sizes: Vec<usize>,
    matches: Option<Result<JobMatches, ServiceError>>,
    matched_resume_ids: Vec<String>,
    auth_replies: VecDeque<Result<AuthReply, ServiceError>>,
    calls: usize,
    observed: Option<Arc<RecordingRenderer>>,
    entries_seen_at_chat: Vec<Vec<Rendered>>,
}

/// A [`ChatService`] answering from scripted responses and recording every request.
///
/// Unscripted calls fail with [`fake_error`], except chat which answers with an empty reply.
#[derive(Default)]
pub struct FakeService {
    state: Mutex<FakeState>,
}

impl FakeService {
    pub fn set_greeting(&self, greeting: Result<&str, ()>) {
        self.state.lock().unwrap().greeting = Some(greeting.map(str::to_string));
    }

    pub fn push_chat(&self, reply: Result<ChatReply, ServiceError>) {
        self.state.lock().unwrap().chat_replies.push_back(reply);
    }

    pub fn set_upload(&self, upload: Result<ResumeUpload, ServiceError>) {
        self.state.lock().unwrap().upload = Some(upload);
    }

    pub fn set_matches(&self, matches: Result<JobMatches, ServiceError>) {
        self.state.lock().unwrap().matches = Some(matches);
    }

    pub fn push_auth(&self, reply: Result<AuthReply, ServiceError>) {
        self.state.lock().unwrap().auth_replies.push_back(reply);
    }

    /// Snapshots `renderer` whenever a chat request arrives.
    pub fn observe_with(&self, renderer: Arc<RecordingRenderer>) {
        self.state.lock().unwrap().observed = Some(renderer);
    }

    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.state.lock().unwrap().chat_requests.clone()
    }

    pub fn entries_seen_at_chat(&self) -> Vec<Vec<Rendered>> {
        self.state.lock().unwrap().entries_seen_at_chat.clone()
    }

    pub fn uploaded_sizes(&self) -> Vec<usize> {
        self.state.lock().unwrap().uploaded_sizes.clone()
    }

    pub fn matched_resume_ids(&self) -> Vec<String> {
        self.state.lock().unwrap().matched_resume_ids.clone()
    }

    /// Number of requests received on any endpoint.
    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls
    }
}

#[async_trait]
impl ChatService for FakeService {
    async fn greet(&self) -> Result<Greeting, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        match state.greeting.clone() {
            Some(Ok(message)) => Ok(Greeting { message }),
            _ => Err(fake_error()),
        }
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        state.chat_requests.push(request.clone());
        if let Some(renderer) = state.observed.clone() {
            state.entries_seen_at_chat.push(renderer.entries());
        }
        state
            .chat_replies
            .pop_front()
            .unwrap_or_else(|| Ok(ChatReply::default()))
    }

    async fn upload_resume(&self, file: UploadFile) -> Result<ResumeUpload, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        state.uploaded_sizes.push(file.content.len());
        state.upload.take().unwrap_or_else(|| Err(fake_error()))
    }

    async fn match_jobs(&self, resume_id: &str) -> Result<JobMatches, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        state.matched_resume_ids.push(resume_id.to_string());
        state.matches.take().unwrap_or_else(|| Err(fake_error()))
    }

    async fn signup(&self, _credentials: &Credentials) -> Result<AuthReply, ServiceError> {
        self.next_auth()
    }

    async fn login(&self, _credentials: &Credentials) -> Result<AuthReply, ServiceError> {
        self.next_auth()
    }
}

impl FakeService {
    fn next_auth(&self) -> Result<AuthReply, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        state
            .auth_replies
            .pop_front()
            .unwrap_or_else(|| Err(fake_error()))
    }
}
