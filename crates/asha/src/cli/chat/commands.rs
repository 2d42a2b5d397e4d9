use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use asha_core::client::ChatClient;
use clap::{Parser, Subcommand};
use tokio::task::JoinSet;

use crate::cli::ux::{ChatMessageType, prompt_password, style_chat_text};

// -------------
// REPL commands
// -------------
#[derive(Parser, Debug)]
#[command(multicall = true)]
pub struct CliCommand {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Hash, PartialEq, Eq)]
pub enum Command {
    /// Upload a resume and list matching jobs.
    ///
    /// The upload runs in the background, keep chatting while it completes.
    #[command(alias = "u")]
    Upload {
        /// Path to the resume file
        path: Option<String>,
    },
    /// Log in with an email, the password is asked for.
    Login {
        /// Account email
        email: String,
    },
    /// Create an account with an email, the password is asked for.
    Signup {
        /// Account email
        email: String,
    },
    /// Show the user and conversation ids of this session.
    #[command(alias = "s")]
    Session,
    /// Exit the chat session
    #[command(alias = "q", alias = "quit")]
    Exit,
}

impl Command {
    /// Executes a REPL command. Requests are spawned onto `pending` and not awaited.
    ///
    /// Returns `Ok(false)` if the REPL should exit.
    pub async fn execute(
        self,
        client: Arc<ChatClient>,
        pending: &mut JoinSet<()>,
    ) -> Result<bool> {
        match self {
            Command::Upload { path } => execute_upload(client, pending, path),
            Command::Login { email } => execute_auth(client, pending, email, false),
            Command::Signup { email } => execute_auth(client, pending, email, true),
            Command::Session => execute_session(client).await,
            Command::Exit => {
                println!("Bye!");
                Ok(false)
            }
        }
    }
}

/// Expands `~` and environment variables in a user supplied path.
pub fn resolve_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(raw),
    }
}

fn execute_upload(
    client: Arc<ChatClient>,
    pending: &mut JoinSet<()>,
    path: Option<String>,
) -> Result<bool> {
    let path = path.as_deref().map(resolve_path);
    pending.spawn(async move {
        client.upload_resume(path.as_deref()).await;
    });
    Ok(true)
}

fn execute_auth(
    client: Arc<ChatClient>,
    pending: &mut JoinSet<()>,
    email: String,
    signup: bool,
) -> Result<bool> {
    let password = match tokio::task::block_in_place(prompt_password) {
        Ok(password) => password,
        Err(e) => {
            let error_msg = format!("Error reading password: {e}");
            eprintln!("{}", style_chat_text(&error_msg, ChatMessageType::Error));
            return Ok(true);
        }
    };

    pending.spawn(async move {
        if signup {
            client.signup(&email, &password).await;
        } else {
            client.login(&email, &password).await;
        }
    });
    Ok(true)
}

async fn execute_session(client: Arc<ChatClient>) -> Result<bool> {
    println!("User ID: {}", client.user_id().await);
    match client.conversation_id().await {
        Some(id) => println!("Conversation ID: {id}"),
        None => println!("Conversation ID: (none yet)"),
    }
    Ok(true)
}

/// Splits a REPL line into clap arguments, honoring quotes.
pub fn parse_command_line(line: &str) -> Vec<String> {
    let trimmed_line = line.trim();
    match shlex::split(trimmed_line) {
        Some(parsed) => parsed,
        // Unbalanced quotes, e.g. an apostrophe in a file name
        None => trimmed_line
            .split_whitespace()
            .map(|s| s.to_string())
            .collect(),
    }
}
