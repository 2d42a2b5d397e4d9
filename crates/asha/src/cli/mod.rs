//! Asha app cli definition and entrypoint.
mod ask;
mod auth;
mod chat;
mod session;
mod upload;
pub mod ux;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use asha_core::client::ChatClient;
use asha_core::config::{Config, get_config};
use asha_core::get_data_dir;
use asha_core::service::HttpChatService;
use asha_core::session::SessionContext;
use asha_core::storage::{FileStorage, LocalStorage, MemoryStorage};
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::cli::ux::{TerminalRenderer, get_theme};
use crate::log::setup_logging;

/// Asha - chat with a career assistant and match your resume to jobs.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show verbose logs.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Service url, overrides the one in the config file.
    #[arg(long, global = true)]
    url: Option<String>,

    /// Path to the config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Keep the session and the chat history in memory only.
    #[arg(long, global = true)]
    ephemeral: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Chat with Asha in an interactive session.
    Chat,
    /// Send one message and print the reply.
    Ask {
        /// Message to send.
        message: Vec<String>,
    },
    /// Upload a resume and list the matching jobs.
    Upload {
        /// Resume file to upload.
        file: Option<String>,
    },
    /// Show the user and conversation ids of the stored session.
    Session {
        /// Print the session as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Log in to the service, the password is asked for.
    Login {
        /// Account email.
        email: String,
    },
    /// Create an account, the password is asked for.
    Signup {
        /// Account email.
        email: String,
    },
}

/// Runs the main CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        setup_logging().context("Failed to set up logging")?;
    }

    let config = load_config(cli.config.clone(), cli.url.as_deref())?;
    debug!(service = %config.service.base_url, "Loaded configuration");
    let storage = open_storage(cli.ephemeral)?;

    if let Commands::Session { json } = cli.command {
        return session::execute(storage, json);
    }

    let service = Arc::new(
        HttpChatService::new(&config.service).context("Failed to create the service client")?,
    );
    let renderer = TerminalRenderer::new(get_theme(&config.theme));

    if cli.command == Commands::Chat {
        return chat::execute(service, renderer, storage, cli.ephemeral).await;
    }

    let renderer = Arc::new(renderer);
    let session = SessionContext::load(storage).context("Failed to load the chat session")?;
    let client = ChatClient::new(service, renderer.clone(), session);
    match &cli.command {
        Commands::Ask { message } => ask::execute(&client, &renderer, message.clone()).await,
        Commands::Upload { file } => upload::execute(&client, &renderer, file.as_deref()).await,
        Commands::Login { email } => auth::execute(&client, email, false).await,
        Commands::Signup { email } => auth::execute(&client, email, true).await,
        Commands::Chat | Commands::Session { .. } => Ok(()),
    }
}

fn load_config(config_path: Option<PathBuf>, url: Option<&str>) -> Result<Config> {
    let config = get_config(config_path).context("Failed to load configuration")?;
    match url {
        Some(url) => config
            .with_base_url(url)
            .context("Invalid --url argument"),
        None => Ok(config),
    }
}

fn open_storage(ephemeral: bool) -> Result<Arc<dyn LocalStorage>> {
    if ephemeral {
        return Ok(Arc::new(MemoryStorage::new()));
    }
    let data_dir = get_data_dir().context("Failed to get data directory")?;
    let storage = FileStorage::in_dir(&data_dir).context("Failed to open session storage")?;
    Ok(Arc::new(storage))
}
