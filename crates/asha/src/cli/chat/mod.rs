use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use asha_core::client::ChatClient;
use asha_core::get_data_dir;
use asha_core::service::ChatService;
use asha_core::storage::LocalStorage;

use crate::cli::ux::TerminalRenderer;

mod commands;
mod compl;
mod repl;

pub use commands::resolve_path;

const HISTORY_FILE: &str = "history.txt";

/// Executes the chat command, starting an interactive REPL session.
///
/// An `ephemeral` session keeps its line history in memory only.
pub async fn execute(
    service: Arc<dyn ChatService>,
    renderer: TerminalRenderer,
    storage: Arc<dyn LocalStorage>,
    ephemeral: bool,
) -> Result<()> {
    // The line editor already shows what the user typed
    let renderer = Arc::new(renderer.without_user_echo());
    let client = ChatClient::initialize(service, renderer, storage)
        .await
        .context("Failed to load the chat session")?;
    let history_file = history_path(ephemeral)?;

    repl::run(Arc::new(client), history_file.as_deref()).await
}

fn history_path(ephemeral: bool) -> Result<Option<PathBuf>> {
    if ephemeral {
        return Ok(None);
    }
    let data_dir = get_data_dir().context("Failed to get data directory")?;
    Ok(Some(data_dir.join(HISTORY_FILE)))
}
