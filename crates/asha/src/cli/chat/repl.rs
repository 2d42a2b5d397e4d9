use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use asha_core::client::ChatClient;
use clap::{CommandFactory, Parser};
use rustyline::error::ReadlineError;
use rustyline::{CompletionType, Editor, history::DefaultHistory};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::cli::chat::commands::{CliCommand, parse_command_line};
use crate::cli::chat::compl::Repl;
use crate::cli::ux::{ChatMessageType, style_chat_text};

/// Formats the prompt, showing the session identity above the input marker.
pub fn format_prompt(user_id: &str, conversation_id: Option<&str>) -> String {
    let prompt_meta = format!(
        "[user: {} | conversation: {}]",
        user_id,
        conversation_id.unwrap_or("new")
    );
    format!(
        "\n{}\n{}",
        style_chat_text(&prompt_meta, ChatMessageType::Prompt),
        style_chat_text("> ", ChatMessageType::Prompt)
    )
}

/// Names of the REPL commands and all their aliases, with the leading `/`.
pub fn command_names() -> Vec<String> {
    CliCommand::command()
        .get_subcommands()
        .flat_map(|c| std::iter::once(c.get_name()).chain(c.get_all_aliases()))
        .map(|s| format!("/{s}"))
        .collect()
}

/// Runs the chat loop until `/exit` or Ctrl-D.
///
/// Every message and upload is spawned as its own task, so a slow reply never blocks
/// the next input. Replies render in the order they complete.
///
/// Line history is loaded from and saved to `history_file` when one is given.
pub async fn run(client: Arc<ChatClient>, history_file: Option<&Path>) -> Result<()> {
    println!("Welcome to asha chat! Type '/help' for commands, '/q' to exit.");

    let config = rustyline::Config::builder()
        .history_ignore_dups(true)?
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .build();

    let mut rl: Editor<Repl, DefaultHistory> = Editor::with_config(config)?;
    rl.set_helper(Some(Repl::new(command_names())));
    if let Some(history_file) = history_file {
        if let Err(e) = rl.load_history(history_file) {
            debug!(error = %e, path = %history_file.display(), "No chat history loaded");
        }
    }

    let mut pending = JoinSet::new();
    let result = read_loop(&mut rl, client, &mut pending).await;

    if !pending.is_empty() {
        println!("Waiting for {} pending request(s)...", pending.len());
    }
    while let Some(joined) = pending.join_next().await {
        if let Err(e) = joined {
            warn!(error = %e, "Chat task failed");
        }
    }

    if let Some(history_file) = history_file {
        if let Err(e) = rl.save_history(history_file) {
            warn!(error = %e, path = %history_file.display(), "Failed to save chat history");
        }
    }
    result
}

async fn read_loop(
    rl: &mut Editor<Repl, DefaultHistory>,
    client: Arc<ChatClient>,
    pending: &mut JoinSet<()>,
) -> Result<()> {
    loop {
        // Reap finished exchanges
        while let Some(joined) = pending.try_join_next() {
            if let Err(e) = joined {
                warn!(error = %e, "Chat task failed");
            }
        }

        let prompt = format_prompt(
            &client.user_id().await,
            client.conversation_id().await.as_deref(),
        );
        let readline = tokio::task::block_in_place(|| rl.readline(&prompt));
        match readline {
            Ok(line) => {
                rl.add_history_entry(&line)?;
                let trimmed_line = line.trim();

                if trimmed_line.is_empty() {
                    continue;
                }

                if trimmed_line.starts_with('/') {
                    let args = parse_command_line(trimmed_line);
                    match CliCommand::try_parse_from(args) {
                        Ok(cli_command) => {
                            if !cli_command
                                .command
                                .execute(client.clone(), pending)
                                .await?
                            {
                                return Ok(());
                            }
                        }
                        Err(e) => {
                            e.print()?;
                        }
                    }
                } else {
                    let client = client.clone();
                    let message = trimmed_line.to_string();
                    pending.spawn(async move {
                        client.send_message(&message).await;
                    });
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Type /quit to exit.");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nBye!");
                return Ok(());
            }
            Err(err) => {
                return Err(err.into());
            }
        }
    }
}
