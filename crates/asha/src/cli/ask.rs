use anyhow::{Result, bail};
use asha_core::client::{ChatClient, ChatOutcome};

use crate::cli::ux::{TerminalRenderer, with_spinner};

/// Sends a single message and prints the reply.
pub async fn execute(
    client: &ChatClient,
    renderer: &TerminalRenderer,
    message: Vec<String>,
) -> Result<()> {
    let message = message.join(" ");
    let outcome = with_spinner(renderer, "Waiting for a reply...", client.send_message(&message)).await;
    check_outcome(outcome)
}

fn check_outcome(outcome: ChatOutcome) -> Result<()> {
    match outcome {
        ChatOutcome::Replied | ChatOutcome::NoReply => Ok(()),
        ChatOutcome::Ignored => bail!("Nothing to send, the message is empty."),
        ChatOutcome::Failed => bail!("The chat request failed. Rerun with --verbose for details."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_outcome() {
        assert!(check_outcome(ChatOutcome::Replied).is_ok());
        assert!(check_outcome(ChatOutcome::NoReply).is_ok());
        assert!(check_outcome(ChatOutcome::Ignored).is_err());
        let err = check_outcome(ChatOutcome::Failed).unwrap_err();
        assert!(err.to_string().contains("--verbose"));
    }
}
