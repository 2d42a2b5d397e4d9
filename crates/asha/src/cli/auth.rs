use anyhow::{Context, Result, bail};
use asha_core::client::{AuthOutcome, ChatClient};

use crate::cli::ux::prompt_password;

/// Signs up or logs in with `email`, asking for the password on the terminal.
pub async fn execute(client: &ChatClient, email: &str, signup: bool) -> Result<()> {
    let password = prompt_password().context("Failed to read password")?;
    let outcome = if signup {
        client.signup(email, &password).await
    } else {
        client.login(email, &password).await
    };
    check_outcome(outcome)
}

fn check_outcome(outcome: AuthOutcome) -> Result<()> {
    match outcome {
        AuthOutcome::Succeeded => Ok(()),
        AuthOutcome::Invalid => bail!("Both email and password are required."),
        AuthOutcome::Rejected => bail!("The credentials were rejected."),
        AuthOutcome::Failed => {
            bail!("The authentication request failed. Rerun with --verbose for details.")
        }
    }
}
