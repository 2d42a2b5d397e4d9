use anyhow::{Result, bail};
use asha_core::client::{ChatClient, UploadOutcome};

use crate::cli::chat::resolve_path;
use crate::cli::ux::{TerminalRenderer, with_spinner};

/// Uploads a resume and prints its analysis and the matched jobs.
pub async fn execute(
    client: &ChatClient,
    renderer: &TerminalRenderer,
    file: Option<&str>,
) -> Result<()> {
    let path = file.map(resolve_path);
    let outcome = with_spinner(
        renderer,
        "Analyzing resume...",
        client.upload_resume(path.as_deref()),
    )
    .await;
    check_outcome(outcome)
}

fn check_outcome(outcome: UploadOutcome) -> Result<()> {
    match outcome {
        UploadOutcome::Matched { .. } | UploadOutcome::NoIdReturned => Ok(()),
        UploadOutcome::NoFile => bail!("No resume file given."),
        UploadOutcome::UploadFailed => {
            bail!("The resume upload failed. Rerun with --verbose for details.")
        }
        UploadOutcome::MatchFailed => {
            bail!("Job matching failed. Rerun with --verbose for details.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_outcome() {
        assert!(check_outcome(UploadOutcome::Matched { jobs: 0 }).is_ok());
        assert!(check_outcome(UploadOutcome::NoIdReturned).is_ok());
        assert!(check_outcome(UploadOutcome::NoFile).is_err());
        assert!(check_outcome(UploadOutcome::UploadFailed).is_err());
        assert!(check_outcome(UploadOutcome::MatchFailed).is_err());
    }
}
