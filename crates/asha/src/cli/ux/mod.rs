mod presenter;
mod progress;
mod render;

pub use presenter::{ChatMessageType, style_chat_text};
pub use progress::GenerationSpinner;
pub use render::*;

use console::{Term, style};

/// Prints a formatted error message to stderr.
pub fn present_error(error: anyhow::Error) {
    let error_text = style("ERROR:").red().bold();
    eprintln!("\n{error_text} {error:#}");
}

/// Reads a password from the terminal without echoing it.
pub fn prompt_password() -> std::io::Result<String> {
    let term = Term::stderr();
    term.write_str("Password: ")?;
    term.read_secure_line()
}

/// Shows a spinner while `future` runs, printing renderer output above it.
pub async fn with_spinner<F: Future>(
    renderer: &TerminalRenderer,
    message: &str,
    future: F,
) -> F::Output {
    let spinner = GenerationSpinner::new(message.to_string());
    renderer.attach_spinner(spinner.progress_bar());
    let output = future.await;
    renderer.detach_spinner();
    spinner.clear();
    output
}
