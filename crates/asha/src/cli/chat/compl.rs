use crate::cli::chat::commands::{CliCommand, Command, parse_command_line};
use crate::cli::ux::{ChatMessageType, style_chat_text};
use clap::Parser;
use rustyline::completion::{Candidate, Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::hint::Hinter;
use rustyline::{Helper, Highlighter, Validator};

/// Completion candidate for the REPL.
#[derive(Debug)]
pub struct CompletionCandidate {
    text: String,
    display_string: String,
}

impl CompletionCandidate {
    pub fn new(text: &str) -> Self {
        let display_string = style_chat_text(text, ChatMessageType::Footer).to_string();
        Self {
            text: text.to_owned(),
            display_string,
        }
    }
}

impl From<Pair> for CompletionCandidate {
    fn from(pair: Pair) -> Self {
        Self {
            text: pair.replacement,
            display_string: pair.display,
        }
    }
}

impl Candidate for CompletionCandidate {
    fn display(&self) -> &str {
        &self.display_string
    }

    fn replacement(&self) -> &str {
        &self.text
    }
}

/// REPL runtime state for command line editing.
#[derive(Helper, Validator, Highlighter)]
pub struct Repl {
    pub command_names: Vec<String>,
    pub file_completer: FilenameCompleter,
}

impl Repl {
    pub fn new(command_names: Vec<String>) -> Self {
        Self {
            command_names,
            file_completer: FilenameCompleter::new(),
        }
    }
}

impl Completer for Repl {
    type Candidate = CompletionCandidate;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &rustyline::Context<'_>,
    ) -> Result<(usize, Vec<Self::Candidate>), ReadlineError> {
        if !line.starts_with('/') {
            return Ok((0, Vec::new()));
        }

        // Arguments are completed only once the command name is complete
        if line[..pos].contains(' ') {
            let args = parse_command_line(line);
            return match CliCommand::try_parse_from(&args) {
                Ok(CliCommand {
                    command: Command::Upload { .. },
                }) => {
                    let (start, pairs) = self.file_completer.complete(line, pos, ctx)?;
                    Ok((start, pairs.into_iter().map(Into::into).collect()))
                }
                _ => Ok((0, Vec::new())),
            };
        }

        let candidates = self
            .command_names
            .iter()
            .filter(|name| name.starts_with(line))
            .map(|name| CompletionCandidate::new(name))
            .collect();

        Ok((0, candidates))
    }
}

impl Hinter for Repl {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<Self::Hint> {
        if line.is_empty() || pos < line.len() || !line.starts_with('/') {
            return None;
        }
        self.command_names
            .iter()
            .find(|&cmd_name| cmd_name.starts_with(line))
            .map(|cmd_name| cmd_name[line.len()..].into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustyline::history::DefaultHistory;

    fn repl() -> Repl {
        Repl::new(vec![
            "/upload".to_string(),
            "/u".to_string(),
            "/login".to_string(),
            "/session".to_string(),
            "/exit".to_string(),
        ])
    }

    #[test]
    fn test_command_name_completion() {
        let history = DefaultHistory::new();
        let ctx = rustyline::Context::new(&history);
        let repl = repl();

        let (start, candidates) = repl.complete("/u", 2, &ctx).unwrap();
        assert_eq!(start, 0);
        let names: Vec<_> = candidates.iter().map(|c| c.replacement()).collect();
        assert_eq!(names, vec!["/upload", "/u"]);

        let (_, candidates) = repl.complete("hello", 5, &ctx).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_upload_path_completion() {
        let history = DefaultHistory::new();
        let ctx = rustyline::Context::new(&history);
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("resume.pdf"), b"%PDF").unwrap();
        let repl = repl();

        let prefix = format!("{}/res", dir.path().display());
        let line = format!("/upload {prefix}");
        let (start, candidates) = repl.complete(&line, line.len(), &ctx).unwrap();

        assert_eq!(start, "/upload ".len());
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].replacement().ends_with("resume.pdf"));
    }

    #[test]
    fn test_no_argument_completion_for_other_commands() {
        let history = DefaultHistory::new();
        let ctx = rustyline::Context::new(&history);
        let line = "/login a";
        let (_, candidates) = repl().complete(line, line.len(), &ctx).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_command_hint() {
        let history = DefaultHistory::new();
        let ctx = rustyline::Context::new(&history);
        let repl = repl();
        assert_eq!(repl.hint("/ses", 4, &ctx), Some("sion".to_string()));
        assert_eq!(repl.hint("/ses", 2, &ctx), None);
        assert_eq!(repl.hint("ses", 3, &ctx), None);

        let repl = Repl::new(crate::cli::chat::repl::command_names());
        assert_eq!(repl.hint("/qu", 3, &ctx), Some("it".to_string()));
    }
}
