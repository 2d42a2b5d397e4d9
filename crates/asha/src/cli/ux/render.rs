use std::sync::Mutex;

use asha_core::render::{Renderer, Role};
use console::Term;
use indicatif::ProgressBar;
use syntect::{
    easy::HighlightLines,
    highlighting::{Theme, ThemeSet},
    parsing::SyntaxSet,
    util::{LinesWithEndings, as_24_bit_terminal_escaped},
};
use tracing::warn;

use super::{ChatMessageType, style_chat_text};

const USER_TAG: &str = "you ›";
const BOT_TAG: &str = "asha ›";

/// Highlight theme for bot replies, `light` or anything else for dark.
pub fn get_theme(theme_name: &str) -> Theme {
    let mut theme_set = ThemeSet::load_defaults();
    let theme_key = match theme_name {
        "light" => "InspiredGitHub",
        "dark" => "base16-ocean.dark",
        other => {
            warn!(theme = other, "Unknown theme, falling back to dark");
            "base16-ocean.dark"
        }
    };
    theme_set.themes.remove(theme_key).unwrap_or_default()
}

/// Renders chat output to the terminal.
///
/// Writes are serialized so lines from concurrent exchanges never interleave mid-line.
pub struct TerminalRenderer {
    out: Term,
    err: Term,
    syntax_set: SyntaxSet,
    theme: Theme,
    echo_user: bool,
    spinner: Mutex<Option<ProgressBar>>,
    write_lock: Mutex<()>,
}

impl TerminalRenderer {
    pub fn new(theme: Theme) -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
            echo_user: true,
            spinner: Mutex::new(None),
            write_lock: Mutex::new(()),
        }
    }

    /// Skips user messages, for when the line editor already shows what was typed.
    pub fn without_user_echo(mut self) -> Self {
        self.echo_user = false;
        self
    }

    /// Prints above `spinner` until [`TerminalRenderer::detach_spinner`] is called.
    pub fn attach_spinner(&self, spinner: ProgressBar) {
        if let Ok(mut slot) = self.spinner.lock() {
            *slot = Some(spinner);
        }
    }

    pub fn detach_spinner(&self) {
        if let Ok(mut slot) = self.spinner.lock() {
            *slot = None;
        }
    }

    /// Highlights `text` as markdown. Returns it unchanged when colors are disabled.
    pub fn highlight_markdown(&self, text: &str) -> String {
        if !console::colors_enabled() {
            return text.to_string();
        }

        let syntax = self
            .syntax_set
            .find_syntax_by_extension("md")
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());
        let mut highlighter = HighlightLines::new(syntax, &self.theme);

        let mut highlighted = String::new();
        for line in LinesWithEndings::from(text) {
            match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => highlighted.push_str(&as_24_bit_terminal_escaped(&ranges[..], false)),
                Err(_) => highlighted.push_str(line),
            }
        }
        // `as_24_bit_terminal_escaped` doesn't reset the color
        highlighted.push_str("\x1b[0m");
        highlighted
    }

    fn write(&self, term: &Term, text: &str) {
        let _guard = self.write_lock.lock();
        let spinner = self.spinner.lock().ok().and_then(|s| s.clone());
        let result = match spinner {
            Some(spinner) => spinner.suspend(|| term.write_line(text)),
            None => term.write_line(text),
        };
        if let Err(e) = result {
            warn!(error = %e, "Failed to write to terminal");
        }
    }
}

/// Prefixes `body` with the sender tag of `role`.
pub fn format_entry(role: Role, body: &str) -> String {
    let tag = match role {
        Role::User => style_chat_text(USER_TAG, ChatMessageType::User),
        Role::Bot => style_chat_text(BOT_TAG, ChatMessageType::Bot),
    };
    format!("{tag} {body}")
}

impl Renderer for TerminalRenderer {
    fn append_message(&self, role: Role, text: &str) {
        if role == Role::User && !self.echo_user {
            return;
        }
        self.write(&self.out, &format_entry(role, text));
    }

    fn append_markup(&self, role: Role, text: &str) {
        if role == Role::User && !self.echo_user {
            return;
        }
        let body = self.highlight_markdown(text);
        self.write(&self.out, &format_entry(role, &body));
    }

    fn show_status(&self, text: &str) {
        self.write(
            &self.out,
            &style_chat_text(text, ChatMessageType::Footer).to_string(),
        );
    }

    fn alert(&self, text: &str) {
        let alert = format!("⚠ {text}");
        self.write(
            &self.err,
            &style_chat_text(&alert, ChatMessageType::Error).to_string(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_entry_tags() {
        let user = console::strip_ansi_codes(&format_entry(Role::User, "Hello")).to_string();
        let bot = console::strip_ansi_codes(&format_entry(Role::Bot, "Hi there!")).to_string();
        assert_eq!(user, "you › Hello");
        assert_eq!(bot, "asha › Hi there!");
    }

    #[test]
    fn test_highlight_markdown_keeps_text() {
        let renderer = TerminalRenderer::new(get_theme("dark"));
        let text = "📄 **Summary:** N/A\n🛠 **Skills:** Python, SQL";
        let highlighted = renderer.highlight_markdown(text);
        assert_eq!(console::strip_ansi_codes(&highlighted), text);
    }

    #[test]
    fn test_get_theme_variants() {
        let dark = get_theme("dark");
        let light = get_theme("light");
        assert_ne!(dark.settings.background, light.settings.background);
        assert_eq!(
            get_theme("unknown").settings.background,
            dark.settings.background
        );
    }
}
