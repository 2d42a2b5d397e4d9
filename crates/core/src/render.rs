use std::fmt;

/// Author of a message in the chat output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Bot,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Bot => write!(f, "bot"),
        }
    }
}

/// Output surface of the chat client.
///
/// Every append puts the entry at the end of the output and scrolls it into view.
pub trait Renderer: Send + Sync {
    /// Appends a plain text message.
    fn append_message(&self, role: Role, text: &str);

    /// Appends a message carrying lightweight markup (line breaks, emphasis).
    fn append_markup(&self, role: Role, text: &str);

    /// Writes to the status area that holds the service greeting.
    fn show_status(&self, text: &str);

    /// Shows a blocking alert to the user.
    fn alert(&self, text: &str);
}

/// A single call made on a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Message(Role, String),
    Markup(Role, String),
    Status(String),
    Alert(String),
}

impl Rendered {
    pub fn role(&self) -> Option<Role> {
        match self {
            Rendered::Message(role, _) | Rendered::Markup(role, _) => Some(*role),
            Rendered::Status(_) | Rendered::Alert(_) => None,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Rendered::Message(_, text)
            | Rendered::Markup(_, text)
            | Rendered::Status(text)
            | Rendered::Alert(text) => text,
        }
    }
}

/// Renderer that keeps everything in memory instead of drawing it.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    entries: std::sync::Mutex<Vec<Rendered>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Rendered> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Entries appended to the chat output by `role`, in order.
    pub fn messages_by(&self, role: Role) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.role() == Some(role))
            .map(|e| e.text().to_string())
            .collect()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                Rendered::Alert(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, entry: Rendered) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }
}

impl Renderer for RecordingRenderer {
    fn append_message(&self, role: Role, text: &str) {
        self.record(Rendered::Message(role, text.to_string()));
    }

    fn append_markup(&self, role: Role, text: &str) {
        self.record(Rendered::Markup(role, text.to_string()));
    }

    fn show_status(&self, text: &str) {
        self.record(Rendered::Status(text.to_string()));
    }

    fn alert(&self, text: &str) {
        self.record(Rendered::Alert(text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_renderer_filters() {
        let renderer = RecordingRenderer::new();
        renderer.show_status("Welcome");
        renderer.append_message(Role::User, "Hello");
        renderer.append_markup(Role::Bot, "**Hi**");
        renderer.alert("Careful");

        assert_eq!(renderer.entries().len(), 4);
        assert_eq!(renderer.messages_by(Role::User), vec!["Hello"]);
        assert_eq!(renderer.messages_by(Role::Bot), vec!["**Hi**"]);
        assert_eq!(renderer.alerts(), vec!["Careful"]);
        assert_eq!(Role::Bot.to_string(), "bot");
    }
}
