use console::{Style, StyledObject};

/// Represents the type of a chat line, used for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMessageType {
    /// The prompt for user input.
    Prompt,
    /// Sender tag of a user message.
    User,
    /// Sender tag of a bot message.
    Bot,
    /// Secondary information, like the greeting or session details.
    Footer,
    /// An error or alert.
    Error,
}

/// Styles a string of text according to the specified `ChatMessageType`.
pub fn style_chat_text(text: &str, style: ChatMessageType) -> StyledObject<&str> {
    let style_obj = match style {
        ChatMessageType::Prompt => Style::new().blue().bold(),
        ChatMessageType::User => Style::new().blue(),
        ChatMessageType::Bot => Style::new().magenta().bold(),
        ChatMessageType::Footer => Style::new().white().dim(),
        ChatMessageType::Error => Style::new().red().bold(),
    };
    style_obj.apply_to(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_styles() {
        let styled = style_chat_text("test", ChatMessageType::Error);
        assert_eq!(
            styled.force_styling(true).to_string(),
            "\u{1b}[31m\u{1b}[1mtest\u{1b}[0m"
        );
    }

    #[test]
    fn test_unstyled_when_forced_off() {
        let styled = style_chat_text("asha:", ChatMessageType::Bot);
        assert_eq!(styled.force_styling(false).to_string(), "asha:");
    }
}
