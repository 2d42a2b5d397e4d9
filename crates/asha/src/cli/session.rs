use std::sync::Arc;

use anyhow::{Context, Result};
use asha_core::session::SessionContext;
use asha_core::storage::LocalStorage;
use serde_json::json;

/// Prints the stored session identity, creating the user id on first use.
pub fn execute(storage: Arc<dyn LocalStorage>, as_json: bool) -> Result<()> {
    let session = SessionContext::load(storage).context("Failed to load the chat session")?;
    println!("{}", format_session(&session, as_json)?);
    Ok(())
}

fn format_session(session: &SessionContext, as_json: bool) -> Result<String> {
    if as_json {
        let value = json!({
            "user_id": session.user_id(),
            "conversation_id": session.conversation_id(),
        });
        return Ok(serde_json::to_string_pretty(&value)?);
    }
    Ok(format!(
        "User ID: {}\nConversation ID: {}",
        session.user_id(),
        session.conversation_id().unwrap_or("(none yet)")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use asha_core::storage::MemoryStorage;

    #[test]
    fn test_format_session() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item("user_id", "user_7").unwrap();
        let mut session = SessionContext::load(storage).unwrap();

        assert_eq!(
            format_session(&session, false).unwrap(),
            "User ID: user_7\nConversation ID: (none yet)"
        );

        session.set_conversation_id("abc").unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&format_session(&session, true).unwrap()).unwrap();
        assert_eq!(value["user_id"], "user_7");
        assert_eq!(value["conversation_id"], "abc");
    }
}
