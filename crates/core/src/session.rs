use std::sync::Arc;

use tracing::{debug, info};

use crate::storage::{LocalStorage, StorageError};

pub const USER_ID_KEY: &str = "user_id";
pub const CONVERSATION_ID_KEY: &str = "conversation_id";

const MAX_USER_NUMBER: u32 = 999_999;

/// Generates a fresh user identifier of the form `user_<n>` with `n` in `0..=999999`.
pub fn generate_user_id() -> String {
    format_user_id(rand::random_range(0..=MAX_USER_NUMBER))
}

fn format_user_id(n: u32) -> String {
    format!("user_{n}")
}

/// Identity of this client towards the service.
///
/// The `user_id` is created once per storage and never changes afterwards. The
/// `conversation_id` stays empty until the service hands one out in a chat reply.
pub struct SessionContext {
    storage: Arc<dyn LocalStorage>,
    user_id: String,
    conversation_id: Option<String>,
}

impl SessionContext {
    /// Loads the identity from `storage`, generating and persisting a user id if absent.
    pub fn load(storage: Arc<dyn LocalStorage>) -> Result<Self, StorageError> {
        Self::load_with(storage, generate_user_id)
    }

    /// Same as [`SessionContext::load`] with a custom user id generator.
    pub fn load_with(
        storage: Arc<dyn LocalStorage>,
        generate: impl FnOnce() -> String,
    ) -> Result<Self, StorageError> {
        let user_id = match non_empty(storage.get_item(USER_ID_KEY)) {
            Some(id) => id,
            None => {
                let id = generate();
                storage.set_item(USER_ID_KEY, &id)?;
                info!(user_id = %id, "Generated new user id");
                id
            }
        };
        let conversation_id = non_empty(storage.get_item(CONVERSATION_ID_KEY));
        debug!(%user_id, ?conversation_id, "Loaded session");

        Ok(Self {
            storage,
            user_id,
            conversation_id,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    /// Records the conversation id issued by the service, replacing any previous one.
    pub fn set_conversation_id(&mut self, conversation_id: &str) -> Result<(), StorageError> {
        if self.conversation_id.as_deref() == Some(conversation_id) {
            return Ok(());
        }
        self.storage
            .set_item(CONVERSATION_ID_KEY, conversation_id)?;
        debug!(
            previous = ?self.conversation_id,
            current = conversation_id,
            "Conversation id updated"
        );
        self.conversation_id = Some(conversation_id.to_string());
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
