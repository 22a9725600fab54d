//! Edit-in-place status message

use std::sync::{Arc, Mutex};

use log::{debug, warn};

use crate::chat::{ChatClient, MessageHandle};

/// A single chat message that is updated in place for the whole session
#[derive(Clone)]
pub struct StatusMessage {
    chat: Arc<dyn ChatClient>,
    handle: MessageHandle,
    last_text: Arc<Mutex<Option<String>>>,
}

impl StatusMessage {
    pub fn new(chat: Arc<dyn ChatClient>, handle: MessageHandle) -> Self {
        Self {
            chat,
            handle,
            last_text: Arc::new(Mutex::new(None)),
        }
    }

    /// Replace the status text.
    ///
    /// Edits are cosmetic: a failure (message deleted, flood limit) is logged
    /// and reported as `false`, never propagated. Repeating the current text
    /// is skipped since the platform rejects no-op edits.
    pub async fn set(&self, text: &str) -> bool {
        if self.is_current(text) {
            debug!(
                "Status {}:{} already shows '{}'",
                self.handle.chat_id, self.handle.message_id, text
            );
            return true;
        }

        match self.chat.edit(&self.handle, text).await {
            Ok(()) => {
                debug!(
                    "Status {}:{} set to '{}'",
                    self.handle.chat_id, self.handle.message_id, text
                );
                self.remember(text);
                true
            }
            Err(e) => {
                warn!(
                    "Ignoring failed status edit on {}:{}: {}",
                    self.handle.chat_id, self.handle.message_id, e
                );
                false
            }
        }
    }

    fn is_current(&self, text: &str) -> bool {
        match self.last_text.lock() {
            Ok(last) => last.as_deref() == Some(text),
            Err(_) => false,
        }
    }

    fn remember(&self, text: &str) {
        if let Ok(mut last) = self.last_text.lock() {
            *last = Some(text.to_string());
        }
    }
}
