use log::debug;

use super::memory::update_memory;
use super::store::{ LocalStore, StoreError, DARK_MODE_KEY, MEMORY_KEY, MESSAGES_KEY };
use crate::models::chat::{ Memory, Message };

/// Conversation state of one chat client, mirrored into the local store
/// after every change.
#[derive(Debug)]
pub struct ChatSession {
    store: LocalStore,
    messages: Vec<Message>,
    memory: Memory,
    dark_mode: bool,
}

impl ChatSession {
    pub fn load(store: LocalStore) -> Self {
        let messages: Vec<Message> = store.get(MESSAGES_KEY).unwrap_or_default();
        let memory: Memory = store.get(MEMORY_KEY).unwrap_or_default();
        let dark_mode = store.get(DARK_MODE_KEY).unwrap_or(false);
        debug!(
            "Loaded chat session from {}: {} message(s), dark_mode={}",
            store.path().display(),
            messages.len(),
            dark_mode
        );
        Self { store, messages, memory, dark_mode }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// Appends the student's message and refreshes memory from it.
    pub fn record_user(&mut self, text: &str) -> Result<(), StoreError> {
        self.messages.push(Message::user(text));
        self.memory = update_memory(&self.memory, text);
        self.store.set(MESSAGES_KEY, &self.messages)?;
        self.store.set(MEMORY_KEY, &self.memory)
    }

    pub fn record_assistant(&mut self, text: &str) -> Result<(), StoreError> {
        self.messages.push(Message::assistant(text));
        self.store.set(MESSAGES_KEY, &self.messages)
    }

    /// Drops all messages and memory, in memory and on disk. The theme is kept.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.messages.clear();
        self.memory = Memory::default();
        self.store.remove(MESSAGES_KEY)?;
        self.store.remove(MEMORY_KEY)
    }

    pub fn toggle_theme(&mut self) -> Result<bool, StoreError> {
        self.dark_mode = !self.dark_mode;
        self.store.set(DARK_MODE_KEY, &self.dark_mode)?;
        Ok(self.dark_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::store::temp_store_path;

    #[test]
    fn messages_and_memory_persist_across_loads() {
        let path = temp_store_path("session");
        let mut session = ChatSession::load(LocalStore::open(&path).unwrap());
        session.record_user("my name is Grace").unwrap();
        session.record_assistant("Hi Grace!").unwrap();

        let reloaded = ChatSession::load(LocalStore::open(&path).unwrap());
        assert_eq!(reloaded.messages(), &[Message::user("my name is Grace"), Message::assistant("Hi Grace!")]);
        assert_eq!(reloaded.memory().name, "Grace");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn clear_empties_persisted_messages_and_memory() {
        let path = temp_store_path("clear");
        let mut session = ChatSession::load(LocalStore::open(&path).unwrap());
        session.record_user("i want to learn heaps").unwrap();
        session.toggle_theme().unwrap();
        session.clear().unwrap();

        assert!(session.messages().is_empty());
        assert!(session.memory().is_empty());

        let store = LocalStore::open(&path).unwrap();
        assert!(!store.contains(MESSAGES_KEY));
        assert!(!store.contains(MEMORY_KEY));
        assert_eq!(store.get::<bool>(DARK_MODE_KEY), Some(true));
        std::fs::remove_file(path).ok();
    }
}
