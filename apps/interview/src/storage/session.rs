use std::sync::Arc;

use super::{read_record, write_record, KeyValueStore, StorageError, SESSION_KEY};
use crate::models::interview::InterviewSession;

/// Serializes the live interview snapshot. Has no state of its own.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn load(&self) -> Option<InterviewSession> {
        read_record(self.store.as_ref(), SESSION_KEY)
    }

    pub fn save(&self, session: &InterviewSession) -> Result<(), StorageError> {
        write_record(self.store.as_ref(), SESSION_KEY, session)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(SESSION_KEY)
    }
}
