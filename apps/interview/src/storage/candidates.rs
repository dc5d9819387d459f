use std::sync::Arc;

use tracing::info;

use super::{read_record, write_record, KeyValueStore, StorageError, CANDIDATES_KEY, LAST_RESULT_KEY};
use crate::models::candidate::{CandidateEntry, LastResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
}

/// Finished candidate records plus the most recent evaluation.
#[derive(Clone)]
pub struct CandidateStore {
    store: Arc<dyn KeyValueStore>,
}

impl CandidateStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// All stored candidates in insertion order. Corrupt data reads as empty.
    pub fn list(&self) -> Vec<CandidateEntry> {
        read_record(self.store.as_ref(), CANDIDATES_KEY).unwrap_or_default()
    }

    pub fn get(&self, id: &str) -> Option<CandidateEntry> {
        self.list().into_iter().find(|c| c.id == id)
    }

    /// Replaces the entry with the same email in place, or appends.
    pub fn upsert(&self, candidate: CandidateEntry) -> Result<Upsert, StorageError> {
        let mut candidates = self.list();
        let outcome = match candidates.iter().position(|c| c.email == candidate.email) {
            Some(idx) => {
                candidates[idx] = candidate;
                Upsert::Replaced
            }
            None => {
                candidates.push(candidate);
                Upsert::Inserted
            }
        };
        write_record(self.store.as_ref(), CANDIDATES_KEY, &candidates)?;
        info!("Candidate list saved ({outcome:?}, {} total)", candidates.len());
        Ok(outcome)
    }

    pub fn last_result(&self) -> Option<LastResult> {
        read_record(self.store.as_ref(), LAST_RESULT_KEY)
    }

    pub fn save_last_result(&self, result: &LastResult) -> Result<(), StorageError> {
        write_record(self.store.as_ref(), LAST_RESULT_KEY, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::CandidateStatus;
    use crate::models::evaluation::EvaluationResponse;
    use crate::storage::memory::MemoryStore;
    use chrono::Utc;

    fn candidate(id: &str, email: &str, score: u32) -> CandidateEntry {
        CandidateEntry {
            id: id.to_string(),
            name: format!("Candidate {id}"),
            email: email.to_string(),
            phone: "555-0000".to_string(),
            resume_file_name: None,
            final_score: score,
            status: CandidateStatus::Complete,
            history: vec![],
            summary: "Solid".to_string(),
            completed_at: None,
        }
    }

    #[test]
    fn test_upsert_new_email_appends() {
        let store = CandidateStore::new(Arc::new(MemoryStore::new()));
        assert_eq!(store.upsert(candidate("1", "a@x.com", 50)).unwrap(), Upsert::Inserted);
        assert_eq!(store.upsert(candidate("2", "b@x.com", 70)).unwrap(), Upsert::Inserted);
        assert_eq!(store.list().len(), 2);
    }

    #[test]
    fn test_upsert_same_email_replaces_in_place() {
        let store = CandidateStore::new(Arc::new(MemoryStore::new()));
        store.upsert(candidate("1", "a@x.com", 50)).unwrap();
        store.upsert(candidate("2", "b@x.com", 70)).unwrap();

        let outcome = store.upsert(candidate("3", "a@x.com", 90)).unwrap();

        assert_eq!(outcome, Upsert::Replaced);
        let list = store.list();
        assert_eq!(list.len(), 2, "count unchanged on update");
        assert_eq!(list[0].id, "3", "replaced at the original position");
        assert_eq!(list[0].final_score, 90);
        assert_eq!(list[1].id, "2");
    }

    #[test]
    fn test_corrupt_list_reads_as_empty() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(CANDIDATES_KEY, "[{\"id\": 1").unwrap();
        let store = CandidateStore::new(kv);

        assert!(store.list().is_empty());
        // A later save starts over from an empty list
        store.upsert(candidate("1", "a@x.com", 50)).unwrap();
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_get_by_id() {
        let store = CandidateStore::new(Arc::new(MemoryStore::new()));
        store.upsert(candidate("abc", "a@x.com", 50)).unwrap();
        assert_eq!(store.get("abc").map(|c| c.email), Some("a@x.com".to_string()));
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn test_last_result_roundtrip() {
        let store = CandidateStore::new(Arc::new(MemoryStore::new()));
        assert!(store.last_result().is_none());

        let result = LastResult {
            id: "r1".to_string(),
            name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
            final_score: 81,
            details: EvaluationResponse {
                total_score: 81,
                results: vec![],
                final_verdict: "Hire".to_string(),
            },
            recorded_at: Utc::now(),
        };
        store.save_last_result(&result).unwrap();
        assert_eq!(store.last_result(), Some(result));
    }
}
