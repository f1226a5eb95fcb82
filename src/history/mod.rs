/// History ledger
///
/// Owns the `history` collection: one entry per user, each holding an
/// append-only sequence of illness records. Report payloads are stored as
/// base64 text so the collection document stays valid JSON; callers off the
/// store boundary deal in raw bytes.
use crate::{
    account::username_eq,
    error::{AppError, AppResult},
    store::JsonStore,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Collection name for per-user illness history
pub const HISTORY_COLLECTION: &str = "history";

/// Per-user history entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserHistory {
    pub username: String,
    pub illnesses: Vec<IllnessRecord>,
}

/// One recorded prediction outcome with its generated reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IllnessRecord {
    pub disease: String,
    pub timestamp: DateTime<Utc>,
    pub symptoms: Vec<String>,
    pub treatment_pdf: String,
    pub illness_pdf: String,
}

impl IllnessRecord {
    /// Decode the treatment report back to bytes
    pub fn treatment_bytes(&self) -> AppResult<Vec<u8>> {
        BASE64
            .decode(&self.treatment_pdf)
            .map_err(|_| AppError::CorruptData(HISTORY_COLLECTION.to_string()))
    }

    /// Decode the illness report back to bytes
    pub fn illness_bytes(&self) -> AppResult<Vec<u8>> {
        BASE64
            .decode(&self.illness_pdf)
            .map_err(|_| AppError::CorruptData(HISTORY_COLLECTION.to_string()))
    }
}

/// Illness record view without the embedded payloads
#[derive(Debug, Clone, Serialize)]
pub struct IllnessSummary {
    pub disease: String,
    pub timestamp: DateTime<Utc>,
    pub symptoms: Vec<String>,
}

impl From<&IllnessRecord> for IllnessSummary {
    fn from(record: &IllnessRecord) -> Self {
        Self {
            disease: record.disease.clone(),
            timestamp: record.timestamp,
            symptoms: record.symptoms.clone(),
        }
    }
}

/// History ledger service
#[derive(Clone)]
pub struct HistoryLedger {
    store: Arc<JsonStore>,
}

impl HistoryLedger {
    /// Create a new history ledger
    pub fn new(store: Arc<JsonStore>) -> Self {
        Self { store }
    }

    /// Append an illness record to a user's history, creating the entry on
    /// first use
    pub async fn append(
        &self,
        username: &str,
        disease: &str,
        symptoms: &[String],
        treatment_pdf: &[u8],
        illness_pdf: &[u8],
    ) -> AppResult<()> {
        let mut history: Vec<UserHistory> = self.store.load(HISTORY_COLLECTION).await?;

        let record = IllnessRecord {
            disease: disease.to_string(),
            timestamp: Utc::now(),
            symptoms: symptoms.to_vec(),
            treatment_pdf: BASE64.encode(treatment_pdf),
            illness_pdf: BASE64.encode(illness_pdf),
        };

        match history
            .iter_mut()
            .find(|entry| username_eq(&entry.username, username))
        {
            Some(entry) => entry.illnesses.push(record),
            None => history.push(UserHistory {
                username: username.to_string(),
                illnesses: vec![record],
            }),
        }

        self.store.save(HISTORY_COLLECTION, &history).await
    }

    /// Full illness history for a user, in insertion order; empty if unknown
    pub async fn history_for(&self, username: &str) -> AppResult<Vec<IllnessRecord>> {
        let history: Vec<UserHistory> = self.store.load(HISTORY_COLLECTION).await?;
        Ok(history
            .into_iter()
            .find(|entry| username_eq(&entry.username, username))
            .map(|entry| entry.illnesses)
            .unwrap_or_default())
    }

    /// Remove a user's whole history entry; used when the owning account is
    /// deleted. Returns whether an entry existed.
    pub async fn remove_user(&self, username: &str) -> AppResult<bool> {
        let mut history: Vec<UserHistory> = self.store.load(HISTORY_COLLECTION).await?;
        let before = history.len();
        history.retain(|entry| !username_eq(&entry.username, username));

        if history.len() == before {
            return Ok(false);
        }

        self.store.save(HISTORY_COLLECTION, &history).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup() -> (tempfile::TempDir, HistoryLedger) {
        let dir = tempdir().unwrap();
        let store = Arc::new(JsonStore::open(dir.path()).await.unwrap());
        (dir, HistoryLedger::new(store))
    }

    #[tokio::test]
    async fn test_append_and_read_round_trip() {
        let (_dir, ledger) = setup().await;

        let symptoms = vec!["Fever".to_string(), "Cough".to_string()];
        let treatment = b"%PDF-1.4 treatment".to_vec();
        let illness = b"%PDF-1.4 illness".to_vec();

        ledger
            .append("alice", "Influenza", &symptoms, &treatment, &illness)
            .await
            .unwrap();

        let records = ledger.history_for("alice").await.unwrap();
        assert_eq!(records.len(), 1);

        let last = records.last().unwrap();
        assert_eq!(last.disease, "Influenza");
        assert_eq!(last.symptoms, symptoms);
        assert_eq!(last.treatment_bytes().unwrap(), treatment);
        assert_eq!(last.illness_bytes().unwrap(), illness);
    }

    #[tokio::test]
    async fn test_appends_preserve_insertion_order() {
        let (_dir, ledger) = setup().await;

        ledger
            .append("alice", "Influenza", &["Fever".to_string()], b"a", b"b")
            .await
            .unwrap();
        ledger
            .append("alice", "Migraine", &["Headache".to_string()], b"c", b"d")
            .await
            .unwrap();

        let records = ledger.history_for("alice").await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].disease, "Influenza");
        assert_eq!(records[1].disease, "Migraine");
    }

    #[tokio::test]
    async fn test_unknown_user_reads_empty() {
        let (_dir, ledger) = setup().await;
        assert!(ledger.history_for("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_user_drops_whole_entry() {
        let (_dir, ledger) = setup().await;

        ledger
            .append("alice", "Influenza", &["Fever".to_string()], b"a", b"b")
            .await
            .unwrap();

        assert!(ledger.remove_user("ALICE").await.unwrap());
        assert!(ledger.history_for("alice").await.unwrap().is_empty());

        // Second removal has nothing to do
        assert!(!ledger.remove_user("alice").await.unwrap());
    }
}
