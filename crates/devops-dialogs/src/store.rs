//! Conversation state storage.
//!
//! States are kept in memory and, when the store has a path, written to a
//! JSON file after every change so that sign-ins and selections survive a
//! restart.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::sync::{Mutex, RwLock, RwLockWriteGuard};
use tracing::{debug, error, info};

use crate::error::Result;
use crate::state::{ConversationState, SignIn};

/// Load conversation states from disk.
fn load_states(path: &Path) -> HashMap<String, ConversationState> {
    if !path.exists() {
        return HashMap::new();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<HashMap<String, ConversationState>>(&content) {
            Ok(states) => {
                info!(count = states.len(), "Loaded conversation states from disk");
                states
            }
            Err(e) => {
                error!(error = %e, path = %path.display(), "Failed to parse conversation state file");
                HashMap::new()
            }
        },
        Err(e) => {
            error!(error = %e, path = %path.display(), "Failed to read conversation state file");
            HashMap::new()
        }
    }
}

/// Conversation id to [`ConversationState`] map.
pub struct ConversationStore {
    path: Option<PathBuf>,
    states: RwLock<HashMap<String, ConversationState>>,
    /// Held while writing the file; taken before the state lock is released
    /// so snapshots reach the disk in the order they were taken.
    writer: Mutex<()>,
}

impl ConversationStore {
    /// A store that never touches the disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            states: RwLock::new(HashMap::new()),
            writer: Mutex::new(()),
        }
    }

    /// Opens the store backed by `path`, loading what is already there.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let states = load_states(&path);
        Self {
            path: Some(path),
            states: RwLock::new(states),
            writer: Mutex::new(()),
        }
    }

    /// State of a conversation; default when unknown.
    pub async fn get(&self, conversation_id: &str) -> ConversationState {
        self.states
            .read()
            .await
            .get(conversation_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Replaces the state of a conversation and persists.
    pub async fn put(&self, conversation_id: &str, state: ConversationState) -> Result<()> {
        let mut states = self.states.write().await;
        if states.get(conversation_id) == Some(&state) {
            return Ok(());
        }
        states.insert(conversation_id.to_string(), state);
        self.save(states).await
    }

    /// Number of known conversations.
    pub async fn len(&self) -> usize {
        self.states.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.states.read().await.is_empty()
    }

    /// Whether some conversation is waiting for OAuth state `nonce`.
    pub async fn has_pending_sign_in(&self, nonce: &str) -> bool {
        self.states
            .read()
            .await
            .values()
            .any(|state| state.pending_sign_in.as_deref() == Some(nonce))
    }

    /// Completes the sign-in started with OAuth state `nonce`.
    ///
    /// Returns the conversation id, or `None` when no conversation is
    /// waiting for that nonce. Each nonce is accepted once.
    pub async fn complete_sign_in(&self, nonce: &str, sign_in: SignIn) -> Result<Option<String>> {
        let mut states = self.states.write().await;
        let Some((conversation_id, state)) = states
            .iter_mut()
            .find(|(_, state)| state.pending_sign_in.as_deref() == Some(nonce))
        else {
            return Ok(None);
        };

        state.signed_in(sign_in);
        let conversation_id = conversation_id.clone();
        self.save(states).await?;
        info!(conversation_id = %conversation_id, "Sign-in completed");
        Ok(Some(conversation_id))
    }

    /// Serializes under the state lock, then writes the file after releasing it.
    async fn save(
        &self,
        states: RwLockWriteGuard<'_, HashMap<String, ConversationState>>,
    ) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(&*states)?;
        let count = states.len();
        let _writing = self.writer.lock().await;
        drop(states);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, json).await?;
        debug!(count, path = %path.display(), "Saved conversation states to disk");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devops_models::Profile;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_unknown_conversation_is_default() {
        let store = ConversationStore::in_memory();
        assert_eq!(store.get("42").await, ConversationState::default());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_persist_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state").join("conversations.json");

        let store = ConversationStore::open(&path);
        let state = ConversationState {
            account: Some("contoso".into()),
            team_project: Some("Fabrikam".into()),
            ..Default::default()
        };
        store.put("42", state.clone()).await.unwrap();
        assert!(path.exists());

        let reopened = ConversationStore::open(&path);
        assert_eq!(reopened.get("42").await, state);
        assert_eq!(reopened.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_puts_all_reach_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conversations.json");
        let store = std::sync::Arc::new(ConversationStore::open(&path));

        let writes = (0..16).map(|i| {
            let store = std::sync::Arc::clone(&store);
            tokio::spawn(async move {
                let state = ConversationState {
                    account: Some(format!("account-{}", i)),
                    ..Default::default()
                };
                store.put(&i.to_string(), state).await
            })
        });
        for write in join_handles(writes).await {
            write.unwrap().unwrap();
        }

        let reopened = ConversationStore::open(&path);
        assert_eq!(reopened.len().await, 16);
        assert_eq!(
            reopened.get("7").await.account.as_deref(),
            Some("account-7")
        );
    }

    async fn join_handles<T>(
        handles: impl Iterator<Item = tokio::task::JoinHandle<T>>,
    ) -> Vec<std::result::Result<T, tokio::task::JoinError>> {
        let mut results = Vec::new();
        for handle in handles.collect::<Vec<_>>() {
            results.push(handle.await);
        }
        results
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conversations.json");
        std::fs::write(&path, "not json").unwrap();

        let store = ConversationStore::open(&path);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_complete_sign_in_once() {
        let store = ConversationStore::in_memory();
        let state = ConversationState {
            pending_sign_in: Some("nonce-1".into()),
            ..Default::default()
        };
        store.put("42", state).await.unwrap();
        assert!(store.has_pending_sign_in("nonce-1").await);
        assert!(!store.has_pending_sign_in("nonce-2").await);

        let sign_in = SignIn::new("tok", Profile::new("me", "Me"));
        let conversation = store.complete_sign_in("nonce-1", sign_in.clone()).await.unwrap();
        assert_eq!(conversation.as_deref(), Some("42"));
        assert_eq!(store.get("42").await.access_token(), Some("tok"));

        let again = store.complete_sign_in("nonce-1", sign_in).await.unwrap();
        assert!(again.is_none());
        assert!(!store.has_pending_sign_in("nonce-1").await);
    }
}
