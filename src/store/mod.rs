//! Local draft store: single source of truth for in-memory draft state.
//!
//! Every mutation is synchronous, mirrored to a namespaced JSON state file so
//! a reload does not lose unsynced work, and announced to subscribers through
//! a watch channel. Store operations are total; a failed file write is logged
//! and never fails the mutation.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::models::{Draft, DraftPatch};

/// Durable local state, one JSON document per client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub draft: Draft,
    #[serde(default)]
    pub is_guest_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_session_id: Option<String>,
}

/// A point-in-time view of the draft handed to the upsert client.
///
/// The epoch identifies the logical draft the snapshot was taken from:
/// `clear()` and loader hydration start a new epoch, so an identity returned
/// by a create that started under an older epoch is discarded instead of
/// being attached to a draft it does not belong to.
#[derive(Debug, Clone)]
pub struct DraftSnapshot {
    pub draft: Draft,
    pub epoch: u64,
}

struct StoreState {
    persisted: PersistedState,
    epoch: u64,
}

/// Local draft store backed by a single state file.
pub struct LocalDraftStore {
    state: Mutex<StoreState>,
    tx: watch::Sender<Draft>,
    path: PathBuf,
    default_language: String,
}

impl LocalDraftStore {
    /// Open the store, hydrating from the state file if one exists.
    pub fn open(path: &Path, default_language: &str) -> Self {
        let persisted = match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<PersistedState>(&contents) {
                Ok(state) => state,
                Err(e) => {
                    tracing::warn!("Discarding unreadable draft state {:?}: {}", path, e);
                    Self::fresh_state(default_language)
                }
            },
            Err(_) => Self::fresh_state(default_language),
        };

        let (tx, _) = watch::channel(persisted.draft.clone());

        Self {
            state: Mutex::new(StoreState {
                persisted,
                epoch: 0,
            }),
            tx,
            path: path.to_path_buf(),
            default_language: default_language.to_string(),
        }
    }

    fn fresh_state(default_language: &str) -> PersistedState {
        PersistedState {
            draft: Draft::empty(default_language),
            is_guest_mode: false,
            guest_session_id: None,
        }
    }

    /// Merge a partial update into the current draft. Returns true if the
    /// query text changed, which is the signal to (re)arm the autosave timer.
    pub fn update(&self, patch: &DraftPatch) -> bool {
        let mut state = self.state.lock().unwrap();
        let query_changed = state.persisted.draft.apply(patch);
        self.persist_and_notify(&state);
        query_changed
    }

    /// Reset to the empty draft, dropping the remote identity association.
    /// A fresh draft is a new logical entity, so the epoch advances; guest
    /// session metadata survives.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        state.persisted.draft = Draft::empty(&self.default_language);
        state.epoch += 1;
        self.persist_and_notify(&state);
    }

    /// Attach the identity assigned by a successful remote create.
    ///
    /// `epoch` is the value captured when the create's snapshot was taken.
    /// If the store was cleared (or rehydrated) since, the late identity is
    /// discarded. Returns whether the identity was attached.
    pub fn set_identity(&self, id: &str, epoch: u64) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.epoch != epoch {
            tracing::info!("Discarding late identity {} for a cleared draft", id);
            return false;
        }
        state.persisted.draft.id = Some(id.to_string());
        self.persist_and_notify(&state);
        true
    }

    /// Replace the whole draft with a remotely loaded one. Starts a new
    /// epoch: any create still in flight belongs to the previous draft.
    pub fn replace(&self, draft: Draft) {
        let mut state = self.state.lock().unwrap();
        state.persisted.draft = draft;
        state.epoch += 1;
        self.persist_and_notify(&state);
    }

    /// Current draft plus the epoch it was read under.
    pub fn snapshot(&self) -> DraftSnapshot {
        let state = self.state.lock().unwrap();
        DraftSnapshot {
            draft: state.persisted.draft.clone(),
            epoch: state.epoch,
        }
    }

    /// Current draft value.
    pub fn draft(&self) -> Draft {
        self.state.lock().unwrap().persisted.draft.clone()
    }

    /// Established anonymous session, if any.
    pub fn guest_session_id(&self) -> Option<String> {
        self.state.lock().unwrap().persisted.guest_session_id.clone()
    }

    /// Record a newly minted anonymous session.
    pub fn set_guest_session(&self, id: &str) {
        let mut state = self.state.lock().unwrap();
        state.persisted.is_guest_mode = true;
        state.persisted.guest_session_id = Some(id.to_string());
        self.persist_and_notify(&state);
    }

    /// Subscribe to draft changes for UI binding.
    pub fn subscribe(&self) -> watch::Receiver<Draft> {
        self.tx.subscribe()
    }

    fn persist_and_notify(&self, state: &StoreState) {
        match serde_json::to_string_pretty(&state.persisted) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.path, json) {
                    tracing::warn!("Failed to persist draft state to {:?}: {}", self.path, e);
                }
            }
            Err(e) => {
                tracing::warn!("Failed to serialize draft state: {}", e);
            }
        }
        self.tx.send_replace(state.persisted.draft.clone());
    }
}
