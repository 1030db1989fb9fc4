//! Remote upsert client: translates a draft snapshot into exactly one
//! remote write, choosing create or update from identity presence.

use std::sync::Arc;

use crate::cache::TtlCache;
use crate::db::ApplicationStore;
use crate::errors::AppError;
use crate::models::{ApplicationChanges, NewApplication};
use crate::session::UserRef;
use crate::store::{DraftSnapshot, LocalDraftStore};

/// What a save attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The gate rejected the snapshot before any remote call
    Skipped,
    /// A new record was created with this identity
    Created(String),
    /// The record with this identity was overwritten
    Updated(String),
}

/// Issues create/update writes against the application store and reconciles
/// assigned identities back into the local draft store.
pub struct RemoteUpsertClient {
    store: Arc<dyn ApplicationStore>,
    local: Arc<LocalDraftStore>,
    departments: Arc<TtlCache<String, String>>,
}

impl RemoteUpsertClient {
    pub fn new(
        store: Arc<dyn ApplicationStore>,
        local: Arc<LocalDraftStore>,
        departments: Arc<TtlCache<String, String>>,
    ) -> Self {
        Self {
            store,
            local,
            departments,
        }
    }

    /// Persist the snapshot remotely: update if it carries an identity,
    /// create otherwise. On create success the assigned identity is written
    /// back through the epoch guard; on failure the local store is left
    /// untouched so the next cycle retries the same decision.
    pub async fn save(
        &self,
        snapshot: DraftSnapshot,
        user: &UserRef,
    ) -> Result<SaveOutcome, AppError> {
        let draft = &snapshot.draft;

        if draft.query.trim().is_empty() {
            return Err(AppError::Validation("Query is required".to_string()));
        }
        if draft.department.trim().is_empty() {
            return Err(AppError::Validation("Department is required".to_string()));
        }

        let department_id = match &draft.department_id {
            Some(id) => Some(id.clone()),
            None => self.resolve_department(&draft.department).await,
        };

        match &draft.id {
            Some(id) => {
                let mut changes = ApplicationChanges::from_draft(draft);
                changes.department_id = department_id;

                self.store
                    .update_application(id, &changes)
                    .await
                    .map_err(|e| {
                        tracing::warn!("Update of application {} failed: {}", id, e);
                        AppError::RemoteWrite(format!(
                            "Update of application {} failed: {}",
                            id,
                            e.message()
                        ))
                    })?;

                Ok(SaveOutcome::Updated(id.clone()))
            }
            None => {
                let new = NewApplication {
                    owner_id: user.as_str().to_string(),
                    query: draft.query.clone(),
                    department: draft.department.clone(),
                    department_id,
                    subject: draft.subject.clone(),
                    applicant: draft.applicant.clone(),
                    language: draft.language.clone(),
                    template_id: draft.template_id.clone(),
                };

                let record = self.store.insert_application(&new).await.map_err(|e| {
                    tracing::warn!("Create failed: {}", e);
                    AppError::RemoteWrite(format!("Create failed: {}", e.message()))
                })?;

                // The next autosave must become an update, not a second
                // create. The epoch guard drops the identity if the draft
                // was cleared while this create was in flight.
                self.local.set_identity(&record.id, snapshot.epoch);

                Ok(SaveOutcome::Created(record.id))
            }
        }
    }

    /// Resolve a department name through the lookup cache. Resolution
    /// failure is non-fatal; the write proceeds without a department id.
    async fn resolve_department(&self, name: &str) -> Option<String> {
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }

        if let Some(id) = self.departments.get(&key) {
            return Some(id);
        }

        match self.store.find_department_id(name).await {
            Ok(Some(id)) => {
                // Remember the resolution so later saves skip the lookup.
                self.departments.insert(key, id.clone());
                Some(id)
            }
            Ok(None) => {
                tracing::debug!("No department matches {:?}", name);
                None
            }
            Err(e) => {
                tracing::warn!("Department lookup for {:?} failed: {}", name, e);
                None
            }
        }
    }
}
