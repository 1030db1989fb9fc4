//! Draft loader: hydrates the local draft store from a remote record.

use std::sync::Arc;

use crate::db::ApplicationStore;
use crate::errors::AppError;
use crate::models::Draft;
use crate::store::LocalDraftStore;

pub struct DraftLoader {
    store: Arc<dyn ApplicationStore>,
    local: Arc<LocalDraftStore>,
}

impl DraftLoader {
    pub fn new(store: Arc<dyn ApplicationStore>, local: Arc<LocalDraftStore>) -> Self {
        Self { store, local }
    }

    /// Fetch the record for `id` and replace the local draft with it.
    ///
    /// An unknown identity is a distinct `NotFound`, never a silently empty
    /// draft, so the caller can offer "start a new draft" instead of a
    /// generic retry.
    pub async fn load(&self, id: &str) -> Result<Draft, AppError> {
        match self.store.get_application(id).await? {
            Some(record) => {
                let draft = record.to_draft();
                self.local.replace(draft.clone());
                Ok(draft)
            }
            None => Err(AppError::NotFound(format!("Application {} not found", id))),
        }
    }
}
