//! Request template model.

use serde::{Deserialize, Serialize};

/// A pre-written request template a draft can start from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub title: String,
    pub body: String,
    pub language: String,
}
