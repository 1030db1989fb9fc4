//! Department model: the target organization of a request.

use serde::{Deserialize, Serialize};

/// A public body requests can be addressed to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    pub name: String,
    pub language: String,
}
