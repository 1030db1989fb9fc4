//! Draft model matching the frontend draft interface.

use serde::{Deserialize, Serialize};

/// Contact details of the applicant filing the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
}

/// An in-progress RTI application.
///
/// `id` is absent until the remote store has accepted the draft once; after
/// that every remote write is an update keyed by it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub department: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default)]
    pub applicant: ApplicantDetails,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
}

impl Draft {
    /// An empty draft in the given language.
    pub fn empty(language: &str) -> Self {
        Self {
            id: None,
            query: String::new(),
            department: String::new(),
            department_id: None,
            subject: None,
            applicant: ApplicantDetails::default(),
            language: language.to_string(),
            template_id: None,
        }
    }

    /// Merge a partial update into this draft. Fields not mentioned in the
    /// patch are left untouched. Returns true if `query` changed.
    pub fn apply(&mut self, patch: &DraftPatch) -> bool {
        let mut query_changed = false;

        if let Some(query) = &patch.query {
            if *query != self.query {
                query_changed = true;
            }
            self.query = query.clone();
        }
        if let Some(department) = &patch.department {
            self.department = department.clone();
        }
        if let Some(department_id) = &patch.department_id {
            self.department_id = Some(department_id.clone());
        }
        if let Some(subject) = &patch.subject {
            self.subject = Some(subject.clone());
        }
        if let Some(applicant) = &patch.applicant {
            self.applicant = applicant.clone();
        }
        if let Some(language) = &patch.language {
            self.language = language.clone();
        }
        if let Some(template_id) = &patch.template_id {
            self.template_id = Some(template_id.clone());
        }

        query_changed
    }
}

impl Default for Draft {
    fn default() -> Self {
        Self::empty(crate::models::DEFAULT_LANGUAGE)
    }
}

/// Platform default language for new drafts.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Partial update for a draft. Absent fields are left unchanged; the patch
/// never removes a field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftPatch {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub department_id: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub applicant: Option<ApplicantDetails>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub template_id: Option<String>,
}
