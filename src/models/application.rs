//! Application record model: the remote row a draft is persisted into.

use serde::{Deserialize, Serialize};

use super::{ApplicantDetails, Draft};

/// Lifecycle status of a persisted application.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Draft,
    Submitted,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "draft",
            ApplicationStatus::Submitted => "submitted",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ApplicationStatus::Draft),
            "submitted" => Some(ApplicationStatus::Submitted),
            _ => None,
        }
    }
}

/// A persisted RTI application as stored remotely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub id: String,
    pub owner_id: String,
    pub query: String,
    pub department: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub applicant: ApplicantDetails,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    pub status: ApplicationStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl ApplicationRecord {
    /// Map the remote record 1:1 into a local draft, identity included, so
    /// subsequent edits route through the update path.
    pub fn to_draft(&self) -> Draft {
        Draft {
            id: Some(self.id.clone()),
            query: self.query.clone(),
            department: self.department.clone(),
            department_id: self.department_id.clone(),
            subject: self.subject.clone(),
            applicant: self.applicant.clone(),
            language: self.language.clone(),
            template_id: self.template_id.clone(),
        }
    }
}

/// Fields for creating a new application record. The owner and initial
/// status are set here once and never re-sent on update.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub owner_id: String,
    pub query: String,
    pub department: String,
    pub department_id: Option<String>,
    pub subject: Option<String>,
    pub applicant: ApplicantDetails,
    pub language: String,
    pub template_id: Option<String>,
}

/// Full field set sent on update. Last write wins; repeating an update with
/// identical values leaves the record observably unchanged.
#[derive(Debug, Clone)]
pub struct ApplicationChanges {
    pub query: String,
    pub department: String,
    pub department_id: Option<String>,
    pub subject: Option<String>,
    pub applicant: ApplicantDetails,
    pub language: String,
    pub template_id: Option<String>,
}

impl ApplicationChanges {
    pub fn from_draft(draft: &Draft) -> Self {
        Self {
            query: draft.query.clone(),
            department: draft.department.clone(),
            department_id: draft.department_id.clone(),
            subject: draft.subject.clone(),
            applicant: draft.applicant.clone(),
            language: draft.language.clone(),
            template_id: draft.template_id.clone(),
        }
    }
}
