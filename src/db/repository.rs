//! Database repository for application persistence.
//!
//! Uses prepared statements; write decisions (create vs. update) are made by
//! the sync core, never here.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    ApplicantDetails, ApplicationChanges, ApplicationRecord, ApplicationStatus, Department,
    NewApplication, Template,
};

use super::ApplicationStore;

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all departments.
    pub async fn list_departments(&self) -> Result<Vec<Department>, AppError> {
        let rows = sqlx::query("SELECT id, name, language FROM departments ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Department {
                id: row.get("id"),
                name: row.get("name"),
                language: row.get("language"),
            })
            .collect())
    }

    /// List all request templates.
    pub async fn list_templates(&self) -> Result<Vec<Template>, AppError> {
        let rows = sqlx::query("SELECT id, title, body, language FROM templates ORDER BY title")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Template {
                id: row.get("id"),
                title: row.get("title"),
                body: row.get("body"),
                language: row.get("language"),
            })
            .collect())
    }
}

#[async_trait]
impl ApplicationStore for Repository {
    /// Insert a new application record. The identity is assigned here and
    /// returned to the caller for write-back into the local draft.
    async fn insert_application(
        &self,
        new: &NewApplication,
    ) -> Result<ApplicationRecord, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let applicant_json = serde_json::to_string(&new.applicant).unwrap_or_default();
        let status = ApplicationStatus::Draft;

        sqlx::query(
            r#"INSERT INTO applications (
                id, owner_id, query, department, department_id, subject,
                applicant, language, template_id, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&id)
        .bind(&new.owner_id)
        .bind(&new.query)
        .bind(&new.department)
        .bind(&new.department_id)
        .bind(&new.subject)
        .bind(&applicant_json)
        .bind(&new.language)
        .bind(&new.template_id)
        .bind(status.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(ApplicationRecord {
            id,
            owner_id: new.owner_id.clone(),
            query: new.query.clone(),
            department: new.department.clone(),
            department_id: new.department_id.clone(),
            subject: new.subject.clone(),
            applicant: new.applicant.clone(),
            language: new.language.clone(),
            template_id: new.template_id.clone(),
            status,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Overwrite the draft fields of an existing record. Owner, status and
    /// created_at are never touched by this path.
    async fn update_application(
        &self,
        id: &str,
        changes: &ApplicationChanges,
    ) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        let applicant_json = serde_json::to_string(&changes.applicant).unwrap_or_default();

        let result = sqlx::query(
            r#"UPDATE applications SET
                query = ?, department = ?, department_id = ?, subject = ?,
                applicant = ?, language = ?, template_id = ?, updated_at = ?
            WHERE id = ?"#,
        )
        .bind(&changes.query)
        .bind(&changes.department)
        .bind(&changes.department_id)
        .bind(&changes.subject)
        .bind(&applicant_json)
        .bind(&changes.language)
        .bind(&changes.template_id)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Application {} not found", id)));
        }

        Ok(())
    }

    /// Get an application by ID.
    async fn get_application(&self, id: &str) -> Result<Option<ApplicationRecord>, AppError> {
        let row = sqlx::query(
            r#"SELECT id, owner_id, query, department, department_id, subject,
                      applicant, language, template_id, status, created_at, updated_at
               FROM applications WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(application_from_row))
    }

    /// Resolve a department display name to its ID, case-insensitively.
    async fn find_department_id(&self, name: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query("SELECT id FROM departments WHERE name = ? COLLATE NOCASE")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get("id")))
    }
}

// Helper functions for row conversion

fn application_from_row(row: &sqlx::sqlite::SqliteRow) -> ApplicationRecord {
    let applicant_str: String = row.get("applicant");
    let status_str: String = row.get("status");

    ApplicationRecord {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        query: row.get("query"),
        department: row.get("department"),
        department_id: row.get("department_id"),
        subject: row.get("subject"),
        applicant: parse_applicant(&applicant_str),
        language: row.get("language"),
        template_id: row.get("template_id"),
        status: ApplicationStatus::from_str(&status_str).unwrap_or(ApplicationStatus::Draft),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn parse_applicant(s: &str) -> ApplicantDetails {
    serde_json::from_str(s).unwrap_or_default()
}
