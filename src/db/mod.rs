//! Database module for SQLite persistence.
//!
//! SQLite stands in for the hosted relational store and is the source of
//! truth for persisted applications.

mod repository;

pub use repository::*;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::errors::AppError;
use crate::models::{ApplicationChanges, ApplicationRecord, NewApplication};

/// Remote-store seam the draft sync core writes through. Implemented by
/// [`Repository`]; tests substitute an in-memory fake.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Insert a new application record and return it with its assigned identity.
    async fn insert_application(&self, new: &NewApplication)
        -> Result<ApplicationRecord, AppError>;

    /// Overwrite the draft fields of an existing record.
    async fn update_application(
        &self,
        id: &str,
        changes: &ApplicationChanges,
    ) -> Result<(), AppError>;

    /// Fetch a record by identity.
    async fn get_application(&self, id: &str) -> Result<Option<ApplicationRecord>, AppError>;

    /// Resolve a department display name to its identity.
    async fn find_department_id(&self, name: &str) -> Result<Option<String>, AppError>;
}

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Create tables if they don't exist
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS applications (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            query TEXT NOT NULL,
            department TEXT NOT NULL,
            department_id TEXT,
            subject TEXT,
            applicant TEXT NOT NULL,
            language TEXT NOT NULL,
            template_id TEXT,
            status TEXT NOT NULL DEFAULT 'draft',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS departments (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            language TEXT NOT NULL DEFAULT 'en'
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS templates (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            body TEXT NOT NULL,
            language TEXT NOT NULL DEFAULT 'en'
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_applications_owner ON applications(owner_id);
        CREATE INDEX IF NOT EXISTS idx_applications_updated_at ON applications(updated_at);
        CREATE INDEX IF NOT EXISTS idx_departments_name ON departments(name);
        "#,
    )
    .execute(pool)
    .await?;

    seed_lookup_tables(pool).await?;

    Ok(())
}

/// Seed the department and template lookup tables on first run.
async fn seed_lookup_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let departments = [
        ("dept-finance", "Ministry of Finance"),
        ("dept-education", "Ministry of Education"),
        ("dept-health", "Ministry of Health"),
        ("dept-environment", "Ministry of Environment"),
        ("dept-public-works", "Department of Public Works"),
    ];

    for (id, name) in departments {
        sqlx::query("INSERT OR IGNORE INTO departments (id, name, language) VALUES (?, ?, 'en')")
            .bind(id)
            .bind(name)
            .execute(pool)
            .await?;
    }

    let templates = [
        (
            "tmpl-pending-application",
            "Status of a pending application",
            "Please provide the current processing status, the officer responsible, \
             and the expected date of disposal for my application.",
        ),
        (
            "tmpl-public-spending",
            "Public spending breakdown",
            "Please provide an itemized breakdown of funds sanctioned, released, \
             and utilized for the scheme or project named below.",
        ),
    ];

    for (id, title, body) in templates {
        sqlx::query(
            "INSERT OR IGNORE INTO templates (id, title, body, language) VALUES (?, ?, ?, 'en')",
        )
        .bind(id)
        .bind(title)
        .bind(body)
        .execute(pool)
        .await?;
    }

    Ok(())
}
