//! RTI Request Filing Backend
//!
//! REST backend for composing and filing Right to Information requests, with
//! SQLite persistence and a debounced draft synchronization core.

mod api;
mod cache;
mod config;
mod db;
mod errors;
mod generate;
mod models;
mod session;
mod store;
mod sync;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cache::{SystemClock, TtlCache};
use config::Config;
use db::{ApplicationStore, Repository};
use generate::{Generator, LetterFormatter};
use models::{Department, Template};
use session::GuestSessionProvider;
use store::LocalDraftStore;
use sync::DraftSession;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
    pub generator: Arc<dyn Generator>,
    /// Department name -> id resolutions, shared with every upsert client
    pub departments_cache: Arc<TtlCache<String, String>>,
    pub department_list_cache: Arc<TtlCache<String, Vec<Department>>>,
    pub template_cache: Arc<TtlCache<String, Vec<Template>>>,
    sessions: Arc<Mutex<HashMap<String, Arc<DraftSession>>>>,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, config: Arc<Config>) -> Self {
        let clock = Arc::new(SystemClock);
        let ttl = config.lookup_cache_ttl;
        let capacity = config.lookup_cache_capacity;

        Self {
            repo,
            config,
            generator: Arc::new(LetterFormatter),
            departments_cache: Arc::new(TtlCache::new(ttl, capacity, clock.clone())),
            department_list_cache: Arc::new(TtlCache::new(ttl, capacity, clock.clone())),
            template_cache: Arc::new(TtlCache::new(ttl, capacity, clock)),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Get or create the draft session for a client. Each client gets its
    /// own local draft store file under the configured state directory.
    pub fn draft_session(&self, client: &str) -> Arc<DraftSession> {
        let mut sessions = self.sessions.lock().unwrap();
        if let Some(session) = sessions.get(client) {
            return session.clone();
        }

        std::fs::create_dir_all(&self.config.state_dir).ok();
        let local = Arc::new(LocalDraftStore::open(
            &self.config.state_dir.join(format!("{}.json", client)),
            &self.config.default_language,
        ));
        let provider = Arc::new(GuestSessionProvider::new(local.clone()));
        let store: Arc<dyn ApplicationStore> = self.repo.clone();

        let session = Arc::new(DraftSession::new(
            local,
            store,
            provider,
            self.departments_cache.clone(),
            self.config.autosave_quiet_period,
        ));
        sessions.insert(client.to_string(), session.clone());
        session
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting RTI Request Filing Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("State directory: {:?}", config.state_dir);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!(
        "Autosave quiet period: {} ms",
        config.autosave_quiet_period.as_millis()
    );

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Create application state
    let state = AppState::new(repo, Arc::new(config.clone()));

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes
    let api_routes = Router::new()
        // Draft session
        .route(
            "/draft",
            get(api::get_draft)
                .put(api::update_draft)
                .delete(api::clear_draft),
        )
        .route("/draft/save", post(api::save_draft))
        .route("/draft/load/{id}", post(api::load_draft))
        .route("/draft/generate", post(api::generate_letter))
        // Persisted applications
        .route("/applications/{id}", get(api::get_application))
        // Lookups
        .route("/departments", get(api::list_departments))
        .route("/departments/lookup", get(api::lookup_department))
        .route("/templates", get(api::list_templates));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
