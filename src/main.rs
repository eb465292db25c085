mod config;
mod db;
mod error;
mod language;
mod llm;
mod routes;
mod services;
mod state;
mod storage;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use config::{AppConfig, UploadConfig};
use db::DbPool;
use language::{AzureTextAnalytics, TextAnalytics};
use llm::LlmChat;
use services::recommend::RecommendationCatalog;
use services::upload::ScopedUploadService;
use storage::StorageError;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();

    // No connection is made here; the first request that needs the
    // database opens the pool.
    let db = DbPool::from_config(config.db.clone());

    let catalog = match config.catalog_path.as_deref() {
        Some(path) => RecommendationCatalog::from_path(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "recommendation catalog unusable; using built-in list");
            RecommendationCatalog::builtin()
        }),
        None => RecommendationCatalog::builtin(),
    };

    let state = state::AppState::new(db, catalog)
        .with_uploads(init_uploads(&config.upload))
        .with_llm(init_llm())
        .with_language(init_language(&config));

    let mut app = routes::app(state, config.upload.max_bytes);
    if let Some(dir) = config.static_dir.as_deref() {
        tracing::info!(dir = %dir.display(), "serving static files");
        app = routes::with_static_dir(app, dir);
    }

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "internship tracker listening");
    axum::serve(listener, app).await
}

// Optional integrations are non-fatal: a missing or broken configuration
// disables the feature and the matching endpoint reports it per request.

fn init_uploads(config: &UploadConfig) -> Result<Arc<ScopedUploadService>, StorageError> {
    let uploads = ScopedUploadService::from_config(config).map(Arc::new);
    if let Err(e) = &uploads {
        tracing::warn!(error = %e, "blob storage not usable; uploads disabled");
    }
    uploads
}

fn init_llm() -> Option<Arc<dyn LlmChat>> {
    match llm::LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "LLM client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured; generated recommendations disabled");
            None
        }
    }
}

fn init_language(config: &AppConfig) -> Option<Arc<dyn TextAnalytics>> {
    let Some(language) = config.language.clone() else {
        tracing::warn!("AZURE_LANGUAGE_ENDPOINT/AZURE_LANGUAGE_KEY not set; skill analysis disabled");
        return None;
    };
    match AzureTextAnalytics::new(language) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            tracing::warn!(error = %e, "language client not usable; skill analysis disabled");
            None
        }
    }
}
