//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the lazily connected database pool plus the optional external
//! integrations. An integration left unconfigured is `None` (uploads keep
//! the configuration error itself); the handler that needs it answers with
//! a configuration error instead of the whole service refusing to start.

use std::sync::Arc;

use crate::db::DbPool;
use crate::language::TextAnalytics;
use crate::llm::LlmChat;
use crate::services::recommend::RecommendationCatalog;
use crate::services::upload::ScopedUploadService;
use crate::storage::StorageError;

/// Shared application state. Clone is required by Axum; all fields are
/// `Arc`-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    /// Why uploads are unavailable when blob storage is missing or unusable.
    pub uploads: Result<Arc<ScopedUploadService>, StorageError>,
    /// `None` if the LLM API key is not configured.
    pub llm: Option<Arc<dyn LlmChat>>,
    /// `None` if the language endpoint or key is not configured.
    pub language: Option<Arc<dyn TextAnalytics>>,
    pub catalog: Arc<RecommendationCatalog>,
}

impl AppState {
    #[must_use]
    pub fn new(db: DbPool, catalog: RecommendationCatalog) -> Self {
        Self {
            db: Arc::new(db),
            uploads: Err(StorageError::Misconfigured("Azure Storage connection string not configured".into())),
            llm: None,
            language: None,
            catalog: Arc::new(catalog),
        }
    }

    #[must_use]
    pub fn with_uploads(mut self, uploads: Result<Arc<ScopedUploadService>, StorageError>) -> Self {
        self.uploads = uploads;
        self
    }

    #[must_use]
    pub fn with_llm(mut self, llm: Option<Arc<dyn LlmChat>>) -> Self {
        self.llm = llm;
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: Option<Arc<dyn TextAnalytics>>) -> Self {
        self.language = language;
        self
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
