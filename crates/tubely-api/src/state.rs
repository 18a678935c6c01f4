//! Application state shared by every handler.

use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_processing::UploadOrchestrator;
use tubely_storage::ReferenceResolver;

/// Everything a request needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub videos: Arc<dyn VideoRepository>,
    pub resolver: ReferenceResolver,
    pub uploads: Arc<UploadOrchestrator>,
}

impl AppState {
    pub fn new(
        config: Config,
        videos: Arc<dyn VideoRepository>,
        resolver: ReferenceResolver,
        uploads: Arc<UploadOrchestrator>,
    ) -> Self {
        Self {
            config,
            videos,
            resolver,
            uploads,
        }
    }

    /// Secret bearer tokens are verified against
    pub fn jwt_secret(&self) -> &str {
        self.config.jwt_secret()
    }
}
