//! Application setup and initialization
//!
//! Builds every component from the validated [`Config`] and wires them into the router.

pub mod database;
pub mod routes;
pub mod server;

use crate::state::AppState;
use crate::telemetry::init_telemetry;
use anyhow::Context;
use axum::Router;
use std::sync::Arc;
use tubely_core::Config;
use tubely_processing::{FfmpegMediaTool, UploadOrchestrator, UploadOrchestratorConfig};
use tubely_storage::{create_asset_store, create_object_store, ReferenceResolver};

/// Initialize the application (repository, object store, media tools, routes)
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router), anyhow::Error> {
    init_telemetry(config.is_production());

    config.validate()?;
    tracing::info!(
        environment = %config.environment(),
        port = config.server_port(),
        "Configuration loaded"
    );

    let videos = database::setup_video_repository(&config).await?;

    let object_store = create_object_store(&config)
        .await
        .context("Failed to initialize object store")?;
    let assets = create_asset_store(&config)
        .await
        .context("Failed to initialize thumbnail asset directory")?;

    let media_tool = FfmpegMediaTool::new(
        config.ffmpeg_path(),
        config.ffprobe_path(),
        config.media_tool_timeout(),
    )
    .context("Invalid media tool configuration")?;

    let resolver = ReferenceResolver::new(object_store.clone(), config.presign_ttl());

    let uploads = UploadOrchestrator::new(
        videos.clone(),
        Arc::new(media_tool),
        object_store,
        resolver.clone(),
        assets,
        UploadOrchestratorConfig {
            bucket: config.s3_bucket().to_string(),
            temp_root: config.temp_dir().cloned(),
            max_video_size_bytes: config.max_video_size_bytes(),
            max_thumbnail_size_bytes: config.max_thumbnail_size_bytes(),
        },
    );

    let state = Arc::new(AppState::new(
        config.clone(),
        videos,
        resolver,
        Arc::new(uploads),
    ));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
