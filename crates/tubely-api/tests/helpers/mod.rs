//! Test helpers for API integration tests.
//!
//! The app runs against the in-memory repository, a temp asset directory and fake
//! media/object-store backends, so no Postgres, S3 or ffmpeg is needed.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tubely_api::auth::issue_token;
use tubely_api::setup::routes::setup_routes;
use tubely_api::AppState;
use tubely_core::{Config, TubelyConfig};
use tubely_db::{InMemoryVideoRepository, VideoRepository};
use tubely_processing::media::processing_path;
use tubely_processing::{
    MediaTool, MediaToolError, StreamGeometry, UploadOrchestrator, UploadOrchestratorConfig,
};
use tubely_storage::{AssetStore, ObjectUploader, ReferenceResolver, StorageResult, UrlSigner};
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";
pub const TEST_BUCKET: &str = "tubely-test-bucket";
pub const TEST_BASE_URL: &str = "http://localhost:8091";

/// Reports fixed dimensions and "remuxes" by copying the input.
pub struct FakeMediaTool {
    pub geometry: StreamGeometry,
}

#[async_trait]
impl MediaTool for FakeMediaTool {
    async fn inspect(&self, _path: &Path) -> Result<StreamGeometry, MediaToolError> {
        Ok(self.geometry)
    }

    async fn remux_fast_start(&self, path: &Path) -> Result<PathBuf, MediaToolError> {
        let output = processing_path(path);
        tokio::fs::copy(path, &output)
            .await
            .map_err(|source| MediaToolError::Spawn {
                tool: "ffmpeg",
                source,
            })?;
        Ok(output)
    }
}

#[derive(Debug, Clone)]
pub struct UploadedObject {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Keeps every uploaded object in memory.
#[derive(Default)]
pub struct RecordingUploader {
    pub objects: Mutex<Vec<UploadedObject>>,
}

impl RecordingUploader {
    pub fn uploaded(&self) -> Vec<UploadedObject> {
        self.objects.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectUploader for RecordingUploader {
    async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        path: &Path,
    ) -> StorageResult<()> {
        let body = tokio::fs::read(path).await?;
        self.objects.lock().unwrap().push(UploadedObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
            content_type: content_type.to_string(),
            body,
        });
        Ok(())
    }
}

/// Signs with a counter so every resolution yields a distinct link.
#[derive(Default)]
pub struct CountingSigner {
    pub calls: Mutex<u32>,
}

#[async_trait]
impl UrlSigner for CountingSigner {
    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        Ok(format!(
            "https://{}.s3.test/{}?X-Amz-Expires={}&sig={}",
            bucket,
            key,
            expires_in.as_secs(),
            *calls
        ))
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub videos: Arc<InMemoryVideoRepository>,
    pub uploader: Arc<RecordingUploader>,
    pub assets_dir: TempDir,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Entries left in the upload temp root.
    pub fn temp_entries(&self) -> usize {
        std::fs::read_dir(self.temp_dir.path()).unwrap().count()
    }

    /// Files in the thumbnail asset directory.
    pub fn asset_files(&self) -> Vec<String> {
        std::fs::read_dir(self.assets_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }
}

fn test_config(assets_dir: &Path, temp_dir: &Path, production: bool) -> Config {
    let mut vars: HashMap<&str, String> = HashMap::from([
        ("JWT_SECRET", TEST_JWT_SECRET.to_string()),
        ("DATABASE_URL", "memory".to_string()),
        ("S3_BUCKET", TEST_BUCKET.to_string()),
        ("AWS_REGION", "us-east-1".to_string()),
        ("ASSETS_ROOT", assets_dir.display().to_string()),
        ("ASSETS_BASE_URL", TEST_BASE_URL.to_string()),
        ("TEMP_DIR", temp_dir.display().to_string()),
        ("MAX_THUMBNAIL_SIZE_MB", "1".to_string()),
    ]);
    if production {
        vars.insert("ENVIRONMENT", "production".to_string());
        vars.insert("CORS_ORIGINS", "https://tubely.test".to_string());
    }
    let config = TubelyConfig::from_lookup(|key| vars.get(key).cloned())
        .expect("test configuration");
    let config = Config(Box::new(config));
    config.validate().expect("valid test configuration");
    config
}

/// App whose media tool reports a 1920x1080 stream.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_geometry(StreamGeometry {
        width: 1920,
        height: 1080,
    })
    .await
}

pub async fn setup_test_app_with_geometry(geometry: StreamGeometry) -> TestApp {
    build_test_app(geometry, false).await
}

/// App configured with `ENVIRONMENT=production`.
pub async fn setup_production_test_app() -> TestApp {
    build_test_app(
        StreamGeometry {
            width: 1920,
            height: 1080,
        },
        true,
    )
    .await
}

async fn build_test_app(geometry: StreamGeometry, production: bool) -> TestApp {
    let assets_dir = TempDir::new().expect("assets dir");
    let temp_dir = TempDir::new().expect("temp dir");
    let config = test_config(assets_dir.path(), temp_dir.path(), production);

    let videos = Arc::new(InMemoryVideoRepository::new());
    let uploader = Arc::new(RecordingUploader::default());
    let signer = Arc::new(CountingSigner::default());
    let assets = Arc::new(
        AssetStore::new(assets_dir.path(), TEST_BASE_URL)
            .await
            .expect("asset store"),
    );

    let resolver = ReferenceResolver::new(signer, config.presign_ttl());
    let repository: Arc<dyn VideoRepository> = videos.clone();
    let uploads = UploadOrchestrator::new(
        repository.clone(),
        Arc::new(FakeMediaTool { geometry }),
        uploader.clone(),
        resolver.clone(),
        assets,
        UploadOrchestratorConfig {
            bucket: TEST_BUCKET.to_string(),
            temp_root: Some(temp_dir.path().to_path_buf()),
            max_video_size_bytes: config.max_video_size_bytes(),
            max_thumbnail_size_bytes: config.max_thumbnail_size_bytes(),
        },
    );

    let state = Arc::new(AppState::new(
        config.clone(),
        repository,
        resolver,
        Arc::new(uploads),
    ));
    let router = setup_routes(&config, state).expect("router");
    let server = TestServer::new(router).expect("test server");

    TestApp {
        server,
        videos,
        uploader,
        assets_dir,
        temp_dir,
    }
}

/// Bearer header value for a fresh token for `user_id`.
pub fn bearer(user_id: Uuid) -> String {
    let token =
        issue_token(user_id, TEST_JWT_SECRET, chrono::Duration::hours(1)).expect("sign token");
    format!("Bearer {}", token)
}
