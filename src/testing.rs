use anyhow::Result;
use axum::Router;
use blob_store::BlobStorageConfig;
use tracing::subscriber;
use tracing_subscriber::{layer::SubscriberExt, Layer};

use crate::{
    config::{ServerConfig, DEFAULT_MAX_UPLOAD_BYTES},
    routes::{create_routes, RouteState},
    service::Service,
};

pub struct TestService {
    pub service: Service,
    temp_dir: tempfile::TempDir,
}

impl TestService {
    pub async fn new() -> Result<Self> {
        Self::with_max_upload_bytes(DEFAULT_MAX_UPLOAD_BYTES).await
    }

    pub async fn with_max_upload_bytes(max_upload_bytes: usize) -> Result<Self> {
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        let _ = subscriber::set_global_default(
            tracing_subscriber::registry()
                .with(tracing_subscriber::fmt::layer().with_filter(env_filter)),
        );

        let temp_dir = tempfile::tempdir()?;

        let cfg = ServerConfig {
            state_store_path: temp_dir
                .path()
                .join("state_store")
                .to_str()
                .unwrap()
                .to_string(),
            blob_storage: BlobStorageConfig::new(
                temp_dir.path().join("blob_store").to_str().unwrap(),
            ),
            max_upload_bytes,
            ..Default::default()
        };
        let service = Service::new(cfg).await?;

        Ok(Self { service, temp_dir })
    }

    /// A fresh router over the service's stores, for driving requests
    /// without binding a socket.
    pub fn routes(&self) -> Router {
        create_routes(
            RouteState {
                state: self.service.state.clone(),
                blob_storage: self.service.blob_storage.clone(),
            },
            self.service.config.max_upload_bytes,
        )
    }

    pub fn blob_dir(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("blob_store")
    }
}
