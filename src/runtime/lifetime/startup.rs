use crate::cache::{ObjectCache, moka::MokaCacheWrapper};
use crate::config::AppConfig;
use crate::storage::Storage;
use std::sync::Arc;
use tracing::warn;

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

/// 确保提交文件目录存在（踢出成员时的级联清理在这里执行 unlink）
fn ensure_files_dir() {
    let dir = &AppConfig::get().files.dir;
    if let Err(e) = std::fs::create_dir_all(dir) {
        warn!("Failed to create files directory {}: {}", dir, e);
    }
}

pub async fn prepare_server_startup() -> StartupContext {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    ensure_files_dir();

    let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::new());
    warn!("Cache backend initialized");

    StartupContext { storage, cache }
}
