use job_board::board::{InMemoryRecordStore, RecordStore, SqliteRecordStore, StoreError};
use job_board::config::StorageConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Open the configured backend: SQLite when a database URL is present, memory otherwise.
pub(crate) async fn open_store(
    config: &StorageConfig,
) -> Result<Arc<dyn RecordStore>, StoreError> {
    match config.database_url.as_deref() {
        Some(url) => {
            let store = SqliteRecordStore::connect(url).await?;
            info!(database_url = url, "using sqlite record store");
            Ok(Arc::new(store))
        }
        None => {
            info!("DATABASE_URL not set; records are kept in memory");
            Ok(Arc::new(InMemoryRecordStore::default()))
        }
    }
}
