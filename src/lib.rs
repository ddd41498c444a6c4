pub mod config;
pub mod issues;
pub mod rest;
pub mod storage;

use std::sync::Arc;

use config::ServerConfig;
use issues::storage::IssueStorage;
use storage::Storage;

/// Shared application state passed to every REST handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub storage: Arc<Storage>,
    /// Issue table operations, sharing the storage connection pool.
    pub issues: Arc<IssueStorage>,
    pub started_at: std::time::Instant,
}
