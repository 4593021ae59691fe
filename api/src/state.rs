//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use crate::config::Config;
use shared::live::{LiveLogReader, LiveLogSource};
use shared::query::LogQueryService;
use shared::snapshot::{SnapshotProvider, SysinfoSnapshotProvider};
use shared::storage::{FilePartitionStore, InMemoryPartitionStore, PartitionStore};
use std::sync::Arc;

/// Application state shared across all request handlers.
///
/// Holds no mutable data of its own; the only shared mutable resource is the
/// partition store behind the query service.
#[derive(Clone)]
pub struct AppState {
    /// Queries and appends over both log surfaces.
    logs: LogQueryService,
    /// Host metrics sampling.
    snapshots: Arc<dyn SnapshotProvider>,
}

impl AppState {
    /// Creates a new application state from its collaborators.
    pub fn new(
        live: Arc<dyn LiveLogSource>,
        store: Arc<dyn PartitionStore>,
        snapshots: Arc<dyn SnapshotProvider>,
    ) -> Self {
        Self {
            logs: LogQueryService::new(live, store),
            snapshots,
        }
    }

    /// Creates the production state described by `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let live = match &config.log_sources {
            Some(paths) => LiveLogReader::from_paths(paths.iter().cloned()),
            None => LiveLogReader::for_current_platform(),
        };
        tracing::info!(
            log_dir = %config.log_dir.display(),
            live_sources = live.paths().len(),
            "Log surfaces configured"
        );

        Self::new(
            Arc::new(live),
            FilePartitionStore::new_shared(&config.log_dir),
            Arc::new(SysinfoSnapshotProvider::new()),
        )
    }

    /// Creates a state with an in-memory partition store and no live sources.
    ///
    /// This is useful for development and testing.
    #[must_use]
    pub fn with_in_memory_store() -> Self {
        Self::new(
            Arc::new(LiveLogReader::default()),
            InMemoryPartitionStore::new_shared(),
            Arc::new(SysinfoSnapshotProvider::new()),
        )
    }

    /// Returns the log query service.
    #[must_use]
    pub fn logs(&self) -> &LogQueryService {
        &self.logs
    }

    /// Returns a handle to the snapshot provider.
    #[must_use]
    pub fn snapshots(&self) -> Arc<dyn SnapshotProvider> {
        Arc::clone(&self.snapshots)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_in_memory_store()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{PriorityFilter, Tier};

    #[test]
    fn test_app_state_with_in_memory_store() {
        let state = AppState::with_in_memory_store();

        state.logs().append(Tier::Low, "hello").unwrap();
        let records = state.logs().persisted(&PriorityFilter::All).unwrap();
        assert_eq!(records.len(), 1);
        assert!(state.logs().live(&PriorityFilter::All).unwrap().is_empty());
    }

    #[test]
    fn test_app_state_is_clone() {
        let state = AppState::with_in_memory_store();
        let state2 = state.clone();

        // Both should share the same store
        state.logs().append(Tier::High, "shared").unwrap();

        let records = state2
            .logs()
            .persisted(&PriorityFilter::Tier(Tier::High))
            .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_from_config_uses_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            log_dir: dir.path().to_path_buf(),
            log_sources: Some(Vec::new()),
            ..Config::default()
        };
        let state = AppState::from_config(&config);

        state.logs().append(Tier::Medium, "persisted").unwrap();
        assert!(dir.path().join("medium.log").exists());
    }
}
