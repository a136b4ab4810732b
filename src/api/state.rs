//! Application state for the tax-credit engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;

/// Shared application state.
///
/// Contains resources that are shared across all request handlers,
/// such as the loaded credit tables.
#[derive(Clone)]
pub struct AppState {
    /// The loaded credit tables.
    config: Arc<ConfigLoader>,
}

impl AppState {
    /// Creates a new application state with the given configuration loader.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns a shared handle to the configuration, for blocking tasks.
    pub fn shared_config(&self) -> Arc<ConfigLoader> {
        Arc::clone(&self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_clones_share_tables() {
        let state = AppState::new(ConfigLoader::statutory());
        let clone = state.clone();
        assert!(Arc::ptr_eq(&state.shared_config(), &clone.shared_config()));
        assert_eq!(clone.shared_config().tables().youth_age_limit, 29);
    }
}
