// src/state.rs
use std::sync::Arc;

use crate::services::browser::BrowserLauncher;
use crate::services::cache::DividendCache;
use crate::services::refresh::RefreshConfig;

/// Shared by every request handler.
pub struct AppState {
    pub cache: DividendCache,
    pub launcher: Arc<dyn BrowserLauncher>,
    pub refresh: RefreshConfig,
}
