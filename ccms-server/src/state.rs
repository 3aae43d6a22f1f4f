//! Application state shared across all request handlers.

use ccms_core::config::SharedConfig;
use ccms_core::gate::AccessGate;
use ccms_core::merge::MergeService;
use ccms_core::store::{ContentStore, IdentityStore};
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Reads and updates the configuration document.
    pub merge: MergeService,
    /// Admin authentication and route policy.
    pub gate: AccessGate,
    /// Runtime configuration (session section reloadable via SIGHUP).
    pub config: SharedConfig,
}

impl AppState {
    /// Create a new AppState over the given store handles.
    pub fn new(
        content: Arc<dyn ContentStore>,
        identities: Arc<dyn IdentityStore>,
        config: SharedConfig,
    ) -> Self {
        Self {
            merge: MergeService::new(content),
            gate: AccessGate::new(identities),
            config,
        }
    }
}
