//! Runtime configuration shared by the server and the services.
//!
//! Loading and parsing the config file is done by the server crate; these
//! are the validated values it hands over.

mod server;
mod session;

pub use server::ServerConfig;
pub use session::SessionConfig;

use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared configuration state with separate locks for each section.
#[derive(Clone)]
pub struct SharedConfig {
    /// Server configuration (listen address).
    pub server: Arc<RwLock<ServerConfig>>,
    /// Session issuing settings, replaced on reload.
    pub session: Arc<RwLock<SessionConfig>>,
}

impl SharedConfig {
    pub fn new(server: ServerConfig, session: SessionConfig) -> Self {
        Self {
            server: Arc::new(RwLock::new(server)),
            session: Arc::new(RwLock::new(session)),
        }
    }

    /// Snapshot of the session settings.
    pub async fn session(&self) -> SessionConfig {
        *self.session.read().await
    }

    /// Swap in reloaded session settings.
    pub async fn replace_session(&self, session: SessionConfig) {
        *self.session.write().await = session;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replace_session_is_visible_to_clones() {
        let config = SharedConfig::new(
            ServerConfig {
                listen: "127.0.0.1:8080".parse().unwrap(),
            },
            SessionConfig::default(),
        );
        let handle = config.clone();

        handle
            .replace_session(SessionConfig {
                ttl: time::Duration::minutes(5),
                secure_cookie: true,
            })
            .await;

        let session = config.session().await;
        assert_eq!(session.ttl, time::Duration::minutes(5));
        assert!(session.secure_cookie);
    }
}
