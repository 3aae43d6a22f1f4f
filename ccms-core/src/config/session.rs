//! Admin session settings.

/// How admin sessions are issued. Reloadable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Lifetime of a freshly issued session.
    pub ttl: time::Duration,
    /// Whether the session cookie carries the `Secure` attribute.
    pub secure_cookie: bool,
}

impl SessionConfig {
    pub const DEFAULT_TTL: time::Duration = time::Duration::hours(24);
    /// Longest lifetime the config file may ask for.
    pub const MAX_TTL: time::Duration = time::Duration::days(365);
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: Self::DEFAULT_TTL,
            secure_cookie: false,
        }
    }
}
