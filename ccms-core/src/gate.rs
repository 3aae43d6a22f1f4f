//! Access gate for the admin surface.
//!
//! The policy is a pure function of the caller's [`AuthState`] and the
//! [`AdminRoute`] class ([`decide`]). [`AccessGate`] resolves the state
//! from a session token and owns login, logout and account bootstrap.
//!
//! Every lookup failure resolves to [`AuthState::Unauthenticated`].

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::password::{PasswordError, hash_password, verify_absent, verify_password};
use crate::store::{IdentityStore, Session, StoreError};

pub const LOGIN_PATH: &str = "/admin/login";
pub const DASHBOARD_PATH: &str = "/admin/dashboard";
pub const PUBLIC_PATH: &str = "/";

/// Who is calling, as far as the admin surface is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    AuthenticatedNonAdmin,
    AuthenticatedAdmin,
}

impl AuthState {
    fn of(session: Option<&Session>) -> Self {
        match session {
            None => AuthState::Unauthenticated,
            Some(s) if s.is_admin => AuthState::AuthenticatedAdmin,
            Some(_) => AuthState::AuthenticatedNonAdmin,
        }
    }
}

/// The two classes of gated routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminRoute {
    /// The login page.
    Login,
    /// Any other admin route.
    Protected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RedirectToLogin,
    RedirectToDashboard,
    RedirectToPublic,
}

impl GateDecision {
    /// Redirect target, or `None` for [`GateDecision::Allow`].
    pub fn location(self) -> Option<&'static str> {
        match self {
            GateDecision::Allow => None,
            GateDecision::RedirectToLogin => Some(LOGIN_PATH),
            GateDecision::RedirectToDashboard => Some(DASHBOARD_PATH),
            GateDecision::RedirectToPublic => Some(PUBLIC_PATH),
        }
    }
}

/// The admin route policy.
pub fn decide(state: AuthState, route: AdminRoute) -> GateDecision {
    match (state, route) {
        (AuthState::Unauthenticated, AdminRoute::Login) => GateDecision::Allow,
        (AuthState::Unauthenticated, AdminRoute::Protected) => GateDecision::RedirectToLogin,
        (AuthState::AuthenticatedAdmin, AdminRoute::Login) => GateDecision::RedirectToDashboard,
        (AuthState::AuthenticatedAdmin, AdminRoute::Protected) => GateDecision::Allow,
        // A non-admin may still sign in as somebody else.
        (AuthState::AuthenticatedNonAdmin, AdminRoute::Login) => GateDecision::Allow,
        (AuthState::AuthenticatedNonAdmin, AdminRoute::Protected) => {
            GateDecision::RedirectToPublic
        }
    }
}

/// Errors from login and account management.
///
/// Every credential problem is the same opaque [`AuthError::LoginFailed`].
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("login failed")]
    LoginFailed,

    #[error("identifier and secret are required")]
    MissingCredentials,

    #[error("session lifetime out of range")]
    SessionTtlOutOfRange,

    #[error("identity store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// A freshly created session together with its bearer token.
///
/// The token is only ever handed to the client; the store keeps its digest.
#[derive(Clone)]
pub struct IssuedSession {
    pub token: String,
    pub session: Session,
}

impl std::fmt::Debug for IssuedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedSession")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct AccessGate {
    identities: Arc<dyn IdentityStore>,
}

impl AccessGate {
    pub fn new(identities: Arc<dyn IdentityStore>) -> Self {
        Self { identities }
    }

    /// Validate credentials and open a session that lives for `ttl`.
    ///
    /// The admin claim is checked before anything is stored, so a failed
    /// admin login never leaves a session behind. An unknown identifier
    /// costs the same argon2 verification as a wrong secret.
    pub async fn login(
        &self,
        identifier: &str,
        secret: &str,
        ttl: time::Duration,
    ) -> Result<IssuedSession, AuthError> {
        let Some(identity) = self.identities.find_identity(identifier).await? else {
            verify_absent(secret);
            return Err(AuthError::LoginFailed);
        };

        if !verify_password(secret, &identity.password_hash) {
            return Err(AuthError::LoginFailed);
        }

        if !identity.is_admin {
            warn!(username = %identity.username, "Login without admin privilege rejected");
            return Err(AuthError::LoginFailed);
        }

        let now = time::OffsetDateTime::now_utc();
        let expires_at = now
            .checked_add(ttl)
            .ok_or(AuthError::SessionTtlOutOfRange)?;

        let token = generate_token();
        let session = Session {
            token_hash: hash_token(&token),
            user_id: identity.id,
            username: identity.username,
            is_admin: identity.is_admin,
            created_at: now,
            expires_at,
        };
        self.identities.insert_session(&session).await?;

        info!(username = %session.username, "Admin logged in");
        Ok(IssuedSession { token, session })
    }

    /// Revoke the session behind `token`. Unknown tokens are fine.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.identities.delete_session(&hash_token(token)).await?;
        Ok(())
    }

    /// The live session behind `token`, if any.
    pub async fn current_session(&self, token: &str) -> Result<Option<Session>, StoreError> {
        let now = time::OffsetDateTime::now_utc();
        let session = self.identities.find_session(&hash_token(token)).await?;
        Ok(session.filter(|s| !s.is_expired(now)))
    }

    /// Resolve the caller's state. Store failures fail closed.
    pub async fn resolve(&self, token: Option<&str>) -> (AuthState, Option<Session>) {
        let Some(token) = token else {
            return (AuthState::Unauthenticated, None);
        };
        match self.current_session(token).await {
            Ok(session) => (AuthState::of(session.as_ref()), session),
            Err(e) => {
                warn!(error = %e, "Session lookup failed, treating caller as unauthenticated");
                (AuthState::Unauthenticated, None)
            }
        }
    }

    /// Whether account creation is open to the caller: always while no
    /// admin exists, otherwise only for an admin session.
    pub async fn may_create_account(&self, token: Option<&str>) -> bool {
        match self.identities.has_admin().await {
            Ok(false) => true,
            Ok(true) => self.resolve(token).await.0 == AuthState::AuthenticatedAdmin,
            Err(e) => {
                warn!(error = %e, "Admin lookup failed, refusing account creation");
                false
            }
        }
    }

    /// Replace the admin identity. All existing sessions are dropped.
    pub async fn create_account(&self, identifier: &str, secret: &str) -> Result<(), AuthError> {
        let identifier = identifier.trim();
        if identifier.is_empty() || secret.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        let hash = hash_password(secret)?;
        self.identities.replace_admin(identifier, &hash).await?;
        info!(username = %identifier, "Admin account replaced");
        Ok(())
    }

    /// Install `username` as admin unless an admin already exists.
    /// `password_hash` must already be an argon2 hash.
    pub async fn ensure_admin(&self, username: &str, password_hash: &str) -> Result<bool, AuthError> {
        if self.identities.has_admin().await? {
            return Ok(false);
        }
        self.identities.replace_admin(username, password_hash).await?;
        info!(username = %username, "Seeded admin account from configuration");
        Ok(true)
    }
}

/// 256 random bits, base64 encoded.
fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    fast32::base64::RFC4648_NOPAD.encode(&bytes)
}

/// SHA-256 digest of a token, as stored.
fn hash_token(token: &str) -> String {
    let digest = ring::digest::digest(&ring::digest::SHA256, token.as_bytes());
    fast32::base64::RFC4648_NOPAD.encode(digest.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Identity, MemoryIdentityStore};
    use async_trait::async_trait;

    const TTL: time::Duration = time::Duration::hours(24);

    async fn gate_with(admin: bool) -> (AccessGate, Arc<MemoryIdentityStore>) {
        let store = Arc::new(MemoryIdentityStore::new());
        let hash = hash_password("hunter2").unwrap();
        store.insert_identity("operator", &hash, admin).await;
        (AccessGate::new(store.clone()), store)
    }

    struct UnreachableStore;

    #[async_trait]
    impl IdentityStore for UnreachableStore {
        async fn find_identity(&self, _: &str) -> Result<Option<Identity>, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn has_admin(&self) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn replace_admin(&self, _: &str, _: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn insert_session(&self, _: &Session) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn find_session(&self, _: &str) -> Result<Option<Session>, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn delete_session(&self, _: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
    }

    /// Identities readable, session writes fail.
    struct SessionWritesFail(MemoryIdentityStore);

    #[async_trait]
    impl IdentityStore for SessionWritesFail {
        async fn find_identity(&self, username: &str) -> Result<Option<Identity>, StoreError> {
            self.0.find_identity(username).await
        }
        async fn has_admin(&self) -> Result<bool, StoreError> {
            self.0.has_admin().await
        }
        async fn replace_admin(&self, username: &str, hash: &str) -> Result<(), StoreError> {
            self.0.replace_admin(username, hash).await
        }
        async fn insert_session(&self, _: &Session) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("read-only".to_string()))
        }
        async fn find_session(&self, token_hash: &str) -> Result<Option<Session>, StoreError> {
            self.0.find_session(token_hash).await
        }
        async fn delete_session(&self, _: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("read-only".to_string()))
        }
    }

    #[test]
    fn test_decision_table() {
        use AdminRoute::*;
        use AuthState::*;
        use GateDecision::*;

        assert_eq!(decide(Unauthenticated, Protected), RedirectToLogin);
        assert_eq!(decide(Unauthenticated, Login), Allow);
        assert_eq!(decide(AuthenticatedAdmin, Login), RedirectToDashboard);
        assert_eq!(decide(AuthenticatedAdmin, Protected), Allow);
        assert_eq!(decide(AuthenticatedNonAdmin, Protected), RedirectToPublic);
        assert_eq!(decide(AuthenticatedNonAdmin, Login), Allow);
    }

    #[test]
    fn test_redirect_locations() {
        assert_eq!(GateDecision::Allow.location(), None);
        assert_eq!(GateDecision::RedirectToLogin.location(), Some("/admin/login"));
        assert_eq!(GateDecision::RedirectToDashboard.location(), Some("/admin/dashboard"));
        assert_eq!(GateDecision::RedirectToPublic.location(), Some("/"));
    }

    #[tokio::test]
    async fn test_admin_login_resolves_to_admin() {
        let (gate, _) = gate_with(true).await;
        let issued = gate.login("operator", "hunter2", TTL).await.unwrap();

        let (state, session) = gate.resolve(Some(&issued.token)).await;
        assert_eq!(state, AuthState::AuthenticatedAdmin);
        assert_eq!(session.unwrap().username, "operator");
    }

    #[tokio::test]
    async fn test_non_admin_login_leaves_no_session() {
        let (gate, store) = gate_with(false).await;
        let err = gate.login("operator", "hunter2", TTL).await.unwrap_err();

        assert!(matches!(err, AuthError::LoginFailed));
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_non_admin_login_never_writes_a_session() {
        let store = MemoryIdentityStore::new();
        let hash = hash_password("hunter2").unwrap();
        store.insert_identity("viewer", &hash, false).await;
        store.insert_identity("operator", &hash, true).await;
        let gate = AccessGate::new(Arc::new(SessionWritesFail(store)));

        let err = gate.login("viewer", "hunter2", TTL).await.unwrap_err();
        assert!(matches!(err, AuthError::LoginFailed));

        let err = gate.login("operator", "hunter2", TTL).await.unwrap_err();
        assert!(matches!(err, AuthError::Store(_)));
    }

    #[tokio::test]
    async fn test_ttl_overflow_is_an_error() {
        let (gate, store) = gate_with(true).await;
        let err = gate
            .login("operator", "hunter2", time::Duration::seconds(9_000_000_000_000))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::SessionTtlOutOfRange));
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_identifier_costs_a_verification() {
        let (gate, _) = gate_with(true).await;
        // Warm the absent-account hash so its one-off setup is not timed.
        let _ = gate.login("nobody", "x", TTL).await;

        let started = std::time::Instant::now();
        let _ = gate.login("operator", "wrong", TTL).await;
        let known = started.elapsed();

        let started = std::time::Instant::now();
        let err = gate.login("nobody", "wrong", TTL).await.unwrap_err();
        let unknown = started.elapsed();

        assert!(matches!(err, AuthError::LoginFailed));
        assert!(unknown * 10 >= known, "unknown {unknown:?} vs known {known:?}");
    }

    #[tokio::test]
    async fn test_bad_credentials_are_indistinguishable() {
        let (gate, _) = gate_with(true).await;
        let wrong_secret = gate.login("operator", "nope", TTL).await.unwrap_err();
        let unknown_user = gate.login("nobody", "hunter2", TTL).await.unwrap_err();
        assert_eq!(wrong_secret.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let (gate, _) = gate_with(true).await;
        let issued = gate.login("operator", "hunter2", TTL).await.unwrap();

        gate.logout(&issued.token).await.unwrap();
        gate.logout(&issued.token).await.unwrap();
        assert!(gate.current_session(&issued.token).await.unwrap().is_none());
        assert_eq!(
            gate.resolve(Some(&issued.token)).await.0,
            AuthState::Unauthenticated
        );
    }

    #[tokio::test]
    async fn test_expired_session_resolves_to_none() {
        let (gate, _) = gate_with(true).await;
        let issued = gate
            .login("operator", "hunter2", time::Duration::seconds(-1))
            .await
            .unwrap();
        assert!(gate.current_session(&issued.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_failure_fails_closed() {
        let gate = AccessGate::new(Arc::new(UnreachableStore));
        assert_eq!(
            gate.resolve(Some("any-token")).await.0,
            AuthState::Unauthenticated
        );
        assert!(!gate.may_create_account(None).await);
    }

    #[tokio::test]
    async fn test_account_bootstrap() {
        let store = Arc::new(MemoryIdentityStore::new());
        let gate = AccessGate::new(store.clone());

        assert!(gate.may_create_account(None).await);
        gate.create_account("root", "s3cret").await.unwrap();
        assert!(!gate.may_create_account(None).await);

        let issued = gate.login("root", "s3cret", TTL).await.unwrap();
        assert!(gate.may_create_account(Some(&issued.token)).await);

        // Replacing the account drops the session that did it.
        gate.create_account("root2", "n3w").await.unwrap();
        assert!(gate.current_session(&issued.token).await.unwrap().is_none());
        assert!(gate.login("root", "s3cret", TTL).await.is_err());
        assert!(gate.login("root2", "n3w", TTL).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_account_requires_credentials() {
        let gate = AccessGate::new(Arc::new(MemoryIdentityStore::new()));
        assert!(matches!(
            gate.create_account("  ", "x").await,
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            gate.create_account("root", "").await,
            Err(AuthError::MissingCredentials)
        ));
    }

    #[tokio::test]
    async fn test_ensure_admin_only_seeds_once() {
        let gate = AccessGate::new(Arc::new(MemoryIdentityStore::new()));
        let hash = hash_password("first").unwrap();
        assert!(gate.ensure_admin("root", &hash).await.unwrap());

        let other = hash_password("second").unwrap();
        assert!(!gate.ensure_admin("root", &other).await.unwrap());
        assert!(gate.login("root", "first", TTL).await.is_ok());
    }
}
