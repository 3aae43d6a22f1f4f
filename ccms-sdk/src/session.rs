//! Session token transport shared by the server and the HTTP client.
//!
//! A session token travels either in the `ccms_session` cookie (browsers)
//! or in the `Ccms-Session` request header (API clients):
//!
//! ```text
//! Cookie: ccms_session={token}
//! Ccms-Session: {token}
//! ```

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "ccms_session";

/// Header name for non-browser session transport.
pub const SESSION_HEADER: &str = "Ccms-Session";

/// Find the session token in a `Cookie` header value.
pub fn token_from_cookie_header(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then_some(value)
    })
}

/// Find the session token in a `Set-Cookie` header value.
pub fn token_from_set_cookie(header: &str) -> Option<&str> {
    let first = header.split(';').next()?;
    let (name, value) = first.trim().split_once('=')?;
    (name == SESSION_COOKIE && !value.is_empty()).then_some(value)
}

/// Build the `Set-Cookie` value that installs a session.
pub fn session_cookie(token: &str, max_age_secs: u64, secure: bool) -> String {
    let mut cookie =
        format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
