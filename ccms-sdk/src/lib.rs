//! Shared types for Checkout CMS.
//!
//! The server, the admin tooling and any third-party integration exchange
//! the types in [`objects`]. The optional `client` feature adds typed HTTP
//! clients.

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
pub mod session;
