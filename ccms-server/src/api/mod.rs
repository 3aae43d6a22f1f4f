//! HTTP handlers.
//!
//! - [`public`]: the checkout page data, open to everyone.
//! - [`admin`]: login, account management and the document editor.

pub mod admin;
pub mod extractors;
pub mod public;
