#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod entities;
pub mod framework;
pub mod gate;
pub mod merge;
pub mod password;
pub mod render;
pub mod store;
