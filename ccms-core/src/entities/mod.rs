//! SQL query objects.
//!
//! Each query is a plain struct processed by
//! [`DatabaseProcessor`](crate::framework::DatabaseProcessor) through
//! [`kanau::processor::Processor`].

pub mod admin_sessions;
pub mod admin_users;
pub mod cms_documents;
