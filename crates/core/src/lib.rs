//! Domain logic shared by the database and HTTP layers.
//!
//! This crate performs no I/O: it holds the error taxonomy, role and access
//! policy rules, pagination math, and the attachment and input validation
//! rules.

pub mod attachments;
pub mod error;
pub mod hashing;
pub mod pagination;
pub mod roles;
pub mod types;
pub mod validation;
