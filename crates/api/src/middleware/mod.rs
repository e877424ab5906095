//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- identity from a Bearer token (API requests).
//! - [`auth::WebUser`] -- identity from the session cookie (browser pages).
//! - [`rbac::Authorized`] / [`rbac::WebAuthorized`] -- identity plus an
//!   access policy check, with aliases such as [`rbac::RequireSuperAdmin`].

pub mod auth;
pub mod rbac;
