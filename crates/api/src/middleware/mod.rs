//! Request extractors.
//!
//! - [`auth::AdminUser`] -- Requires a valid admin session.

pub mod auth;
