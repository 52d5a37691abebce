pub mod admin;
pub mod auth;
pub mod boards;
pub mod claims;
pub mod feed;
pub mod tiles;
