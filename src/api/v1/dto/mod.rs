pub mod announce;
pub mod auth;
