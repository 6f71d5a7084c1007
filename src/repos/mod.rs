pub mod announce_repo;
pub mod error;
pub mod user_repo;
