pub mod access;
pub mod guard;
pub mod ws;

pub use guard::AccessGuard;
