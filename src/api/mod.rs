pub mod resp;
pub mod v1;
