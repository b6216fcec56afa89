pub mod find;
pub mod transfer;
