pub mod classify;
pub mod proposals;
pub mod table;
