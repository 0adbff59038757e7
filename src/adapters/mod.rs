pub mod converty;
pub mod database;
pub mod memory;
