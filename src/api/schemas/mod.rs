pub mod health;
pub mod oauth;
pub mod orders;
pub mod records;
