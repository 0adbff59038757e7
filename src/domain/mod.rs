pub mod authorization;
pub mod interaction;
pub mod order;
pub mod token;
