pub mod interaction;
pub mod token;

pub use interaction::InteractionRecord;
pub use token::TokenInfoRecord;
