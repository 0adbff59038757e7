pub mod authorization_state;
pub mod health_service;
pub mod interaction_service;
pub mod partner_service;
pub mod stores;
pub mod token_service;
