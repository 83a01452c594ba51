pub mod api;
pub mod auth;
pub mod card;
pub mod cli;
pub mod router;
pub mod session;

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
