pub mod config;
pub mod constants;
pub mod input;
pub mod message;
pub mod session;
