pub mod auth;
pub mod cache;
pub mod gravatar;
pub mod mail;
