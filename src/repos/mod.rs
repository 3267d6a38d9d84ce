pub mod contact_repo;
pub mod error;
pub mod user_repo;
