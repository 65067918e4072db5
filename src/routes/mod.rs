pub mod auth;
pub mod error;
pub mod health;
pub mod todo;
pub mod user;
