pub mod postgres_repository;
pub mod todo;
pub mod user;
