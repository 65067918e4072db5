pub mod pagination;
pub mod response;
pub mod todo;
pub mod user;
