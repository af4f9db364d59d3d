pub mod catalog;
pub mod postgres_repo;
