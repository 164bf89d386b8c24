//! User persistence

pub mod repository;

pub use repository::{open_database, UserRepository};
