//! Infrastructure layer: collaborators, persistence and logging

pub mod auth;
pub mod logging;
pub mod user;
