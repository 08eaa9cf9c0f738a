mod accounts;
mod auth_service;

pub use accounts::*;
pub use auth_service::*;
