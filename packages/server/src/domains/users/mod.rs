//! Users domain: host/profile accounts.

pub mod models;

pub use models::*;
