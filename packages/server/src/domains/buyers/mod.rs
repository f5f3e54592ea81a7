//! Buyers domain: purchase-side accounts and their saved search preferences.

pub mod models;

pub use models::*;
