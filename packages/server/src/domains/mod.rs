// Domain modules. Each owns its record shapes and store queries; routes
// stay thin on top of these.

pub mod auth;
pub mod buyers;
pub mod listings;
pub mod users;
