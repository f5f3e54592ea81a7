// Infrastructure: the hosted-store and hosted-identity collaborators,
// the query description they share, and the injected dependency bundle.

pub mod deps;
pub mod gotrue_client;
pub mod query;
pub mod supabase_store;
pub mod test_dependencies;
pub mod traits;

pub use deps::*;
pub use gotrue_client::*;
pub use query::*;
pub use supabase_store::*;
pub use traits::*;

/// Collection names in the hosted store.
///
/// This is the schema-adapter boundary: when a collection is versioned
/// (listings -> listings_v2), the rename happens here and nowhere else.
pub mod collections {
    pub const LISTINGS: &str = "listings_v2";
    pub const PROFILES: &str = "profiles";
    pub const BUYERS: &str = "buyers";
}
