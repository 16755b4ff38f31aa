//! Credential matching for the vault agent.
//!
//! Records are scoped to an origin (scheme, host and port). Matching is exact equality of
//! normalised origins; there is no subdomain, substring or wildcard matching.

pub mod errors;
pub mod matcher;
pub mod model;
pub mod origin;
pub mod store;

pub use errors::{MalformedOrigin, StoreError};
pub use matcher::find_matching;
pub use model::CredentialRecord;
pub use origin::normalize_origin;
pub use store::{CredentialStore, InMemoryCredentialStore};
