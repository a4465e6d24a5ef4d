//! Domain traits - Abstractions for infrastructure implementations

pub mod identity;
pub mod store;

pub use identity::{FixedIdentity, IdentityProvider};
pub use store::{DocumentStore, QueryRows, Subscription};
