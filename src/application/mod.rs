//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Services: The relationship, trade, conversation, account, and shop managers
//! - Profiles: Typed repository over the users collection
//! - Launch: Native-client launch links
//! - Errors: Service-level error types

pub mod errors;
pub mod launch;
pub mod profiles;
pub mod services;
