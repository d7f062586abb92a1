pub mod claims;
pub mod extractors;
pub mod policy;
pub mod resolver;

pub use extractors::{AdminUser, CurrentUser};
pub use policy::{AccessError, AccessPolicy};
pub use resolver::IdentityResolver;
