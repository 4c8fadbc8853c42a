//! In-memory stores: links and users.

pub mod link_registry;
pub mod models;
pub mod user_registry;

pub use link_registry::{LinkRegistry, RegistryConfig, RegistryStats};
pub use models::{LinkState, ShortLink};
pub use user_registry::{DEFAULT_INBOX_CAPACITY, User, UserRegistry};
