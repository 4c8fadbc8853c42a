//! System-level modules
//!
//! - Application context (dependency wiring)
//! - Logging initialization
//! - Shutdown handling

pub mod context;
pub mod logging;
pub mod shutdown;

pub use context::AppContext;
