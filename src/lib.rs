//! Linkshelf - an in-memory link registry
//!
//! Maps URLs to short codes with a per-link click quota and a time-to-live,
//! and guarantees that one owner asking twice for the same URL gets one code.
//!
//! # Architecture
//! - `storage`: the link registry (records and indices) and the user registry
//! - `services`: link service facade, notifications, background eviction
//! - `utils`: code generation, URL validation, clock
//! - `config`: configuration loading
//! - `system`: application context, logging, shutdown

pub mod config;
pub mod errors;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
