//! Short code generator
//!
//! Draws codes from the thread-local CSPRNG and remembers every code it has
//! handed out until the code is released.

use std::collections::HashSet;
use std::iter;

use parking_lot::Mutex;
use tracing::warn;

use crate::errors::{LinkshelfError, Result};

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Attempts before the keyspace for a length is treated as saturated.
pub const MAX_ATTEMPTS: usize = 100;

/// Longest code the generator will produce.
pub const MAX_CODE_LENGTH: usize = 64;

/// Random alphanumeric string of `length` characters.
pub fn generate_random_code(length: usize) -> String {
    iter::repeat_with(|| ALPHABET[rand::random_range(0..ALPHABET.len())] as char)
        .take(length)
        .collect()
}

/// Issues codes that are unique among all outstanding (unreleased) codes.
#[derive(Debug, Default)]
pub struct CodeGenerator {
    outstanding: Mutex<HashSet<String>>,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate and reserve a fresh code.
    pub fn generate(&self, length: usize) -> Result<String> {
        if length == 0 || length > MAX_CODE_LENGTH {
            return Err(LinkshelfError::config(format!(
                "Code length must be between 1 and {}, got {}",
                MAX_CODE_LENGTH, length
            )));
        }

        let mut outstanding = self.outstanding.lock();

        for _ in 0..MAX_ATTEMPTS {
            let code = generate_random_code(length);
            if outstanding.insert(code.clone()) {
                return Ok(code);
            }
        }

        warn!(
            "CodeGenerator: no free code of length {} after {} attempts ({} outstanding)",
            length,
            MAX_ATTEMPTS,
            outstanding.len()
        );
        Err(LinkshelfError::generation_exhausted(format!(
            "No unique code of length {} found after {} attempts",
            length, MAX_ATTEMPTS
        )))
    }

    /// Return a code to the pool. Returns false if it was not outstanding.
    pub fn release(&self, code: &str) -> bool {
        self.outstanding.lock().remove(code)
    }

    pub fn is_in_use(&self, code: &str) -> bool {
        self.outstanding.lock().contains(code)
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.lock().len()
    }
}
