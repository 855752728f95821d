//! Error types returned by this crate.
//!
//! The kernel never panics on malformed input (spec: "no panics on malformed peaks") and never
//! propagates an error from a spectrum-level call — a spectrum that cannot be deconvoluted yields
//! an empty `Vec<PeakGroup>`, not an `Err`. The only failure mode that is a real error is invalid
//! configuration discovered at construction time.

use std::fmt;

/// A configuration error raised by [`crate::Parameters::validate`] / [`crate::Engine::new`].
///
/// Modelled on a plain struct implementing [`std::error::Error`] rather than a `thiserror`
/// enum-per-variant, matching the teacher crate's own error type: this is a library with no CLI
/// to render diagnostics for, so there is no benefit to a rich derive macro, only to a short and
/// a long description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    short_description: String,
    long_description: String,
}

impl ConfigError {
    /// Create a new configuration error.
    pub fn new(short_desc: impl Into<String>, long_desc: impl Into<String>) -> Self {
        Self {
            short_description: short_desc.into(),
            long_description: long_desc.into(),
        }
    }

    /// A short description of the error, generally used as a title line.
    pub fn short_description(&self) -> &str {
        &self.short_description
    }

    /// A longer description with more detail on what was wrong and why.
    pub fn long_description(&self) -> &str {
        &self.long_description
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.short_description, self.long_description)
    }
}

impl std::error::Error for ConfigError {}
