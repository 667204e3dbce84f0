//! Error types for the cacheplex library.
//!
//! Cache operations themselves are total and never fail (a miss is a normal
//! negative outcome). The only fallible surface is configuration: the
//! `try_`-prefixed constructors and
//! [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build)
//! validate user-supplied parameters and return [`ConfigError`] instead of
//! silently clamping.
//!
//! ## Example Usage
//!
//! ```
//! use cacheplex::error::ConfigError;
//! use cacheplex::policy::lru_k::LrukCache;
//!
//! // Fallible constructor for user-configurable parameters
//! let cache: Result<LrukCache<u64, u64>, ConfigError> = LrukCache::try_new(100, 50, 2);
//! assert!(cache.is_ok());
//!
//! // Invalid threshold is caught without panicking
//! let bad = LrukCache::<u64, u64>::try_new(100, 50, 0);
//! assert!(bad.is_err());
//! ```

use std::fmt;

/// Error returned when cache configuration parameters are invalid.
///
/// Carries a human-readable description of which parameter failed
/// validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}
