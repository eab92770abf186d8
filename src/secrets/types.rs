//! Secure types for handling credential material.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A bearer-token wrapper that redacts its contents in Debug and Display
/// output and zeroes its memory on drop.
///
/// CA API keys extracted from credential secrets are carried in this type
/// so they can never leak through logging or error formatting. The actual
/// value is only reachable via [`SecretToken::expose`].
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretToken(String);

impl SecretToken {
    /// Wrap a token value.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Expose the underlying value. Never log or print the result.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true if the token is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretToken([REDACTED])")
    }
}

impl fmt::Display for SecretToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for SecretToken {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretToken {}

impl From<&str> for SecretToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for SecretToken {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}
