//! Correlation tokens and listener ids.
//!
//! A [`Token`] is a short opaque string: 8 characters drawn from the base-36
//! alphabet `[0-9a-z]`. It pairs an outbound command with its reply and also
//! serves as the default id of a listener registration, so the two share one
//! type ([`ListenerId`]).
//!
//! Tokens carry no state and are not guaranteed unique. Collisions are rare,
//! and the registry resolves them per type with last-write-wins.

use std::borrow::Borrow;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of characters in a generated token.
pub const TOKEN_LEN: usize = 8;

/// Characters a generated token is drawn from.
pub const TOKEN_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a fresh random token string.
fn generate() -> String {
    let mut rng = rand::rng();
    (0..TOKEN_LEN)
        .map(|_| char::from(TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())]))
        .collect()
}

/// Opaque correlation token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

/// Listener ids are tokens; a correlated send registers its reply listener
/// under the token it transmits.
pub type ListenerId = Token;

impl Token {
    /// Create a new random token.
    #[must_use]
    pub fn new() -> Self {
        Self(generate())
    }

    /// Return the inner string as a slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume self and return the inner `String`.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Default for Token {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for Token {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Token {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.0
    }
}
