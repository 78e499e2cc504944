//! Validated username newtype.
//!
//! [`Username`] wraps a non-empty, trimmed string. It identifies one chat
//! session and is the key in [`super::ConnectionRegistry`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Identifier for one chat participant.
///
/// Guaranteed non-empty and free of leading/trailing whitespace. A
/// username backs at most one live connection at a time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Parses a raw string into a `Username`, trimming whitespace first.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::EmptyUsername`] if the trimmed input is empty.
    pub fn parse(raw: &str) -> Result<Self, ChatError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ChatError::EmptyUsername);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hashes identically to the inner string, so `&str` can be used for
// map lookups without allocating.
impl std::borrow::Borrow<str> for Username {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_whitespace() {
        let Ok(name) = Username::parse("  alice  ") else {
            panic!("expected valid username");
        };
        assert_eq!(name.as_str(), "alice");
    }

    #[test]
    fn parse_rejects_empty() {
        assert!(Username::parse("").is_err());
    }

    #[test]
    fn parse_rejects_whitespace_only() {
        assert!(Username::parse("   ").is_err());
    }

    #[test]
    fn display_matches_inner() {
        let Ok(name) = Username::parse("bob") else {
            panic!("expected valid username");
        };
        assert_eq!(format!("{name}"), "bob");
    }

    #[test]
    fn hash_works_in_hashmap() {
        use std::collections::HashMap;
        let Ok(name) = Username::parse("carol") else {
            panic!("expected valid username");
        };
        let mut map = HashMap::new();
        map.insert(name.clone(), "test");
        assert_eq!(map.get(&name), Some(&"test"));
    }

    #[test]
    fn map_lookup_by_str_via_borrow() {
        use std::collections::HashMap;
        let Ok(name) = Username::parse("dave") else {
            panic!("expected valid username");
        };
        let mut map = HashMap::new();
        map.insert(name, "test");
        assert_eq!(map.get("dave"), Some(&"test"));
        assert_eq!(map.get("mallory"), None);
    }
}
