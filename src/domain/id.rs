//! Identifiers for navigation nodes, content blocks and pages
//!
//! ID Format:
//! - Freshly generated IDs are lowercase hyphenated UUID v4 strings
//!   (e.g. `7f2b4c1e-9d3e-4f25-a1b2-0c3d4e5f6a7b`)
//! - IDs read from persisted data may be any non-empty string; seed data
//!   uses readable ids such as `group-main` or `page-faq`
//!
//! All three kinds share the same rules but are distinct types so a block id
//! can never be passed where a navigation node id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid {kind} ID: must be a non-empty string, got '{value}'")]
    Invalid { kind: &'static str, value: String },
}

fn check(kind: &'static str, value: &str) -> Result<(), IdError> {
    if value.is_empty() {
        return Err(IdError::Invalid {
            kind,
            value: value.to_string(),
        });
    }
    Ok(())
}

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident, $kind:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Generates a fresh random ID
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Returns the ID as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                check($kind, s)?;
                Ok(Self(s.to_string()))
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                check($kind, &value)?;
                Ok(Self(value))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a navigation tree node, unique across the whole forest
    NodeId,
    "node"
);

string_id!(
    /// Identifier of a content block, unique within its page (sections included)
    BlockId,
    "block"
);

string_id!(
    /// Identifier of a page document
    PageId,
    "page"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_uuids() {
        let id = BlockId::generate();
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(NodeId::generate(), NodeId::generate());
    }

    #[test]
    fn parse_readable_id() {
        let id: NodeId = "group-main".parse().unwrap();
        assert_eq!(id.to_string(), "group-main");
    }

    #[test]
    fn reject_empty_id() {
        let err = "".parse::<PageId>().unwrap_err();
        assert!(matches!(err, IdError::Invalid { kind: "page", .. }));
    }

    #[test]
    fn serde_roundtrip_as_plain_string() {
        let id: BlockId = "b-1".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"b-1\"");

        let parsed: BlockId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn serde_rejects_empty() {
        assert!(serde_json::from_str::<BlockId>("\"\"").is_err());
    }
}
