//! Entity identifiers and the generator that mints them.
//!
//! Ids are opaque strings so that documents produced elsewhere (or by older
//! versions) round-trip untouched. Freshly minted ids carry an entity prefix
//! followed by a v4 UUID.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a node, unique within a document and immutable once assigned.
    NodeId
);

string_id!(
    /// Identifier of an edge, unique within a document.
    EdgeId
);

/// Produces collision-resistant identifiers for nodes and edges.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator;

impl IdGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn node_id(&self) -> NodeId {
        NodeId(Self::mint("node"))
    }

    pub fn edge_id(&self) -> EdgeId {
        EdgeId(Self::mint("edge"))
    }

    fn mint(prefix: &str) -> String {
        format!("{}_{}", prefix, Uuid::new_v4().simple())
    }
}
