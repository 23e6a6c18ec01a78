//! Entity identifiers.
//!
//! Rows created by the hosted database carry UUID primary keys. Rows created
//! locally either get a fresh UUID (players, episodes) or a deterministic
//! SHA256-derived UUID (appearances, teams) so that re-saving the same results
//! produces the same row ids. Both kinds fit a uuid-typed column.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::{Builder, Uuid};

/// Identifier of a stored row.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Wrap an existing id string.
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// A fresh random (v4) UUID.
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Generate an EntityId from input fields.
    /// The first 16 bytes of a SHA256 over the fields become a v8 (custom) UUID.
    pub fn generate(fields: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                hasher.update(b"|");
            }
            hasher.update(field.as_bytes());
        }
        let digest = hasher.finalize();
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        Self(Builder::from_custom_bytes(bytes).into_uuid().to_string())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

pub type PlayerId = EntityId;

pub type EpisodeId = EntityId;

pub type AppearanceId = EntityId;

pub type TeamId = EntityId;
