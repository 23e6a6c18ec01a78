//! Player model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityId, PlayerId};

/// A contestant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,

    /// URL-safe unique handle (e.g., "shayne-topp")
    pub slug: String,

    /// Display name
    pub name: String,

    /// Profile image
    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Player {
    /// Create a new Player with a random ID.
    pub fn new(name: String, slug: String) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::random(),
            slug,
            name,
            image_url: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Builder method to set the profile image.
    pub fn with_image_url(mut self, url: String) -> Self {
        self.image_url = Some(url);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_creation() {
        let player = Player::new("Shayne Topp".to_string(), "shayne-topp".to_string())
            .with_image_url("https://example.com/shayne.png".to_string());

        assert_eq!(player.name, "Shayne Topp");
        assert_eq!(player.slug, "shayne-topp");
        assert!(player.image_url.is_some());
        assert_eq!(player.created_at, player.updated_at);
    }

    #[test]
    fn test_player_from_database_row() {
        let json = r#"{
            "id": "0b8f8f0e-7d1c-4a57-9d43-5d5c7c0e7d11",
            "slug": "amanda",
            "name": "Amanda",
            "image_url": null,
            "created_at": "2025-01-02T10:00:00+00:00",
            "updated_at": null
        }"#;
        let player: Player = serde_json::from_str(json).unwrap();
        assert_eq!(player.slug, "amanda");
        assert!(player.image_url.is_none());
        assert!(player.created_at.is_some());
        assert!(player.updated_at.is_none());
    }
}
