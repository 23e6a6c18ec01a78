//! Episode model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityId, EpisodeId, PlayerId};
use crate::media;

/// Whether contestants play for themselves or in teams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpisodeType {
    #[default]
    Solo,
    Team,
}

impl std::fmt::Display for EpisodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EpisodeType::Solo => write!(f, "solo"),
            EpisodeType::Team => write!(f, "team"),
        }
    }
}

impl std::str::FromStr for EpisodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "solo" => Ok(EpisodeType::Solo),
            "team" => Ok(EpisodeType::Team),
            other => Err(format!("unknown episode type: {}", other)),
        }
    }
}

/// One aired game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: EpisodeId,

    pub title: String,

    #[serde(default)]
    pub season: Option<u32>,

    pub episode_number: u32,

    pub air_date: NaiveDate,

    #[serde(default)]
    pub youtube_url: Option<String>,

    #[serde(default)]
    pub thumbnail_url: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub episode_type: EpisodeType,

    /// Player who won the bonus final round, if recorded
    #[serde(default, rename = "final_beopardy_winner_id")]
    pub final_round_winner_id: Option<PlayerId>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Episode {
    /// Create a new Episode with a random ID.
    pub fn new(title: String, episode_number: u32, air_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::random(),
            title,
            season: None,
            episode_number,
            air_date,
            youtube_url: None,
            thumbnail_url: None,
            description: None,
            episode_type: EpisodeType::Solo,
            final_round_winner_id: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Builder method to set the season.
    pub fn with_season(mut self, season: u32) -> Self {
        self.season = Some(season);
        self
    }

    /// Builder method to set the episode format.
    pub fn with_type(mut self, episode_type: EpisodeType) -> Self {
        self.episode_type = episode_type;
        self
    }

    /// Builder method to set the video link.
    pub fn with_youtube_url(mut self, url: String) -> Self {
        self.youtube_url = Some(url);
        self
    }

    /// Stored thumbnail, falling back to the video's YouTube thumbnail.
    pub fn display_thumbnail(&self) -> Option<String> {
        self.thumbnail_url.clone().or_else(|| {
            self.youtube_url
                .as_deref()
                .and_then(media::youtube_thumbnail)
        })
    }
}
