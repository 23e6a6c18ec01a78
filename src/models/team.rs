//! Team model (team episodes only).

use serde::{Deserialize, Serialize};

use super::{EntityId, EpisodeId, FinalRound, TeamId};

/// A team competing in a team episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,

    pub episode_id: EpisodeId,

    pub team_name: String,

    /// Hex colour used when displaying the team (e.g., "#3B82F6")
    #[serde(default)]
    pub team_color: String,

    #[serde(default)]
    pub is_winner: bool,

    #[serde(default)]
    pub placement: Option<u32>,

    /// Sum of member points plus the team's final-round adjustment
    #[serde(default)]
    pub total_points: i64,

    #[serde(default)]
    pub final_wager: Option<u32>,

    #[serde(default)]
    pub final_correct: Option<bool>,
}

impl Team {
    /// Create a team; the ID is derived from episode, entry position and name.
    pub fn new(episode_id: EpisodeId, position: usize, team_name: String) -> Self {
        let id = EntityId::generate(&[
            episode_id.as_str(),
            "team",
            &position.to_string(),
            &team_name,
        ]);
        Self {
            id,
            episode_id,
            team_name,
            team_color: String::new(),
            is_winner: false,
            placement: None,
            total_points: 0,
            final_wager: None,
            final_correct: None,
        }
    }

    /// Builder method to set the display colour.
    pub fn with_color(mut self, color: String) -> Self {
        self.team_color = color;
        self
    }

    pub fn final_round(&self) -> Option<FinalRound> {
        FinalRound::from_parts(self.final_wager, self.final_correct)
    }
}
