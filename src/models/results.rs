//! Per-episode results in their two shapes.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Appearance, Episode, EpisodeType, Player, PlayerId, Team};

/// A team together with its members' appearances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamResult {
    pub team: Team,
    pub members: Vec<Appearance>,
}

/// All results for one episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "episode_type", content = "entries", rename_all = "lowercase")]
pub enum EpisodeResults {
    Solo(Vec<Appearance>),
    Team(Vec<TeamResult>),
}

impl EpisodeResults {
    /// Assemble the results of one episode from its stored rows.
    ///
    /// Team-episode appearances whose team is missing are dropped.
    pub fn from_rows(episode_type: EpisodeType, appearances: Vec<Appearance>, teams: Vec<Team>) -> Self {
        match episode_type {
            EpisodeType::Solo => EpisodeResults::Solo(appearances),
            EpisodeType::Team => {
                let mut grouped: Vec<TeamResult> = teams
                    .into_iter()
                    .map(|team| TeamResult {
                        team,
                        members: Vec::new(),
                    })
                    .collect();
                for appearance in appearances {
                    let slot = appearance
                        .team_id
                        .as_ref()
                        .and_then(|tid| grouped.iter_mut().find(|t| &t.team.id == tid));
                    match slot {
                        Some(team) => team.members.push(appearance),
                        None => warn!(
                            "Appearance {} has no matching team in episode {}",
                            appearance.id, appearance.episode_id
                        ),
                    }
                }
                EpisodeResults::Team(grouped)
            }
        }
    }

    pub fn episode_type(&self) -> EpisodeType {
        match self {
            EpisodeResults::Solo(_) => EpisodeType::Solo,
            EpisodeResults::Team(_) => EpisodeType::Team,
        }
    }

    /// Number of players who appeared.
    pub fn participant_count(&self) -> usize {
        match self {
            EpisodeResults::Solo(rows) => rows.len(),
            EpisodeResults::Team(teams) => teams.iter().map(|t| t.members.len()).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.participant_count() == 0
    }

    pub fn has_winner(&self) -> bool {
        match self {
            EpisodeResults::Solo(rows) => rows.iter().any(|r| r.is_winner),
            EpisodeResults::Team(teams) => teams.iter().any(|t| t.team.is_winner),
        }
    }
}

/// Rows to persist for one episode after results entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRows {
    pub appearances: Vec<Appearance>,
    pub teams: Vec<Team>,
    pub final_round_winner_id: Option<PlayerId>,
}

/// An appearance joined with its player and episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppearanceDetail {
    pub appearance: Appearance,
    pub player: Player,
    pub episode: Episode,
}
