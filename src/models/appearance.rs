//! Appearance model: one player's results in one episode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AppearanceId, EntityId, EpisodeId, PlayerId, TeamId};

/// Outcome of the bonus final round.
///
/// Only exists when both the wager and the correctness were recorded; a row
/// with either column null did not take part in the final round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalRound {
    pub wager: u32,
    pub correct: bool,
}

impl FinalRound {
    pub fn new(wager: u32, correct: bool) -> Self {
        Self { wager, correct }
    }

    /// Combine the two nullable storage columns.
    pub fn from_parts(wager: Option<u32>, correct: Option<bool>) -> Option<Self> {
        match (wager, correct) {
            (Some(wager), Some(correct)) => Some(Self { wager, correct }),
            _ => None,
        }
    }
}

/// A player's recorded participation in one episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    pub id: AppearanceId,

    pub episode_id: EpisodeId,

    pub player_id: PlayerId,

    /// Team the player played for (team episodes only)
    #[serde(default)]
    pub team_id: Option<TeamId>,

    #[serde(default)]
    pub questions_seen: u32,

    #[serde(default)]
    pub questions_correct: u32,

    /// Final recorded score, including any final-round adjustment
    #[serde(default)]
    pub points_scored: i64,

    /// Always false for team-episode rows
    #[serde(default)]
    pub is_winner: bool,

    /// Explicit final rank (1 = first)
    #[serde(default)]
    pub placement: Option<u32>,

    #[serde(default)]
    pub final_wager: Option<u32>,

    #[serde(default)]
    pub final_correct: Option<bool>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Appearance {
    /// Create an empty appearance; the ID is derived from episode + player.
    pub fn new(episode_id: EpisodeId, player_id: PlayerId) -> Self {
        let id = EntityId::generate(&[episode_id.as_str(), player_id.as_str()]);
        Self {
            id,
            episode_id,
            player_id,
            team_id: None,
            questions_seen: 0,
            questions_correct: 0,
            points_scored: 0,
            is_winner: false,
            placement: None,
            final_wager: None,
            final_correct: None,
            notes: None,
            created_at: Some(Utc::now()),
            updated_at: None,
        }
    }

    /// Builder method to set the recorded score.
    pub fn with_points(mut self, points: i64) -> Self {
        self.points_scored = points;
        self
    }

    /// Builder method to set question counts.
    pub fn with_questions(mut self, seen: u32, correct: u32) -> Self {
        self.questions_seen = seen;
        self.questions_correct = correct;
        self
    }

    /// Builder method to mark the episode winner.
    pub fn as_winner(mut self) -> Self {
        self.is_winner = true;
        self
    }

    /// Builder method to set the placement.
    pub fn with_placement(mut self, placement: u32) -> Self {
        self.placement = Some(placement);
        self
    }

    /// Builder method to record a final-round outcome.
    pub fn with_final_round(mut self, final_round: FinalRound) -> Self {
        self.final_wager = Some(final_round.wager);
        self.final_correct = Some(final_round.correct);
        self
    }

    /// Builder method to assign a team.
    pub fn with_team(mut self, team_id: TeamId) -> Self {
        self.team_id = Some(team_id);
        self
    }

    pub fn final_round(&self) -> Option<FinalRound> {
        FinalRound::from_parts(self.final_wager, self.final_correct)
    }

    /// Percentage of seen questions answered correctly.
    pub fn accuracy(&self) -> f64 {
        crate::calculate::accuracy(self.questions_correct, self.questions_seen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_round_requires_both_parts() {
        assert_eq!(
            FinalRound::from_parts(Some(100), Some(true)),
            Some(FinalRound::new(100, true))
        );
        assert_eq!(FinalRound::from_parts(Some(100), None), None);
        assert_eq!(FinalRound::from_parts(None, Some(false)), None);
        assert_eq!(FinalRound::from_parts(None, None), None);
    }

    #[test]
    fn test_appearance_id_is_deterministic() {
        let a = Appearance::new("ep-1".into(), "p-1".into());
        let b = Appearance::new("ep-1".into(), "p-1".into());
        let c = Appearance::new("ep-1".into(), "p-2".into());
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn test_appearance_builders() {
        let a = Appearance::new("ep-1".into(), "p-1".into())
            .with_points(1200)
            .with_questions(20, 15)
            .as_winner()
            .with_placement(1)
            .with_final_round(FinalRound::new(300, false));

        assert_eq!(a.points_scored, 1200);
        assert!(a.is_winner);
        assert_eq!(a.placement, Some(1));
        assert_eq!(a.final_round(), Some(FinalRound::new(300, false)));
        assert!((a.accuracy() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_appearance_row_with_nulls() {
        let json = r#"{
            "id": "a-1",
            "episode_id": "ep-1",
            "player_id": "p-1",
            "questions_seen": 0,
            "questions_correct": 0,
            "points_scored": -200,
            "is_winner": false,
            "placement": null,
            "final_wager": 500,
            "final_correct": null,
            "notes": null
        }"#;
        let a: Appearance = serde_json::from_str(json).unwrap();
        assert_eq!(a.points_scored, -200);
        assert!(a.team_id.is_none());
        assert!(a.final_round().is_none());
        assert_eq!(a.accuracy(), 0.0);
    }
}
