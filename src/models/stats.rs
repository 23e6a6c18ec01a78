//! Aggregate view models.
//!
//! These mirror the `player_career_stats` and `episode_summary` database
//! views. Every column of a view is nullable, so numeric columns read null as
//! zero.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::{EpisodeId, EpisodeType, PlayerId};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Lifetime totals for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerCareerStats {
    pub id: PlayerId,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,

    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub total_appearances: u32,

    #[serde(default, deserialize_with = "null_as_default")]
    pub total_wins: u32,

    /// Wins / appearances, 0-100
    #[serde(default, deserialize_with = "null_as_default")]
    pub win_percentage: f64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub total_points: i64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub avg_points_per_appearance: f64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub total_questions_seen: u32,

    #[serde(default, deserialize_with = "null_as_default")]
    pub total_questions_correct: u32,

    /// Correct / seen over the whole career, 0-100
    #[serde(default, deserialize_with = "null_as_default")]
    pub accuracy_percentage: f64,

    #[serde(default)]
    pub highest_score: Option<i64>,

    #[serde(default)]
    pub lowest_score: Option<i64>,

    #[serde(default)]
    pub first_appearance: Option<NaiveDate>,

    #[serde(default)]
    pub last_appearance: Option<NaiveDate>,
}

/// One row per episode with its headline result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub id: EpisodeId,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default)]
    pub season: Option<u32>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub episode_number: u32,

    #[serde(default)]
    pub air_date: Option<NaiveDate>,

    #[serde(default)]
    pub youtube_url: Option<String>,

    #[serde(default)]
    pub thumbnail_url: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub episode_type: EpisodeType,

    /// Winning player (solo episodes only)
    #[serde(default)]
    pub winner_id: Option<PlayerId>,

    /// Winning player or team name
    #[serde(default)]
    pub winner_name: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub participant_count: u32,

    #[serde(default)]
    pub highest_score: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_career_stats_null_columns_read_as_zero() {
        let json = r#"{
            "id": "p-1",
            "name": "Amanda",
            "slug": "amanda",
            "image_url": null,
            "total_appearances": null,
            "total_wins": null,
            "win_percentage": null,
            "total_points": null,
            "avg_points_per_appearance": null,
            "total_questions_seen": null,
            "total_questions_correct": null,
            "accuracy_percentage": null,
            "highest_score": null,
            "lowest_score": null,
            "first_appearance": null,
            "last_appearance": null
        }"#;
        let stats: PlayerCareerStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.total_appearances, 0);
        assert_eq!(stats.win_percentage, 0.0);
        assert!(stats.highest_score.is_none());
    }

    #[test]
    fn test_career_stats_from_view_row() {
        let json = r#"{
            "id": "p-1",
            "name": "Amanda",
            "slug": "amanda",
            "total_appearances": 4,
            "total_wins": 1,
            "win_percentage": 25.0,
            "total_points": 4100,
            "avg_points_per_appearance": 1025.0,
            "total_questions_seen": 80,
            "total_questions_correct": 50,
            "accuracy_percentage": 62.5,
            "highest_score": 1800,
            "lowest_score": -100,
            "first_appearance": "2024-01-05",
            "last_appearance": "2024-04-05"
        }"#;
        let stats: PlayerCareerStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.total_wins, 1);
        assert_eq!(stats.lowest_score, Some(-100));
        assert_eq!(
            stats.first_appearance,
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
    }

    #[test]
    fn test_episode_summary_minimal_row() {
        let json = r#"{"id": "ep-1", "title": null, "episode_type": null, "participant_count": null}"#;
        let summary: EpisodeSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.title, "");
        assert_eq!(summary.episode_type, EpisodeType::Solo);
        assert_eq!(summary.participant_count, 0);
        assert!(summary.winner_name.is_none());
    }
}
