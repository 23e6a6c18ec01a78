//! Leaderboards over career stats.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::MIN_APPEARANCES_FOR_RATES;
use crate::models::PlayerCareerStats;

/// Number of players shown in the overview's top winners.
pub const TOP_WINNERS_LIMIT: usize = 5;

/// Ranking dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardCategory {
    #[default]
    Wins,
    WinRate,
    Points,
    Accuracy,
    Appearances,
}

impl LeaderboardCategory {
    pub const ALL: [LeaderboardCategory; 5] = [
        LeaderboardCategory::Wins,
        LeaderboardCategory::WinRate,
        LeaderboardCategory::Points,
        LeaderboardCategory::Accuracy,
        LeaderboardCategory::Appearances,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LeaderboardCategory::Wins => "Most Wins",
            LeaderboardCategory::WinRate => "Best Win Rate",
            LeaderboardCategory::Points => "Most Points",
            LeaderboardCategory::Accuracy => "Best Accuracy",
            LeaderboardCategory::Appearances => "Most Appearances",
        }
    }

    /// Appearances a player needs to be ranked in this category.
    pub fn min_appearances(&self) -> u32 {
        match self {
            LeaderboardCategory::WinRate | LeaderboardCategory::Accuracy => {
                MIN_APPEARANCES_FOR_RATES
            }
            _ => 1,
        }
    }

    /// The ranked value for one player.
    pub fn value(&self, stats: &PlayerCareerStats) -> f64 {
        match self {
            LeaderboardCategory::Wins => stats.total_wins as f64,
            LeaderboardCategory::WinRate => stats.win_percentage,
            LeaderboardCategory::Points => stats.total_points as f64,
            LeaderboardCategory::Accuracy => stats.accuracy_percentage,
            LeaderboardCategory::Appearances => stats.total_appearances as f64,
        }
    }
}

impl std::fmt::Display for LeaderboardCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LeaderboardCategory::Wins => "wins",
            LeaderboardCategory::WinRate => "win_rate",
            LeaderboardCategory::Points => "points",
            LeaderboardCategory::Accuracy => "accuracy",
            LeaderboardCategory::Appearances => "appearances",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for LeaderboardCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "wins" => Ok(LeaderboardCategory::Wins),
            "win_rate" | "winrate" => Ok(LeaderboardCategory::WinRate),
            "points" => Ok(LeaderboardCategory::Points),
            "accuracy" => Ok(LeaderboardCategory::Accuracy),
            "appearances" => Ok(LeaderboardCategory::Appearances),
            other => Err(format!("unknown leaderboard category: {}", other)),
        }
    }
}

/// One row on a leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub value: f64,
    pub player: PlayerCareerStats,
}

/// Rank players for a category, highest value first, ties by name.
pub fn leaderboard(
    stats: &[PlayerCareerStats],
    category: LeaderboardCategory,
    limit: Option<usize>,
) -> Vec<LeaderboardEntry> {
    let min = category.min_appearances();
    let mut eligible: Vec<&PlayerCareerStats> = stats
        .iter()
        .filter(|s| s.total_appearances > 0 && s.total_appearances >= min)
        .collect();

    eligible.sort_by(|a, b| {
        category
            .value(b)
            .total_cmp(&category.value(a))
            .then_with(|| a.name.cmp(&b.name))
    });

    eligible
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .enumerate()
        .map(|(i, s)| LeaderboardEntry {
            rank: i as u32 + 1,
            value: category.value(s),
            player: s.clone(),
        })
        .collect()
}

fn by_wins_then_rate(a: &PlayerCareerStats, b: &PlayerCareerStats) -> Ordering {
    b.total_wins
        .cmp(&a.total_wins)
        .then_with(|| b.win_percentage.total_cmp(&a.win_percentage))
}

/// Players with the most wins, breaking ties on win percentage.
pub fn top_winners(stats: &[PlayerCareerStats], limit: usize) -> Vec<PlayerCareerStats> {
    let mut ranked: Vec<&PlayerCareerStats> =
        stats.iter().filter(|s| s.total_appearances > 0).collect();
    ranked.sort_by(|a, b| by_wins_then_rate(a, b));
    ranked.into_iter().take(limit).cloned().collect()
}
