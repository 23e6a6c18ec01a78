//! Head-to-head comparison of two players.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{AppearanceDetail, EpisodeId, PlayerCareerStats};

/// Which side of a comparison is ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Leader {
    Player1,
    Player2,
    Tie,
}

impl Leader {
    fn higher_wins(a: f64, b: f64) -> Self {
        if a > b {
            Leader::Player1
        } else if b > a {
            Leader::Player2
        } else {
            Leader::Tie
        }
    }
}

/// One player's line in a shared game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSide {
    pub points: i64,
    pub is_winner: bool,
    pub accuracy: f64,
}

/// An episode both players appeared in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharedGame {
    pub episode_id: EpisodeId,
    pub episode_title: String,
    pub air_date: NaiveDate,
    pub player1: GameSide,
    pub player2: GameSide,
}

/// A career stat side by side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatComparison {
    pub label: &'static str,
    pub player1: f64,
    pub player2: f64,
    pub leader: Leader,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadToHead {
    pub player1: PlayerCareerStats,
    pub player2: PlayerCareerStats,
    /// Newest first
    pub games: Vec<SharedGame>,
    pub player1_wins: u32,
    pub player2_wins: u32,
    pub stats: Vec<StatComparison>,
}

fn side(d: &AppearanceDetail) -> GameSide {
    GameSide {
        points: d.appearance.points_scored,
        is_winner: d.appearance.is_winner,
        accuracy: d.appearance.accuracy(),
    }
}

/// Episodes both players appeared in, newest first.
pub fn shared_games(rows1: &[AppearanceDetail], rows2: &[AppearanceDetail]) -> Vec<SharedGame> {
    let other: HashMap<&EpisodeId, &AppearanceDetail> =
        rows2.iter().map(|d| (&d.appearance.episode_id, d)).collect();

    let mut games: Vec<SharedGame> = rows1
        .iter()
        .filter_map(|a| {
            let b = other.get(&a.appearance.episode_id)?;
            Some(SharedGame {
                episode_id: a.episode.id.clone(),
                episode_title: a.episode.title.clone(),
                air_date: a.episode.air_date,
                player1: side(a),
                player2: side(b),
            })
        })
        .collect();
    games.sort_by(|a, b| {
        b.air_date
            .cmp(&a.air_date)
            .then_with(|| a.episode_id.cmp(&b.episode_id))
    });
    games
}

/// Career stats side by side; higher is better for every row.
pub fn compare_stats(p1: &PlayerCareerStats, p2: &PlayerCareerStats) -> Vec<StatComparison> {
    let rows: [(&'static str, fn(&PlayerCareerStats) -> f64); 7] = [
        ("Total Wins", |s| s.total_wins as f64),
        ("Win Rate", |s| s.win_percentage),
        ("Appearances", |s| s.total_appearances as f64),
        ("Total Points", |s| s.total_points as f64),
        ("Avg Points", |s| s.avg_points_per_appearance),
        ("Correct %", |s| s.accuracy_percentage),
        ("Highest Score", |s| s.highest_score.unwrap_or(0) as f64),
    ];

    rows.into_iter()
        .map(|(label, value)| {
            let (a, b) = (value(p1), value(p2));
            StatComparison {
                label,
                player1: a,
                player2: b,
                leader: Leader::higher_wins(a, b),
            }
        })
        .collect()
}

/// Full comparison. `rows1`/`rows2` are each player's appearances.
pub fn head_to_head(
    p1: &PlayerCareerStats,
    p2: &PlayerCareerStats,
    rows1: &[AppearanceDetail],
    rows2: &[AppearanceDetail],
) -> HeadToHead {
    let games = shared_games(rows1, rows2);
    let player1_wins = games.iter().filter(|g| g.player1.is_winner).count() as u32;
    let player2_wins = games.iter().filter(|g| g.player2.is_winner).count() as u32;
    HeadToHead {
        player1: p1.clone(),
        player2: p2.clone(),
        games,
        player1_wins,
        player2_wins,
        stats: compare_stats(p1, p2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::career::career_table;
    use crate::models::{Appearance, Episode, Player};
    use pretty_assertions::assert_eq;

    fn player(id: &str) -> Player {
        let mut p = Player::new(id.to_uppercase(), id.to_string());
        p.id = id.into();
        p
    }

    fn episode(id: &str, air: &str) -> Episode {
        let date = NaiveDate::parse_from_str(air, "%Y-%m-%d").unwrap();
        let mut e = Episode::new(format!("Episode {}", id), 1, date);
        e.id = id.into();
        e
    }

    fn detail(p: &Player, e: &Episode, points: i64, winner: bool) -> AppearanceDetail {
        let mut a = Appearance::new(e.id.clone(), p.id.clone())
            .with_points(points)
            .with_questions(10, 5);
        a.is_winner = winner;
        AppearanceDetail {
            appearance: a,
            player: p.clone(),
            episode: e.clone(),
        }
    }

    #[test]
    fn test_head_to_head() {
        let (amy, ben) = (player("amy"), player("ben"));
        let (e1, e2, e3) = (
            episode("e-1", "2024-01-01"),
            episode("e-2", "2024-02-01"),
            episode("e-3", "2024-03-01"),
        );
        let amy_rows = vec![
            detail(&amy, &e1, 1000, true),
            detail(&amy, &e2, 400, false),
            detail(&amy, &e3, 700, true),
        ];
        let ben_rows = vec![detail(&ben, &e1, 800, false), detail(&ben, &e2, 900, true)];

        let mut stats = career_table(
            &[amy.clone(), ben.clone()],
            &amy_rows
                .iter()
                .chain(ben_rows.iter())
                .map(|d| d.appearance.clone())
                .collect::<Vec<_>>(),
            &[e1.clone(), e2.clone(), e3.clone()],
        );
        let ben_stats = stats.remove(1);
        let amy_stats = stats.remove(0);

        let h2h = head_to_head(&amy_stats, &ben_stats, &amy_rows, &ben_rows);
        let ids: Vec<&str> = h2h.games.iter().map(|g| g.episode_id.as_str()).collect();
        assert_eq!(ids, vec!["e-2", "e-1"]);
        assert_eq!(h2h.player1_wins, 1);
        assert_eq!(h2h.player2_wins, 1);
        assert_eq!(h2h.games[0].player2.points, 900);
        assert_eq!(h2h.games[0].player1.accuracy, 50.0);

        let wins = &h2h.stats[0];
        assert_eq!(wins.label, "Total Wins");
        assert_eq!(wins.leader, Leader::Player1);
        let appearances = h2h.stats.iter().find(|s| s.label == "Appearances").unwrap();
        assert_eq!(appearances.leader, Leader::Player1);
        let accuracy = h2h.stats.iter().find(|s| s.label == "Correct %").unwrap();
        assert_eq!(accuracy.leader, Leader::Tie);
    }

    #[test]
    fn test_no_shared_games() {
        let (amy, ben) = (player("amy"), player("ben"));
        let amy_rows = vec![detail(&amy, &episode("e-1", "2024-01-01"), 100, true)];
        let ben_rows = vec![detail(&ben, &episode("e-2", "2024-01-02"), 100, true)];
        assert!(shared_games(&amy_rows, &ben_rows).is_empty());
    }
}
