//! Lifetime statistics per player.
//!
//! Stores with server-side views read `player_career_stats` directly; the
//! local store materializes the same rows here.

use std::collections::HashMap;

use chrono::NaiveDate;

use super::{accuracy, average_points, percentage};
use crate::models::{Appearance, Episode, EpisodeId, Player, PlayerCareerStats, PlayerId};

/// Reduce one player's appearances to career totals.
///
/// `air_date` resolves an episode to its air date; appearances whose episode
/// is unknown still count but do not move the first/last dates.
pub fn reduce_career<'a, I, F>(player: &Player, appearances: I, air_date: F) -> PlayerCareerStats
where
    I: IntoIterator<Item = &'a Appearance>,
    F: Fn(&EpisodeId) -> Option<NaiveDate>,
{
    let mut stats = PlayerCareerStats {
        id: player.id.clone(),
        name: player.name.clone(),
        slug: player.slug.clone(),
        image_url: player.image_url.clone(),
        total_appearances: 0,
        total_wins: 0,
        win_percentage: 0.0,
        total_points: 0,
        avg_points_per_appearance: 0.0,
        total_questions_seen: 0,
        total_questions_correct: 0,
        accuracy_percentage: 0.0,
        highest_score: None,
        lowest_score: None,
        first_appearance: None,
        last_appearance: None,
    };

    for a in appearances {
        stats.total_appearances += 1;
        if a.is_winner {
            stats.total_wins += 1;
        }
        stats.total_points += a.points_scored;
        stats.total_questions_seen += a.questions_seen;
        stats.total_questions_correct += a.questions_correct;
        stats.highest_score = Some(stats.highest_score.map_or(a.points_scored, |h| h.max(a.points_scored)));
        stats.lowest_score = Some(stats.lowest_score.map_or(a.points_scored, |l| l.min(a.points_scored)));

        if let Some(date) = air_date(&a.episode_id) {
            stats.first_appearance = Some(stats.first_appearance.map_or(date, |d| d.min(date)));
            stats.last_appearance = Some(stats.last_appearance.map_or(date, |d| d.max(date)));
        }
    }

    stats.win_percentage = percentage(stats.total_wins, stats.total_appearances);
    stats.avg_points_per_appearance = average_points(stats.total_points, stats.total_appearances);
    stats.accuracy_percentage = accuracy(stats.total_questions_correct, stats.total_questions_seen);
    stats
}

/// Career rows for every player, in the same order as `players`.
///
/// Players without appearances get a zeroed row.
pub fn career_table(
    players: &[Player],
    appearances: &[Appearance],
    episodes: &[Episode],
) -> Vec<PlayerCareerStats> {
    let dates: HashMap<&EpisodeId, NaiveDate> =
        episodes.iter().map(|e| (&e.id, e.air_date)).collect();

    let mut by_player: HashMap<&PlayerId, Vec<&Appearance>> = HashMap::new();
    for a in appearances {
        by_player.entry(&a.player_id).or_default().push(a);
    }

    players
        .iter()
        .map(|p| {
            let rows = by_player.get(&p.id).map(Vec::as_slice).unwrap_or(&[]);
            reduce_career(p, rows.iter().copied(), |id| dates.get(id).copied())
        })
        .collect()
}
