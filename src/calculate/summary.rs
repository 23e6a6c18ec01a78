//! Per-episode headline rows (`episode_summary`).

use std::collections::HashMap;

use crate::models::{
    Appearance, Episode, EpisodeId, EpisodeResults, EpisodeSummary, Player, PlayerId, Team,
};

/// Summarize one episode.
///
/// The winner is the winning player for solo episodes and the winning team's
/// name for team episodes. Participant count and highest score come from the
/// appearance rows.
pub fn summarize(
    episode: &Episode,
    results: &EpisodeResults,
    player_name: impl Fn(&PlayerId) -> Option<String>,
) -> EpisodeSummary {
    let (winner_id, winner_name) = match results {
        EpisodeResults::Solo(rows) => match rows.iter().find(|a| a.is_winner) {
            Some(w) => (Some(w.player_id.clone()), player_name(&w.player_id)),
            None => (None, None),
        },
        EpisodeResults::Team(teams) => (
            None,
            teams
                .iter()
                .find(|t| t.team.is_winner)
                .map(|t| t.team.team_name.clone()),
        ),
    };

    let highest_score = match results {
        EpisodeResults::Solo(rows) => rows.iter().map(|a| a.points_scored).max(),
        EpisodeResults::Team(teams) => teams
            .iter()
            .flat_map(|t| t.members.iter())
            .map(|a| a.points_scored)
            .max(),
    };

    EpisodeSummary {
        id: episode.id.clone(),
        title: episode.title.clone(),
        season: episode.season,
        episode_number: episode.episode_number,
        air_date: Some(episode.air_date),
        youtube_url: episode.youtube_url.clone(),
        thumbnail_url: episode.display_thumbnail(),
        episode_type: episode.episode_type,
        winner_id,
        winner_name,
        participant_count: results.participant_count() as u32,
        highest_score,
    }
}

/// Summaries for every episode, in the same order as `episodes`.
pub fn summary_table(
    episodes: &[Episode],
    appearances: &[Appearance],
    teams: &[Team],
    players: &[Player],
) -> Vec<EpisodeSummary> {
    let names: HashMap<&PlayerId, &str> =
        players.iter().map(|p| (&p.id, p.name.as_str())).collect();

    let mut rows_by_episode: HashMap<&EpisodeId, Vec<Appearance>> = HashMap::new();
    for a in appearances {
        rows_by_episode.entry(&a.episode_id).or_default().push(a.clone());
    }
    let mut teams_by_episode: HashMap<&EpisodeId, Vec<Team>> = HashMap::new();
    for t in teams {
        teams_by_episode.entry(&t.episode_id).or_default().push(t.clone());
    }

    episodes
        .iter()
        .map(|e| {
            let results = EpisodeResults::from_rows(
                e.episode_type,
                rows_by_episode.remove(&e.id).unwrap_or_default(),
                teams_by_episode.remove(&e.id).unwrap_or_default(),
            );
            summarize(e, &results, |id| names.get(id).map(|n| n.to_string()))
        })
        .collect()
}
