//! Read models assembled from a [`Store`].
//!
//! Both the HTTP API and the CLI go through these loaders, so the joins and
//! orderings live in one place. Independent fetches run concurrently.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use super::{EntityCounts, StorageError, Store};
use crate::calculate::compare::{head_to_head, HeadToHead};
use crate::calculate::leaderboard::{top_winners, TOP_WINNERS_LIMIT};
use crate::calculate::records::{find_records, Game, Records};
use crate::calculate::standings::{rank_results, RankedResults};
use crate::calculate::trend::{performance_trend, PerformanceTrend};
use crate::calculate::career::reduce_career;
use crate::models::{
    Appearance, AppearanceDetail, Episode, EpisodeId, EpisodeResults, EpisodeSummary,
    EpisodeType, Player, PlayerCareerStats, PlayerId, Team,
};

pub const RECENT_EPISODES_LIMIT: usize = 5;
pub const RECENT_ACTIVITY_LIMIT: usize = 3;
pub const SEARCH_LIMIT: usize = 5;

/// Join appearances with their players and episodes. Rows whose player or
/// episode is missing are dropped.
pub fn join_details(
    appearances: Vec<Appearance>,
    players: &[Player],
    episodes: &[Episode],
) -> Vec<AppearanceDetail> {
    let players: HashMap<&PlayerId, &Player> = players.iter().map(|p| (&p.id, p)).collect();
    let episodes: HashMap<&EpisodeId, &Episode> = episodes.iter().map(|e| (&e.id, e)).collect();

    appearances
        .into_iter()
        .filter_map(|appearance| {
            let player = (*players.get(&appearance.player_id)?).clone();
            let episode = (*episodes.get(&appearance.episode_id)?).clone();
            Some(AppearanceDetail {
                appearance,
                player,
                episode,
            })
        })
        .collect()
}

/// Group rows into one [`Game`] per episode.
pub fn build_games(episodes: Vec<Episode>, appearances: Vec<Appearance>, teams: Vec<Team>) -> Vec<Game> {
    let mut rows: HashMap<EpisodeId, Vec<Appearance>> = HashMap::new();
    for a in appearances {
        rows.entry(a.episode_id.clone()).or_default().push(a);
    }
    let mut team_rows: HashMap<EpisodeId, Vec<Team>> = HashMap::new();
    for t in teams {
        team_rows.entry(t.episode_id.clone()).or_default().push(t);
    }

    episodes
        .into_iter()
        .map(|episode| {
            let results = EpisodeResults::from_rows(
                episode.episode_type,
                rows.remove(&episode.id).unwrap_or_default(),
                team_rows.remove(&episode.id).unwrap_or_default(),
            );
            Game { episode, results }
        })
        .collect()
}

/// Newest first, ties by episode number descending.
pub fn sort_summaries_newest_first(summaries: &mut [EpisodeSummary]) {
    summaries.sort_by(|a, b| {
        b.air_date
            .cmp(&a.air_date)
            .then_with(|| b.episode_number.cmp(&a.episode_number))
    });
}

pub async fn episode_results(store: &dyn Store, episode: &Episode) -> Result<EpisodeResults, StorageError> {
    let (appearances, teams) = match episode.episode_type {
        EpisodeType::Solo => (store.episode_appearances(&episode.id).await?, Vec::new()),
        EpisodeType::Team => tokio::try_join!(
            store.episode_appearances(&episode.id),
            store.episode_teams(&episode.id)
        )?,
    };
    Ok(EpisodeResults::from_rows(episode.episode_type, appearances, teams))
}

pub async fn load_records(store: &dyn Store) -> Result<Records, StorageError> {
    let (players, episodes, appearances, teams, stats) = tokio::try_join!(
        store.players(),
        store.episodes(),
        store.appearances(),
        store.teams(),
        store.career_stats()
    )?;
    debug!(
        "Computing records over {} appearances in {} episodes",
        appearances.len(),
        episodes.len()
    );
    let rows = join_details(appearances.clone(), &players, &episodes);
    let games = build_games(episodes, appearances, teams);
    Ok(find_records(&rows, &stats, &games))
}

/// Career stats for a player, zeroed when the view has no row yet.
pub async fn career_of(store: &dyn Store, player: &Player) -> Result<PlayerCareerStats, StorageError> {
    let stats = store.career_stats().await?;
    Ok(stats
        .into_iter()
        .find(|s| s.id == player.id)
        .unwrap_or_else(|| reduce_career(player, std::iter::empty(), |_| None)))
}

/// A player's appearances joined with their episodes.
pub async fn player_details(store: &dyn Store, player: &Player) -> Result<Vec<AppearanceDetail>, StorageError> {
    let (appearances, episodes) =
        tokio::try_join!(store.player_appearances(&player.id), store.episodes())?;
    Ok(join_details(appearances, std::slice::from_ref(player), &episodes))
}

/// One line of a player's appearance history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub episode_id: EpisodeId,
    pub episode_title: String,
    pub air_date: NaiveDate,
    pub episode_type: EpisodeType,
    pub points: i64,
    pub questions_seen: u32,
    pub questions_correct: u32,
    pub accuracy: f64,
    pub is_winner: bool,
    pub placement: Option<u32>,
}

impl From<&AppearanceDetail> for HistoryEntry {
    fn from(d: &AppearanceDetail) -> Self {
        Self {
            episode_id: d.episode.id.clone(),
            episode_title: d.episode.title.clone(),
            air_date: d.episode.air_date,
            episode_type: d.episode.episode_type,
            points: d.appearance.points_scored,
            questions_seen: d.appearance.questions_seen,
            questions_correct: d.appearance.questions_correct,
            accuracy: d.appearance.accuracy(),
            is_winner: d.appearance.is_winner,
            placement: d.appearance.placement,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerProfile {
    pub player: Player,
    pub stats: PlayerCareerStats,
    /// Newest first
    pub history: Vec<HistoryEntry>,
    pub trend: Option<PerformanceTrend>,
}

pub async fn player_profile(store: &dyn Store, slug: &str) -> Result<Option<PlayerProfile>, StorageError> {
    let Some(player) = store.player_by_slug(slug).await? else {
        return Ok(None);
    };
    let (stats, rows) = tokio::try_join!(career_of(store, &player), player_details(store, &player))?;

    let mut history: Vec<HistoryEntry> = rows.iter().map(HistoryEntry::from).collect();
    history.sort_by(|a, b| b.air_date.cmp(&a.air_date));

    Ok(Some(PlayerProfile {
        trend: performance_trend(&rows),
        player,
        stats,
        history,
    }))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeDetail {
    pub episode: Episode,
    pub thumbnail_url: Option<String>,
    pub players: Vec<Player>,
    pub results: RankedResults,
}

pub async fn episode_detail(store: &dyn Store, id: &EpisodeId) -> Result<Option<EpisodeDetail>, StorageError> {
    let Some(episode) = store.episode(id).await? else {
        return Ok(None);
    };
    let (results, players) = tokio::try_join!(episode_results(store, &episode), store.players())?;

    let appeared: Vec<&PlayerId> = match &results {
        EpisodeResults::Solo(rows) => rows.iter().map(|a| &a.player_id).collect(),
        EpisodeResults::Team(teams) => teams
            .iter()
            .flat_map(|t| t.members.iter().map(|a| &a.player_id))
            .collect(),
    };
    let players = players
        .into_iter()
        .filter(|p| appeared.contains(&&p.id))
        .collect();

    Ok(Some(EpisodeDetail {
        thumbnail_url: episode.display_thumbnail(),
        results: rank_results(&results),
        episode,
        players,
    }))
}

/// Compare two players by id. `None` when either is unknown.
pub async fn compare_players(
    store: &dyn Store,
    player1: &PlayerId,
    player2: &PlayerId,
) -> Result<Option<HeadToHead>, StorageError> {
    let (p1, p2) = tokio::try_join!(store.player(player1), store.player(player2))?;
    let (Some(p1), Some(p2)) = (p1, p2) else {
        return Ok(None);
    };
    let (s1, s2, rows1, rows2) = tokio::try_join!(
        career_of(store, &p1),
        career_of(store, &p2),
        player_details(store, &p1),
        player_details(store, &p2)
    )?;
    Ok(Some(head_to_head(&s1, &s2, &rows1, &rows2)))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub counts: EntityCounts,
    pub recent_episodes: Vec<EpisodeSummary>,
    pub top_winners: Vec<PlayerCareerStats>,
    pub recent_players: Vec<Player>,
    pub recent_winners: Vec<EpisodeSummary>,
}

pub async fn overview(store: &dyn Store) -> Result<Overview, StorageError> {
    let (counts, mut summaries, stats, mut players) = tokio::try_join!(
        store.counts(),
        store.episode_summaries(),
        store.career_stats(),
        store.players()
    )?;

    sort_summaries_newest_first(&mut summaries);
    players.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    players.truncate(RECENT_ACTIVITY_LIMIT);

    let recent_winners = summaries
        .iter()
        .filter(|s| s.winner_name.is_some())
        .take(RECENT_ACTIVITY_LIMIT)
        .cloned()
        .collect();
    summaries.truncate(RECENT_EPISODES_LIMIT);

    Ok(Overview {
        counts,
        recent_episodes: summaries,
        top_winners: top_winners(&stats, TOP_WINNERS_LIMIT),
        recent_players: players,
        recent_winners,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    pub players: Vec<PlayerCareerStats>,
    pub episodes: Vec<EpisodeSummary>,
}

/// Case-insensitive substring search over player names and episode titles
/// or winners. A blank query matches nothing.
pub async fn search(store: &dyn Store, query: &str) -> Result<SearchResults, StorageError> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Ok(SearchResults::default());
    }
    let (mut stats, mut summaries) = tokio::try_join!(store.career_stats(), store.episode_summaries())?;

    stats.sort_by(|a, b| a.name.cmp(&b.name));
    sort_summaries_newest_first(&mut summaries);

    let contains = |s: &str| s.to_lowercase().contains(&needle);
    Ok(SearchResults {
        players: stats
            .into_iter()
            .filter(|s| contains(&s.name))
            .take(SEARCH_LIMIT)
            .collect(),
        episodes: summaries
            .into_iter()
            .filter(|s| contains(&s.title) || s.winner_name.as_deref().is_some_and(contains))
            .take(SEARCH_LIMIT)
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{plan_results, ParticipantInput, ResultsForm};
    use crate::storage::{JsonlStore, StorageConfig};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn participant(player: &Player, points: i64, winner: bool) -> ParticipantInput {
        ParticipantInput {
            player_id: Some(player.id.clone()),
            questions_seen: 10,
            questions_correct: 6,
            base_points: points,
            is_winner: winner,
            ..Default::default()
        }
    }

    /// Amy wins ep1 (500 vs 300); Ben wins ep2 (700 vs 200).
    async fn seeded() -> (TempDir, JsonlStore, Player, Player) {
        let temp = TempDir::new().unwrap();
        let store = JsonlStore::new(StorageConfig::new(temp.path().to_path_buf()));
        let amy = store
            .insert_player(&Player::new("Amy".to_string(), "amy".to_string()))
            .await
            .unwrap();
        let ben = store
            .insert_player(&Player::new("Ben".to_string(), "ben".to_string()))
            .await
            .unwrap();

        for (n, air, a_pts, b_pts, amy_wins) in [
            (1, "2024-01-01", 500, 300, true),
            (2, "2024-02-01", 200, 700, false),
        ] {
            let episode = store
                .insert_episode(&Episode::new(format!("Beopardy {}", n), n, date(air)))
                .await
                .unwrap();
            let form = ResultsForm::Solo(vec![
                participant(&amy, a_pts, amy_wins),
                participant(&ben, b_pts, !amy_wins),
            ]);
            let rows = plan_results(&episode, &form).unwrap();
            store.replace_results(&episode.id, &rows).await.unwrap();
        }
        (temp, store, amy, ben)
    }

    #[tokio::test]
    async fn test_player_profile() {
        let (_temp, store, _, _) = seeded().await;
        let profile = player_profile(&store, "amy").await.unwrap().unwrap();
        assert_eq!(profile.stats.total_appearances, 2);
        assert_eq!(profile.stats.total_wins, 1);
        let titles: Vec<&str> = profile.history.iter().map(|h| h.episode_title.as_str()).collect();
        assert_eq!(titles, vec!["Beopardy 2", "Beopardy 1"]);
        let trend = profile.trend.unwrap();
        assert_eq!(trend.average_points, 350);
        assert_eq!(trend.points[0].points, 500);

        assert!(player_profile(&store, "nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_records_and_compare() {
        let (_temp, store, amy, ben) = seeded().await;
        let records = load_records(&store).await.unwrap();
        assert_eq!(records.highest_score.unwrap().player_name, "Ben");
        assert_eq!(records.closest_game.unwrap().margin, 200);
        assert_eq!(records.biggest_blowout.unwrap().margin, 500);

        let h2h = compare_players(&store, &amy.id, &ben.id).await.unwrap().unwrap();
        assert_eq!(h2h.games.len(), 2);
        assert_eq!((h2h.player1_wins, h2h.player2_wins), (1, 1));
        assert!(compare_players(&store, &amy.id, &"missing".into())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_overview_and_search() {
        let (_temp, store, _, _) = seeded().await;
        let overview = overview(&store).await.unwrap();
        assert_eq!(overview.counts.episodes, 2);
        assert_eq!(overview.recent_episodes[0].title, "Beopardy 2");
        assert_eq!(overview.recent_winners[0].winner_name.as_deref(), Some("Ben"));
        assert_eq!(overview.top_winners.len(), 2);

        let found = search(&store, "BEN").await.unwrap();
        assert_eq!(found.players.len(), 1);
        assert_eq!(found.episodes.len(), 1);
        assert_eq!(found.episodes[0].title, "Beopardy 2");
        assert_eq!(search(&store, "  ").await.unwrap(), SearchResults::default());
    }

    #[tokio::test]
    async fn test_episode_detail_orders_results() {
        let (_temp, store, _, ben) = seeded().await;
        let episodes = store.episodes().await.unwrap();
        let ep2 = episodes.iter().find(|e| e.episode_number == 2).unwrap();
        let detail = episode_detail(&store, &ep2.id).await.unwrap().unwrap();
        match detail.results {
            RankedResults::Solo(rows) => {
                assert_eq!(rows[0].appearance.player_id, ben.id);
                assert_eq!(rows[0].position, 1);
            }
            other => panic!("expected solo results, got {:?}", other),
        }
        assert_eq!(detail.players.len(), 2);
        assert!(episode_detail(&store, &"missing".into()).await.unwrap().is_none());
    }
}
