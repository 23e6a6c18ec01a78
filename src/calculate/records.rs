//! Records and superlatives over the whole history.
//!
//! Every finder is an independent reduction that returns `None` when nothing
//! qualifies. Ties never depend on input order:
//! - single-game records go to the earliest air date, then the lowest
//!   appearance id
//! - career records go to the player name (ascending), then the lowest id
//! - game margins go to the earliest air date, then the lowest episode id

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use super::standings::order_by_points;
use super::{accuracy, MIN_APPEARANCES_FOR_RATES, MIN_QUESTIONS_FOR_ACCURACY_RECORD};
use crate::models::{
    Appearance, AppearanceDetail, Episode, EpisodeId, EpisodeResults, PlayerCareerStats, PlayerId,
    TeamId, TeamResult,
};

/// A single-game record holder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppearanceRecord {
    pub player_id: PlayerId,
    pub player_name: String,
    pub player_slug: String,
    pub image_url: Option<String>,
    pub episode_id: EpisodeId,
    pub episode_title: String,
    pub air_date: NaiveDate,
    pub points: i64,
    pub questions_seen: u32,
    pub questions_correct: u32,
    pub accuracy: f64,
}

impl From<&AppearanceDetail> for AppearanceRecord {
    fn from(d: &AppearanceDetail) -> Self {
        Self {
            player_id: d.player.id.clone(),
            player_name: d.player.name.clone(),
            player_slug: d.player.slug.clone(),
            image_url: d.player.image_url.clone(),
            episode_id: d.episode.id.clone(),
            episode_title: d.episode.title.clone(),
            air_date: d.episode.air_date,
            points: d.appearance.points_scored,
            questions_seen: d.appearance.questions_seen,
            questions_correct: d.appearance.questions_correct,
            accuracy: d.appearance.accuracy(),
        }
    }
}

/// One side of a game margin: a solo player or a team.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contender {
    pub id: String,
    pub name: Option<String>,
    pub points: i64,
}

/// Points gap between first and second in one episode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarginRecord {
    pub episode_id: EpisodeId,
    pub episode_title: String,
    pub air_date: NaiveDate,
    pub margin: i64,
    pub first: Contender,
    pub second: Contender,
}

/// An episode with its assembled results.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    pub episode: Episode,
    pub results: EpisodeResults,
}

/// Everything on the records page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Records {
    pub highest_score: Option<AppearanceRecord>,
    pub lowest_winning_score: Option<AppearanceRecord>,
    pub best_single_game_accuracy: Option<AppearanceRecord>,
    pub highest_non_winning_score: Option<AppearanceRecord>,
    pub most_appearances_without_win: Option<PlayerCareerStats>,
    pub best_win_rate: Option<PlayerCareerStats>,
    pub most_total_points: Option<PlayerCareerStats>,
    pub most_wins: Option<PlayerCareerStats>,
    pub highest_average_points: Option<PlayerCareerStats>,
    pub closest_game: Option<MarginRecord>,
    pub biggest_blowout: Option<MarginRecord>,
}

impl Records {
    pub fn is_empty(&self) -> bool {
        self == &Records::default()
    }
}

fn by_date_then_id(a: &AppearanceDetail, b: &AppearanceDetail) -> Ordering {
    a.episode
        .air_date
        .cmp(&b.episode.air_date)
        .then_with(|| a.appearance.id.cmp(&b.appearance.id))
}

/// Best single-game row under `primary` (Less = better).
fn best_appearance<P, F>(rows: &[AppearanceDetail], keep: P, primary: F) -> Option<AppearanceRecord>
where
    P: Fn(&AppearanceDetail) -> bool,
    F: Fn(&AppearanceDetail, &AppearanceDetail) -> Ordering,
{
    rows.iter()
        .filter(|d| keep(d))
        .min_by(|a, b| primary(a, b).then_with(|| by_date_then_id(a, b)))
        .map(AppearanceRecord::from)
}

fn best_player<P, F>(stats: &[PlayerCareerStats], keep: P, primary: F) -> Option<PlayerCareerStats>
where
    P: Fn(&PlayerCareerStats) -> bool,
    F: Fn(&PlayerCareerStats, &PlayerCareerStats) -> Ordering,
{
    stats
        .iter()
        .filter(|s| keep(s))
        .min_by(|a, b| {
            primary(a, b)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        })
        .cloned()
}

pub fn highest_score(rows: &[AppearanceDetail]) -> Option<AppearanceRecord> {
    best_appearance(rows, |_| true, |a, b| {
        b.appearance.points_scored.cmp(&a.appearance.points_scored)
    })
}

pub fn lowest_winning_score(rows: &[AppearanceDetail]) -> Option<AppearanceRecord> {
    best_appearance(rows, |d| d.appearance.is_winner, |a, b| {
        a.appearance.points_scored.cmp(&b.appearance.points_scored)
    })
}

/// Best accuracy in one game, among games with enough questions seen.
pub fn best_single_game_accuracy(rows: &[AppearanceDetail]) -> Option<AppearanceRecord> {
    best_appearance(
        rows,
        |d| d.appearance.questions_seen >= MIN_QUESTIONS_FOR_ACCURACY_RECORD,
        |a, b| {
            let acc_a = accuracy(a.appearance.questions_correct, a.appearance.questions_seen);
            let acc_b = accuracy(b.appearance.questions_correct, b.appearance.questions_seen);
            acc_b.total_cmp(&acc_a)
        },
    )
}

/// Ids of every team that won its episode.
pub fn winning_teams(games: &[Game]) -> HashSet<TeamId> {
    games
        .iter()
        .filter_map(|g| match &g.results {
            EpisodeResults::Team(teams) => Some(teams),
            EpisodeResults::Solo(_) => None,
        })
        .flatten()
        .filter(|t| t.team.is_winner)
        .map(|t| t.team.id.clone())
        .collect()
}

/// Highest score that did not win.
///
/// Team members never carry a win flag themselves; a member of a team in
/// `winning_teams` counts as a winner.
pub fn highest_non_winning_score(
    rows: &[AppearanceDetail],
    winning_teams: &HashSet<TeamId>,
) -> Option<AppearanceRecord> {
    best_appearance(
        rows,
        |d| {
            let team_won = d
                .appearance
                .team_id
                .as_ref()
                .is_some_and(|t| winning_teams.contains(t));
            !d.appearance.is_winner && !team_won
        },
        |a, b| b.appearance.points_scored.cmp(&a.appearance.points_scored),
    )
}

pub fn most_appearances_without_win(stats: &[PlayerCareerStats]) -> Option<PlayerCareerStats> {
    best_player(
        stats,
        |s| s.total_appearances > 0 && s.total_wins == 0,
        |a, b| b.total_appearances.cmp(&a.total_appearances),
    )
}

pub fn best_win_rate(stats: &[PlayerCareerStats]) -> Option<PlayerCareerStats> {
    best_player(
        stats,
        |s| s.total_appearances >= MIN_APPEARANCES_FOR_RATES,
        |a, b| b.win_percentage.total_cmp(&a.win_percentage),
    )
}

pub fn most_total_points(stats: &[PlayerCareerStats]) -> Option<PlayerCareerStats> {
    best_player(stats, |_| true, |a, b| b.total_points.cmp(&a.total_points))
}

pub fn most_wins(stats: &[PlayerCareerStats]) -> Option<PlayerCareerStats> {
    best_player(stats, |_| true, |a, b| b.total_wins.cmp(&a.total_wins))
}

pub fn highest_average_points(stats: &[PlayerCareerStats]) -> Option<PlayerCareerStats> {
    best_player(
        stats,
        |s| s.total_appearances >= MIN_APPEARANCES_FOR_RATES,
        |a, b| {
            b.avg_points_per_appearance
                .total_cmp(&a.avg_points_per_appearance)
        },
    )
}

/// Margins for every game with at least two entries and a winner.
///
/// Entries are players in solo games and teams in team games; the top two
/// are taken by points. A team game is measured on team `total_points`
/// (member points plus the final-round adjustment), not on the single
/// highest member rows, so members [900, 100] against [950] with totals
/// 1000 and 700 give a margin of 300.
pub fn game_margins<F>(games: &[Game], player_name: F) -> Vec<MarginRecord>
where
    F: Fn(&PlayerId) -> Option<String>,
{
    games
        .iter()
        .filter(|g| g.results.has_winner())
        .filter_map(|g| {
            let (first, second) = match &g.results {
                EpisodeResults::Solo(rows) => {
                    let ordered = order_by_points(rows);
                    let [a, b, ..] = ordered.as_slice() else {
                        return None;
                    };
                    let contender = |x: &Appearance| Contender {
                        id: x.player_id.to_string(),
                        name: player_name(&x.player_id),
                        points: x.points_scored,
                    };
                    (contender(*a), contender(*b))
                }
                EpisodeResults::Team(teams) => {
                    let ordered = order_by_points(teams);
                    let [a, b, ..] = ordered.as_slice() else {
                        return None;
                    };
                    let contender = |x: &TeamResult| Contender {
                        id: x.team.id.to_string(),
                        name: Some(x.team.team_name.clone()),
                        points: x.team.total_points,
                    };
                    (contender(*a), contender(*b))
                }
            };
            Some(MarginRecord {
                episode_id: g.episode.id.clone(),
                episode_title: g.episode.title.clone(),
                air_date: g.episode.air_date,
                margin: first.points - second.points,
                first,
                second,
            })
        })
        .collect()
}

fn by_margin_date_then_id(a: &MarginRecord, b: &MarginRecord) -> Ordering {
    a.air_date
        .cmp(&b.air_date)
        .then_with(|| a.episode_id.cmp(&b.episode_id))
}

pub fn closest_game(margins: &[MarginRecord]) -> Option<MarginRecord> {
    margins
        .iter()
        .min_by(|a, b| a.margin.cmp(&b.margin).then_with(|| by_margin_date_then_id(a, b)))
        .cloned()
}

pub fn biggest_blowout(margins: &[MarginRecord]) -> Option<MarginRecord> {
    margins
        .iter()
        .min_by(|a, b| b.margin.cmp(&a.margin).then_with(|| by_margin_date_then_id(a, b)))
        .cloned()
}

/// Compute every record.
pub fn find_records(
    rows: &[AppearanceDetail],
    stats: &[PlayerCareerStats],
    games: &[Game],
) -> Records {
    let names: HashMap<&PlayerId, &str> = rows
        .iter()
        .map(|d| (&d.player.id, d.player.name.as_str()))
        .chain(stats.iter().map(|s| (&s.id, s.name.as_str())))
        .collect();
    let margins = game_margins(games, |id| names.get(id).map(|n| n.to_string()));

    Records {
        highest_score: highest_score(rows),
        lowest_winning_score: lowest_winning_score(rows),
        best_single_game_accuracy: best_single_game_accuracy(rows),
        highest_non_winning_score: highest_non_winning_score(rows, &winning_teams(games)),
        most_appearances_without_win: most_appearances_without_win(stats),
        best_win_rate: best_win_rate(stats),
        most_total_points: most_total_points(stats),
        most_wins: most_wins(stats),
        highest_average_points: highest_average_points(stats),
        closest_game: closest_game(&margins),
        biggest_blowout: biggest_blowout(&margins),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::career::career_table;
    use crate::models::{EpisodeType, Player, Team};
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn player(id: &str, name: &str) -> Player {
        let mut p = Player::new(name.to_string(), name.to_lowercase());
        p.id = id.into();
        p
    }

    fn episode(id: &str, air: &str) -> Episode {
        let mut e = Episode::new(format!("Episode {}", id), 1, date(air));
        e.id = id.into();
        e
    }

    fn detail(player: &Player, episode: &Episode, appearance: Appearance) -> AppearanceDetail {
        AppearanceDetail {
            appearance,
            player: player.clone(),
            episode: episode.clone(),
        }
    }

    fn stats(id: &str, name: &str, appearances: u32, wins: u32, points: i64) -> PlayerCareerStats {
        let mut s = career_table(&[player(id, name)], &[], &[]).remove(0);
        s.total_appearances = appearances;
        s.total_wins = wins;
        s.win_percentage = crate::calculate::percentage(wins, appearances);
        s.total_points = points;
        s.avg_points_per_appearance = crate::calculate::average_points(points, appearances);
        s
    }

    #[test]
    fn test_empty_input_yields_no_records() {
        let records = find_records(&[], &[], &[]);
        assert!(records.is_empty());
        assert_eq!(highest_score(&[]), None);
        assert_eq!(lowest_winning_score(&[]), None);
        assert_eq!(best_single_game_accuracy(&[]), None);
        assert_eq!(highest_non_winning_score(&[], &HashSet::new()), None);
        assert_eq!(most_appearances_without_win(&[]), None);
        assert_eq!(best_win_rate(&[]), None);
        assert_eq!(most_total_points(&[]), None);
        assert_eq!(most_wins(&[]), None);
        assert_eq!(highest_average_points(&[]), None);
        assert_eq!(closest_game(&[]), None);
        assert_eq!(biggest_blowout(&[]), None);
    }

    #[test]
    fn test_three_player_scenario() {
        let ep = episode("E", "2024-02-02");
        let (a, b, c) = (player("A", "Alpha"), player("B", "Bravo"), player("C", "Charlie"));
        let rows = vec![
            detail(&a, &ep, Appearance::new("E".into(), "A".into()).with_points(1200).as_winner()),
            detail(&b, &ep, Appearance::new("E".into(), "B".into()).with_points(1500)),
            detail(&c, &ep, Appearance::new("E".into(), "C".into()).with_points(900)),
        ];

        let high = highest_score(&rows).unwrap();
        assert_eq!(high.player_id.as_str(), "B");
        assert_eq!(high.points, 1500);

        let low_win = lowest_winning_score(&rows).unwrap();
        assert_eq!(low_win.player_id.as_str(), "A");
        assert_eq!(low_win.points, 1200);

        let non_win = highest_non_winning_score(&rows, &HashSet::new()).unwrap();
        assert_eq!(non_win.player_id.as_str(), "B");

        let game = Game {
            episode: ep.clone(),
            results: EpisodeResults::Solo(rows.iter().map(|d| d.appearance.clone()).collect()),
        };
        let records = find_records(&rows, &[], &[game]);
        let closest = records.closest_game.unwrap();
        assert_eq!(closest.margin, 300);
        assert_eq!(closest.first.name.as_deref(), Some("Bravo"));
        assert_eq!(closest.second.name.as_deref(), Some("Alpha"));
    }

    #[test]
    fn test_losing_team_members_count_as_non_winners() {
        let solo_ep = episode("e-solo", "2024-01-01");
        let team_ep = episode("e-team", "2024-02-01").with_type(EpisodeType::Team);
        let (a, b, c, d) = (
            player("a", "Amy"),
            player("b", "Ben"),
            player("c", "Cat"),
            player("d", "Dan"),
        );

        let mut gold = Team::new("e-team".into(), 0, "Gold".to_string());
        gold.total_points = 3000;
        gold.is_winner = true;
        let mut grey = Team::new("e-team".into(), 1, "Grey".to_string());
        grey.total_points = 2000;

        let gold_member = Appearance::new("e-team".into(), "c".into())
            .with_points(3000)
            .with_team(gold.id.clone());
        let grey_member = Appearance::new("e-team".into(), "d".into())
            .with_points(2000)
            .with_team(grey.id.clone());
        let rows = vec![
            detail(&a, &solo_ep, Appearance::new("e-solo".into(), "a".into()).with_points(800).as_winner()),
            detail(&b, &solo_ep, Appearance::new("e-solo".into(), "b".into()).with_points(500)),
            detail(&c, &team_ep, gold_member.clone()),
            detail(&d, &team_ep, grey_member.clone()),
        ];
        let games = vec![Game {
            episode: team_ep.clone(),
            results: EpisodeResults::Team(vec![
                TeamResult { team: gold, members: vec![gold_member] },
                TeamResult { team: grey, members: vec![grey_member] },
            ]),
        }];

        let winners = winning_teams(&games);
        assert_eq!(winners.len(), 1);

        let non_win = highest_non_winning_score(&rows, &winners).unwrap();
        assert_eq!(non_win.player_id.as_str(), "d");
        assert_eq!(non_win.points, 2000);

        let records = find_records(&rows, &[], &games);
        assert_eq!(records.highest_non_winning_score, Some(non_win));
    }

    #[test]
    fn test_ties_go_to_earliest_air_date() {
        let p = player("p", "Pat");
        let late = episode("e-late", "2024-06-01");
        let early = episode("e-early", "2023-01-01");
        let rows = vec![
            detail(&p, &late, Appearance::new("e-late".into(), "p".into()).with_points(1000)),
            detail(&p, &early, Appearance::new("e-early".into(), "p".into()).with_points(1000)),
        ];
        assert_eq!(highest_score(&rows).unwrap().episode_id.as_str(), "e-early");
    }

    #[test]
    fn test_accuracy_record_needs_ten_questions() {
        let p = player("p", "Pat");
        let ep = episode("e", "2024-01-01");
        let rows = vec![
            detail(&p, &ep, Appearance::new("e".into(), "p".into()).with_questions(5, 5)),
            detail(&p, &ep, Appearance::new("e".into(), "q".into()).with_questions(10, 8)),
        ];
        let best = best_single_game_accuracy(&rows).unwrap();
        assert_eq!(best.accuracy, 80.0);

        let only_short = &rows[..1];
        assert_eq!(best_single_game_accuracy(only_short), None);
    }

    #[test]
    fn test_player_records() {
        let table = vec![
            stats("1", "Zed", 10, 5, 9000),
            stats("2", "Amy", 4, 3, 4000),
            stats("3", "Bob", 2, 2, 3000),
            stats("4", "Cat", 6, 0, 1200),
            stats("5", "Dan", 0, 0, 0),
        ];

        assert_eq!(most_wins(&table).unwrap().name, "Zed");
        assert_eq!(most_total_points(&table).unwrap().name, "Zed");
        // Bob has 100% but only two appearances.
        assert_eq!(best_win_rate(&table).unwrap().name, "Amy");
        assert_eq!(highest_average_points(&table).unwrap().name, "Amy");
        assert_eq!(most_appearances_without_win(&table).unwrap().name, "Cat");
    }

    #[test]
    fn test_player_ties_go_to_name() {
        let table = vec![stats("9", "Zoe", 3, 2, 100), stats("1", "Abe", 3, 2, 100)];
        assert_eq!(most_wins(&table).unwrap().name, "Abe");
        assert_eq!(best_win_rate(&table).unwrap().name, "Abe");
    }

    #[test]
    fn test_game_margins_skip_unqualified_games() {
        let one_player = Game {
            episode: episode("e-1", "2024-01-01"),
            results: EpisodeResults::Solo(vec![
                Appearance::new("e-1".into(), "a".into()).with_points(500).as_winner(),
            ]),
        };
        let no_winner = Game {
            episode: episode("e-2", "2024-01-02"),
            results: EpisodeResults::Solo(vec![
                Appearance::new("e-2".into(), "a".into()).with_points(500),
                Appearance::new("e-2".into(), "b".into()).with_points(400),
            ]),
        };
        assert!(game_margins(&[one_player, no_winner], |_| None).is_empty());
    }

    #[test]
    fn test_closest_and_blowout() {
        let solo = |id: &str, air: &str, top: i64, next: i64| Game {
            episode: episode(id, air),
            results: EpisodeResults::Solo(vec![
                Appearance::new(id.into(), "a".into()).with_points(top).as_winner(),
                Appearance::new(id.into(), "b".into()).with_points(next),
            ]),
        };
        let mut red = Team::new("e-t".into(), 0, "Red".to_string());
        red.total_points = 800;
        red.is_winner = true;
        let mut blue = Team::new("e-t".into(), 1, "Blue".to_string());
        blue.total_points = 2800;
        let team_game = Game {
            episode: episode("e-t", "2024-03-01").with_type(EpisodeType::Team),
            results: EpisodeResults::Team(vec![
                TeamResult { team: red, members: vec![] },
                TeamResult { team: blue, members: vec![] },
            ]),
        };

        let margins = game_margins(
            &[
                solo("e-1", "2024-01-01", 1000, 900),
                solo("e-2", "2024-02-01", 3000, 100),
                solo("e-3", "2023-12-01", 700, 600),
                team_game,
            ],
            |_| None,
        );
        assert_eq!(margins.len(), 4);

        let closest = closest_game(&margins).unwrap();
        assert_eq!(closest.margin, 100);
        // e-1 and e-3 tie; e-3 aired first.
        assert_eq!(closest.episode_id.as_str(), "e-3");

        let blowout = biggest_blowout(&margins).unwrap();
        assert_eq!(blowout.episode_id.as_str(), "e-2");
        assert_eq!(blowout.margin, 2900);

        let team_margin = margins.iter().find(|m| m.episode_id.as_str() == "e-t").unwrap();
        assert_eq!(team_margin.first.name.as_deref(), Some("Blue"));
        assert_eq!(team_margin.margin, 2000);
    }
}
