//! Result ordering for a single episode.
//!
//! One comparator decides how standings are ordered everywhere: winners
//! first, then explicit placements when both sides have one, then points
//! descending. The same points rule drives game margins in
//! [`crate::calculate::records`].

use std::cmp::Ordering;

use serde::Serialize;

use crate::models::{Appearance, EpisodeResults, Team, TeamResult};

/// Anything that finishes somewhere in an episode.
pub trait Standing {
    fn is_winner(&self) -> bool;
    fn placement(&self) -> Option<u32>;
    fn points(&self) -> i64;
}

impl Standing for Appearance {
    fn is_winner(&self) -> bool {
        self.is_winner
    }

    fn placement(&self) -> Option<u32> {
        self.placement
    }

    fn points(&self) -> i64 {
        self.points_scored
    }
}

impl Standing for Team {
    fn is_winner(&self) -> bool {
        self.is_winner
    }

    fn placement(&self) -> Option<u32> {
        self.placement
    }

    fn points(&self) -> i64 {
        self.total_points
    }
}

impl Standing for TeamResult {
    fn is_winner(&self) -> bool {
        self.team.is_winner
    }

    fn placement(&self) -> Option<u32> {
        self.team.placement
    }

    fn points(&self) -> i64 {
        self.team.total_points
    }
}

/// Higher points first.
pub fn compare_points<S: Standing + ?Sized>(a: &S, b: &S) -> Ordering {
    b.points().cmp(&a.points())
}

/// The display ordering rule shared by every results view.
pub fn compare_standings<S: Standing + ?Sized>(a: &S, b: &S) -> Ordering {
    match (a.is_winner(), b.is_winner()) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }
    if let (Some(pa), Some(pb)) = (a.placement(), b.placement()) {
        return pa.cmp(&pb);
    }
    compare_points(a, b)
}

/// Stable ordering by `cmp` that never panics.
///
/// Mixing placed and unplaced rows can make the standings comparator
/// intransitive, which `slice::sort_by` is allowed to reject. An insertion
/// pass keeps equal elements in input order and always terminates; episodes
/// only have a handful of rows.
pub fn stable_order_by<T, F>(items: &[T], mut cmp: F) -> Vec<&T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mut ordered: Vec<&T> = Vec::with_capacity(items.len());
    for item in items {
        let mut pos = ordered.len();
        while pos > 0 && cmp(ordered[pos - 1], item) == Ordering::Greater {
            pos -= 1;
        }
        ordered.insert(pos, item);
    }
    ordered
}

/// Order rows for display without touching the input.
pub fn order_standings<S: Standing>(rows: &[S]) -> Vec<&S> {
    stable_order_by(rows, |a, b| compare_standings(a, b))
}

/// Rows sorted by points only, highest first (input order on ties).
pub fn order_by_points<S: Standing>(rows: &[S]) -> Vec<&S> {
    stable_order_by(rows, |a, b| compare_points(a, b))
}

/// One participant in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedAppearance {
    /// Explicit placement, or 1-based display index when none was recorded
    pub position: u32,
    pub accuracy: f64,
    pub appearance: Appearance,
}

/// One team in display order, with its members ordered by points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTeam {
    pub position: u32,
    pub team: Team,
    /// Sum of member points before the team's final round
    pub member_points: i64,
    pub questions_seen: u32,
    pub questions_correct: u32,
    pub accuracy: f64,
    pub members: Vec<RankedAppearance>,
}

/// An episode's results ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "episode_type", content = "entries", rename_all = "lowercase")]
pub enum RankedResults {
    Solo(Vec<RankedAppearance>),
    Team(Vec<RankedTeam>),
}

fn ranked(index: usize, appearance: &Appearance, placement: Option<u32>) -> RankedAppearance {
    RankedAppearance {
        position: placement.unwrap_or(index as u32 + 1),
        accuracy: appearance.accuracy(),
        appearance: appearance.clone(),
    }
}

/// Solo results: winner first, then placement, then points.
pub fn rank_solo(rows: &[Appearance]) -> Vec<RankedAppearance> {
    order_standings(rows)
        .into_iter()
        .enumerate()
        .map(|(i, a)| ranked(i, a, a.placement))
        .collect()
}

/// Team results: teams by the standings rule, members by points.
pub fn rank_teams(teams: &[TeamResult]) -> Vec<RankedTeam> {
    order_standings(teams)
        .into_iter()
        .enumerate()
        .map(|(i, t)| {
            let members: Vec<RankedAppearance> = order_by_points(&t.members)
                .into_iter()
                .enumerate()
                .map(|(mi, m)| ranked(mi, m, None))
                .collect();
            let questions_seen = t.members.iter().map(|m| m.questions_seen).sum();
            let questions_correct = t.members.iter().map(|m| m.questions_correct).sum();
            RankedTeam {
                position: t.team.placement.unwrap_or(i as u32 + 1),
                team: t.team.clone(),
                member_points: t.members.iter().map(|m| m.points_scored).sum(),
                questions_seen,
                questions_correct,
                accuracy: super::accuracy(questions_correct, questions_seen),
                members,
            }
        })
        .collect()
}

pub fn rank_results(results: &EpisodeResults) -> RankedResults {
    match results {
        EpisodeResults::Solo(rows) => RankedResults::Solo(rank_solo(rows)),
        EpisodeResults::Team(teams) => RankedResults::Team(rank_teams(teams)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(player: &str, points: i64) -> Appearance {
        Appearance::new("ep-1".into(), player.into()).with_points(points)
    }

    fn players(ranked: &[RankedAppearance]) -> Vec<&str> {
        ranked.iter().map(|r| r.appearance.player_id.as_str()).collect()
    }

    #[test]
    fn test_winner_first_regardless_of_points() {
        let rows = vec![row("loser", 50), row("winner", 10).as_winner()];
        let ranked = rank_solo(&rows);
        assert_eq!(players(&ranked), vec!["winner", "loser"]);
    }

    #[test]
    fn test_placement_before_points() {
        let rows = vec![
            row("a", 900).with_placement(3),
            row("b", 100).with_placement(2),
            row("c", 500).with_placement(1),
        ];
        assert_eq!(players(&rank_solo(&rows)), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_equal_placement_keeps_input_order() {
        let rows = vec![
            row("low", 100).with_placement(1),
            row("high", 900).with_placement(1),
            row("mid", 500).with_placement(1),
        ];
        assert_eq!(players(&rank_solo(&rows)), vec!["low", "high", "mid"]);
    }

    #[test]
    fn test_points_when_placement_missing() {
        let rows = vec![row("a", 100), row("b", 300), row("c", 200)];
        assert_eq!(players(&rank_solo(&rows)), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_three_player_scenario() {
        let rows = vec![
            row("A", 1200).as_winner(),
            row("B", 1500),
            row("C", 900),
        ];
        let ranked = rank_solo(&rows);
        assert_eq!(players(&ranked), vec!["A", "B", "C"]);
        assert_eq!(
            ranked.iter().map(|r| r.position).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_position_uses_placement_when_present() {
        let rows = vec![row("a", 100).with_placement(4), row("b", 50).with_placement(7)];
        let ranked = rank_solo(&rows);
        assert_eq!(ranked[0].position, 4);
        assert_eq!(ranked[1].position, 7);
    }

    #[test]
    fn test_ranking_does_not_mutate_input() {
        let rows = vec![row("a", 1), row("b", 2)];
        let before = rows.clone();
        let _ = rank_solo(&rows);
        assert_eq!(rows, before);
    }

    #[test]
    fn test_accuracy_per_row() {
        let rows = vec![row("a", 0).with_questions(0, 0), row("b", 0).with_questions(8, 6)];
        let ranked = rank_solo(&rows);
        assert_eq!(ranked[0].accuracy, 0.0);
        assert_eq!(ranked[1].accuracy, 75.0);
    }

    #[test]
    fn test_intransitive_mix_does_not_panic() {
        // placed(1, 10) < placed(2, 30); placed(2, 30) < unplaced(20) by points;
        // unplaced(20) < placed(1, 10) by points. A cycle.
        let rows = vec![
            row("a", 10).with_placement(1),
            row("b", 20),
            row("c", 30).with_placement(2),
        ];
        let ranked = rank_solo(&rows);
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn test_empty_results() {
        assert!(rank_solo(&[]).is_empty());
        assert!(rank_teams(&[]).is_empty());
    }

    fn team(name: &str, total: i64, members: &[(&str, i64)]) -> TeamResult {
        let mut t = Team::new("ep-1".into(), 0, name.to_string());
        t.id = name.into();
        t.total_points = total;
        TeamResult {
            team: t,
            members: members
                .iter()
                .map(|(p, pts)| row(p, *pts).with_team(name.into()))
                .collect(),
        }
    }

    #[test]
    fn test_team_ranking() {
        let mut red = team("red", 800, &[("r1", 150), ("r2", 300), ("r3", 250)]);
        red.team.is_winner = true;
        let blue = team("blue", 900, &[("b1", 500), ("b2", 400)]);

        let ranked = rank_teams(&[blue, red]);
        assert_eq!(ranked[0].team.team_name, "red");
        assert_eq!(ranked[0].member_points, 700);
        assert_eq!(players(&ranked[0].members), vec!["r2", "r3", "r1"]);
        assert_eq!(
            ranked[0].members.iter().map(|m| m.position).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(ranked[1].team.team_name, "blue");
    }

    #[test]
    fn test_teams_without_winner_order_by_total() {
        let a = team("a", 100, &[]);
        let b = team("b", 300, &[]);
        let ranked = rank_teams(&[a, b]);
        assert_eq!(ranked[0].team.team_name, "b");
        assert_eq!(ranked[0].accuracy, 0.0);
    }

    #[test]
    fn test_rank_results_dispatch() {
        let solo = EpisodeResults::Solo(vec![row("a", 1)]);
        assert!(matches!(rank_results(&solo), RankedResults::Solo(r) if r.len() == 1));
        let teams = EpisodeResults::Team(vec![team("x", 0, &[])]);
        assert!(matches!(rank_results(&teams), RankedResults::Team(t) if t.len() == 1));
    }

    #[test]
    fn test_order_by_points_stable_on_ties() {
        let rows = vec![row("first", 500), row("second", 500), row("top", 900)];
        let ordered: Vec<&str> = order_by_points(&rows)
            .into_iter()
            .map(|a| a.player_id.as_str())
            .collect();
        assert_eq!(ordered, vec!["top", "first", "second"]);
    }
}
