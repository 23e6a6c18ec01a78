//! Admin results entry.
//!
//! An editor submits a [`ResultsForm`] with base scores (before the final
//! round). Validation collects every problem at once; planning turns a valid
//! form into the rows to persist with the final round applied, and
//! [`load_form`] turns stored rows back into an editable form.

pub mod forms;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculate::scoring;
use crate::models::{
    Appearance, Episode, EpisodeResults, EpisodeRows, EpisodeType, FinalRound, PlayerId, Team,
};

/// Highest placement an editor may assign.
pub const MAX_PLACEMENT: u32 = 10;

/// Minimum number of teams in a team episode.
pub const MIN_TEAMS: usize = 2;

/// Display colours offered for teams, assigned in entry order by default.
pub const TEAM_COLORS: [&str; 8] = [
    "#EF4444", "#F97316", "#EAB308", "#22C55E", "#3B82F6", "#8B5CF6", "#EC4899", "#6B7280",
];

/// One solo participant as entered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticipantInput {
    /// Unset while the editor has not picked a player
    #[serde(default)]
    pub player_id: Option<PlayerId>,

    #[serde(default)]
    pub questions_seen: u32,

    #[serde(default)]
    pub questions_correct: u32,

    /// Score before the final round
    #[serde(default)]
    pub base_points: i64,

    #[serde(default)]
    pub is_winner: bool,

    #[serde(default)]
    pub placement: Option<u32>,

    #[serde(default)]
    pub final_wager: Option<u32>,

    #[serde(default)]
    pub final_correct: Option<bool>,

    #[serde(default)]
    pub notes: Option<String>,
}

impl ParticipantInput {
    pub fn final_round(&self) -> Option<FinalRound> {
        FinalRound::from_parts(self.final_wager, self.final_correct)
    }
}

/// One team member as entered. Members have no placement or final round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberInput {
    #[serde(default)]
    pub player_id: Option<PlayerId>,

    #[serde(default)]
    pub questions_seen: u32,

    #[serde(default)]
    pub questions_correct: u32,

    #[serde(default)]
    pub points: i64,

    #[serde(default)]
    pub notes: Option<String>,
}

/// One team as entered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamInput {
    #[serde(default)]
    pub team_name: String,

    /// Empty picks the default colour for the team's position
    #[serde(default)]
    pub team_color: String,

    #[serde(default)]
    pub is_winner: bool,

    #[serde(default)]
    pub placement: Option<u32>,

    #[serde(default)]
    pub final_wager: Option<u32>,

    #[serde(default)]
    pub final_correct: Option<bool>,

    #[serde(default)]
    pub members: Vec<MemberInput>,
}

impl TeamInput {
    pub fn final_round(&self) -> Option<FinalRound> {
        FinalRound::from_parts(self.final_wager, self.final_correct)
    }

    /// Member points before the team's final round.
    pub fn base_points(&self) -> i64 {
        self.members.iter().map(|m| m.points).sum()
    }
}

/// Results for one episode as the editor sees them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "episode_type", content = "entries", rename_all = "lowercase")]
pub enum ResultsForm {
    Solo(Vec<ParticipantInput>),
    Team(Vec<TeamInput>),
}

impl ResultsForm {
    pub fn episode_type(&self) -> EpisodeType {
        match self {
            ResultsForm::Solo(_) => EpisodeType::Solo,
            ResultsForm::Team(_) => EpisodeType::Team,
        }
    }

    /// A blank form with one empty row (solo) or two empty teams.
    pub fn blank(episode_type: EpisodeType) -> Self {
        match episode_type {
            EpisodeType::Solo => ResultsForm::Solo(vec![ParticipantInput::default()]),
            EpisodeType::Team => ResultsForm::Team(
                (0..MIN_TEAMS)
                    .map(|i| TeamInput {
                        team_name: format!("Team {}", i + 1),
                        team_color: TEAM_COLORS[i % TEAM_COLORS.len()].to_string(),
                        members: vec![MemberInput::default()],
                        ..Default::default()
                    })
                    .collect(),
            ),
        }
    }
}

/// A single problem with a results form. Rows and teams are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("At least one participant is required")]
    NoParticipants,

    #[error("Row {row} has no player selected")]
    MissingPlayer { row: usize },

    #[error("Player {0} is listed more than once")]
    DuplicatePlayer(PlayerId),

    #[error("Please select a winner")]
    NoWinner,

    #[error("Only one winner can be selected ({0} marked)")]
    MultipleWinners(usize),

    #[error("Row {row}: placement {placement} must be between 1 and 10")]
    PlacementOutOfRange { row: usize, placement: u32 },

    #[error("Row {row}: questions correct cannot exceed questions seen")]
    CorrectExceedsSeen { row: usize },

    #[error("A team episode needs at least 2 teams ({0} given)")]
    TooFewTeams(usize),

    #[error("Team {team} needs a name")]
    UnnamedTeam { team: usize },

    #[error("Team {0} has no members")]
    EmptyTeam(String),

    #[error("Please select a winning team")]
    NoWinningTeam,

    #[error("Only one winning team can be selected ({0} marked)")]
    MultipleWinningTeams(usize),

    #[error("Results are for a {found} episode but the episode is {expected}")]
    TypeMismatch {
        expected: EpisodeType,
        found: EpisodeType,
    },
}

fn join_errors(errors: &[EntryError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Every problem found in a form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_errors(.0))]
pub struct ValidationErrors(pub Vec<EntryError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[EntryError] {
        &self.0
    }
}

struct Checker {
    errors: Vec<EntryError>,
    seen_players: HashSet<PlayerId>,
    reported_duplicates: HashSet<PlayerId>,
}

impl Checker {
    fn new() -> Self {
        Self {
            errors: Vec::new(),
            seen_players: HashSet::new(),
            reported_duplicates: HashSet::new(),
        }
    }

    fn player(&mut self, row: usize, player_id: &Option<PlayerId>) {
        match player_id {
            Some(id) if !id.as_str().trim().is_empty() => {
                if !self.seen_players.insert(id.clone()) && self.reported_duplicates.insert(id.clone()) {
                    self.errors.push(EntryError::DuplicatePlayer(id.clone()));
                }
            }
            _ => self.errors.push(EntryError::MissingPlayer { row }),
        }
    }

    fn questions(&mut self, row: usize, seen: u32, correct: u32) {
        if correct > seen {
            self.errors.push(EntryError::CorrectExceedsSeen { row });
        }
    }

    fn placement(&mut self, row: usize, placement: Option<u32>) {
        if let Some(p) = placement {
            if !(1..=MAX_PLACEMENT).contains(&p) {
                self.errors.push(EntryError::PlacementOutOfRange { row, placement: p });
            }
        }
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

/// Check a form, collecting every problem.
pub fn validate(form: &ResultsForm) -> Result<(), ValidationErrors> {
    let mut check = Checker::new();

    match form {
        ResultsForm::Solo(rows) => {
            if rows.is_empty() {
                check.errors.push(EntryError::NoParticipants);
                return check.finish();
            }
            for (i, row) in rows.iter().enumerate() {
                check.player(i + 1, &row.player_id);
                check.questions(i + 1, row.questions_seen, row.questions_correct);
                check.placement(i + 1, row.placement);
            }
            match rows.iter().filter(|r| r.is_winner).count() {
                0 => check.errors.push(EntryError::NoWinner),
                1 => {}
                n => check.errors.push(EntryError::MultipleWinners(n)),
            }
        }
        ResultsForm::Team(teams) => {
            if teams.len() < MIN_TEAMS {
                check.errors.push(EntryError::TooFewTeams(teams.len()));
            }
            let mut row = 0;
            for (i, team) in teams.iter().enumerate() {
                let name = team.team_name.trim();
                if name.is_empty() {
                    check.errors.push(EntryError::UnnamedTeam { team: i + 1 });
                }
                check.placement(i + 1, team.placement);
                if team.members.is_empty() {
                    let label = if name.is_empty() {
                        (i + 1).to_string()
                    } else {
                        name.to_string()
                    };
                    check.errors.push(EntryError::EmptyTeam(label));
                }
                for member in &team.members {
                    row += 1;
                    check.player(row, &member.player_id);
                    check.questions(row, member.questions_seen, member.questions_correct);
                }
            }
            if row == 0 && teams.len() >= MIN_TEAMS {
                check.errors.push(EntryError::NoParticipants);
            }
            match teams.iter().filter(|t| t.is_winner).count() {
                0 => check.errors.push(EntryError::NoWinningTeam),
                1 => {}
                n => check.errors.push(EntryError::MultipleWinningTeams(n)),
            }
        }
    }

    check.finish()
}

/// Solo final-round winner: answered the final correctly, highest adjusted
/// score; the earlier row wins a tie.
fn final_round_winner(rows: &[Appearance]) -> Option<PlayerId> {
    rows.iter()
        .filter(|a| a.final_correct == Some(true))
        .fold(None::<&Appearance>, |best, a| match best {
            Some(b) if b.points_scored >= a.points_scored => Some(b),
            _ => Some(a),
        })
        .map(|a| a.player_id.clone())
}

/// Validate a form and build the rows to persist for `episode`.
pub fn plan_results(episode: &Episode, form: &ResultsForm) -> Result<EpisodeRows, ValidationErrors> {
    if form.episode_type() != episode.episode_type {
        return Err(ValidationErrors(vec![EntryError::TypeMismatch {
            expected: episode.episode_type,
            found: form.episode_type(),
        }]));
    }
    validate(form)?;

    let rows = match form {
        ResultsForm::Solo(inputs) => {
            let appearances: Vec<Appearance> = inputs
                .iter()
                .filter_map(|input| {
                    let player_id = input.player_id.clone()?;
                    let mut a = Appearance::new(episode.id.clone(), player_id)
                        .with_points(scoring::adjust(input.base_points, input.final_round()))
                        .with_questions(input.questions_seen, input.questions_correct);
                    a.is_winner = input.is_winner;
                    a.placement = input.placement;
                    a.final_wager = input.final_wager;
                    a.final_correct = input.final_correct;
                    a.notes = input.notes.clone();
                    Some(a)
                })
                .collect();
            let final_round_winner_id = final_round_winner(&appearances);
            EpisodeRows {
                appearances,
                teams: Vec::new(),
                final_round_winner_id,
            }
        }
        ResultsForm::Team(inputs) => {
            let mut teams = Vec::with_capacity(inputs.len());
            let mut appearances = Vec::new();
            for (i, input) in inputs.iter().enumerate() {
                let color = if input.team_color.trim().is_empty() {
                    TEAM_COLORS[i % TEAM_COLORS.len()].to_string()
                } else {
                    input.team_color.clone()
                };
                let mut team = Team::new(episode.id.clone(), i, input.team_name.trim().to_string())
                    .with_color(color);
                team.is_winner = input.is_winner;
                team.placement = input.placement;
                team.final_wager = input.final_wager;
                team.final_correct = input.final_correct;

                let members: Vec<Appearance> = input
                    .members
                    .iter()
                    .filter_map(|m| {
                        let player_id = m.player_id.clone()?;
                        let mut a = Appearance::new(episode.id.clone(), player_id)
                            .with_points(m.points)
                            .with_questions(m.questions_seen, m.questions_correct)
                            .with_team(team.id.clone());
                        a.notes = m.notes.clone();
                        Some(a)
                    })
                    .collect();
                team.total_points = scoring::team_total(&members, team.final_round());

                teams.push(team);
                appearances.extend(members);
            }
            EpisodeRows {
                appearances,
                teams,
                final_round_winner_id: None,
            }
        }
    };

    Ok(rows)
}

/// Turn stored results back into an editable form, reversing the final
/// round so the editor sees base scores.
pub fn load_form(results: &EpisodeResults) -> ResultsForm {
    match results {
        EpisodeResults::Solo(rows) => {
            let mut ordered: Vec<&Appearance> = rows.iter().collect();
            ordered.sort_by_key(|a| a.placement.unwrap_or(u32::MAX));
            ResultsForm::Solo(
                ordered
                    .into_iter()
                    .map(|a| ParticipantInput {
                        player_id: Some(a.player_id.clone()),
                        questions_seen: a.questions_seen,
                        questions_correct: a.questions_correct,
                        base_points: scoring::reverse(a.points_scored, a.final_round()),
                        is_winner: a.is_winner,
                        placement: a.placement,
                        final_wager: a.final_wager,
                        final_correct: a.final_correct,
                        notes: a.notes.clone(),
                    })
                    .collect(),
            )
        }
        EpisodeResults::Team(teams) => ResultsForm::Team(
            teams
                .iter()
                .map(|t| TeamInput {
                    team_name: t.team.team_name.clone(),
                    team_color: t.team.team_color.clone(),
                    is_winner: t.team.is_winner,
                    placement: t.team.placement,
                    final_wager: t.team.final_wager,
                    final_correct: t.team.final_correct,
                    members: t
                        .members
                        .iter()
                        .map(|m| MemberInput {
                            player_id: Some(m.player_id.clone()),
                            questions_seen: m.questions_seen,
                            questions_correct: m.questions_correct,
                            points: m.points_scored,
                            notes: m.notes.clone(),
                        })
                        .collect(),
                })
                .collect(),
        ),
    }
}
