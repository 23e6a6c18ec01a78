//! Final-round score adjustment.
//!
//! A participant (or team) that takes the final round wagers part of their
//! score: a correct answer adds the wager, a wrong one subtracts it. Stored
//! scores already include the adjustment, so editing a stored row reverses
//! it to recover the base score.

use crate::models::{Appearance, FinalRound};

/// Signed change in score caused by the final round.
pub fn adjustment(final_round: Option<FinalRound>) -> i64 {
    match final_round {
        Some(FinalRound {
            wager,
            correct: true,
        }) => i64::from(wager),
        Some(FinalRound {
            wager,
            correct: false,
        }) => -i64::from(wager),
        None => 0,
    }
}

/// Score to persist once the final round is applied.
pub fn adjust(base_points: i64, final_round: Option<FinalRound>) -> i64 {
    base_points + adjustment(final_round)
}

/// Base score the editor should see for a stored total.
pub fn reverse(stored_total: i64, final_round: Option<FinalRound>) -> i64 {
    stored_total - adjustment(final_round)
}

/// Stored team total: member points summed, then the team's final round.
///
/// Member points are never adjusted individually.
pub fn team_total<'a, I>(members: I, final_round: Option<FinalRound>) -> i64
where
    I: IntoIterator<Item = &'a Appearance>,
{
    let base: i64 = members.into_iter().map(|m| m.points_scored).sum();
    adjust(base, final_round)
}
