//! Statistics calculation engine.
//!
//! Pure derivations over rows already fetched from the store:
//! - Final-round score adjustment and its reversal
//! - Result ordering for an episode (solo and team)
//! - Career totals and episode summaries
//! - Records, leaderboards, head-to-head comparisons and trends

pub mod career;
pub mod compare;
pub mod leaderboard;
pub mod records;
pub mod scoring;
pub mod standings;
pub mod summary;
pub mod trend;

/// Minimum appearances for rate-based rankings (win rate, accuracy, average).
pub const MIN_APPEARANCES_FOR_RATES: u32 = 3;

/// Minimum questions seen for a single-game accuracy record.
pub const MIN_QUESTIONS_FOR_ACCURACY_RECORD: u32 = 10;

/// `part / whole` as a percentage (0-100); 0 when `whole` is 0.
pub fn percentage(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Question accuracy as a percentage; 0 when nothing was seen.
pub fn accuracy(correct: u32, seen: u32) -> f64 {
    percentage(correct, seen)
}

/// Mean points per appearance; 0 when there are no appearances.
pub fn average_points(total_points: i64, appearances: u32) -> f64 {
    if appearances == 0 {
        0.0
    } else {
        total_points as f64 / appearances as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(15, 20), 75.0);
        assert_eq!(accuracy(0, 20), 0.0);
        assert_eq!(accuracy(20, 20), 100.0);
    }

    #[test]
    fn test_accuracy_never_divides_by_zero() {
        for correct in [0, 1, 7, u32::MAX] {
            assert_eq!(accuracy(correct, 0), 0.0);
        }
    }

    #[test]
    fn test_percentage() {
        assert!((percentage(1, 3) - 33.333).abs() < 0.01);
        assert_eq!(percentage(0, 0), 0.0);
    }

    #[test]
    fn test_average_points() {
        assert_eq!(average_points(3000, 4), 750.0);
        assert_eq!(average_points(-300, 3), -100.0);
        assert_eq!(average_points(500, 0), 0.0);
    }
}
