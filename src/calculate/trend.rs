//! Per-game performance over a player's career.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::AppearanceDetail;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// 1-based game number in air order
    pub game: u32,
    pub air_date: NaiveDate,
    pub episode_title: String,
    pub points: i64,
    /// Whole-number accuracy percentage
    pub accuracy: u32,
    pub is_winner: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceTrend {
    pub points: Vec<TrendPoint>,
    /// Mean points per game, rounded
    pub average_points: i64,
}

/// Build the trend for one player's appearances.
///
/// Returns `None` with fewer than two games; one point is not a trend.
pub fn performance_trend(rows: &[AppearanceDetail]) -> Option<PerformanceTrend> {
    if rows.len() < 2 {
        return None;
    }

    let mut ordered: Vec<&AppearanceDetail> = rows.iter().collect();
    ordered.sort_by_key(|d| d.episode.air_date);

    let points: Vec<TrendPoint> = ordered
        .iter()
        .enumerate()
        .map(|(i, d)| TrendPoint {
            game: i as u32 + 1,
            air_date: d.episode.air_date,
            episode_title: d.episode.title.clone(),
            points: d.appearance.points_scored,
            accuracy: d.appearance.accuracy().round() as u32,
            is_winner: d.appearance.is_winner,
        })
        .collect();

    let total: i64 = points.iter().map(|p| p.points).sum();
    let average_points = (total as f64 / points.len() as f64).round() as i64;

    Some(PerformanceTrend {
        points,
        average_points,
    })
}
