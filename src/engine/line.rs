//! Suggested over/under line from a player's general history.
//!
//! The point estimate is the sample mean nudged toward recent form; the range
//! is a Student's-t interval around the unadjusted mean, scaled by the
//! population standard deviation. The range is deliberately NOT re-centered on
//! the form-adjusted line.

use serde::Serialize;
use std::fmt;

use super::error::AnalysisError;
use super::opponent::VsOpponent;
use super::records::{metric_values, GameRecordStore};
use super::stats;
use crate::config::LineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecentForm {
    Hot,
    Cold,
    Stable,
}

impl fmt::Display for RecentForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecentForm::Hot => "HOT",
            RecentForm::Cold => "COLD",
            RecentForm::Stable => "STABLE",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSuggestion {
    pub suggested_line: f64,
    pub range: (f64, f64),
    pub confidence: f64,
    pub recent_form: RecentForm,
    pub mean: f64,
    pub last_5_avg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vs_opponent: Option<VsOpponent>,
}

impl LineSuggestion {
    pub fn range_width(&self) -> f64 {
        self.range.1 - self.range.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct LineEstimator {
    config: LineConfig,
}

impl LineEstimator {
    pub fn new(config: LineConfig) -> Self {
        Self { config }
    }

    pub fn default_confidence(&self) -> f64 {
        self.config.confidence_level
    }

    pub fn suggest_line(
        &self,
        store: &GameRecordStore,
        player: &str,
        metric: &str,
        confidence_level: f64,
    ) -> Result<LineSuggestion, AnalysisError> {
        if !(confidence_level > 0.0 && confidence_level < 1.0) {
            return Err(AnalysisError::InvalidConfidence(confidence_level));
        }
        let history = store
            .history(player)
            .ok_or_else(|| AnalysisError::UnknownPlayer {
                player: player.to_string(),
            })?;

        // df = n - 1 must stay positive
        let min_games = self.config.min_games.max(2);
        if history.len() < min_games {
            tracing::debug!(
                player = %player,
                games = history.len(),
                required = min_games,
                "not enough games for line suggestion"
            );
            return Err(AnalysisError::NotEnoughGames {
                player: player.to_string(),
                required: min_games,
                available: history.len(),
            });
        }

        let missing = || AnalysisError::MissingMetric {
            player: player.to_string(),
            metric: metric.to_string(),
        };
        let recent = history.recent_first();
        if !recent[0].has_metric(metric) {
            tracing::debug!(
                player = %player,
                metric = %metric,
                available = ?recent[0].metrics.keys().collect::<Vec<_>>(),
                "metric not in latest game"
            );
            return Err(missing());
        }

        let sample_size = self.config.sample_size.max(min_games);
        let window = &recent[..recent.len().min(sample_size)];
        let values = metric_values(window, metric).ok_or_else(missing)?;
        tracing::debug!(player = %player, metric = %metric, values = ?values, "line sample");

        let n = values.len();
        let mean = stats::mean(&values);
        let std = stats::population_std(&values);
        let (low, high) = stats::t_interval(confidence_level, (n - 1) as f64, mean, std);

        let form_n = self.config.form_window.clamp(1, n);
        let last_5_avg = stats::mean(&values[..form_n]);
        let form_adjustment = (last_5_avg - mean) * self.config.form_weight;

        Ok(LineSuggestion {
            suggested_line: stats::round_to(mean + form_adjustment, 1),
            range: (stats::round_to(low, 1), stats::round_to(high, 1)),
            confidence: confidence_level,
            recent_form: classify_form(form_adjustment, std),
            mean: stats::round_to(mean, 1),
            last_5_avg: stats::round_to(last_5_avg, 1),
            opponent_factor: None,
            vs_opponent: None,
        })
    }
}

/// HOT/COLD when the form adjustment exceeds half a standard deviation.
///
/// With `std == 0` any nonzero adjustment is HOT or COLD.
pub fn classify_form(form_adjustment: f64, std: f64) -> RecentForm {
    if form_adjustment > std / 2.0 {
        RecentForm::Hot
    } else if form_adjustment < -std / 2.0 {
        RecentForm::Cold
    } else {
        RecentForm::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::records::GameRecord;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    /// `points` oldest -> newest, one game per day.
    fn store_with(points: &[f64]) -> GameRecordStore {
        let mut store = GameRecordStore::new();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for (i, p) in points.iter().enumerate() {
            let mut metrics = BTreeMap::new();
            metrics.insert("points".to_string(), *p);
            let date = start + chrono::Duration::days(i as i64);
            store.add_record("P", GameRecord::new(date, metrics, None));
        }
        store
    }

    #[test]
    fn test_classify_form() {
        assert_eq!(classify_form(1.1, 2.0), RecentForm::Hot);
        assert_eq!(classify_form(-1.1, 2.0), RecentForm::Cold);
        assert_eq!(classify_form(1.0, 2.0), RecentForm::Stable);
        assert_eq!(classify_form(0.0, 0.0), RecentForm::Stable);
        assert_eq!(classify_form(0.1, 0.0), RecentForm::Hot);
    }

    #[test]
    fn test_constant_series() {
        let store = store_with(&[20.0; 6]);
        let s = LineEstimator::default()
            .suggest_line(&store, "P", "points", 0.8)
            .unwrap();
        assert_eq!(s.suggested_line, 20.0);
        assert_eq!(s.range, (20.0, 20.0));
        assert_eq!(s.recent_form, RecentForm::Stable);
        assert_eq!(s.mean, 20.0);
        assert_eq!(s.last_5_avg, 20.0);
        assert!(s.opponent_factor.is_none());
    }

    #[test]
    fn test_rising_series_adjusts_line() {
        // 10 games: 10..28 step 2. mean 19, last 5 = (28+26+24+22+20)/5 = 24
        // form_adjustment = 5 * 0.2 = 1.0; std = sqrt(33) ~ 5.745 -> STABLE
        let points: Vec<f64> = (0..10).map(|i| 10.0 + 2.0 * i as f64).collect();
        let store = store_with(&points);
        let s = LineEstimator::default()
            .suggest_line(&store, "P", "points", 0.8)
            .unwrap();
        assert_eq!(s.mean, 19.0);
        assert_eq!(s.last_5_avg, 24.0);
        assert_eq!(s.suggested_line, 20.0);
        assert_eq!(s.recent_form, RecentForm::Stable);

        // Range is centered on the raw mean, not the adjusted line.
        let center = (s.range.0 + s.range.1) / 2.0;
        assert!((center - 19.0).abs() <= 0.1, "center={center}");
    }

    #[test]
    fn test_range_matches_t_interval() {
        // mean 19, std sqrt(33), df 9, t_0.9 = 1.383029
        let points: Vec<f64> = (0..10).map(|i| 10.0 + 2.0 * i as f64).collect();
        let store = store_with(&points);
        let s = LineEstimator::default()
            .suggest_line(&store, "P", "points", 0.8)
            .unwrap();
        // 19 -/+ 1.383029 * 5.7446 = 11.055 / 26.945
        assert_eq!(s.range, (11.1, 26.9));
    }

    #[test]
    fn test_form_shift_under_half_std_is_stable() {
        // 15 quiet games then 5 big ones
        let mut points = vec![10.0; 15];
        points.extend([30.0; 5]);
        let store = store_with(&points);
        let s = LineEstimator::default()
            .suggest_line(&store, "P", "points", 0.8)
            .unwrap();
        // mean 15, last5 30, adj 3.0, std = sqrt(75) ~ 8.66 -> 3.0 < 4.33 -> STABLE
        assert_eq!(s.suggested_line, 18.0);
        assert_eq!(s.recent_form, RecentForm::Stable);

        let mut points = vec![20.0; 15];
        points.extend([21.0; 5]);
        let store = store_with(&points);
        let s = LineEstimator::default()
            .suggest_line(&store, "P", "points", 0.8)
            .unwrap();
        // mean 20.25, std 0.433, adj 0.15 < 0.2165 -> STABLE
        assert_eq!(s.recent_form, RecentForm::Stable);
        // 20.25 is an exact tie and rounds to even
        assert_eq!(s.mean, 20.2);
        assert_eq!(s.suggested_line, 20.4);

        let mut points = vec![20.0; 18];
        points.extend([30.0; 2]);
        let store = store_with(&points);
        let s = LineEstimator::default()
            .suggest_line(&store, "P", "points", 0.8)
            .unwrap();
        // mean 21, last5 = 24, adj 0.6, std = 3.0 -> 0.6 < 1.5 -> STABLE
        assert_eq!(s.recent_form, RecentForm::Stable);
    }

    #[test]
    fn test_hot_streak_with_heavier_weight() {
        // 15 games at 10, last 5 at 30: adj = 15 * 0.6 = 9.0 > 8.66 / 2
        let mut points = vec![10.0; 15];
        points.extend([30.0; 5]);
        let store = store_with(&points);
        let config = LineConfig {
            form_weight: 0.6,
            ..LineConfig::default()
        };
        let s = LineEstimator::new(config)
            .suggest_line(&store, "P", "points", 0.8)
            .unwrap();
        assert_eq!(s.recent_form, RecentForm::Hot);
        assert_eq!(s.suggested_line, 24.0);
        assert_eq!(s.mean, 15.0);
    }

    #[test]
    fn test_cold_streak() {
        // 15 games at 20, last 5 at 0: mean 15, last5 0, adj -3, std 8.66
        // Using a 0.6 weight pushes the adjustment past half a std.
        let mut points = vec![20.0; 15];
        points.extend([0.0; 5]);
        let store = store_with(&points);
        let config = LineConfig {
            form_weight: 0.6,
            ..LineConfig::default()
        };
        let s = LineEstimator::new(config)
            .suggest_line(&store, "P", "points", 0.8)
            .unwrap();
        // adj = -15 * 0.6 = -9.0 < -4.33
        assert_eq!(s.recent_form, RecentForm::Cold);
        assert_eq!(s.suggested_line, 6.0);
    }

    #[test]
    fn test_uses_most_recent_twenty() {
        // 10 old games at 100, then 20 games at 10
        let mut points = vec![100.0; 10];
        points.extend([10.0; 20]);
        let store = store_with(&points);
        let s = LineEstimator::default()
            .suggest_line(&store, "P", "points", 0.8)
            .unwrap();
        assert_eq!(s.mean, 10.0);
        assert_eq!(s.range, (10.0, 10.0));
    }

    #[test]
    fn test_four_games_is_no_data() {
        let store = store_with(&[20.0, 22.0, 24.0, 26.0]);
        let err = LineEstimator::default()
            .suggest_line(&store, "P", "points", 0.8)
            .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::NotEnoughGames {
                player: "P".to_string(),
                required: 5,
                available: 4
            }
        );
    }

    #[test]
    fn test_unknown_player_and_metric() {
        let store = store_with(&[20.0; 5]);
        let estimator = LineEstimator::default();
        assert!(matches!(
            estimator.suggest_line(&store, "Q", "points", 0.8),
            Err(AnalysisError::UnknownPlayer { .. })
        ));
        assert!(matches!(
            estimator.suggest_line(&store, "P", "assists", 0.8),
            Err(AnalysisError::MissingMetric { .. })
        ));
    }

    #[test]
    fn test_invalid_confidence() {
        let store = store_with(&[20.0; 5]);
        let estimator = LineEstimator::default();
        for c in [0.0, 1.0, -0.5, f64::NAN] {
            assert!(matches!(
                estimator.suggest_line(&store, "P", "points", c),
                Err(AnalysisError::InvalidConfidence(_))
            ));
        }
    }
}
