//! Over/under recommendation against a supplied line.
//!
//! Two signals feed the decision:
//! 1. `avg_vs_line`: how far the short-window average sits from the line
//!    (fractional). Inside the avoid band the answer is AVOID/LOW.
//! 2. `trend_strength`: short-window minus long-window average, in units of
//!    the long window's standard deviation. Agreement with the pick direction
//!    makes the base confidence HIGH, otherwise MEDIUM.
//!
//! Opponent history can then move confidence one step between MEDIUM and HIGH.

use serde::Serialize;
use std::fmt;

use super::error::AnalysisError;
use super::opponent::{OpponentSummary, OpponentTrend, VsOpponent};
use super::records::{metric_values, GameRecordStore};
use super::stats;
use crate::config::TrendConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Over,
    Under,
    Avoid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrendDirection::Up => "UP",
            TrendDirection::Down => "DOWN",
            TrendDirection::Stable => "STABLE",
        })
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Recommendation::Over => "OVER",
            Recommendation::Under => "UNDER",
            Recommendation::Avoid => "AVOID",
        })
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Confidence::Low => "LOW",
            Confidence::Medium => "MEDIUM",
            Confidence::High => "HIGH",
        })
    }
}

/// Rolling averages over a player's most recent games.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingAverages {
    pub games: usize,
    pub last_5: Option<f64>,
    pub last_10: Option<f64>,
    pub max: f64,
    pub min: f64,
    pub std_dev: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendRecommendation {
    pub metric: String,
    pub line: f64,
    pub last_5_avg: f64,
    pub last_10_avg: f64,
    pub trend: TrendDirection,
    pub trend_strength: f64,
    pub avg_vs_line: f64,
    pub recommendation: Recommendation,
    pub confidence: Confidence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vs_opponent: Option<VsOpponent>,
}

#[derive(Debug, Clone, Default)]
pub struct TrendRecommender {
    config: TrendConfig,
}

impl TrendRecommender {
    pub fn new(config: TrendConfig) -> Self {
        Self { config }
    }

    /// Averages over the most recent `games_back` games.
    ///
    /// `last_5`/`last_10` are None when the window is shorter than the
    /// configured short/long window.
    pub fn recent_averages(
        &self,
        store: &GameRecordStore,
        player: &str,
        metric: &str,
        games_back: usize,
    ) -> Result<RollingAverages, AnalysisError> {
        let history = store
            .history(player)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| AnalysisError::UnknownPlayer {
                player: player.to_string(),
            })?;

        let recent = history.recent_first();
        let window = &recent[..recent.len().min(games_back.max(1))];
        let values = metric_values(window, metric).ok_or_else(|| AnalysisError::MissingMetric {
            player: player.to_string(),
            metric: metric.to_string(),
        })?;

        let short = self.config.short_window;
        let long = self.config.window;
        Ok(RollingAverages {
            games: values.len(),
            last_5: (values.len() >= short).then(|| stats::mean(&values[..short])),
            last_10: (values.len() >= long).then(|| stats::mean(&values[..long])),
            max: stats::max(&values),
            min: stats::min(&values),
            std_dev: stats::population_std(&values),
        })
    }

    /// Recommend OVER/UNDER/AVOID for `line`.
    ///
    /// `opponent` is the head-to-head summary, if the caller has one.
    pub fn analyze_trend(
        &self,
        store: &GameRecordStore,
        player: &str,
        metric: &str,
        line: f64,
        opponent: Option<&OpponentSummary>,
    ) -> Result<TrendRecommendation, AnalysisError> {
        if line == 0.0 || !line.is_finite() {
            return Err(AnalysisError::InvalidLine(line));
        }

        let window = self.config.window;
        let available = store.game_count(player);
        if available < window {
            return Err(AnalysisError::InsufficientTrendData {
                player: player.to_string(),
                required: window,
                available,
            });
        }

        let averages = self.recent_averages(store, player, metric, window)?;
        let (Some(last_5_avg), Some(last_10_avg)) = (averages.last_5, averages.last_10) else {
            return Err(AnalysisError::InsufficientTrendData {
                player: player.to_string(),
                required: window,
                available: averages.games,
            });
        };

        let trend_strength = if averages.std_dev != 0.0 {
            (last_5_avg - last_10_avg) / averages.std_dev
        } else {
            0.0
        };
        let avg_vs_line = (last_5_avg - line) / line;
        let modifier = opponent.map_or(0, |o| confidence_modifier(o.trend));

        let (recommendation, confidence) = self.decide(avg_vs_line, trend_strength, modifier);

        tracing::debug!(
            player = %player,
            metric = %metric,
            line = line,
            last_5_avg = last_5_avg,
            last_10_avg = last_10_avg,
            trend_strength = trend_strength,
            avg_vs_line = avg_vs_line,
            modifier = modifier,
            recommendation = %recommendation,
            confidence = %confidence,
            "trend analysis"
        );

        Ok(TrendRecommendation {
            metric: metric.to_string(),
            line,
            last_5_avg: stats::round_to(last_5_avg, 2),
            last_10_avg: stats::round_to(last_10_avg, 2),
            trend: self.classify(trend_strength),
            trend_strength,
            avg_vs_line,
            recommendation,
            confidence,
            vs_opponent: opponent.map(|o| o.vs_opponent(2)),
        })
    }

    pub fn classify(&self, trend_strength: f64) -> TrendDirection {
        let threshold = self.config.strength_threshold;
        if trend_strength > threshold {
            TrendDirection::Up
        } else if trend_strength < -threshold {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        }
    }

    /// Decision rule. `modifier` is +1, 0 or -1 from opponent history.
    pub fn decide(
        &self,
        avg_vs_line: f64,
        trend_strength: f64,
        modifier: i8,
    ) -> (Recommendation, Confidence) {
        if avg_vs_line.abs() <= self.config.avoid_threshold {
            return (Recommendation::Avoid, Confidence::Low);
        }

        let (recommendation, agrees) = if avg_vs_line > 0.0 {
            (Recommendation::Over, trend_strength > 0.0)
        } else {
            (Recommendation::Under, trend_strength < 0.0)
        };
        let base = if agrees {
            Confidence::High
        } else {
            Confidence::Medium
        };

        let confidence = match (base, modifier.signum()) {
            (Confidence::Medium, 1) => Confidence::High,
            (Confidence::High, -1) => Confidence::Medium,
            (c, _) => c,
        };
        (recommendation, confidence)
    }
}

/// +1 when the player is improving against this opponent, -1 when declining.
pub fn confidence_modifier(trend: OpponentTrend) -> i8 {
    match trend {
        OpponentTrend::Improving => 1,
        OpponentTrend::Declining => -1,
        OpponentTrend::Stable | OpponentTrend::InsufficientData => 0,
    }
}
