//! Head-to-head history against a single opponent.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use super::error::AnalysisError;
use super::records::{metric_values, GameRecord, GameRecordStore};
use super::stats;
use crate::config::OpponentConfig;

/// How the latest meeting compares to earlier meetings.
///
/// Independent of the rolling-average trend in `trend.rs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpponentTrend {
    Improving,
    Declining,
    Stable,
    InsufficientData,
}

impl fmt::Display for OpponentTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OpponentTrend::Improving => "IMPROVING",
            OpponentTrend::Declining => "DECLINING",
            OpponentTrend::Stable => "STABLE",
            OpponentTrend::InsufficientData => "INSUFFICIENT_DATA",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpponentSummary {
    pub opponent: String,
    pub games_played: usize,
    pub average: f64,
    pub max: f64,
    pub min: f64,
    pub std_dev: f64,
    pub last_matchup: NaiveDate,
    pub last_performance: f64,
    pub trend: OpponentTrend,
    /// Most recent meetings, newest first.
    pub recent_games: Vec<GameRecord>,
}

/// Condensed head-to-head block attached to suggestions and recommendations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VsOpponent {
    pub opponent: String,
    pub average: f64,
    pub games_played: usize,
    pub last_matchup: NaiveDate,
    pub last_performance: f64,
    pub trend: OpponentTrend,
}

impl OpponentSummary {
    /// `average` rounded to `decimals` places.
    pub fn vs_opponent(&self, decimals: i32) -> VsOpponent {
        VsOpponent {
            opponent: self.opponent.clone(),
            average: stats::round_to(self.average, decimals),
            games_played: self.games_played,
            last_matchup: self.last_matchup,
            last_performance: self.last_performance,
            trend: self.trend,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OpponentHistory {
    config: OpponentConfig,
}

impl OpponentHistory {
    pub fn new(config: OpponentConfig) -> Self {
        Self { config }
    }

    /// Summarize `player`'s `metric` in games against `opponent`.
    pub fn opponent_stats(
        &self,
        store: &GameRecordStore,
        player: &str,
        opponent: &str,
        metric: &str,
    ) -> Result<OpponentSummary, AnalysisError> {
        let no_history = || AnalysisError::NoOpponentHistory {
            player: player.to_string(),
            opponent: opponent.to_string(),
        };
        let games = store
            .history(player)
            .and_then(|h| h.against(opponent))
            .ok_or_else(no_history)?;
        let latest = *games.first().ok_or_else(no_history)?;

        let values = metric_values(&games, metric).ok_or_else(|| AnalysisError::MissingMetric {
            player: player.to_string(),
            metric: metric.to_string(),
        })?;

        let trend = self.opponent_trend(&values);
        tracing::debug!(
            player = %player,
            opponent = %opponent,
            metric = %metric,
            games = values.len(),
            trend = %trend,
            "opponent history"
        );

        Ok(OpponentSummary {
            opponent: opponent.to_string(),
            games_played: values.len(),
            average: stats::mean(&values),
            max: stats::max(&values),
            min: stats::min(&values),
            std_dev: stats::population_std(&values),
            last_matchup: latest.date,
            last_performance: values[0],
            trend,
            recent_games: games
                .iter()
                .take(self.config.recent_games)
                .map(|g| (*g).clone())
                .collect(),
        })
    }

    /// Classify `values` (most recent first): latest meeting vs the mean of the rest.
    pub fn opponent_trend(&self, values: &[f64]) -> OpponentTrend {
        if values.len() < 2 {
            return OpponentTrend::InsufficientData;
        }
        let recent = values[0];
        let historical = stats::mean(&values[1..]);

        if recent > historical * self.config.improving_ratio {
            OpponentTrend::Improving
        } else if recent < historical * self.config.declining_ratio {
            OpponentTrend::Declining
        } else {
            OpponentTrend::Stable
        }
    }
}
