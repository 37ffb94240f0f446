use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use super::error::AnalysisError;
use super::line::{LineEstimator, LineSuggestion};
use super::matchup::MatchupAdjuster;
use super::opponent::{OpponentHistory, OpponentSummary};
use super::records::{GameRecord, GameRecordStore};
use super::trend::{RollingAverages, TrendRecommendation, TrendRecommender};
use crate::config::Config;

/// Line suggestion plus the trend call against that same line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchupReport {
    pub player: String,
    pub metric: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent: Option<String>,
    pub suggestion: LineSuggestion,
    pub trend: TrendRecommendation,
}

/// One analysis session: the record store plus the components that read it.
///
/// Only `add_record` mutates; every query is a pure function of the store.
#[derive(Debug, Default)]
pub struct PropAnalyzer {
    store: GameRecordStore,
    estimator: LineEstimator,
    opponents: OpponentHistory,
    adjuster: MatchupAdjuster,
    recommender: TrendRecommender,
}

impl PropAnalyzer {
    pub fn new(config: &Config) -> Self {
        Self {
            store: GameRecordStore::new(),
            estimator: LineEstimator::new(config.line.clone()),
            opponents: OpponentHistory::new(config.opponent.clone()),
            adjuster: MatchupAdjuster::new(config.matchup.clone()),
            recommender: TrendRecommender::new(config.trend.clone()),
        }
    }

    pub fn store(&self) -> &GameRecordStore {
        &self.store
    }

    pub fn add_record<K>(
        &mut self,
        player: &str,
        date: NaiveDate,
        metrics: impl IntoIterator<Item = (K, f64)>,
        opponent: Option<&str>,
    ) where
        K: Into<String>,
    {
        let metrics: BTreeMap<String, f64> =
            metrics.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.store.add_record(
            player,
            GameRecord::new(date, metrics, opponent.map(str::to_string)),
        );
    }

    /// Suggested line at the configured confidence level.
    pub fn suggest_line(&self, player: &str, metric: &str) -> Result<LineSuggestion, AnalysisError> {
        self.suggest_line_at(player, metric, self.estimator.default_confidence())
    }

    pub fn suggest_line_at(
        &self,
        player: &str,
        metric: &str,
        confidence_level: f64,
    ) -> Result<LineSuggestion, AnalysisError> {
        self.estimator
            .suggest_line(&self.store, player, metric, confidence_level)
    }

    pub fn suggest_line_with_matchup(
        &self,
        player: &str,
        metric: &str,
        opponent: Option<&str>,
    ) -> Result<LineSuggestion, AnalysisError> {
        self.suggest_line_with_matchup_at(
            player,
            metric,
            opponent,
            self.estimator.default_confidence(),
        )
    }

    pub fn suggest_line_with_matchup_at(
        &self,
        player: &str,
        metric: &str,
        opponent: Option<&str>,
        confidence_level: f64,
    ) -> Result<LineSuggestion, AnalysisError> {
        let base = self.suggest_line_at(player, metric, confidence_level)?;
        let summary = opponent.and_then(|o| self.opponent_stats(player, o, metric).ok());
        Ok(self.adjuster.adjust(base, summary.as_ref()))
    }

    pub fn opponent_stats(
        &self,
        player: &str,
        opponent: &str,
        metric: &str,
    ) -> Result<OpponentSummary, AnalysisError> {
        self.opponents
            .opponent_stats(&self.store, player, opponent, metric)
    }

    pub fn analyze_trend(
        &self,
        player: &str,
        metric: &str,
        line: f64,
        opponent: Option<&str>,
    ) -> Result<TrendRecommendation, AnalysisError> {
        let summary = opponent.and_then(|o| self.opponent_stats(player, o, metric).ok());
        self.recommender
            .analyze_trend(&self.store, player, metric, line, summary.as_ref())
    }

    pub fn recent_averages(
        &self,
        player: &str,
        metric: &str,
        games_back: usize,
    ) -> Result<RollingAverages, AnalysisError> {
        self.recommender
            .recent_averages(&self.store, player, metric, games_back)
    }

    /// Matchup-aware suggestion, then the trend call against `line` (or the
    /// suggested line when none is given).
    pub fn matchup_report(
        &self,
        player: &str,
        metric: &str,
        opponent: Option<&str>,
        line: Option<f64>,
    ) -> Result<MatchupReport, AnalysisError> {
        let suggestion = self.suggest_line_with_matchup(player, metric, opponent)?;
        let line = line.unwrap_or(suggestion.suggested_line);
        let trend = self.analyze_trend(player, metric, line, opponent)?;
        Ok(MatchupReport {
            player: player.to_string(),
            metric: metric.to_string(),
            opponent: opponent.map(str::to_string),
            suggestion,
            trend,
        })
    }
}
