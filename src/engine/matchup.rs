use super::line::LineSuggestion;
use super::opponent::OpponentSummary;
use super::stats;
use crate::config::MatchupConfig;

/// Blends a general line suggestion with head-to-head history.
#[derive(Debug, Clone, Default)]
pub struct MatchupAdjuster {
    config: MatchupConfig,
}

impl MatchupAdjuster {
    pub fn new(config: MatchupConfig) -> Self {
        Self { config }
    }

    /// Apply the opponent factor on top of the (already form-adjusted) base line.
    ///
    /// Returns `base` untouched when there is no summary or fewer than
    /// `min_opponent_games` meetings.
    pub fn adjust(&self, base: LineSuggestion, summary: Option<&OpponentSummary>) -> LineSuggestion {
        let Some(summary) = summary else {
            return base;
        };
        if summary.games_played < self.config.min_opponent_games {
            tracing::debug!(
                opponent = %summary.opponent,
                games = summary.games_played,
                required = self.config.min_opponent_games,
                "too few meetings, skipping opponent factor"
            );
            return base;
        }

        let factor = stats::round_to(
            (summary.average - base.mean) * self.config.opponent_weight,
            1,
        );
        LineSuggestion {
            suggested_line: stats::round_to(base.suggested_line + factor, 1),
            opponent_factor: Some(factor),
            vs_opponent: Some(summary.vs_opponent(1)),
            ..base
        }
    }
}
