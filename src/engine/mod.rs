pub mod analyzer;
pub mod error;
pub mod line;
pub mod matchup;
pub mod opponent;
pub mod records;
pub mod stats;
pub mod trend;

pub use analyzer::{MatchupReport, PropAnalyzer};
pub use error::{AnalysisError, ErrorKind};
pub use line::{LineEstimator, LineSuggestion, RecentForm};
pub use matchup::MatchupAdjuster;
pub use opponent::{OpponentHistory, OpponentSummary, OpponentTrend, VsOpponent};
pub use records::{GameRecord, GameRecordStore, PlayerHistory};
pub use trend::{
    Confidence, Recommendation, RollingAverages, TrendDirection, TrendRecommendation,
    TrendRecommender,
};
