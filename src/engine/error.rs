use thiserror::Error;

/// Failure tiers surfaced to callers.
///
/// `NoData` and `InsufficientData` are recoverable: show a neutral
/// "insufficient data" state. `PreconditionViolation` means the caller broke
/// the contract (zero line, bad confidence level).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NoData,
    InsufficientData,
    PreconditionViolation,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("no data found for {player}")]
    UnknownPlayer { player: String },

    #[error("metric '{metric}' not found in data for {player}")]
    MissingMetric { player: String, metric: String },

    #[error("not enough games for {player} (need {required}, got {available})")]
    NotEnoughGames {
        player: String,
        required: usize,
        available: usize,
    },

    #[error("no games recorded for {player} against {opponent}")]
    NoOpponentHistory { player: String, opponent: String },

    #[error("insufficient data for trend analysis of {player} (need {required}, got {available})")]
    InsufficientTrendData {
        player: String,
        required: usize,
        available: usize,
    },

    #[error("line must be a nonzero finite number, got {0}")]
    InvalidLine(f64),

    #[error("confidence level must be strictly between 0 and 1, got {0}")]
    InvalidConfidence(f64),
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::UnknownPlayer { .. }
            | AnalysisError::MissingMetric { .. }
            | AnalysisError::NotEnoughGames { .. }
            | AnalysisError::NoOpponentHistory { .. } => ErrorKind::NoData,
            AnalysisError::InsufficientTrendData { .. } => ErrorKind::InsufficientData,
            AnalysisError::InvalidLine(_) | AnalysisError::InvalidConfidence(_) => {
                ErrorKind::PreconditionViolation
            }
        }
    }

    /// True for data shortfalls the caller should render as "insufficient data".
    pub fn is_recoverable(&self) -> bool {
        self.kind() != ErrorKind::PreconditionViolation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let err = AnalysisError::UnknownPlayer {
            player: "Nobody".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::NoData);
        assert!(err.is_recoverable());

        let err = AnalysisError::InsufficientTrendData {
            player: "P".to_string(),
            required: 10,
            available: 7,
        };
        assert_eq!(err.kind(), ErrorKind::InsufficientData);

        let err = AnalysisError::InvalidLine(0.0);
        assert_eq!(err.kind(), ErrorKind::PreconditionViolation);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_messages() {
        let err = AnalysisError::NotEnoughGames {
            player: "LeBron James".to_string(),
            required: 5,
            available: 4,
        };
        assert_eq!(
            err.to_string(),
            "not enough games for LeBron James (need 5, got 4)"
        );
    }
}
