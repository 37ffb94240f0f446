use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub line: LineConfig,
    #[serde(default)]
    pub matchup: MatchupConfig,
    #[serde(default)]
    pub trend: TrendConfig,
    #[serde(default)]
    pub opponent: OpponentConfig,
    #[serde(default)]
    pub sports: SportsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Suggested-line estimation.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LineConfig {
    pub confidence_level: f64,
    /// Most recent games fed to the estimate.
    pub sample_size: usize,
    pub min_games: usize,
    pub form_window: usize,
    /// Share of the (recent - overall) gap added to the line.
    pub form_weight: f64,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            confidence_level: 0.80,
            sample_size: 20,
            min_games: 5,
            form_window: 5,
            form_weight: 0.2,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MatchupConfig {
    pub opponent_weight: f64,
    /// Below this many games against an opponent the history is ignored.
    pub min_opponent_games: usize,
}

impl Default for MatchupConfig {
    fn default() -> Self {
        Self {
            opponent_weight: 0.3,
            min_opponent_games: 2,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TrendConfig {
    pub window: usize,
    pub short_window: usize,
    /// |trend_strength| above this is UP/DOWN.
    pub strength_threshold: f64,
    /// |avg_vs_line| at or below this is AVOID.
    pub avoid_threshold: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            window: 10,
            short_window: 5,
            strength_threshold: 0.2,
            avoid_threshold: 0.10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OpponentConfig {
    pub improving_ratio: f64,
    pub declining_ratio: f64,
    pub recent_games: usize,
}

impl Default for OpponentConfig {
    fn default() -> Self {
        Self {
            improving_ratio: 1.10,
            declining_ratio: 0.90,
            recent_games: 5,
        }
    }
}

/// Metric menus offered per sport.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SportsConfig {
    #[serde(alias = "NBA")]
    pub nba: Vec<String>,
    #[serde(alias = "NFL")]
    pub nfl: Vec<String>,
    #[serde(alias = "MLB")]
    pub mlb: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for SportsConfig {
    fn default() -> Self {
        Self {
            nba: strings(&["points", "rebounds", "assists", "threes"]),
            nfl: strings(&["passing_yards", "rushing_yards", "receptions"]),
            mlb: strings(&["strikeouts", "hits", "runs"]),
        }
    }
}

impl SportsConfig {
    /// Metric menu for a sport key ("NBA", "nfl", ...). None if unknown.
    pub fn metrics_for(&self, sport: &str) -> Option<&[String]> {
        match sport.to_ascii_lowercase().as_str() {
            "nba" => Some(&self.nba),
            "nfl" => Some(&self.nfl),
            "mlb" => Some(&self.mlb),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive. `RUST_LOG` wins when set.
    pub filter: String,
    /// Log to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "prop_lines=warn".to_string(),
            file: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| "Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to built-in defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        let c = self.line.confidence_level;
        if !(c > 0.0 && c < 1.0) {
            anyhow::bail!("line.confidence_level must be in (0, 1), got {}", c);
        }
        if self.line.min_games < 2 {
            anyhow::bail!("line.min_games must be at least 2, got {}", self.line.min_games);
        }
        if self.line.sample_size < self.line.min_games {
            anyhow::bail!(
                "line.sample_size ({}) must be >= line.min_games ({})",
                self.line.sample_size,
                self.line.min_games
            );
        }
        if self.line.form_window == 0 {
            anyhow::bail!("line.form_window must be > 0");
        }
        if self.trend.short_window == 0 || self.trend.short_window > self.trend.window {
            anyhow::bail!(
                "trend.short_window must be in 1..={}, got {}",
                self.trend.window,
                self.trend.short_window
            );
        }
        if self.opponent.declining_ratio > self.opponent.improving_ratio {
            anyhow::bail!("opponent.declining_ratio must not exceed opponent.improving_ratio");
        }
        Ok(())
    }
}
