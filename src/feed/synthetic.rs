//! Seeded synthetic seasons for demos and tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

use super::types::GameLogEntry;
use super::GameLogSource;
use anyhow::Result;
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct MetricProfile {
    pub name: String,
    pub mean: f64,
    pub std_dev: f64,
}

impl MetricProfile {
    pub fn new(name: &str, mean: f64, std_dev: f64) -> Self {
        Self {
            name: name.to_string(),
            mean,
            std_dev,
        }
    }
}

/// Generates one player's season: a game every other day against a rotating
/// list of opponents, metrics drawn from a normal distribution and floored at 0.
pub struct SyntheticSeason {
    player: String,
    start: NaiveDate,
    games: usize,
    opponents: Vec<String>,
    profiles: Vec<MetricProfile>,
    /// Added to every metric's mean per game (positive = trending up).
    drift_per_game: f64,
    rng: StdRng,
}

impl SyntheticSeason {
    /// A 30-game basketball season with typical points/rebounds/assists.
    pub fn new(player: &str, seed: u64) -> Self {
        Self {
            player: player.to_string(),
            start: NaiveDate::from_ymd_opt(2023, 10, 24).unwrap_or(NaiveDate::MIN),
            games: 30,
            opponents: ["Lakers", "Celtics", "Bulls", "Heat", "Knicks", "Warriors"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            profiles: vec![
                MetricProfile::new("points", 26.0, 6.0),
                MetricProfile::new("rebounds", 7.5, 2.5),
                MetricProfile::new("assists", 7.0, 2.5),
                MetricProfile::new("threes", 2.2, 1.3),
            ],
            drift_per_game: 0.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn with_games(mut self, games: usize) -> Self {
        self.games = games;
        self
    }

    pub fn with_start(mut self, start: NaiveDate) -> Self {
        self.start = start;
        self
    }

    pub fn with_opponents(mut self, opponents: &[&str]) -> Self {
        self.opponents = opponents.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_profiles(mut self, profiles: Vec<MetricProfile>) -> Self {
        self.profiles = profiles;
        self
    }

    pub fn with_drift(mut self, drift_per_game: f64) -> Self {
        self.drift_per_game = drift_per_game;
        self
    }

    pub fn generate(&mut self) -> Vec<GameLogEntry> {
        let mut entries = Vec::with_capacity(self.games);
        for i in 0..self.games {
            let date = self.start + chrono::Duration::days(2 * i as i64);
            let opponent = if self.opponents.is_empty() {
                None
            } else {
                Some(self.opponents[i % self.opponents.len()].clone())
            };

            let mut metrics = BTreeMap::new();
            for p in 0..self.profiles.len() {
                let (mean, std_dev) = (self.profiles[p].mean, self.profiles[p].std_dev);
                let drifted = mean + self.drift_per_game * i as f64;
                let value = (drifted + std_dev * self.sample_standard_normal()).max(0.0);
                metrics.insert(self.profiles[p].name.clone(), value.round());
            }

            entries.push(GameLogEntry {
                player: self.player.clone(),
                date,
                opponent,
                metrics,
            });
        }
        entries
    }

    fn sample_standard_normal(&mut self) -> f64 {
        // Box-Muller; u1 in (0, 1] keeps ln finite
        let u1: f64 = 1.0 - self.rng.gen::<f64>();
        let u2: f64 = self.rng.gen();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }
}

impl GameLogSource for SyntheticSeason {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn entries(&mut self) -> Result<Vec<GameLogEntry>> {
        Ok(self.generate())
    }
}
