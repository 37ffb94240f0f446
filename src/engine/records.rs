use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One game's box-score line for a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub date: NaiveDate,
    pub metrics: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent: Option<String>,
}

impl GameRecord {
    pub fn new(date: NaiveDate, metrics: BTreeMap<String, f64>, opponent: Option<String>) -> Self {
        Self {
            date,
            metrics,
            opponent,
        }
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    pub fn has_metric(&self, name: &str) -> bool {
        self.metrics.contains_key(name)
    }
}

/// Append-only game log for a single player.
///
/// The opponent index stores positions into `games`, never copies.
#[derive(Debug, Default)]
pub struct PlayerHistory {
    games: Vec<GameRecord>,
    by_opponent: HashMap<String, Vec<usize>>,
}

impl PlayerHistory {
    fn push(&mut self, record: GameRecord) {
        let idx = self.games.len();
        if let Some(opponent) = record.opponent.as_deref() {
            match self.by_opponent.get_mut(opponent) {
                Some(bucket) => bucket.push(idx),
                None => {
                    self.by_opponent.insert(opponent.to_string(), vec![idx]);
                }
            }
        }
        self.games.push(record);
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Games in insertion order.
    pub fn games(&self) -> &[GameRecord] {
        &self.games
    }

    /// All games, most recent date first.
    pub fn recent_first(&self) -> Vec<&GameRecord> {
        let mut games: Vec<&GameRecord> = self.games.iter().collect();
        sort_recent_first(&mut games);
        games
    }

    /// Games against `opponent`, most recent date first. None if never played.
    pub fn against(&self, opponent: &str) -> Option<Vec<&GameRecord>> {
        let bucket = self.by_opponent.get(opponent)?;
        let mut games: Vec<&GameRecord> = bucket.iter().map(|&i| &self.games[i]).collect();
        sort_recent_first(&mut games);
        Some(games)
    }

    /// Opponents faced, sorted by name.
    pub fn opponents(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_opponent.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Owns every player's history for one analysis session.
#[derive(Debug, Default)]
pub struct GameRecordStore {
    players: HashMap<String, PlayerHistory>,
}

impl GameRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a game to `player`'s history, creating it on first use.
    ///
    /// Games with an opponent are also indexed under that opponent.
    pub fn add_record(&mut self, player: &str, record: GameRecord) {
        match self.players.get_mut(player) {
            Some(history) => history.push(record),
            None => {
                let mut history = PlayerHistory::default();
                history.push(record);
                self.players.insert(player.to_string(), history);
            }
        }
    }

    pub fn history(&self, player: &str) -> Option<&PlayerHistory> {
        self.players.get(player)
    }

    pub fn game_count(&self, player: &str) -> usize {
        self.players.get(player).map_or(0, PlayerHistory::len)
    }

    /// Known player names, sorted.
    pub fn players(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.players.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Sort descending by date. The sort is stable, so same-date games keep
/// insertion order (oldest insertion first).
pub fn sort_recent_first(games: &mut [&GameRecord]) {
    games.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Extract `metric` from every game, or None if any game lacks it.
pub fn metric_values(games: &[&GameRecord], metric: &str) -> Option<Vec<f64>> {
    games.iter().map(|g| g.metric(metric)).collect()
}
