use super::types::{GameLogEntry, RawGameRow};
use super::GameLogSource;
use crate::engine::PropAnalyzer;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Reads a scraped game log from disk (JSON array or JSON Lines).
pub struct JsonFileSource {
    path: PathBuf,
    default_player: Option<String>,
}

impl JsonFileSource {
    /// `default_player` fills in rows that carry no `player` field
    /// (single-player exports).
    pub fn new(path: &Path, default_player: Option<&str>) -> Self {
        Self {
            path: path.to_path_buf(),
            default_player: default_player.map(str::to_string),
        }
    }
}

impl GameLogSource for JsonFileSource {
    fn name(&self) -> &str {
        "json-file"
    }

    fn entries(&mut self) -> Result<Vec<GameLogEntry>> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read game log: {}", self.path.display()))?;
        parse_game_log(&content, self.default_player.as_deref())
            .with_context(|| format!("Failed to parse game log: {}", self.path.display()))
    }
}

/// Accepts "2023-12-01", RFC 3339 timestamps, and "12/01/2023".
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(raw, "%m/%d/%Y").ok()
}

/// Parse a game log. Malformed JSON fails the whole log; rows that parse but
/// lack a usable player or date are skipped with a warning.
pub fn parse_game_log(content: &str, default_player: Option<&str>) -> Result<Vec<GameLogEntry>> {
    let trimmed = content.trim_start_matches('\u{feff}').trim();
    let rows: Vec<(usize, Value)> = if trimmed.starts_with('[') {
        let rows: Vec<Value> = serde_json::from_str(trimmed).context("invalid JSON array")?;
        rows.into_iter().enumerate().map(|(i, v)| (i + 1, v)).collect()
    } else {
        trimmed
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str::<Value>(line)
                    .map(|v| (i + 1, v))
                    .with_context(|| format!("invalid JSON on line {}", i + 1))
            })
            .collect::<Result<Vec<(usize, Value)>>>()?
    };

    let mut entries = Vec::with_capacity(rows.len());
    for (row_number, value) in rows {
        let row = match serde_json::from_value::<RawGameRow>(value) {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!(row = row_number, error = %e, "skipping game-log row that is not an object");
                continue;
            }
        };
        if let Some(entry) = normalize(row, row_number, default_player) {
            entries.push(entry);
        }
    }
    Ok(entries)
}

/// Text of a string or numeric JSON value, trimmed. None when blank.
fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn normalize(row: RawGameRow, row_number: usize, default_player: Option<&str>) -> Option<GameLogEntry> {
    let player = row
        .player
        .as_ref()
        .and_then(value_text)
        .or_else(|| default_player.map(str::to_string));
    let Some(player) = player else {
        tracing::warn!(row = row_number, "skipping game-log row without a player");
        return None;
    };
    let date = match &row.date {
        Some(Value::String(raw)) => parse_date(raw),
        _ => None,
    };
    let Some(date) = date else {
        tracing::warn!(row = row_number, player = %player, date = ?row.date, "skipping game-log row with missing or bad date");
        return None;
    };

    let mut metrics = std::collections::BTreeMap::new();
    for (key, value) in row.fields {
        match value.as_f64() {
            Some(v) => {
                metrics.insert(key, v);
            }
            None => tracing::debug!(player = %player, field = %key, "ignoring non-numeric field"),
        }
    }

    Some(GameLogEntry {
        player,
        date,
        opponent: row.opponent.as_ref().and_then(value_text),
        metrics,
    })
}

/// Append every entry to the analyzer. Returns the number of games added.
pub fn load_into(analyzer: &mut PropAnalyzer, entries: Vec<GameLogEntry>) -> usize {
    let count = entries.len();
    for entry in entries {
        analyzer.add_record(
            &entry.player,
            entry.date,
            entry.metrics,
            entry.opponent.as_deref(),
        );
    }
    tracing::info!(games = count, "game log loaded");
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
        assert_eq!(parse_date("2023-12-01"), Some(expected));
        assert_eq!(parse_date("2023-12-01T19:30:00Z"), Some(expected));
        assert_eq!(parse_date("2023-12-01T19:30:00"), Some(expected));
        assert_eq!(parse_date("12/01/2023"), Some(expected));
        assert_eq!(parse_date("Dec 1"), None);
    }

    #[test]
    fn test_parse_json_array() {
        let content = r#"[
            {"player": "LeBron James", "date": "2023-12-01", "points": 28, "rebounds": 8, "opponent": "Lakers"},
            {"player": "LeBron James", "date": "2023-12-03", "points": 32.5, "result": "W"}
        ]"#;
        let entries = parse_game_log(content, None).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].opponent.as_deref(), Some("Lakers"));
        assert_eq!(entries[0].metrics.get("points"), Some(&28.0));
        assert_eq!(entries[0].metrics.get("rebounds"), Some(&8.0));
        assert_eq!(entries[1].metrics.get("points"), Some(&32.5));
        // Non-numeric fields are dropped
        assert!(!entries[1].metrics.contains_key("result"));
        assert!(entries[1].opponent.is_none());
    }

    #[test]
    fn test_parse_json_lines_with_default_player() {
        let content = "{\"date\": \"2023-12-01\", \"points\": 28}\n\n{\"date\": \"2023-12-03\", \"points\": 30}\n";
        let entries = parse_game_log(content, Some("Jayson Tatum")).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.player == "Jayson Tatum"));
    }

    #[test]
    fn test_rows_without_player_or_date_are_skipped() {
        let content = "{\"date\": \"2023-12-01\", \"points\": 28}\n{\"player\": \"P\", \"date\": \"soon\", \"points\": 30}\n{\"player\": \"P\", \"date\": \"2023-12-05\", \"points\": 31}";
        let entries = parse_game_log(content, None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].metrics.get("points"), Some(&31.0));
    }

    #[test]
    fn test_bad_rows_do_not_sink_the_log() {
        let content = "{\"player\": \"P\", \"date\": \"2023-12-01\", \"points\": 28}\n\
                       {\"player\": \"P\", \"points\": 99}\n\
                       {\"player\": \"P\", \"date\": 20231203, \"points\": 99}\n\
                       [1, 2, 3]\n\
                       {\"player\": \"P\", \"date\": \"2023-12-05\", \"opponent\": 1610612747, \"points\": 31}";
        let entries = parse_game_log(content, None).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].metrics.get("points"), Some(&28.0));
        assert_eq!(entries[1].metrics.get("points"), Some(&31.0));
        // Numeric opponent ids are kept as text
        assert_eq!(entries[1].opponent.as_deref(), Some("1610612747"));
    }

    #[test]
    fn test_bad_row_in_array_is_skipped() {
        let content = r#"[
            {"player": "P", "date": "2023-12-01", "points": 20},
            {"player": "P", "date": null, "points": 21},
            "not a row",
            {"player": "P", "date": "2023-12-03", "points": 22}
        ]"#;
        let entries = parse_game_log(content, None).unwrap();
        let points: Vec<f64> = entries.iter().map(|e| e.metrics["points"]).collect();
        assert_eq!(points, vec![20.0, 22.0]);
    }

    #[test]
    fn test_blank_opponent_is_none() {
        let content = r#"[{"player": "P", "date": "2023-12-01", "opponent": " ", "points": 1}]"#;
        let entries = parse_game_log(content, None).unwrap();
        assert!(entries[0].opponent.is_none());
    }

    #[test]
    fn test_malformed_line_reports_position() {
        let content = "{\"player\": \"P\", \"date\": \"2023-12-01\"}\n{not json}";
        let err = parse_game_log(content, None).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn test_load_into_analyzer() {
        let content = r#"[
            {"player": "P", "date": "2023-12-01", "points": 28, "opponent": "Lakers"},
            {"player": "P", "date": "2023-12-03", "points": 30, "opponent": "Lakers"},
            {"player": "Q", "date": "2023-12-03", "points": 12}
        ]"#;
        let mut analyzer = PropAnalyzer::default();
        let added = load_into(&mut analyzer, parse_game_log(content, None).unwrap());
        assert_eq!(added, 3);
        assert_eq!(analyzer.store().game_count("P"), 2);
        assert_eq!(analyzer.store().game_count("Q"), 1);
        let summary = analyzer.opponent_stats("P", "Lakers", "points").unwrap();
        assert_eq!(summary.games_played, 2);
    }
}
