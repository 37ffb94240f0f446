use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Normalized game-log row handed to the engine (source-agnostic).
#[derive(Debug, Clone, PartialEq)]
pub struct GameLogEntry {
    pub player: String,
    pub date: NaiveDate,
    pub opponent: Option<String>,
    pub metrics: BTreeMap<String, f64>,
}

/// Raw JSON row as produced by the box-score scraper.
///
/// Every field other than player/date/opponent is a candidate metric. The
/// identifying fields stay untyped so one odd row can be skipped on its own.
#[derive(Debug, Deserialize)]
pub struct RawGameRow {
    #[serde(default)]
    pub player: Option<serde_json::Value>,
    #[serde(default)]
    pub date: Option<serde_json::Value>,
    #[serde(default)]
    pub opponent: Option<serde_json::Value>,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}
