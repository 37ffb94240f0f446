// Plain-text and JSON rendering of analysis results

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::engine::records::metric_values;
use crate::engine::{
    stats, GameRecordStore, LineSuggestion, MatchupReport, TrendRecommendation, VsOpponent,
};

/// One row of the recent-games table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameRow {
    pub date: String,
    pub opponent: String,
    pub values: Vec<Option<f64>>,
}

/// Recent games for a player, most recent first, with one column per metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameTable {
    pub player: String,
    pub metrics: Vec<String>,
    pub rows: Vec<GameRow>,
    pub averages: BTreeMap<String, f64>,
}

/// Build the recent-games table over the last `last` games.
///
/// Columns are every metric seen in the window, sorted by name. Averages only
/// cover metrics present in every game of the window.
pub fn build_game_table(store: &GameRecordStore, player: &str, last: usize) -> Option<GameTable> {
    let history = store.history(player).filter(|h| !h.is_empty())?;
    let recent = history.recent_first();
    let window = &recent[..recent.len().min(last.max(1))];

    let mut metrics: Vec<String> = window
        .iter()
        .flat_map(|g| g.metrics.keys().cloned())
        .collect();
    metrics.sort();
    metrics.dedup();

    let rows = window
        .iter()
        .map(|g| GameRow {
            date: g.date.format("%Y-%m-%d").to_string(),
            opponent: g.opponent.clone().unwrap_or_else(|| "-".to_string()),
            values: metrics.iter().map(|m| g.metric(m)).collect(),
        })
        .collect();

    let averages = metrics
        .iter()
        .filter_map(|m| {
            metric_values(window, m).map(|v| (m.clone(), stats::round_to(stats::mean(&v), 1)))
        })
        .collect();

    Some(GameTable {
        player: player.to_string(),
        metrics,
        rows,
        averages,
    })
}

pub fn format_game_table(table: &GameTable) -> String {
    let mut lines = vec![format!("{} - last {} games", table.player, table.rows.len())];

    let mut header = format!("{:<12}{:<16}", "DATE", "OPPONENT");
    for m in &table.metrics {
        header.push_str(&format!("{:>14}", m.to_uppercase()));
    }
    lines.push(header);

    for row in &table.rows {
        let mut line = format!("{:<12}{:<16}", row.date, row.opponent);
        for v in &row.values {
            match v {
                Some(v) => line.push_str(&format!("{:>14.1}", v)),
                None => line.push_str(&format!("{:>14}", "-")),
            }
        }
        lines.push(line);
    }

    if !table.averages.is_empty() {
        let averages: Vec<String> = table
            .averages
            .iter()
            .map(|(m, avg)| format!("{}={:.1}", m, avg))
            .collect();
        lines.push(format!("Averages: {}", averages.join(" ")));
    }
    lines.join("\n") + "\n"
}

/// The `last` most recent games for a single metric: date, value, opponent.
pub fn format_recent_games(
    store: &GameRecordStore,
    player: &str,
    metric: &str,
    last: usize,
) -> Option<String> {
    let history = store.history(player).filter(|h| !h.is_empty())?;
    let recent = history.recent_first();
    let window = &recent[..recent.len().min(last.max(1))];

    let mut lines = vec![format!("  Last {} games:", window.len())];
    for g in window {
        let value = g
            .metric(metric)
            .map_or_else(|| "-".to_string(), |v| format!("{:.1}", v));
        let opponent = g
            .opponent
            .as_deref()
            .map_or_else(String::new, |o| format!(" vs {}", o));
        lines.push(format!(
            "    {}  {} {}{}",
            g.date.format("%Y-%m-%d"),
            value,
            metric,
            opponent
        ));
    }
    Some(lines.join("\n") + "\n")
}

fn format_vs_opponent(vs: &VsOpponent) -> String {
    format!(
        "vs {}: avg {} over {} games, last {} on {} ({})",
        vs.opponent,
        vs.average,
        vs.games_played,
        vs.last_performance,
        vs.last_matchup.format("%Y-%m-%d"),
        vs.trend
    )
}

pub fn format_suggestion(s: &LineSuggestion) -> String {
    let mut lines = vec![
        format!("  Suggested line: {:.1}", s.suggested_line),
        format!(
            "  Range ({:.0}%): {:.1} - {:.1}",
            s.confidence * 100.0,
            s.range.0,
            s.range.1
        ),
        format!(
            "  Mean: {:.1}  Last 5: {:.1}  Form: {}",
            s.mean, s.last_5_avg, s.recent_form
        ),
    ];
    if let Some(factor) = s.opponent_factor {
        lines.push(format!("  Opponent factor: {:+.1}", factor));
    }
    if let Some(vs) = &s.vs_opponent {
        lines.push(format!("  {}", format_vs_opponent(vs)));
    }
    lines.join("\n") + "\n"
}

pub fn format_trend(t: &TrendRecommendation) -> String {
    let mut lines = vec![
        format!(
            "  {} vs line {}: {} ({} confidence)",
            t.metric, t.line, t.recommendation, t.confidence
        ),
        format!(
            "  Last 5: {:.2}  Last 10: {:.2}  Trend: {} ({:+.2})  Avg vs line: {:+.1}%",
            t.last_5_avg,
            t.last_10_avg,
            t.trend,
            t.trend_strength,
            t.avg_vs_line * 100.0
        ),
    ];
    if let Some(vs) = &t.vs_opponent {
        lines.push(format!("  {}", format_vs_opponent(vs)));
    }
    lines.join("\n") + "\n"
}

pub fn format_report(r: &MatchupReport) -> String {
    let title = match &r.opponent {
        Some(o) => format!("{} {} vs {}\n", r.player, r.metric, o),
        None => format!("{} {}\n", r.player, r.metric),
    };
    title + &format_suggestion(&r.suggestion) + &format_trend(&r.trend)
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize report")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{GameRecord, OpponentTrend, RecentForm};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 12, d).unwrap()
    }

    fn store() -> GameRecordStore {
        let mut store = GameRecordStore::new();
        for (d, points, rebounds, opp) in [
            (1, 20.0, Some(5.0), Some("Lakers")),
            (3, 30.0, Some(7.0), None),
            (5, 25.0, None, Some("Bulls")),
        ] {
            let mut metrics = BTreeMap::new();
            metrics.insert("points".to_string(), points);
            if let Some(r) = rebounds {
                metrics.insert("rebounds".to_string(), r);
            }
            store.add_record("P", GameRecord::new(day(d), metrics, opp.map(str::to_string)));
        }
        store
    }

    fn suggestion() -> LineSuggestion {
        LineSuggestion {
            suggested_line: 27.4,
            range: (22.1, 31.9),
            confidence: 0.8,
            recent_form: RecentForm::Stable,
            mean: 27.0,
            last_5_avg: 29.0,
            opponent_factor: Some(-1.2),
            vs_opponent: Some(VsOpponent {
                opponent: "Celtics".to_string(),
                average: 23.0,
                games_played: 3,
                last_matchup: day(11),
                last_performance: 20.0,
                trend: OpponentTrend::Declining,
            }),
        }
    }

    #[test]
    fn test_game_table_recent_first() {
        let table = build_game_table(&store(), "P", 10).unwrap();
        assert_eq!(table.metrics, vec!["points", "rebounds"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0].date, "2023-12-05");
        assert_eq!(table.rows[0].opponent, "Bulls");
        assert_eq!(table.rows[0].values, vec![Some(25.0), None]);
        assert_eq!(table.rows[1].opponent, "-");
        // rebounds missing from one game, so no average for it
        assert_eq!(table.averages.get("points"), Some(&25.0));
        assert!(!table.averages.contains_key("rebounds"));
    }

    #[test]
    fn test_game_table_last_n() {
        let table = build_game_table(&store(), "P", 2).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.averages.get("points"), Some(&27.5));
    }

    #[test]
    fn test_game_table_unknown_player() {
        assert!(build_game_table(&store(), "Nobody", 5).is_none());
    }

    #[test]
    fn test_format_game_table() {
        let text = format_game_table(&build_game_table(&store(), "P", 10).unwrap());
        assert!(text.starts_with("P - last 3 games"));
        assert!(text.contains("POINTS"));
        assert!(text.contains("Averages: points=25.0"));
    }

    #[test]
    fn test_format_recent_games() {
        let text = format_recent_games(&store(), "P", "rebounds", 5).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "  Last 3 games:");
        assert_eq!(lines[1], "    2023-12-05  - rebounds vs Bulls");
        assert_eq!(lines[2], "    2023-12-03  7.0 rebounds");
        assert_eq!(lines[3], "    2023-12-01  5.0 rebounds vs Lakers");

        let text = format_recent_games(&store(), "P", "points", 1).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(format_recent_games(&store(), "Nobody", "points", 5).is_none());
    }

    #[test]
    fn test_format_report_sections() {
        use crate::engine::{Confidence, Recommendation, TrendDirection};
        let report = MatchupReport {
            player: "P".to_string(),
            metric: "points".to_string(),
            opponent: Some("Celtics".to_string()),
            suggestion: suggestion(),
            trend: TrendRecommendation {
                metric: "points".to_string(),
                line: 27.4,
                last_5_avg: 29.0,
                last_10_avg: 27.0,
                trend: TrendDirection::Up,
                trend_strength: 0.5,
                avg_vs_line: 0.0584,
                recommendation: Recommendation::Avoid,
                confidence: Confidence::Low,
                vs_opponent: None,
            },
        };
        let text = format_report(&report);
        assert!(text.starts_with("P points vs Celtics\n  Suggested line: 27.4\n"), "{text}");
        assert!(text.contains("points vs line 27.4: AVOID (LOW confidence)"), "{text}");
        assert!(text.contains("Trend: UP (+0.50)"), "{text}");
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_format_suggestion() {
        let text = format_suggestion(&suggestion());
        assert!(text.contains("Suggested line: 27.4"), "{text}");
        assert!(text.contains("Range (80%): 22.1 - 31.9"), "{text}");
        assert!(text.contains("Opponent factor: -1.2"), "{text}");
        assert!(text.contains("vs Celtics"), "{text}");
        assert!(text.contains("DECLINING"), "{text}");
    }

    #[test]
    fn test_json_uses_wire_names() {
        let json = to_json(&suggestion()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["recent_form"], "STABLE");
        assert_eq!(value["range"][0], 22.1);
        assert_eq!(value["vs_opponent"]["trend"], "DECLINING");
    }

    #[test]
    fn test_json_omits_absent_opponent() {
        let mut s = suggestion();
        s.opponent_factor = None;
        s.vs_opponent = None;
        let value: serde_json::Value = serde_json::from_str(&to_json(&s).unwrap()).unwrap();
        assert!(value.get("opponent_factor").is_none());
        assert!(value.get("vs_opponent").is_none());
    }
}
