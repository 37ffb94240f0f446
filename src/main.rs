use anyhow::{bail, Context, Result};
use prop_lines::config::{Config, LoggingConfig};
use prop_lines::engine::{AnalysisError, MatchupReport, PropAnalyzer};
use prop_lines::feed::game_log::{self, JsonFileSource};
use prop_lines::feed::synthetic::SyntheticSeason;
use prop_lines::feed::GameLogSource;
use prop_lines::report;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage:
  prop-lines analyze --player P (--metric M | --sport S) [--line L] [--opponent O]
                     [--confidence C] [--games FILE | --demo [--seed N]] [--config PATH] [--json]
  prop-lines stats   --player P [--games FILE | --demo [--seed N]] [--last N] [--config PATH] [--json]";

const DEFAULT_SEED: u64 = 42;
/// Games listed under each analysis in text mode.
const RECENT_GAMES_SHOWN: usize = 5;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match args.first().map(String::as_str) {
        Some("-h") | Some("--help") | None => {
            println!("{USAGE}");
            return Ok(());
        }
        Some(c) => c.to_string(),
    };

    let config_path = arg_value(&args, "--config")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));
    let config = Config::load_or_default(&config_path)?;
    // The subscriber needs the logging section, so this is reported after init
    init_tracing(&config.logging)?;
    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "config file not found, using defaults");
    }

    match command.as_str() {
        "analyze" => run_analyze(&args, config),
        "stats" => run_stats(&args, &config),
        other => bail!("unknown command '{other}'\n\n{USAGE}"),
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.filter))
        .with_context(|| format!("Invalid logging.filter: {}", logging.filter))?;

    match &logging.file {
        Some(path) => {
            let log_file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(log_file)
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn run_analyze(args: &[String], mut config: Config) -> Result<()> {
    let player = required_arg(args, "--player")?;
    if let Some(c) = parse_f64_arg(args, "--confidence")? {
        config.line.confidence_level = c;
    }
    let metrics: Vec<String> = match (arg_value(args, "--metric"), arg_value(args, "--sport")) {
        (Some(m), _) => vec![m.to_string()],
        (None, Some(sport)) => match config.sports.metrics_for(sport) {
            Some(menu) => menu.to_vec(),
            None => bail!("unknown sport '{sport}' (expected NBA, NFL or MLB)"),
        },
        (None, None) => bail!("--metric or --sport is required\n\n{USAGE}"),
    };
    let opponent = arg_value(args, "--opponent");
    let line = parse_f64_arg(args, "--line")?;
    let json = has_flag(args, "--json");

    let analyzer = load_analyzer(args, &config, player)?;

    let mut reports: Vec<MatchupReport> = Vec::new();
    for metric in &metrics {
        match analyzer.matchup_report(player, metric, opponent, line) {
            Ok(r) => reports.push(r),
            Err(e) => report_failure(player, metric, e, json)?,
        }
    }

    for r in &reports {
        if json {
            println!("{}", report::to_json(r)?);
        } else {
            print!("{}", report::format_report(r));
            if let Some(recent) =
                report::format_recent_games(analyzer.store(), player, &r.metric, RECENT_GAMES_SHOWN)
            {
                print!("{recent}");
            }
            println!();
        }
    }
    Ok(())
}

/// Data shortfalls print a neutral message; contract violations are errors.
fn report_failure(player: &str, metric: &str, err: AnalysisError, json: bool) -> Result<()> {
    if !err.is_recoverable() {
        return Err(err).with_context(|| format!("Cannot analyze {player} {metric}"));
    }
    tracing::debug!(player = %player, metric = %metric, error = %err, "analysis skipped");
    if json {
        let value = serde_json::json!({
            "player": player,
            "metric": metric,
            "status": "insufficient data",
            "detail": err.to_string(),
        });
        println!("{}", report::to_json(&value)?);
    } else {
        println!("{player} {metric}: insufficient data ({err})");
    }
    Ok(())
}

fn run_stats(args: &[String], config: &Config) -> Result<()> {
    let player = required_arg(args, "--player")?;
    let last = parse_usize_arg(args, "--last")?.unwrap_or(config.trend.window);
    let analyzer = load_analyzer(args, config, player)?;

    match report::build_game_table(analyzer.store(), player, last) {
        Some(table) if has_flag(args, "--json") => println!("{}", report::to_json(&table)?),
        Some(table) => print!("{}", report::format_game_table(&table)),
        None => println!("{player}: insufficient data (no games recorded)"),
    }
    Ok(())
}

fn load_analyzer(args: &[String], config: &Config, player: &str) -> Result<PropAnalyzer> {
    let mut source: Box<dyn GameLogSource> = if has_flag(args, "--demo") {
        let seed = parse_usize_arg(args, "--seed")?.map_or(DEFAULT_SEED, |s| s as u64);
        Box::new(SyntheticSeason::new(player, seed))
    } else if let Some(path) = arg_value(args, "--games") {
        Box::new(JsonFileSource::new(Path::new(path), Some(player)))
    } else {
        bail!("--games FILE or --demo is required\n\n{USAGE}");
    };

    let entries = source.entries()?;
    tracing::info!(source = source.name(), rows = entries.len(), "game log read");
    let mut analyzer = PropAnalyzer::new(config);
    game_log::load_into(&mut analyzer, entries);
    Ok(analyzer)
}

/// Value of `--name VALUE` or `--name=VALUE`.
fn arg_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            return Some(raw.trim());
        }
        if arg == name {
            return args.get(idx + 1).map(|s| s.trim());
        }
    }
    None
}

fn required_arg<'a>(args: &'a [String], name: &str) -> Result<&'a str> {
    match arg_value(args, name) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => bail!("{name} is required\n\n{USAGE}"),
    }
}

fn parse_f64_arg(args: &[String], name: &str) -> Result<Option<f64>> {
    arg_value(args, name)
        .map(|raw| {
            raw.parse::<f64>()
                .with_context(|| format!("{name} expects a number, got '{raw}'"))
        })
        .transpose()
}

fn parse_usize_arg(args: &[String], name: &str) -> Result<Option<usize>> {
    arg_value(args, name)
        .map(|raw| {
            raw.parse::<usize>()
                .with_context(|| format!("{name} expects a whole number, got '{raw}'"))
        })
        .transpose()
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|arg| arg == name)
}
