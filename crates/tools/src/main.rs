use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use game_core::{AdvanceStopReason, DangerPolicy, Difficulty, Game, GameConfig, RunSummary};
use serde::Serialize;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Difficulty selector: 0 easy, 1 medium, 2 hard
    #[arg(short, long)]
    difficulty: Option<u8>,
    /// Tick limit for the run, overriding the config file
    #[arg(short, long)]
    ticks: Option<u64>,
    /// TOML file with game and autopilot settings
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum)]
    policy: Option<PolicyArg>,
    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Hold,
    Sidestep,
}

impl From<PolicyArg> for DangerPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Hold => DangerPolicy::Hold,
            PolicyArg::Sidestep => DangerPolicy::Sidestep,
        }
    }
}

#[derive(Serialize)]
struct Report {
    difficulty: Difficulty,
    danger_policy: DangerPolicy,
    events: usize,
    summary: RunSummary,
}

fn load_config(path: &Path) -> Result<GameConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&text)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn resolve_config(args: &Args) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => GameConfig::default(),
    };
    if let Some(selector) = args.difficulty {
        config.difficulty = Difficulty::from_selector(selector)?;
    }
    if let Some(ticks) = args.ticks {
        config.max_ticks = ticks;
    }
    if let Some(policy) = args.policy {
        config.autopilot.danger_policy = policy.into();
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = resolve_config(&args)?;
    info!(seed = args.seed, difficulty = ?config.difficulty, "starting simulation");

    let mut game = Game::new(args.seed, &config).context("Failed to build maze")?;
    loop {
        let result = game.advance(100);
        if let AdvanceStopReason::Finished(_) = result.stop_reason {
            break;
        }
    }

    let report = Report {
        difficulty: config.difficulty,
        danger_policy: config.autopilot.danger_policy,
        events: game.log().len(),
        summary: game.summary(),
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Simulation complete.");
    println!("Outcome: {:?}", report.summary.outcome);
    println!("Ticks: {}", report.summary.ticks);
    println!("Score: {} x{}", report.summary.score, report.summary.multiplier);
    println!("Final Score: {}", report.summary.final_score);
    println!("Snapshot Hash: {}", report.summary.snapshot_hash);

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn args_with(config: Option<PathBuf>) -> Args {
        Args { seed: 1, difficulty: None, ticks: None, config, policy: None, json: false }
    }

    #[test]
    fn config_file_settings_apply_and_flags_override_them() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "difficulty = \"easy\"\nmax_ticks = 50").expect("write config");
        writeln!(file, "[autopilot]\ndanger_policy = \"sidestep\"").expect("write config");

        let mut args = args_with(Some(file.path().to_path_buf()));
        let config = resolve_config(&args).expect("config should load");
        assert_eq!(config.difficulty, Difficulty::Easy);
        assert_eq!(config.max_ticks, 50);
        assert_eq!(config.autopilot.danger_policy, DangerPolicy::Sidestep);

        args.difficulty = Some(2);
        args.policy = Some(PolicyArg::Hold);
        let config = resolve_config(&args).expect("config should load");
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!(config.autopilot.danger_policy, DangerPolicy::Hold);
    }

    #[test]
    fn missing_config_file_reports_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("absent.toml");

        let error = load_config(&path).expect_err("missing file should fail");
        assert!(format!("{error:#}").contains("absent.toml"));
    }

    #[test]
    fn unknown_difficulty_selector_is_rejected() {
        let mut args = args_with(None);
        args.difficulty = Some(9);
        assert!(resolve_config(&args).is_err());
    }
}
