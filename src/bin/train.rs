use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ql_connect_four::ai::OpponentKind;
use ql_connect_four::checkpoint::AgentStore;
use ql_connect_four::config::AppConfig;
use ql_connect_four::training::trainer::Trainer;

/// Train a Connect Four Q-learning agent via self-play.
#[derive(Parser)]
#[command(name = "train", about = "Train a Connect Four Q-learning agent")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override number of training episodes
    #[arg(long)]
    iterations: Option<usize>,

    /// Tier whose agent file is trained: Q1, Q2 or Q3
    #[arg(long, default_value = "Q1")]
    tier: OpponentKind,

    /// Train this agent file instead of the tier's file
    #[arg(long)]
    agent: Option<PathBuf>,

    /// Agent file to play against; a random opponent when omitted
    #[arg(long)]
    opponent: Option<PathBuf>,

    /// Override learning rate
    #[arg(long)]
    lr: Option<f64>,

    /// Override discount factor
    #[arg(long)]
    discount: Option<f64>,

    /// Override number of evaluation games after training (0 disables)
    #[arg(long)]
    eval_games: Option<usize>,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", AppConfig::default_toml().context("serializing default config")?);
        return Ok(());
    }

    let mut app_config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    if let Some(iterations) = cli.iterations {
        app_config.training.iterations = iterations;
    }
    if let Some(lr) = cli.lr {
        app_config.q_learning.learning_rate = lr;
    }
    if let Some(discount) = cli.discount {
        app_config.q_learning.discount_factor = discount;
    }
    if let Some(eval_games) = cli.eval_games {
        app_config.training.eval_games = eval_games;
    }
    app_config.validate().context("validating config overrides")?;

    let agent_path = match cli.agent {
        Some(path) => path,
        None => {
            if !cli.tier.is_q_tier() {
                bail!("tier '{}' is not trainable (expected Q1, Q2 or Q3)", cli.tier);
            }
            let store = AgentStore::new(app_config.store.clone());
            store
                .path_for(cli.tier)
                .with_context(|| format!("no agent file for tier {}", cli.tier))?
        }
    };

    let trainer = Trainer::from_app_config(&app_config);
    let summary = trainer
        .train_agents(
            app_config.training.iterations,
            cli.opponent.as_deref(),
            &agent_path,
        )
        .with_context(|| format!("training {}", agent_path.display()))?;

    info!(
        file = %agent_path.display(),
        episodes = summary.episodes,
        wins = summary.wins,
        losses = summary.losses,
        draws = summary.draws,
        games_played = summary.games_played,
        eval_win_rate = ?summary.eval_win_rate,
        "done"
    );
    Ok(())
}
