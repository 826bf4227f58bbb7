use std::path::Path;

use tracing::info;

use crate::ai::{Agent, AgentKind, QLearningAgent, QLearningConfig, RandomAgent};
use crate::checkpoint::{AgentStore, AgentStoreConfig};
use crate::config::AppConfig;
use crate::error::{PersistError, TrainingError};
use crate::game::{EngineConfig, GameEngine, Seat};
use crate::training::episode::{play_episode, DRIVER_SIDE};
use crate::training::metrics::TrainingMetrics;

/// Trainer configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub iterations: usize,
    pub log_interval: usize,
    /// Greedy games against a random opponent after training; 0 disables.
    pub eval_games: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            iterations: 10_000,
            log_interval: 100,
            eval_games: 100,
        }
    }
}

/// Outcome counts for one `train_agents` run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    pub episodes: usize,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    /// Lifetime games recorded in the trained agent's file.
    pub games_played: u64,
    pub eval_win_rate: Option<f32>,
}

/// Self-play trainer for a Q-learning agent.
pub struct Trainer {
    config: TrainerConfig,
    q_config: QLearningConfig,
    engine_config: EngineConfig,
    store: AgentStore,
}

impl Trainer {
    pub fn new(
        config: TrainerConfig,
        q_config: QLearningConfig,
        engine_config: EngineConfig,
        store_config: AgentStoreConfig,
    ) -> Self {
        Trainer {
            config,
            q_config,
            engine_config,
            store: AgentStore::new(store_config),
        }
    }

    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(
            config.training.clone(),
            config.q_learning.clone(),
            config.engine.clone(),
            config.store.clone(),
        )
    }

    fn engine(&self) -> GameEngine {
        GameEngine::new(
            self.store.clone(),
            self.q_config.clone(),
            self.engine_config.clone(),
        )
    }

    /// Load the agent under training, or create and save a fresh one.
    fn load_training_agent(&self, path: &Path) -> Result<QLearningAgent, PersistError> {
        if path.exists() {
            return QLearningAgent::from_file(path, self.q_config.clone());
        }
        let agent = QLearningAgent::new(self.q_config.clone());
        agent.to_file(path)?;
        info!(path = %path.display(), "bootstrapped new training agent");
        Ok(agent)
    }

    /// Opponent for training: random without a file, otherwise whatever
    /// agent the file holds.
    fn load_opponent(&self, path: Option<&Path>) -> Result<AgentKind, PersistError> {
        match path {
            None => Ok(AgentKind::Random(RandomAgent::new())),
            Some(path) => AgentKind::load_or_bootstrap(path, &self.q_config, || {
                AgentKind::QLearning(QLearningAgent::new(self.q_config.clone()))
            }),
        }
    }

    /// Play `iterations` episodes of the agent stored at `training_file`
    /// (as Red) against the opponent from `opponent_file` (as Yellow). The
    /// opponent only plays its current policy. After every episode the
    /// trained agent's counters are bumped and it is saved.
    pub fn train_agents(
        &self,
        iterations: usize,
        opponent_file: Option<&Path>,
        training_file: &Path,
    ) -> Result<TrainingSummary, TrainingError> {
        let mut opponent = Some(Seat::frozen(self.load_opponent(opponent_file)?));
        let mut agent = self.load_training_agent(training_file)?;
        let mut metrics = TrainingMetrics::new(DRIVER_SIDE);
        let (mut wins, mut losses, mut draws) = (0, 0, 0);

        let start = agent.games_played();
        info!(
            iterations,
            start_game = start + 1,
            opponent = opponent.as_ref().map_or("none", |s| s.agent().name()),
            file = %training_file.display(),
            "starting training"
        );

        for episode in 1..=iterations {
            let mut engine = self.engine();
            engine.reset_with(opponent.take());

            let result = play_episode(
                &mut engine,
                &mut agent,
                true,
                self.engine_config.max_resamples,
            )?;
            opponent = engine.take_opponent();

            let won = result.winner == Some(DRIVER_SIDE);
            match result.winner {
                Some(_) if won => wins += 1,
                Some(_) => losses += 1,
                None => draws += 1,
            }
            agent.record_episode(won);
            agent.to_file(training_file)?;
            metrics.record_episode(result);

            if self.config.log_interval > 0 && episode % self.config.log_interval == 0 {
                let window = self.config.log_interval;
                info!(
                    episode,
                    iterations,
                    win_rate = format!("{:.1}%", metrics.win_rate(window) * 100.0),
                    loss_rate = format!("{:.1}%", metrics.loss_rate(window) * 100.0),
                    draw_rate = format!("{:.1}%", metrics.draw_rate(window) * 100.0),
                    avg_len = format!("{:.1}", metrics.average_game_length(window)),
                    states = agent.q_table().len(),
                    eps_per_sec = format!("{:.0}", metrics.episodes_per_sec()),
                    "training progress"
                );
                metrics.reset_window();
            }
        }

        let eval_win_rate = if self.config.eval_games > 0 {
            let rate = self.evaluate(&mut agent, self.config.eval_games)?;
            info!(
                games = self.config.eval_games,
                win_rate = format!("{:.1}%", rate * 100.0),
                "eval vs random"
            );
            Some(rate)
        } else {
            None
        };

        info!(
            episodes = iterations,
            wins,
            losses,
            draws,
            games_played = agent.games_played(),
            "training complete"
        );

        Ok(TrainingSummary {
            episodes: iterations,
            wins,
            losses,
            draws,
            games_played: agent.games_played(),
            eval_win_rate,
        })
    }

    /// Win rate of `agent` over `games` greedy games against a random
    /// opponent. Nothing is learned or saved.
    pub fn evaluate(&self, agent: &mut QLearningAgent, games: usize) -> Result<f32, TrainingError> {
        if games == 0 {
            return Ok(0.0);
        }
        let mut wins = 0;
        for _ in 0..games {
            let mut engine = self.engine();
            engine.reset_with(Some(Seat::frozen(AgentKind::Random(RandomAgent::new()))));
            let result = play_episode(
                &mut engine,
                agent,
                false,
                self.engine_config.max_resamples,
            )?;
            if result.winner == Some(DRIVER_SIDE) {
                wins += 1;
            }
        }
        Ok(wins as f32 / games as f32)
    }
}
