use std::path::Path;

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::ai::agent::{random_legal_column, Agent};
use crate::ai::q_table::{QTable, TdParams};
use crate::checkpoint::{self, AgentRecord};
use crate::error::PersistError;
use crate::game::{fingerprint, Board, Fingerprint, COLS};

/// Q-learning hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    pub learning_rate: f64,
    pub discount_factor: f64,
    /// Accepted and validated but not consulted: move selection is greedy,
    /// with a random column only for states never seen before.
    pub exploration_rate: f64,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        QLearningConfig {
            learning_rate: 0.2,
            discount_factor: 0.1,
            exploration_rate: 0.1,
        }
    }
}

impl QLearningConfig {
    pub fn td_params(&self) -> TdParams {
        TdParams {
            learning_rate: self.learning_rate,
            discount_factor: self.discount_factor,
        }
    }
}

/// Durable part of a Q-learning agent. This is all that goes to disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyState {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub q_table: QTable,
    #[serde(default)]
    pub games_played: u64,
    #[serde(default)]
    pub wins: u64,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<QTable, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<QTable>::deserialize(deserializer)?.unwrap_or_default())
}

/// The (state, action) pair chosen by the most recent `select_move`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastMove {
    pub state: Fingerprint,
    pub action: usize,
}

/// Tabular Q-learning agent.
///
/// Holds the persisted [`PolicyState`] plus transient runtime context: the
/// random source and the last move it made. Loading from disk always starts
/// with a fresh random source and no last move.
pub struct QLearningAgent {
    policy: PolicyState,
    config: QLearningConfig,
    rng: StdRng,
    last_move: Option<LastMove>,
}

impl QLearningAgent {
    pub fn new(config: QLearningConfig) -> Self {
        Self::from_policy(PolicyState::default(), config)
    }

    /// Agent with a deterministic random source.
    pub fn with_seed(config: QLearningConfig, seed: u64) -> Self {
        QLearningAgent {
            rng: StdRng::seed_from_u64(seed),
            ..Self::new(config)
        }
    }

    /// Wrap an existing policy with fresh runtime context.
    pub fn from_policy(policy: PolicyState, config: QLearningConfig) -> Self {
        QLearningAgent {
            policy,
            config,
            rng: StdRng::from_os_rng(),
            last_move: None,
        }
    }

    pub fn policy(&self) -> &PolicyState {
        &self.policy
    }

    pub fn q_table(&self) -> &QTable {
        &self.policy.q_table
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    pub fn games_played(&self) -> u64 {
        self.policy.games_played
    }

    pub fn wins(&self) -> u64 {
        self.policy.wins
    }

    pub fn last_move(&self) -> Option<LastMove> {
        self.last_move
    }

    /// Greedy move for known states, random column for unseen ones (which
    /// get an all-zero entry). The choice is recorded as the last move.
    pub fn select_move(&mut self, board: &Board) -> usize {
        let state = fingerprint(board);
        let action = match self.policy.q_table.best_action(state) {
            Some(action) => action,
            None => {
                self.policy.q_table.ensure(state);
                self.rng.random_range(0..COLS)
            }
        };
        debug!(state = state.0, action, "q-agent selected move");
        self.last_move = Some(LastMove { state, action });
        action
    }

    /// One-step TD update of `(state, action)`. Returns the new value.
    pub fn update_q_value(&mut self, reward: f64, state: Fingerprint, action: usize) -> f64 {
        self.policy
            .q_table
            .update(state, action, reward, self.config.td_params())
    }

    /// Apply `reward` to the last recorded move, if there is one.
    pub fn reward_last(&mut self, reward: f64) -> Option<f64> {
        let LastMove { state, action } = self.last_move?;
        Some(self.update_q_value(reward, state, action))
    }

    /// Count a finished game.
    pub fn record_episode(&mut self, won: bool) {
        self.policy.games_played += 1;
        if won {
            self.policy.wins += 1;
        }
    }

    pub fn to_file(&self, path: &Path) -> Result<(), PersistError> {
        checkpoint::save_record(path, &AgentRecord::q_learning(&self.policy))
    }

    /// Load the policy stored at `path`. A random-agent file yields an
    /// empty policy.
    pub fn from_file(path: &Path, config: QLearningConfig) -> Result<Self, PersistError> {
        let policy = match checkpoint::load_record(path)? {
            AgentRecord::QLearning(policy) => policy.into_owned(),
            AgentRecord::Random => PolicyState::default(),
        };
        Ok(Self::from_policy(policy, config))
    }
}

impl Agent for QLearningAgent {
    fn select_move(&mut self, board: &Board) -> usize {
        QLearningAgent::select_move(self, board)
    }

    fn random_legal_move(&mut self, board: &Board) -> Option<usize> {
        let action = random_legal_column(&mut self.rng, board)?;
        self.last_move = Some(LastMove {
            state: fingerprint(board),
            action,
        });
        Some(action)
    }

    fn name(&self) -> &str {
        "Q-Learning"
    }
}
