use std::fmt;
use std::path::Path;
use std::str::FromStr;

use rand::Rng;
use tracing::info;

use crate::ai::q_learning::{QLearningAgent, QLearningConfig};
use crate::ai::random::RandomAgent;
use crate::checkpoint::{self, AgentRecord};
use crate::error::PersistError;
use crate::game::{Board, COLS};

/// Universal interface for move-selecting opponents.
pub trait Agent {
    /// Suggest a column for the given board. The suggestion may be illegal;
    /// the engine resamples until it gets a playable column.
    fn select_move(&mut self, board: &Board) -> usize;

    /// Uniformly random playable column, `None` on a full board. Used by the
    /// engine once an agent has exhausted its resample budget.
    fn random_legal_move(&mut self, board: &Board) -> Option<usize>;

    /// Return the agent's display name.
    fn name(&self) -> &str;
}

/// Pick a random column among the ones that are not full.
pub(crate) fn random_legal_column<R: Rng>(rng: &mut R, board: &Board) -> Option<usize> {
    let legal: Vec<usize> = (0..COLS).filter(|&c| !board.is_column_full(c)).collect();
    if legal.is_empty() {
        return None;
    }
    Some(legal[rng.random_range(0..legal.len())])
}

/// The closed set of agents an engine can seat.
pub enum AgentKind {
    Random(RandomAgent),
    QLearning(QLearningAgent),
}

impl AgentKind {
    pub fn as_q_learning(&self) -> Option<&QLearningAgent> {
        match self {
            AgentKind::QLearning(agent) => Some(agent),
            AgentKind::Random(_) => None,
        }
    }

    pub fn as_q_learning_mut(&mut self) -> Option<&mut QLearningAgent> {
        match self {
            AgentKind::QLearning(agent) => Some(agent),
            AgentKind::Random(_) => None,
        }
    }

    /// Build a live agent from a stored record with fresh runtime context.
    pub fn from_record(record: AgentRecord<'_>, config: &QLearningConfig) -> Self {
        match record {
            AgentRecord::Random => AgentKind::Random(RandomAgent::new()),
            AgentRecord::QLearning(policy) => AgentKind::QLearning(QLearningAgent::from_policy(
                policy.into_owned(),
                config.clone(),
            )),
        }
    }

    pub fn to_file(&self, path: &Path) -> Result<(), PersistError> {
        match self {
            AgentKind::Random(agent) => agent.to_file(path),
            AgentKind::QLearning(agent) => agent.to_file(path),
        }
    }

    pub fn from_file(path: &Path, config: &QLearningConfig) -> Result<Self, PersistError> {
        Ok(Self::from_record(checkpoint::load_record(path)?, config))
    }

    /// Load the agent stored at `path`, or persist `fresh()` there first if
    /// no file exists yet.
    pub fn load_or_bootstrap(
        path: &Path,
        config: &QLearningConfig,
        fresh: impl FnOnce() -> AgentKind,
    ) -> Result<Self, PersistError> {
        if path.exists() {
            return Self::from_file(path, config);
        }
        let agent = fresh();
        agent.to_file(path)?;
        info!(path = %path.display(), agent = agent.name(), "bootstrapped new agent file");
        Ok(agent)
    }
}

impl Agent for AgentKind {
    fn select_move(&mut self, board: &Board) -> usize {
        match self {
            AgentKind::Random(agent) => agent.select_move(board),
            AgentKind::QLearning(agent) => agent.select_move(board),
        }
    }

    fn random_legal_move(&mut self, board: &Board) -> Option<usize> {
        match self {
            AgentKind::Random(agent) => agent.random_legal_move(board),
            AgentKind::QLearning(agent) => agent.random_legal_move(board),
        }
    }

    fn name(&self) -> &str {
        match self {
            AgentKind::Random(agent) => agent.name(),
            AgentKind::QLearning(agent) => agent.name(),
        }
    }
}

/// Opponent selection accepted by [`crate::game::GameEngine::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpponentKind {
    Human,
    Random,
    Q1,
    Q2,
    Q3,
}

impl OpponentKind {
    pub const ALL: [OpponentKind; 5] = [
        OpponentKind::Human,
        OpponentKind::Random,
        OpponentKind::Q1,
        OpponentKind::Q2,
        OpponentKind::Q3,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OpponentKind::Human => "Human",
            OpponentKind::Random => "Random",
            OpponentKind::Q1 => "Q1",
            OpponentKind::Q2 => "Q2",
            OpponentKind::Q3 => "Q3",
        }
    }

    pub fn is_q_tier(self) -> bool {
        matches!(self, OpponentKind::Q1 | OpponentKind::Q2 | OpponentKind::Q3)
    }
}

impl fmt::Display for OpponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown opponent '{0}' (expected Human, Random, Q1, Q2 or Q3)")]
pub struct ParseOpponentError(String);

impl FromStr for OpponentKind {
    type Err = ParseOpponentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OpponentKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseOpponentError(s.to_string()))
    }
}
