use std::path::Path;

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use super::agent::{random_legal_column, Agent};
use crate::checkpoint::{self, AgentRecord};
use crate::error::PersistError;
use crate::game::{Board, COLS};

/// An agent that suggests a uniformly random column, legal or not.
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new() -> Self {
        RandomAgent {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        RandomAgent {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Write the marker file. There is no state beyond the agent's kind.
    pub fn to_file(&self, path: &Path) -> Result<(), PersistError> {
        checkpoint::save_record(path, &AgentRecord::Random)
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for RandomAgent {
    fn select_move(&mut self, _board: &Board) -> usize {
        self.rng.random_range(0..COLS)
    }

    fn random_legal_move(&mut self, board: &Board) -> Option<usize> {
        random_legal_column(&mut self.rng, board)
    }

    fn name(&self) -> &str {
        "Random"
    }
}
