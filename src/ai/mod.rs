//! Opponents: the agent capability, the random and Q-learning agents, the
//! Q-table they learn into, and the reward signals they receive.

mod agent;
mod q_learning;
pub mod q_table;
mod random;
pub mod reward;

pub use agent::{Agent, AgentKind, OpponentKind, ParseOpponentError};
pub use q_learning::{LastMove, PolicyState, QLearningAgent, QLearningConfig};
pub use q_table::{ActionValue, ActionValues, QTable, TdParams};
pub use random::RandomAgent;
