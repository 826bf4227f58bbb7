use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::ai::PolicyState;

/// Current on-disk layout version.
pub const FORMAT_VERSION: u32 = 1;

/// What an agent file stores about its agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentRecord<'a> {
    /// Marker only: a random agent has no durable state.
    Random,
    QLearning(Cow<'a, PolicyState>),
}

impl<'a> AgentRecord<'a> {
    pub fn q_learning(policy: &'a PolicyState) -> Self {
        AgentRecord::QLearning(Cow::Borrowed(policy))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AgentRecord::Random => "random",
            AgentRecord::QLearning(_) => "q_learning",
        }
    }
}

/// Top-level document written to an agent file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentFile<'a> {
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    #[serde(default)]
    pub saved_at: u64,
    pub agent: AgentRecord<'a>,
}

fn default_format_version() -> u32 {
    FORMAT_VERSION
}
