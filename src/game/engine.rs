use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::ai::reward::{self, terminal_reward};
use crate::ai::{Agent, AgentKind, OpponentKind, QLearningConfig};
use crate::checkpoint::AgentStore;
use crate::error::{EngineError, PersistError};

use super::{Board, Player, COLS};

/// Side a seated agent always plays.
pub const AGENT_SIDE: Player = Player::Yellow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(Player),
    Draw,
}

/// Engine tuning.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Illegal suggestions tolerated from a seated agent before the engine
    /// plays a random legal column on its behalf.
    pub max_resamples: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig { max_resamples: 64 }
    }
}

/// An agent seated on the Yellow side of an engine.
pub struct Seat {
    agent: AgentKind,
    learning: bool,
    path: Option<PathBuf>,
}

impl Seat {
    /// Seat that receives rewards and is saved to `path` after every game.
    pub fn learning(agent: AgentKind, path: PathBuf) -> Self {
        Seat {
            agent,
            learning: true,
            path: Some(path),
        }
    }

    /// Seat that plays its current policy without updating it.
    pub fn frozen(agent: AgentKind) -> Self {
        Seat {
            agent,
            learning: false,
            path: None,
        }
    }

    pub fn agent(&self) -> &AgentKind {
        &self.agent
    }

    pub fn is_learning(&self) -> bool {
        self.learning
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn into_agent(self) -> AgentKind {
        self.agent
    }

    fn reward(&mut self, value: f64) {
        if !self.learning {
            return;
        }
        if let Some(agent) = self.agent.as_q_learning_mut() {
            agent.reward_last(value);
        }
    }
}

/// Connect Four rules engine.
///
/// Owns the board, the side to move and the Active/Terminal flag. When an
/// agent is seated, every successful [`GameEngine::play`] by Red is answered
/// by the agent before `play` returns.
pub struct GameEngine {
    board: Board,
    current_player: Player,
    active: bool,
    outcome: Option<GameOutcome>,
    message: String,
    opponent: Option<Seat>,
    store: AgentStore,
    q_config: QLearningConfig,
    config: EngineConfig,
}

impl GameEngine {
    /// Engine with a fresh board and no seated agent.
    pub fn new(store: AgentStore, q_config: QLearningConfig, config: EngineConfig) -> Self {
        let mut engine = GameEngine {
            board: Board::new(),
            current_player: Player::Red,
            active: true,
            outcome: None,
            message: String::new(),
            opponent: None,
            store,
            q_config,
            config,
        };
        engine.reset_with(None);
        engine
    }

    /// Start a new game against `kind`, loading its agent file or creating
    /// one if it does not exist.
    pub fn reset(&mut self, kind: OpponentKind) -> Result<(), PersistError> {
        let seat = self
            .store
            .load_opponent(kind, &self.q_config)?
            .map(|(agent, path)| Seat::learning(agent, path));
        self.reset_with(seat);
        info!(opponent = %kind, "new game");
        Ok(())
    }

    /// Start a new game with a caller-built seat (or none).
    pub fn reset_with(&mut self, opponent: Option<Seat>) {
        self.board = Board::new();
        self.current_player = Player::Red;
        self.active = true;
        self.outcome = None;
        self.message = "Starting new game".to_string();
        self.opponent = opponent;
    }

    /// Remove and return the seated agent.
    pub fn take_opponent(&mut self) -> Option<Seat> {
        self.opponent.take()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn opponent(&self) -> Option<&Seat> {
        self.opponent.as_ref()
    }

    /// True iff the column exists and is not full.
    pub fn is_valid(&self, column: usize) -> bool {
        column < COLS && !self.board.is_column_full(column)
    }

    /// True iff the board is full and nobody won.
    pub fn is_draw(&self) -> bool {
        self.board.is_full() && !matches!(self.outcome, Some(GameOutcome::Winner(_)))
    }

    /// Drop the current player's piece into `column`, then let a seated
    /// agent answer. Returns `Ok(false)` without touching the board if the
    /// game is over or the column is full. A full column during a live game
    /// still costs a learning seat the illegal-move penalty.
    pub fn play(&mut self, column: usize) -> Result<bool, EngineError> {
        if column >= COLS {
            return Err(EngineError::InvalidColumn(column));
        }
        if !self.active {
            debug!(column, "rejected move after game end");
            return Ok(false);
        }
        if !self.is_valid(column) {
            debug!(column, "rejected move into full column");
            if let Some(seat) = self.opponent.as_mut() {
                seat.reward(reward::ILLEGAL_MOVE);
            }
            return Ok(false);
        }
        self.place(column)?;
        self.run_autoplay()?;
        Ok(true)
    }

    /// Apply a validated move and advance the state machine.
    fn place(&mut self, column: usize) -> Result<bool, PersistError> {
        let player = self.current_player;
        let Ok(row) = self.board.drop_piece(column, player.to_cell()) else {
            return Ok(false);
        };
        debug!(player = %player, column, row, "placed piece");

        if self.board.check_win(row, column) {
            self.finish(GameOutcome::Winner(player))?;
        } else if self.board.is_full() {
            self.finish(GameOutcome::Draw)?;
        } else {
            self.current_player = player.other();
        }
        Ok(true)
    }

    /// Let the seated agent move for as long as it is its turn.
    fn run_autoplay(&mut self) -> Result<(), PersistError> {
        while self.active && self.current_player == AGENT_SIDE {
            let Some(seat) = self.opponent.as_mut() else {
                break;
            };
            let Some(column) = choose_move(seat, &self.board, self.config.max_resamples) else {
                break;
            };
            if !self.place(column)? {
                break;
            }
        }
        Ok(())
    }

    /// Active -> Terminal. Rewards and saves a learning seat.
    fn finish(&mut self, outcome: GameOutcome) -> Result<(), PersistError> {
        self.active = false;
        self.outcome = Some(outcome);
        self.message = match outcome {
            GameOutcome::Winner(player) => format!("{player} Wins"),
            GameOutcome::Draw => "Draw".to_string(),
        };
        info!(result = %self.message, moves = self.board.piece_count(), "game over");

        let Some(seat) = self.opponent.as_mut() else {
            return Ok(());
        };
        if !seat.learning {
            return Ok(());
        }
        if let Some(agent) = seat.agent.as_q_learning_mut() {
            agent.reward_last(terminal_reward(outcome, AGENT_SIDE));
            agent.record_episode(outcome == GameOutcome::Winner(AGENT_SIDE));
            if let Some(path) = &seat.path {
                agent.to_file(path)?;
            }
        }
        Ok(())
    }
}

/// Ask the seated agent for a playable column, penalizing a learning agent
/// for each full column it suggests.
fn choose_move(seat: &mut Seat, board: &Board, max_resamples: usize) -> Option<usize> {
    for attempt in 0..=max_resamples {
        let column = seat.agent.select_move(board);
        if column < COLS && !board.is_column_full(column) {
            return Some(column);
        }
        debug!(column, attempt, agent = seat.agent.name(), "agent suggested illegal column");
        seat.reward(reward::ILLEGAL_MOVE);
    }
    warn!(
        agent = seat.agent.name(),
        max_resamples, "resample budget exhausted, playing random legal column"
    );
    seat.agent.random_legal_move(board)
}
