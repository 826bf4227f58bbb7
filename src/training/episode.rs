use tracing::debug;

use crate::ai::reward::{self, terminal_reward};
use crate::ai::{Agent, QLearningAgent};
use crate::error::TrainingError;
use crate::game::{GameEngine, GameOutcome, Player};
use crate::training::metrics::EpisodeResult;

/// Side the driving agent plays.
pub const DRIVER_SIDE: Player = Player::Red;

/// Drive `engine` to a terminal state with `agent` moving for Red.
///
/// The engine answers every Red move with its seated opponent. When `learn`
/// is set, the agent gets the illegal-move penalty for each rejected
/// suggestion and the terminal reward for its last move. Moves that do not
/// end the game are not updated. Counters are left to the caller.
pub fn play_episode(
    engine: &mut GameEngine,
    agent: &mut QLearningAgent,
    learn: bool,
    max_resamples: usize,
) -> Result<EpisodeResult, TrainingError> {
    while engine.is_active() {
        let mut attempts = 0;
        loop {
            let column = if attempts > max_resamples {
                match agent.random_legal_move(engine.board()) {
                    Some(column) => column,
                    None => break,
                }
            } else {
                agent.select_move(engine.board())
            };
            if engine.play(column)? {
                break;
            }
            debug!(column, attempts, "driver suggested illegal column");
            if learn {
                agent.reward_last(reward::ILLEGAL_MOVE);
            }
            attempts += 1;
        }
    }

    let outcome = engine.outcome().ok_or(TrainingError::MissingOutcome)?;
    if learn {
        agent.reward_last(terminal_reward(outcome, DRIVER_SIDE));
    }

    let winner = match outcome {
        GameOutcome::Winner(p) => Some(p),
        GameOutcome::Draw => None,
    };
    Ok(EpisodeResult {
        winner,
        game_length: engine.board().piece_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AgentKind, LastMove, PolicyState, QLearningConfig, QTable, RandomAgent};
    use crate::checkpoint::{AgentStore, AgentStoreConfig};
    use crate::game::{fingerprint, Board, Cell, EngineConfig, Seat, COLS};

    fn engine_with_random(dir: &std::path::Path) -> GameEngine {
        let store = AgentStore::new(AgentStoreConfig {
            data_dir: dir.to_path_buf(),
        });
        let mut engine =
            GameEngine::new(store, QLearningConfig::default(), EngineConfig::default());
        engine.reset_with(Some(Seat::frozen(AgentKind::Random(RandomAgent::with_seed(8)))));
        engine
    }

    #[test]
    fn test_play_episode_terminates() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_with_random(dir.path());
        let mut agent = QLearningAgent::with_seed(QLearningConfig::default(), 21);

        let result = play_episode(&mut engine, &mut agent, true, 64).unwrap();
        assert!(!engine.is_active());
        assert!(result.game_length >= 7);
        assert_eq!(result.game_length, engine.board().piece_count());
        assert!(!agent.q_table().is_empty());
    }

    #[test]
    fn test_terminal_reward_sign_matches_outcome() {
        let dir = tempfile::tempdir().unwrap();
        for seed in 0..5 {
            let mut engine = engine_with_random(dir.path());
            let mut agent = QLearningAgent::with_seed(QLearningConfig::default(), seed);
            let result = play_episode(&mut engine, &mut agent, true, 64).unwrap();

            let last = agent.last_move().unwrap();
            let value = agent.q_table().value(last.state, last.action);
            match result.winner {
                Some(DRIVER_SIDE) => assert!(value > 0.0, "seed {seed}: {value}"),
                Some(_) => assert!(value < 0.0, "seed {seed}: {value}"),
                None => {}
            }
        }
    }

    #[test]
    fn test_scripted_win_raises_last_pair_by_lr() {
        let dir = tempfile::tempdir().unwrap();
        let config = QLearningConfig::default();
        let params = config.td_params();

        // Red knows its states with all-zero values and stacks the last
        // column; Yellow is primed to answer in column 0.
        let mut board = Board::new();
        let mut driver = QTable::new();
        let mut opponent = QTable::new();
        let mut states = Vec::new();
        for turn in 0..4 {
            states.push(fingerprint(&board));
            driver.ensure(fingerprint(&board));
            board.drop_piece(COLS - 1, Cell::Red).unwrap();
            if turn < 3 {
                opponent.update(fingerprint(&board), 0, reward::WIN, params);
                board.drop_piece(0, Cell::Yellow).unwrap();
            }
        }

        let win_state = states[states.len() - 1];

        let store = AgentStore::new(AgentStoreConfig {
            data_dir: dir.path().to_path_buf(),
        });
        let mut engine = GameEngine::new(store, config.clone(), EngineConfig::default());
        let opponent = QLearningAgent::from_policy(
            PolicyState {
                q_table: opponent,
                ..Default::default()
            },
            config.clone(),
        );
        engine.reset_with(Some(Seat::frozen(AgentKind::QLearning(opponent))));

        let mut agent = QLearningAgent::from_policy(
            PolicyState {
                q_table: driver,
                ..Default::default()
            },
            config.clone(),
        );
        let result = play_episode(&mut engine, &mut agent, true, 64).unwrap();

        assert_eq!(result.winner, Some(DRIVER_SIDE));
        assert_eq!(result.game_length, 7);
        let expected = LastMove {
            state: win_state,
            action: COLS - 1,
        };
        assert_eq!(agent.last_move(), Some(expected));
        let value = agent.q_table().value(win_state, COLS - 1);
        assert!(value > 0.0);
        assert!((value - config.learning_rate * reward::WIN).abs() < 1e-12, "value {value}");
    }

    #[test]
    fn test_evaluation_mode_leaves_values_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_with_random(dir.path());
        let mut agent = QLearningAgent::with_seed(QLearningConfig::default(), 4);

        play_episode(&mut engine, &mut agent, false, 64).unwrap();
        assert!(agent
            .q_table()
            .iter()
            .all(|(_, values)| values.iter().all(|av| av.value == 0.0)));
    }
}
