use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::game::Player;

/// Result of a single episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeResult {
    pub winner: Option<Player>,
    pub game_length: usize,
}

/// Rolling-window outcome statistics from the trained side's point of view.
pub struct TrainingMetrics {
    side: Player,
    episode_results: VecDeque<EpisodeResult>,
    capacity: usize,
    total_episodes: usize, // lifetime count, never capped
    window_start: Instant,
    window_count: usize,
}

impl TrainingMetrics {
    pub fn with_capacity(side: Player, capacity: usize) -> Self {
        TrainingMetrics {
            side,
            episode_results: VecDeque::with_capacity(capacity),
            capacity,
            total_episodes: 0,
            window_start: Instant::now(),
            window_count: 0,
        }
    }

    pub fn new(side: Player) -> Self {
        Self::with_capacity(side, 100)
    }

    pub fn record_episode(&mut self, result: EpisodeResult) {
        self.total_episodes += 1;
        self.window_count += 1;
        self.episode_results.push_back(result);
        if self.episode_results.len() > self.capacity {
            self.episode_results.pop_front();
        }
    }

    fn rate(&self, last_n: usize, pred: impl Fn(&EpisodeResult) -> bool) -> f32 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let hits = self
            .episode_results
            .iter()
            .rev()
            .take(n)
            .filter(|r| pred(r))
            .count();
        hits as f32 / n as f32
    }

    /// Share of the last N episodes won by the trained side.
    pub fn win_rate(&self, last_n: usize) -> f32 {
        self.rate(last_n, |r| r.winner == Some(self.side))
    }

    /// Share of the last N episodes won by the opponent.
    pub fn loss_rate(&self, last_n: usize) -> f32 {
        self.rate(last_n, |r| r.winner == Some(self.side.other()))
    }

    /// Draw rate in the last N episodes.
    pub fn draw_rate(&self, last_n: usize) -> f32 {
        self.rate(last_n, |r| r.winner.is_none())
    }

    /// Average game length (pieces on the board) over the last N episodes.
    pub fn average_game_length(&self, last_n: usize) -> f32 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let total: usize = self
            .episode_results
            .iter()
            .rev()
            .take(n)
            .map(|r| r.game_length)
            .sum();
        total as f32 / n as f32
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    /// Episodes per second since the last `reset_window` call.
    pub fn episodes_per_sec(&self) -> f32 {
        let elapsed = self.window_start.elapsed();
        if elapsed == Duration::ZERO {
            return 0.0;
        }
        self.window_count as f32 / elapsed.as_secs_f32()
    }

    /// Reset the throughput window (call after each log interval).
    pub fn reset_window(&mut self) {
        self.window_start = Instant::now();
        self.window_count = 0;
    }
}
