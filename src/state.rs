//! Score, level and difficulty bookkeeping for a run.
//!
//! `GameState` holds only scalars. Sequencing against the entity registry
//! happens in `world`.

use log::info;

use crate::constants::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Playing,
    Paused,
    GameOver,
}

/// Things the frame loop may want to react to, for audio or logging.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Paused,
    Resumed,
    LevelUp(u32),
    DifficultyUp,
    GameOver { score: u32 },
    Reset,
}

#[derive(Clone, Debug)]
pub struct GameState {
    pub score: f64,
    pub high_score: u32,
    pub level: u32,
    pub spawn_interval: u64,
    pub spawn_timer: u64,
    pub difficulty_timer: u64,
    pub level_message: Option<String>,
    pub level_message_timer: i64,
    pub phase: Phase,
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        GameState {
            score: 0.0,
            high_score: 0,
            level: 1,
            spawn_interval: SPAWN_INTERVAL_MS,
            spawn_timer: 0,
            difficulty_timer: 0,
            level_message: None,
            level_message_timer: 0,
            phase: Phase::Playing,
        }
    }

    pub fn display_score(&self) -> u32 {
        self.score.floor() as u32
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    /// Flips between playing and paused. Has no effect after game over.
    pub fn toggle_pause(&mut self) -> Option<GameEvent> {
        match self.phase {
            Phase::Playing => {
                self.phase = Phase::Paused;
                info!("Paused at score {}.", self.display_score());
                Some(GameEvent::Paused)
            }
            Phase::Paused => {
                self.phase = Phase::Playing;
                info!("Resumed.");
                Some(GameEvent::Resumed)
            }
            Phase::GameOver => None,
        }
    }

    pub fn advance_score(&mut self, dt_ms: u64) {
        self.score += dt_ms as f64 / SCORE_DIVISOR_MS;
    }

    /// Levels up once when the score reaches the next threshold. Returns the
    /// new level; callers speed up live obstacles.
    pub fn check_level_up(&mut self) -> Option<u32> {
        if self.display_score() < self.level * LEVEL_UP_THRESHOLD {
            return None;
        }
        self.level += 1;
        self.level_message = Some(format!("Level {}!", self.level));
        self.level_message_timer = LEVEL_MESSAGE_MS;
        self.shorten_spawn_interval(LEVEL_UP_SPAWN_DECREASE_MS);
        info!("Level {} reached, spawn interval {} ms.", self.level, self.spawn_interval);
        Some(self.level)
    }

    /// Accumulates play time and ramps difficulty once per period. Returns
    /// true when the ramp fired; callers speed up live obstacles.
    pub fn tick_difficulty(&mut self, dt_ms: u64) -> bool {
        self.difficulty_timer += dt_ms;
        if self.difficulty_timer <= DIFFICULTY_PERIOD_MS {
            return false;
        }
        self.difficulty_timer = 0;
        self.shorten_spawn_interval(DIFFICULTY_SPAWN_DECREASE_MS);
        true
    }

    /// Advances the spawn accumulator and returns how many obstacles are due.
    pub fn take_due_spawns(&mut self, dt_ms: u64) -> u32 {
        self.spawn_timer += dt_ms;
        let mut due = 0;
        while self.spawn_timer >= self.spawn_interval {
            self.spawn_timer -= self.spawn_interval;
            due += 1;
        }
        due
    }

    /// Counts the transient message down; runs in every phase.
    pub fn tick_message(&mut self, dt_ms: u64) {
        if self.level_message_timer > 0 {
            self.level_message_timer -= dt_ms as i64;
            if self.level_message_timer <= 0 {
                self.level_message = None;
                self.level_message_timer = 0;
            }
        }
    }

    pub fn enter_game_over(&mut self) -> GameEvent {
        self.phase = Phase::GameOver;
        self.high_score = self.high_score.max(self.display_score());
        self.spawn_timer = 0;
        info!("Game over with score {} (high {}).", self.display_score(), self.high_score);
        GameEvent::GameOver { score: self.display_score() }
    }

    /// Starts a fresh run. The high score survives.
    pub fn reset(&mut self) {
        *self = GameState { high_score: self.high_score, ..GameState::new() };
        info!("New run started.");
    }

    /// Restarts the spawn accumulator with a shorter period, never below the floor.
    fn shorten_spawn_interval(&mut self, by_ms: u64) {
        self.spawn_interval = self.spawn_interval.saturating_sub(by_ms).max(MIN_SPAWN_INTERVAL_MS);
        self.spawn_timer = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn score_advances_by_tenth_of_elapsed_ms() {
        let mut state = GameState::new();
        state.advance_score(16);
        assert!((state.score - 0.16).abs() < 1e-9);
        state.advance_score(0);
        assert!((state.score - 0.16).abs() < 1e-9);
    }

    #[test]
    fn level_up_from_95_after_one_second() {
        let mut state = GameState::new();
        state.score = 95.0;
        state.spawn_timer = 300;
        state.advance_score(1000);
        assert!((state.score - 105.0).abs() < 1e-9);

        assert_eq!(state.check_level_up(), Some(2));
        assert_eq!(state.level, 2);
        assert_eq!(state.level_message.as_deref(), Some("Level 2!"));
        assert_eq!(state.level_message_timer, 1500);
        assert_eq!(state.spawn_interval, 640);
        assert_eq!(state.spawn_timer, 0);

        assert_eq!(state.check_level_up(), None);
        assert_eq!(state.level, 2);
    }

    #[test]
    fn level_up_waits_for_whole_threshold() {
        let mut state = GameState::new();
        state.score = 99.99;
        assert_eq!(state.check_level_up(), None);
        state.score = 100.0;
        assert_eq!(state.check_level_up(), Some(2));
    }

    #[test]
    fn spawn_interval_floors_at_minimum() {
        let mut state = GameState::new();
        state.spawn_interval = 230;
        state.score = 100.0;
        state.check_level_up();
        assert_eq!(state.spawn_interval, MIN_SPAWN_INTERVAL_MS);

        state.difficulty_timer = DIFFICULTY_PERIOD_MS;
        assert!(state.tick_difficulty(1));
        assert_eq!(state.spawn_interval, MIN_SPAWN_INTERVAL_MS);
    }

    #[test]
    fn difficulty_fires_after_period_and_restarts() {
        let mut state = GameState::new();
        assert!(!state.tick_difficulty(5000));
        state.spawn_timer = 100;
        assert!(state.tick_difficulty(1));
        assert_eq!(state.difficulty_timer, 0);
        assert_eq!(state.spawn_interval, 660);
        assert_eq!(state.spawn_timer, 0);
    }

    #[test]
    fn spawns_fall_due_on_interval() {
        let mut state = GameState::new();
        assert_eq!(state.take_due_spawns(699), 0);
        assert_eq!(state.take_due_spawns(1), 1);
        assert_eq!(state.spawn_timer, 0);
        assert_eq!(state.take_due_spawns(1500), 2);
        assert_eq!(state.spawn_timer, 100);
    }

    #[test]
    fn message_counts_down_and_clears() {
        let mut state = GameState::new();
        state.score = 100.0;
        state.check_level_up();
        state.phase = Phase::Paused;
        state.tick_message(1000);
        assert_eq!(state.level_message_timer, 500);
        assert!(state.level_message.is_some());
        state.tick_message(600);
        assert_eq!(state.level_message_timer, 0);
        assert!(state.level_message.is_none());
    }

    #[test]
    fn pause_toggles_but_not_after_game_over() {
        let mut state = GameState::new();
        assert_eq!(state.toggle_pause(), Some(GameEvent::Paused));
        assert_eq!(state.phase, Phase::Paused);
        assert_eq!(state.toggle_pause(), Some(GameEvent::Resumed));
        assert!(state.is_playing());

        state.enter_game_over();
        assert_eq!(state.toggle_pause(), None);
        assert_eq!(state.phase, Phase::GameOver);
    }

    #[test]
    fn game_over_keeps_best_whole_score() {
        let mut state = GameState::new();
        state.score = 57.9;
        assert_eq!(state.enter_game_over(), GameEvent::GameOver { score: 57 });
        assert_eq!(state.high_score, 57);

        state.reset();
        state.score = 12.0;
        state.enter_game_over();
        assert_eq!(state.high_score, 57);
    }

    #[test]
    fn reset_restores_initial_run_values() {
        let mut state = GameState::new();
        state.score = 333.0;
        state.level = 4;
        state.spawn_interval = 300;
        state.level_message = Some("Level 4!".into());
        state.level_message_timer = 900;
        state.enter_game_over();

        state.reset();
        assert_eq!(state.score, 0.0);
        assert_eq!(state.level, 1);
        assert_eq!(state.spawn_interval, SPAWN_INTERVAL_MS);
        assert!(state.level_message.is_none());
        assert_eq!(state.level_message_timer, 0);
        assert_eq!(state.high_score, 333);
        assert!(state.is_playing());
    }

    proptest! {
        #[test]
        fn ramps_never_break_bounds(dts in prop::collection::vec(0u64..2000, 1..300)) {
            let mut state = GameState::new();
            for dt in dts {
                let (score, level, interval) = (state.score, state.level, state.spawn_interval);
                state.advance_score(dt);
                prop_assert!((state.score - (score + dt as f64 / 100.0)).abs() < 1e-6);
                state.check_level_up();
                state.tick_difficulty(dt);
                prop_assert!(state.level == level || state.level == level + 1);
                prop_assert!(state.spawn_interval <= interval);
                prop_assert!(state.spawn_interval >= MIN_SPAWN_INTERVAL_MS);
            }
        }
    }
}
