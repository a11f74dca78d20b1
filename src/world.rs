use image::RgbaImage;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::*;
use crate::entities::{Entity, Obstacle, Player};
use crate::registry::EntityRegistry;
use crate::state::{GameEvent, GameState, Phase};
use crate::terminal_io::InputState;

/// One run of the game: state, live entities and the artwork used to spawn them.
pub struct World<R: Rng = StdRng> {
    pub state: GameState,
    pub registry: EntityRegistry,
    ship_image: Option<RgbaImage>,
    planets: Vec<RgbaImage>,
    rng: R,
}

impl World<StdRng> {
    pub fn new(ship_image: Option<RgbaImage>, planets: Vec<RgbaImage>) -> Self {
        World::with_rng(ship_image, planets, StdRng::from_entropy())
    }
}

impl<R: Rng> World<R> {
    pub fn with_rng(ship_image: Option<RgbaImage>, planets: Vec<RgbaImage>, rng: R) -> Self {
        let mut world = World {
            state: GameState::new(),
            registry: EntityRegistry::new(),
            ship_image,
            planets,
            rng,
        };
        world.spawn_player();
        world
    }

    /// The space bar: pause toggle during a run, restart after game over.
    pub fn action(&mut self) -> Option<GameEvent> {
        match self.state.phase {
            Phase::GameOver => {
                self.reset();
                Some(GameEvent::Reset)
            }
            Phase::Playing | Phase::Paused => self.state.toggle_pause(),
        }
    }

    pub fn reset(&mut self) {
        info!("Clearing {} entities for a new run.", self.registry.len());
        self.registry.clear();
        self.spawn_player();
        self.state.reset();
    }

    /// Advances one frame of `dt_ms` milliseconds.
    pub fn step(&mut self, dt_ms: u64, input: &InputState) -> Vec<GameEvent> {
        let mut events = Vec::new();

        if self.state.is_playing() {
            self.play(dt_ms, input, &mut events);
        }
        self.state.tick_message(dt_ms);
        debug_assert_eq!(self.registry.player_count(), 1);

        events
    }

    fn play(&mut self, dt_ms: u64, input: &InputState, events: &mut Vec<GameEvent>) {
        for _ in 0..self.state.take_due_spawns(dt_ms) {
            let obstacle = Obstacle::spawn(&mut self.rng, &self.planets);
            self.registry.add(Entity::Obstacle(obstacle));
        }

        self.registry.update(input);

        if self.registry.player_collides() {
            events.push(self.state.enter_game_over());
            return;
        }

        self.state.advance_score(dt_ms);

        if let Some(level) = self.state.check_level_up() {
            self.registry.boost_obstacles(FALL_SPEED_INCREASE);
            events.push(GameEvent::LevelUp(level));
        }

        if self.state.tick_difficulty(dt_ms) {
            self.registry.boost_obstacles(FALL_SPEED_INCREASE);
            info!("Difficulty up, spawn interval {} ms.", self.state.spawn_interval);
            events.push(GameEvent::DifficultyUp);
        }
    }

    fn spawn_player(&mut self) {
        self.registry.add(Entity::Player(Player::spawn(self.ship_image.as_ref())));
    }
}
