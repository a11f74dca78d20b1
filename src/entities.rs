use image::RgbaImage;
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::constants::*;
use crate::rendering::Canvas;
use crate::sprite::{Shape, Sprite};
use crate::terminal_io::InputState;
use crate::types::{Rect, Rgb};

// --- Player ship ---
pub struct Player {
    pub rect: Rect,
    pub speed: i32,
    pub sprite: Sprite,
}

impl Player {
    /// Centers a ship at (cx, cy). Uses `image` scaled to ship size when it
    /// scales cleanly, otherwise a blue triangle.
    pub fn new(cx: i32, cy: i32, image: Option<&RgbaImage>) -> Self {
        let sprite = Sprite::scaled(image, PLAYER_WIDTH, PLAYER_HEIGHT)
            .unwrap_or(Sprite::Procedural(Shape::Triangle(BLUE)));
        Player {
            rect: Rect::from_center(cx, cy, PLAYER_WIDTH, PLAYER_HEIGHT),
            speed: PLAYER_SPEED,
            sprite,
        }
    }

    pub fn spawn(image: Option<&RgbaImage>) -> Self {
        Player::new(SCREEN_WIDTH / 2, PLAYER_START_Y, image)
    }

    pub fn update(&mut self, input: &InputState) {
        if input.left {
            self.rect.x -= self.speed;
        }
        if input.right {
            self.rect.x += self.speed;
        }

        // Keep on screen
        if self.rect.left() < 0 {
            self.rect.set_left(0);
        }
        if self.rect.right() > SCREEN_WIDTH {
            self.rect.set_right(SCREEN_WIDTH);
        }
    }
}

// --- Falling obstacle ---
pub struct Obstacle {
    pub rect: Rect,
    pub fall_speed: i32,
    pub sprite: Sprite,
    pub alive: bool,
}

impl Obstacle {
    pub fn new(rect: Rect, fall_speed: i32, sprite: Sprite) -> Self {
        Obstacle { rect, fall_speed, sprite, alive: true }
    }

    /// A randomly sized obstacle just above the top edge. Picks a planet image
    /// when any are available and falls back to a solid colored block.
    pub fn spawn(rng: &mut impl Rng, planets: &[RgbaImage]) -> Self {
        let width = rng.gen_range(BLOCK_MIN_SIZE..=BLOCK_MAX_SIZE);
        let height = rng.gen_range(BLOCK_MIN_SIZE..=BLOCK_MAX_SIZE);

        let sprite = Sprite::scaled(planets.choose(rng), width, height).unwrap_or_else(|| {
            Sprite::Procedural(Shape::Solid(random_block_color(rng)))
        });

        let x = rng.gen_range(0..=SCREEN_WIDTH - width);
        let fall_speed = rng.gen_range(BLOCK_MIN_SPEED..=BLOCK_MAX_SPEED);
        debug!("Spawned obstacle {}x{} at x={} falling {}", width, height, x, fall_speed);
        Obstacle::new(Rect::new(x, -height, width, height), fall_speed, sprite)
    }

    pub fn update(&mut self) {
        self.rect.y += self.fall_speed;
        if self.rect.top() > SCREEN_HEIGHT {
            self.alive = false;
        }
    }
}

fn random_block_color(rng: &mut impl Rng) -> Rgb {
    Rgb(
        rng.gen_range(BLOCK_MIN_CHANNEL..=BLOCK_MAX_CHANNEL),
        rng.gen_range(BLOCK_MIN_CHANNEL..=BLOCK_MAX_CHANNEL),
        rng.gen_range(BLOCK_MIN_CHANNEL..=BLOCK_MAX_CHANNEL),
    )
}

// --- Entity: anything the registry holds ---
pub enum Entity {
    Player(Player),
    Obstacle(Obstacle),
}

impl Entity {
    pub fn rect(&self) -> Rect {
        match self {
            Entity::Player(p) => p.rect,
            Entity::Obstacle(o) => o.rect,
        }
    }

    pub fn sprite(&self) -> &Sprite {
        match self {
            Entity::Player(p) => &p.sprite,
            Entity::Obstacle(o) => &o.sprite,
        }
    }

    pub fn is_alive(&self) -> bool {
        match self {
            Entity::Player(_) => true,
            Entity::Obstacle(o) => o.alive,
        }
    }

    pub fn update(&mut self, input: &InputState) {
        match self {
            Entity::Player(p) => p.update(input),
            Entity::Obstacle(o) => o.update(),
        }
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        self.sprite().draw(canvas, self.rect());
    }
}
