use crate::types::Rgb;

// --- Screen ---
pub const SCREEN_WIDTH: i32 = 480;
pub const SCREEN_HEIGHT: i32 = 640;
pub const FPS: u64 = 60;
pub const WINDOW_TITLE: &str = "Dodge the Blocks";

// --- Player ---
pub const PLAYER_WIDTH: i32 = 50;
pub const PLAYER_HEIGHT: i32 = 30;
pub const PLAYER_SPEED: i32 = 6;
pub const PLAYER_START_Y: i32 = SCREEN_HEIGHT - 50; // Center of the ship

// --- Obstacles ---
pub const BLOCK_MIN_SIZE: i32 = 20;
pub const BLOCK_MAX_SIZE: i32 = 80;
pub const BLOCK_MIN_SPEED: i32 = 3;
pub const BLOCK_MAX_SPEED: i32 = 8;
pub const BLOCK_MIN_CHANNEL: u8 = 40;
pub const BLOCK_MAX_CHANNEL: u8 = 240;

// --- Difficulty ---
pub const SPAWN_INTERVAL_MS: u64 = 700;
pub const MIN_SPAWN_INTERVAL_MS: u64 = 200;
pub const LEVEL_UP_THRESHOLD: u32 = 100;
pub const LEVEL_UP_SPAWN_DECREASE_MS: u64 = 60;
pub const DIFFICULTY_PERIOD_MS: u64 = 5000;
pub const DIFFICULTY_SPAWN_DECREASE_MS: u64 = 40;
pub const FALL_SPEED_INCREASE: i32 = 1;
pub const SCORE_DIVISOR_MS: f64 = 100.0; // ~10 points per second
pub const LEVEL_MESSAGE_MS: i64 = 1500;

// --- Background ---
pub const BACKGROUND_SCROLL_SPEED: f32 = 1.8; // Pixels per frame at level 1
pub const BACKGROUND_SCROLL_PER_LEVEL: f32 = 0.3;

// --- Audio ---
pub const MUSIC_VOLUME: f32 = 0.5;
pub const GAME_OVER_VOLUME: f32 = 0.7;

// --- Input ---
pub const KEY_HOLD_MS: u64 = 250; // Held window when the terminal reports no key releases

// --- Assets ---
pub const ASSETS_ENV_VAR: &str = "SPACE_DODGE_ASSETS";
pub const ASSETS_DIR: &str = "assets";
pub const SOUNDS_DIR: &str = "sounds";
pub const BACKGROUND_IMAGE: &str = "background.jpg";
pub const SHIP_IMAGE: &str = "ship_K.png";
pub const PLANET_PREFIX: &str = "planet";
pub const MUSIC_TRACK: &str = "background.mp3";
pub const GAME_OVER_TRACK: &str = "game-over.mp3";

pub const LOG_FILE: &str = "space-dodge.log";

// --- Colors ---
pub const WHITE: Rgb = Rgb(255, 255, 255);
pub const BLACK: Rgb = Rgb(0, 0, 0);
pub const RED: Rgb = Rgb(200, 40, 40);
pub const GREEN: Rgb = Rgb(40, 200, 40);
pub const BLUE: Rgb = Rgb(50, 120, 220);
pub const GRAY: Rgb = Rgb(30, 30, 30);
