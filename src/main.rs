mod assets;
mod audio;
mod constants;
mod entities;
mod game;
mod registry;
mod rendering;
mod sprite;
mod state;
mod terminal_io;
mod types;
mod world;

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, Show},
    event::{
        DisableFocusChange, EnableFocusChange, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        self, DisableLineWrap, EnableLineWrap, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
        disable_raw_mode, enable_raw_mode, size,
    },
};
use log::{error, info};

use crate::assets::Assets;
use crate::audio::{Audio, GameSounds};
use crate::constants::*;
use crate::game::Game;
use crate::rendering::{OutputTarget, Renderer};
use crate::terminal_io::KeyTracker;
use crate::world::World;

fn main() -> io::Result<()> {
    simple_logging::log_to_file(LOG_FILE, log::LevelFilter::Info)?;
    info!("Starting Space Dodge.");

    let assets = Assets::discover(&assets::resolve_base_dir());
    let sounds = GameSounds::load(assets.music.as_deref(), assets.game_over_sound.as_deref());
    let audio = Audio::open();

    let reports_release = setup_terminal().map_err(|e| { error!("Failed to set up terminal: {}", e); e })?;
    let result = play(assets, audio, sounds, reports_release);
    let restored = restore_terminal(reports_release);

    if let Err(e) = &result {
        error!("Game loop ended with error: {}", e);
    }
    info!("Exiting Space Dodge.");
    result.and(restored)
}

fn play(assets: Assets, audio: Audio, sounds: GameSounds, reports_release: bool) -> io::Result<()> {
    let (cols, rows) = size().map_err(|e| { error!("Failed to get terminal size: {}", e); e })?;
    info!("Terminal size: {}x{}", cols, rows);

    let Assets { background, ship, planets, .. } = assets;
    let world = World::new(ship, planets);
    let renderer = Renderer::new(background, cols, rows);
    let keys = KeyTracker::new(reports_release);

    let mut game = Game::new(world, renderer, audio, sounds, keys, OutputTarget::Stdout(io::stdout()));
    game.run()
}

/// Raw mode on the alternate screen. Returns whether key releases will be reported.
fn setup_terminal() -> io::Result<bool> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide, DisableLineWrap, EnableFocusChange, SetTitle(WINDOW_TITLE))?;

    let reports_release = terminal::supports_keyboard_enhancement().unwrap_or(false);
    if reports_release {
        execute!(stdout, PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))?;
    }
    info!("Raw mode enabled, key release events: {}", reports_release);
    Ok(reports_release)
}

fn restore_terminal(reports_release: bool) -> io::Result<()> {
    let mut stdout = io::stdout();
    if reports_release {
        execute!(stdout, PopKeyboardEnhancementFlags)?;
    }
    execute!(stdout, DisableFocusChange, LeaveAlternateScreen, Show, EnableLineWrap)?;
    stdout.flush()?;
    disable_raw_mode().map_err(|e| { error!("Failed to disable raw mode: {}", e); e })
}
