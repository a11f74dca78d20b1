use std::io;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event};
use log::{error, info};

use crate::audio::{Audio, GameSounds};
use crate::constants::*;
use crate::rendering::{OutputTarget, Renderer};
use crate::state::GameEvent;
use crate::terminal_io::{Command, KeyTracker, SimulatedInput, translate};
use crate::world::World;

/// Paces frames and reports whole milliseconds since the previous tick.
pub struct FrameClock {
    last: Instant,
    paced: bool,
}

impl FrameClock {
    pub fn new(paced: bool) -> Self {
        FrameClock { last: Instant::now(), paced }
    }

    pub fn tick(&mut self, fps: u64) -> u64 {
        if !self.paced {
            return 1000 / fps;
        }
        let frame = Duration::from_secs_f64(1.0 / fps as f64);
        let elapsed = self.last.elapsed();
        if elapsed < frame {
            thread::sleep(frame - elapsed);
        }
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_millis() as u64;
        self.last = now;
        dt
    }
}

pub struct Game {
    world: World,
    renderer: Renderer,
    audio: Audio,
    sounds: GameSounds,
    keys: KeyTracker,
    stdout_target: OutputTarget,
    simulated_input: Option<SimulatedInput>,
    max_frames: Option<u64>,
    clock: FrameClock,
}

impl Game {
    pub fn new(
        world: World,
        renderer: Renderer,
        audio: Audio,
        sounds: GameSounds,
        keys: KeyTracker,
        stdout_target: OutputTarget,
    ) -> Self {
        Game {
            world,
            renderer,
            audio,
            sounds,
            keys,
            stdout_target,
            simulated_input: None,
            max_frames: None,
            clock: FrameClock::new(true),
        }
    }

    /// Unpaced, silent game fed by a script.
    #[cfg(test)]
    pub fn headless(world: World, renderer: Renderer, stdout_target: OutputTarget, script: SimulatedInput, max_frames: u64) -> Self {
        Game {
            world,
            renderer,
            audio: Audio::silent(),
            sounds: GameSounds::default(),
            keys: KeyTracker::new(true),
            stdout_target,
            simulated_input: Some(script),
            max_frames: Some(max_frames),
            clock: FrameClock::new(false),
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        if let Some(music) = &self.sounds.music {
            self.audio.play_looping(music, MUSIC_VOLUME);
        }

        let mut frame_count = 0;
        while self.max_frames.is_none_or(|max| frame_count < max) {
            let dt = self.clock.tick(FPS);
            self.keys.advance(dt);

            if !self.handle_input(frame_count)? {
                info!("Quit requested at frame {}.", frame_count);
                break;
            }

            let events = self.world.step(dt, &self.keys.state());
            self.dispatch(&events);

            self.renderer.compose(&self.world.state, &self.world.registry);
            self.renderer
                .present(&mut self.stdout_target, &self.world.state)
                .map_err(|e| { error!("Failed to render frame: {}", e); e })?;

            frame_count += 1;
        }

        self.audio.stop_music();
        Ok(())
    }

    /// Drains every pending event. Returns false once quit was requested.
    fn handle_input(&mut self, frame_count: u64) -> io::Result<bool> {
        for event in self.pending_events(frame_count)? {
            match translate(&event) {
                Some(Command::Quit) => return Ok(false),
                Some(Command::Action) => {
                    if let Some(game_event) = self.world.action() {
                        self.dispatch(&[game_event]);
                    }
                }
                Some(Command::Move { direction, pressed }) => self.keys.set(direction, pressed),
                Some(Command::Resize(cols, rows)) => {
                    self.renderer.resize(cols, rows);
                    let viewport = self.renderer.viewport();
                    info!("Terminal resized to {}x{}", viewport.cols, viewport.rows);
                }
                Some(Command::FocusLost) => self.keys.release_all(),
                None => {}
            }
        }
        Ok(true)
    }

    fn pending_events(&mut self, frame_count: u64) -> io::Result<Vec<Event>> {
        if let Some(script) = &mut self.simulated_input {
            return Ok(script.drain(frame_count));
        }
        let mut events = Vec::new();
        while event::poll(Duration::ZERO).map_err(|e| { error!("Failed to poll event: {}", e); e })? {
            events.push(event::read().map_err(|e| { error!("Failed to read event: {}", e); e })?);
        }
        Ok(events)
    }

    fn dispatch(&mut self, events: &[GameEvent]) {
        for event in events {
            if let GameEvent::GameOver { .. } = event {
                self.audio.stop_music();
                if let Some(sound) = &self.sounds.game_over {
                    self.audio.play_once(sound, GAME_OVER_VOLUME);
                }
            }
        }
    }
}
