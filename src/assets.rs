//! Optional asset discovery.
//!
//! Every asset is optional. Missing directories, missing files and files that
//! fail to decode all collapse to "absent", and callers fall back to
//! procedural shapes or silence.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::RgbaImage;
use log::{info, warn};

use crate::constants::*;

/// Everything found under the asset base directory. Audio is kept as paths and
/// decoded by the audio backend.
#[derive(Default)]
pub struct Assets {
    pub background: Option<RgbaImage>,
    pub ship: Option<RgbaImage>,
    pub planets: Vec<RgbaImage>,
    pub music: Option<PathBuf>,
    pub game_over_sound: Option<PathBuf>,
}

impl Assets {
    pub fn discover(base: &Path) -> Self {
        if !base.is_dir() {
            info!("No asset directory at {}, using procedural graphics.", base.display());
            return Assets::default();
        }

        let background = find_file(base, BACKGROUND_IMAGE)
            .and_then(|path| load_image(&path))
            .map(|img| imageops::resize(&img, SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32, FilterType::Triangle));
        let ship = find_file(base, SHIP_IMAGE).and_then(|path| load_image(&path));
        let planets = find_images_by_pattern(base, PLANET_PREFIX);

        let sounds = base.join(SOUNDS_DIR);
        let music = find_file(&sounds, MUSIC_TRACK);
        let game_over_sound = find_file(&sounds, GAME_OVER_TRACK);

        info!(
            "Assets from {}: background={}, ship={}, planets={}, music={}, game_over={}",
            base.display(),
            background.is_some(),
            ship.is_some(),
            planets.len(),
            music.is_some(),
            game_over_sound.is_some(),
        );

        Assets { background, ship, planets, music, game_over_sound }
    }
}

/// Picks the asset base directory: the environment override, then `./assets`,
/// then `assets/` beside the executable.
pub fn resolve_base_dir() -> PathBuf {
    if let Some(dir) = env::var_os(ASSETS_ENV_VAR) {
        return PathBuf::from(dir);
    }
    let local = PathBuf::from(ASSETS_DIR);
    if local.is_dir() {
        return local;
    }
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(ASSETS_DIR)))
        .unwrap_or(local)
}

/// `dir/name` if it exists, otherwise the first file called `name` anywhere
/// below `dir`.
pub fn find_file(dir: &Path, name: &str) -> Option<PathBuf> {
    let direct = dir.join(name);
    if direct.is_file() {
        return Some(direct);
    }
    walk_files(dir)
        .into_iter()
        .find(|path| path.file_name().is_some_and(|file| file == name))
}

/// Decodes every `<prefix><digits>.png` below `dir`. Files that fail to decode
/// are skipped.
pub fn find_images_by_pattern(dir: &Path, prefix: &str) -> Vec<RgbaImage> {
    walk_files(dir)
        .into_iter()
        .filter(|path| matches_numbered_png(path, prefix))
        .filter_map(|path| load_image(&path))
        .collect()
}

pub fn load_image(path: &Path) -> Option<RgbaImage> {
    match image::open(path) {
        Ok(img) => Some(img.to_rgba8()),
        Err(e) => {
            warn!("Skipping image {}: {}", path.display(), e);
            None
        }
    }
}

fn matches_numbered_png(path: &Path, prefix: &str) -> bool {
    if path.extension().and_then(|ext| ext.to_str()) != Some("png") {
        return false;
    }
    let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
        return false;
    };
    match stem.strip_prefix(prefix) {
        Some(suffix) => !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// All regular files below `dir`, in sorted path order.
fn walk_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let Ok(entries) = fs::read_dir(&current) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.is_file() {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}
