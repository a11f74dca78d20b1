use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::{info, warn};
use rodio::source::Buffered;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

/// A decoded, replayable audio clip.
pub type Track = Buffered<Decoder<BufReader<File>>>;

struct Output {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

/// Music and sound effect playback. Without an output device every call is a
/// no-op.
pub struct Audio {
    output: Option<Output>,
    music: Option<Sink>,
}

impl Audio {
    pub fn open() -> Self {
        match OutputStream::try_default() {
            Ok((stream, handle)) => {
                info!("Audio output opened.");
                Audio { output: Some(Output { _stream: stream, handle }), music: None }
            }
            Err(e) => {
                warn!("No audio output, running silent: {}", e);
                Audio::silent()
            }
        }
    }

    pub fn silent() -> Self {
        Audio { output: None, music: None }
    }

    /// Replaces any current music with `track`, repeated forever.
    pub fn play_looping(&mut self, track: &Track, volume: f32) {
        self.stop_music();
        if let Some(sink) = self.new_sink(volume) {
            sink.append(track.clone().repeat_infinite());
            self.music = Some(sink);
        }
    }

    pub fn play_once(&self, track: &Track, volume: f32) {
        if let Some(sink) = self.new_sink(volume) {
            sink.append(track.clone());
            sink.detach();
        }
    }

    pub fn stop_music(&mut self) {
        if let Some(sink) = self.music.take() {
            sink.stop();
        }
    }

    fn new_sink(&self, volume: f32) -> Option<Sink> {
        let output = self.output.as_ref()?;
        match Sink::try_new(&output.handle) {
            Ok(sink) => {
                sink.set_volume(volume);
                Some(sink)
            }
            Err(e) => {
                warn!("Failed to create audio sink: {}", e);
                None
            }
        }
    }
}

/// The clips the game plays, decoded once at startup.
#[derive(Default)]
pub struct GameSounds {
    pub music: Option<Track>,
    pub game_over: Option<Track>,
}

impl GameSounds {
    pub fn load(music: Option<&Path>, game_over: Option<&Path>) -> Self {
        GameSounds {
            music: music.and_then(load_track),
            game_over: game_over.and_then(load_track),
        }
    }
}

pub fn load_track(path: &Path) -> Option<Track> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            warn!("Failed to open sound {}: {}", path.display(), e);
            return None;
        }
    };
    match Decoder::new(BufReader::new(file)) {
        Ok(decoder) => Some(decoder.buffered()),
        Err(e) => {
            warn!("Failed to decode sound {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn undecodable_track_is_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("background.mp3");
        fs::write(&path, b"definitely not audio").unwrap();
        assert!(load_track(&path).is_none());
        assert!(load_track(&dir.path().join("missing.mp3")).is_none());

        let sounds = GameSounds::load(Some(&path), None);
        assert!(sounds.music.is_none());
        assert!(sounds.game_over.is_none());
    }

    #[test]
    fn silent_backend_accepts_calls() {
        let mut audio = Audio::silent();
        assert!(audio.output.is_none());
        audio.stop_music();
        audio.stop_music();
    }
}
