//! Per-step audible cue
//!
//! Each reel engine owns its own player. The engine rewinds before every
//! play so rapid steps restart the cue instead of stacking copies, and any
//! playback failure is dropped.

use std::io::Write;

use thiserror::Error;

/// Cue playback failure (never surfaced past the engine)
#[derive(Error, Debug)]
#[error("Cue playback failed: {0}")]
pub struct PlaybackError(pub String);

/// Audio handle for the step cue
pub trait CuePlayer {
    /// Seek back to the start of the cue
    fn rewind(&mut self);

    /// Start playback from the current position
    fn play(&mut self) -> Result<(), PlaybackError>;
}

/// No audio
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentCue;

impl CuePlayer for SilentCue {
    fn rewind(&mut self) {}

    fn play(&mut self) -> Result<(), PlaybackError> {
        Ok(())
    }
}

/// Rings the terminal bell on stderr
#[derive(Debug, Default)]
pub struct TerminalBell {
    plays: u64,
}

impl TerminalBell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful plays
    pub fn plays(&self) -> u64 {
        self.plays
    }
}

impl CuePlayer for TerminalBell {
    fn rewind(&mut self) {}

    fn play(&mut self) -> Result<(), PlaybackError> {
        let mut stderr = std::io::stderr();
        stderr
            .write_all(b"\x07")
            .and_then(|_| stderr.flush())
            .map_err(|e| PlaybackError(e.to_string()))?;
        self.plays += 1;
        Ok(())
    }
}

/// Rewind then play, discarding failures
pub(crate) fn trigger(player: &mut dyn CuePlayer) {
    player.rewind();
    if let Err(e) = player.play() {
        log::trace!("{e}");
    }
}
