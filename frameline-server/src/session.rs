//! Playback session state machine
//!
//! Tracks the full transport state of one room's player: normalized time,
//! play/pause, scrub state, duration, volume, speed, quality, loop and
//! fullscreen. The session never touches the media itself; imperative seeks
//! are returned as [`SeekRequest`] commands for the playback backend.
//!
//! Two gating rules keep progress reporting and user intent from fighting
//! each other:
//! - while `seeking` is true (scrub in progress), backend progress ticks are
//!   ignored; only scrub moves update the displayed time
//! - after a seek is issued, progress ticks below the seek target are
//!   dropped until the backend reaches it, so a stale tick cannot drag the
//!   position back behind a skip-to

use frameline_common::model::{PresenceStatus, Quality, TransportSnapshot, SPEED_OPTIONS};
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Volume step applied by the arrow-key shortcuts
const VOLUME_STEP: f64 = 0.1;

/// An imperative seek the playback backend must perform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekRequest {
    /// Normalized target position, 0.0 to just under 1.0
    pub to: f64,
}

/// Keyboard shortcuts understood by the player surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum KeyCode {
    Space,
    KeyF,
    KeyM,
    KeyL,
    ArrowUp,
    ArrowDown,
}

/// Transport state for one room, created when the room is opened and
/// discarded with it. Not persisted.
#[derive(Debug)]
pub struct PlaybackSession {
    /// Normalized position, 0.0 to just under 1.0
    time: f64,
    playing: bool,
    /// A scrub is in progress; progress ticks are suspended
    seeking: bool,
    duration_secs: f64,
    volume: f64,
    muted: bool,
    speed: f64,
    quality: Quality,
    looping: bool,
    fullscreen: bool,
    /// The surface reported native fullscreen support
    fullscreen_supported: bool,
    /// A text input has focus; shortcuts are suppressed
    typing: bool,
    /// Outstanding seek target; progress below it is stale
    pending_seek: Option<f64>,
}

impl PlaybackSession {
    pub fn new() -> Self {
        Self {
            time: 0.0,
            playing: false,
            seeking: false,
            duration_secs: 0.0,
            volume: 0.8,
            muted: false,
            speed: 1.0,
            quality: Quality::Auto,
            looping: false,
            fullscreen: false,
            fullscreen_supported: true,
            typing: false,
            pending_seek: None,
        }
    }

    // ------------------------------------------------------------------
    // Backend reports
    // ------------------------------------------------------------------

    /// The backend learned the media duration; the session is unready until
    /// this arrives.
    pub fn set_duration(&mut self, duration_secs: f64) {
        self.duration_secs = duration_secs.max(0.0);
    }

    /// Progress tick from the backend. Returns whether the tick was applied.
    ///
    /// Dropped while a scrub is in progress, and while a seek is outstanding
    /// with the reported position still behind the target.
    pub fn handle_progress(&mut self, played: f64) -> bool {
        if self.seeking {
            return false;
        }

        if let Some(target) = self.pending_seek {
            if played < target {
                debug!(played, target, "Dropping stale progress behind seek target");
                return false;
            }
            self.pending_seek = None;
        }

        self.time = clamp_time(played);
        true
    }

    /// Playback reached the end of the media.
    pub fn handle_ended(&mut self) {
        if !self.looping {
            self.playing = false;
        }
    }

    // ------------------------------------------------------------------
    // Transport controls
    // ------------------------------------------------------------------

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    pub fn toggle_playing(&mut self) {
        self.playing = !self.playing;
    }

    /// Scrub move: enter seeking and track the thumb. Display only, no seek
    /// is issued until the scrub commits.
    pub fn scrub(&mut self, value: f64) {
        self.seeking = true;
        self.time = clamp_time(value);
    }

    /// Scrub release: apply the committed value, issue exactly one seek,
    /// leave seeking.
    pub fn scrub_commit(&mut self, value: f64) -> SeekRequest {
        let target = clamp_time(value);
        self.time = target;
        self.seeking = false;
        self.pending_seek = Some(target);
        SeekRequest { to: target }
    }

    /// Jump to a timeline percentage (thread "jump to time", pin click).
    ///
    /// Order matters: cancel any in-progress scrub, pause, set the displayed
    /// time, then issue one seek, so a stale progress event cannot overwrite
    /// the target.
    pub fn skip_to_percentage(&mut self, percentage: f64) -> Result<SeekRequest> {
        if !(0.0..=100.0).contains(&percentage) {
            return Err(Error::BadRequest(format!(
                "Percentage out of range: {}",
                percentage
            )));
        }

        let target = clamp_time(percentage / 100.0);
        self.seeking = false;
        self.playing = false;
        self.time = target;
        self.pending_seek = Some(target);
        Ok(SeekRequest { to: target })
    }

    // ------------------------------------------------------------------
    // Audio / display controls
    // ------------------------------------------------------------------

    /// Volume slider: dragging to zero also mutes.
    pub fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
        self.muted = self.volume == 0.0;
    }

    /// Arrow-key volume step, clamped to [0, 1]. Does not touch mute.
    pub fn adjust_volume(&mut self, delta: f64) {
        self.volume = (self.volume + delta).clamp(0.0, 1.0);
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    pub fn toggle_loop(&mut self) {
        self.looping = !self.looping;
    }

    pub fn set_speed(&mut self, speed: f64) -> Result<()> {
        if !SPEED_OPTIONS.contains(&speed) {
            return Err(Error::BadRequest(format!("Unknown speed: {}", speed)));
        }
        self.speed = speed;
        Ok(())
    }

    pub fn set_quality(&mut self, quality: Quality) {
        self.quality = quality;
    }

    /// Whether the playback surface supports native fullscreen.
    pub fn set_fullscreen_supported(&mut self, supported: bool) {
        self.fullscreen_supported = supported;
        if !supported {
            self.fullscreen = false;
        }
    }

    /// Toggle fullscreen. Silently no-ops when the surface has no native
    /// fullscreen support; returns the resulting state.
    pub fn toggle_fullscreen(&mut self) -> bool {
        if !self.fullscreen_supported {
            return false;
        }
        self.fullscreen = !self.fullscreen;
        self.fullscreen
    }

    // ------------------------------------------------------------------
    // Keyboard shortcuts
    // ------------------------------------------------------------------

    /// Composer/editor focus: while typing, shortcuts are suppressed.
    pub fn set_typing(&mut self, typing: bool) {
        self.typing = typing;
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    /// Document-level keyboard shortcut. Ignored while a text input has
    /// focus.
    pub fn handle_key(&mut self, key: KeyCode) {
        if self.typing {
            return;
        }

        match key {
            KeyCode::Space => self.toggle_playing(),
            KeyCode::KeyF => {
                self.toggle_fullscreen();
            }
            KeyCode::KeyM => self.toggle_mute(),
            KeyCode::KeyL => self.toggle_loop(),
            KeyCode::ArrowUp => self.adjust_volume(VOLUME_STEP),
            KeyCode::ArrowDown => self.adjust_volume(-VOLUME_STEP),
        }
    }

    // ------------------------------------------------------------------
    // Derived values
    // ------------------------------------------------------------------

    /// Current position as a percentage of duration.
    ///
    /// `None` while the player is unready (duration unknown); callers must
    /// treat that as "do not attach a time". Exactly `0` at the start,
    /// otherwise always within (0, 100).
    pub fn current_percentage(&self) -> Option<f64> {
        if self.duration_secs <= 0.0 {
            return None;
        }
        if self.time == 0.0 {
            return Some(0.0);
        }
        Some(self.time * 100.0)
    }

    /// Seconds elapsed, derived from normalized time and duration.
    pub fn time_secs(&self) -> f64 {
        self.time * self.duration_secs
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_seeking(&self) -> bool {
        self.seeking
    }

    /// Transport activity as shown in the presence strip. Seeking wins over
    /// playing/paused.
    pub fn presence_status(&self) -> PresenceStatus {
        if self.seeking {
            PresenceStatus::Seeking
        } else if self.playing {
            PresenceStatus::Playing
        } else {
            PresenceStatus::Paused
        }
    }

    pub fn snapshot(&self) -> TransportSnapshot {
        TransportSnapshot {
            time: self.time,
            playing: self.playing,
            seeking: self.seeking,
            duration_secs: self.duration_secs,
            volume: self.volume,
            muted: self.muted,
            speed: self.speed,
            quality: self.quality,
            looping: self.looping,
            fullscreen: self.fullscreen,
        }
    }
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalized time stays in [0, 1); 1.0 itself is the slider maximum the
/// player never reports.
fn clamp_time(value: f64) -> f64 {
    value.clamp(0.0, 0.999_999)
}
