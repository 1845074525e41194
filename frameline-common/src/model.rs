//! Core model types for the review-room service
//!
//! Thread metadata keeps the wire shape the stored comments already use
//! (camelCase keys, `-1` for unset time fields) so existing room data stays
//! readable. Inside the process the `-1` sentinel becomes [`TimeAnchor`],
//! an optional value that cannot be compared against by accident.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Kind of media a resource holds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Video,
    Audio,
    Image,
}

impl ResourceKind {
    /// Image resources have no timeline, so threads on them never carry a
    /// playback position.
    pub fn has_timeline(&self) -> bool {
        !matches!(self, ResourceKind::Image)
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Video => write!(f, "video"),
            ResourceKind::Audio => write!(f, "audio"),
            ResourceKind::Image => write!(f, "image"),
        }
    }
}

/// A reviewable media item from the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    pub id: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub name: String,
}

/// Playback time expressed two ways at once: seconds elapsed and percentage
/// of total duration. Unset on the wire is `-1` for both fields.
///
/// `None` means "no position attached" (image resource, attach-time off, or
/// the player was not ready at submit time).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeAnchor(Option<f64>);

impl TimeAnchor {
    pub const UNSET: TimeAnchor = TimeAnchor(None);

    /// Anchor at a concrete value. Negative input collapses to unset.
    pub fn new(value: f64) -> Self {
        if value < 0.0 {
            TimeAnchor(None)
        } else {
            TimeAnchor(Some(value))
        }
    }

    pub fn get(&self) -> Option<f64> {
        self.0
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    /// Raw wire value: the stored number, or `-1` when unset.
    ///
    /// The thread-list sort compares raw values, which places unset anchors
    /// first. Kept on purpose; see DESIGN.md.
    pub fn raw(&self) -> f64 {
        self.0.unwrap_or(-1.0)
    }
}

impl From<Option<f64>> for TimeAnchor {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) => TimeAnchor::new(v),
            None => TimeAnchor::UNSET,
        }
    }
}

impl Serialize for TimeAnchor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.raw())
    }
}

impl<'de> Deserialize<'de> for TimeAnchor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Ok(TimeAnchor::new(value))
    }
}

/// Metadata attached to every comment thread
///
/// `time` is seconds elapsed, `time_percentage` is 0-100 of total duration.
/// A thread belongs to exactly one resource via `resource_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThreadMetadata {
    pub resource_id: String,
    #[serde(rename = "resourceType")]
    pub resource_kind: ResourceKind,
    pub time: TimeAnchor,
    pub time_percentage: TimeAnchor,
}

impl ThreadMetadata {
    /// Whether this thread can offer a "jump to time" affordance.
    pub fn has_timeline_position(&self) -> bool {
        self.time_percentage.is_set() && self.resource_kind.has_timeline()
    }
}

/// A single comment inside a thread
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommentData {
    pub id: Uuid,
    pub user_id: String,
    pub body: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A comment thread anchored to a resource, optionally to a playback time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThreadData {
    pub id: Uuid,
    pub resolved: bool,
    pub comments: Vec<CommentData>,
    pub metadata: ThreadMetadata,
}

impl ThreadData {
    /// First comment of the thread, used for pin previews.
    pub fn root_comment(&self) -> Option<&CommentData> {
        self.comments.first()
    }
}

/// Reviewer info shown in the presence strip
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    pub name: String,
    pub avatar: String,
}

/// Transport activity broadcast to other reviewers in the room
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Playing,
    Paused,
    Seeking,
}

impl std::fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PresenceStatus::Playing => write!(f, "playing"),
            PresenceStatus::Paused => write!(f, "paused"),
            PresenceStatus::Seeking => write!(f, "seeking"),
        }
    }
}

/// Playback rate options offered by the speed menu
pub const SPEED_OPTIONS: [f64; 6] = [0.5, 0.75, 1.0, 1.5, 1.75, 2.0];

/// Rendition options offered by the quality menu
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Quality {
    #[default]
    Auto,
    #[serde(rename = "180p")]
    Q180,
    #[serde(rename = "540p")]
    Q540,
    #[serde(rename = "720p")]
    Q720,
    #[serde(rename = "1080p")]
    Q1080,
}

impl Quality {
    pub const OPTIONS: [Quality; 5] = [
        Quality::Auto,
        Quality::Q180,
        Quality::Q540,
        Quality::Q720,
        Quality::Q1080,
    ];
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quality::Auto => write!(f, "Auto"),
            Quality::Q180 => write!(f, "180p"),
            Quality::Q540 => write!(f, "540p"),
            Quality::Q720 => write!(f, "720p"),
            Quality::Q1080 => write!(f, "1080p"),
        }
    }
}

/// Full transport state of a room's player, as reported over the API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransportSnapshot {
    /// Normalized position, 0.0 to just under 1.0
    pub time: f64,
    pub playing: bool,
    pub seeking: bool,
    pub duration_secs: f64,
    pub volume: f64,
    pub muted: bool,
    pub speed: f64,
    pub quality: Quality,
    pub looping: bool,
    pub fullscreen: bool,
}
