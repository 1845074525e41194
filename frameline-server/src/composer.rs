//! Comment composer
//!
//! Packages a submitted comment body into a new thread with resource and
//! time metadata. The time fields are read synchronously from the session
//! at submit time, and only when the attach-time toggle is on, the resource
//! has a timeline, and the player is ready. In every other case both fields
//! stay unset and the submission proceeds anyway.

use frameline_common::model::{
    CommentData, Resource, ThreadData, ThreadMetadata, TimeAnchor,
};
use frameline_common::time::now;
use serde::Deserialize;
use uuid::Uuid;

use crate::session::PlaybackSession;

/// A comment submission from the composer form
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadDraft {
    pub body: String,
    pub user_id: String,
    /// The "attach current time" checkbox
    #[serde(default = "default_attach_time")]
    pub attach_time: bool,
}

fn default_attach_time() -> bool {
    true
}

/// Build the new thread for a draft, capturing playback time at submit.
pub fn compose_thread(
    draft: &ThreadDraft,
    resource: &Resource,
    session: &PlaybackSession,
) -> ThreadData {
    let (time, time_percentage) = capture_anchor(draft.attach_time, resource, session);

    ThreadData {
        id: Uuid::new_v4(),
        resolved: false,
        comments: vec![CommentData {
            id: Uuid::new_v4(),
            user_id: draft.user_id.clone(),
            body: draft.body.clone(),
            created_at: now(),
        }],
        metadata: ThreadMetadata {
            resource_id: resource.id.clone(),
            resource_kind: resource.kind,
            time,
            time_percentage,
        },
    }
}

/// The attach-time rules: unset unless the toggle is on, the resource has a
/// timeline, and the player reports a percentage. An unready player means
/// "do not attach a time".
fn capture_anchor(
    attach_time: bool,
    resource: &Resource,
    session: &PlaybackSession,
) -> (TimeAnchor, TimeAnchor) {
    if !attach_time || !resource.kind.has_timeline() {
        return (TimeAnchor::UNSET, TimeAnchor::UNSET);
    }

    match session.current_percentage() {
        Some(percentage) => (
            TimeAnchor::new(session.time_secs()),
            TimeAnchor::new(percentage),
        ),
        None => (TimeAnchor::UNSET, TimeAnchor::UNSET),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frameline_common::model::ResourceKind;

    fn video() -> Resource {
        Resource {
            id: "1".to_string(),
            url: "https://media.example.com/review/clip-01.mp4".to_string(),
            kind: ResourceKind::Video,
            name: "Clip".to_string(),
        }
    }

    fn image() -> Resource {
        Resource {
            id: "3".to_string(),
            url: "https://media.example.com/review/still-01.jpeg".to_string(),
            kind: ResourceKind::Image,
            name: "Still".to_string(),
        }
    }

    fn draft(attach_time: bool) -> ThreadDraft {
        ThreadDraft {
            body: "The color grade shifts here".to_string(),
            user_id: "user-1".to_string(),
            attach_time,
        }
    }

    #[test]
    fn test_attach_time_captures_both_fields() {
        let mut session = PlaybackSession::new();
        session.set_duration(25.0);
        session.handle_progress(0.42);

        let thread = compose_thread(&draft(true), &video(), &session);
        assert!((thread.metadata.time.get().unwrap() - 10.5).abs() < 1e-9);
        assert!((thread.metadata.time_percentage.get().unwrap() - 42.0).abs() < 1e-9);
        assert!(!thread.resolved);
        assert_eq!(thread.comments.len(), 1);
        assert_eq!(thread.comments[0].body, "The color grade shifts here");
    }

    #[test]
    fn test_toggle_off_always_submits_unset() {
        let mut session = PlaybackSession::new();
        session.set_duration(25.0);
        session.handle_progress(0.42);

        let thread = compose_thread(&draft(false), &video(), &session);
        assert_eq!(thread.metadata.time, TimeAnchor::UNSET);
        assert_eq!(thread.metadata.time_percentage, TimeAnchor::UNSET);
    }

    #[test]
    fn test_unready_player_does_not_attach() {
        // No duration reported yet: current_percentage() is None
        let session = PlaybackSession::new();

        let thread = compose_thread(&draft(true), &video(), &session);
        assert_eq!(thread.metadata.time, TimeAnchor::UNSET);
        assert_eq!(thread.metadata.time_percentage, TimeAnchor::UNSET);
    }

    #[test]
    fn test_image_resource_never_attaches() {
        let mut session = PlaybackSession::new();
        session.set_duration(25.0);
        session.handle_progress(0.42);

        let thread = compose_thread(&draft(true), &image(), &session);
        assert_eq!(thread.metadata.time_percentage, TimeAnchor::UNSET);
        assert_eq!(thread.metadata.resource_kind, ResourceKind::Image);
    }

    #[test]
    fn test_wire_shape_of_unset_fields() {
        let session = PlaybackSession::new();
        let thread = compose_thread(&draft(false), &video(), &session);

        let json = serde_json::to_value(&thread.metadata).unwrap();
        assert_eq!(json["time"], -1.0);
        assert_eq!(json["timePercentage"], -1.0);
    }
}
