//! Comment thread store, list filtering, and timeline pins
//!
//! The store is in-memory per room and insertion-ordered; durable
//! persistence is out of scope. The list contract is the interesting part:
//! filter by resource and resolution, then a **stable** ascending sort on
//! the raw time-percentage value, so threads with an unset anchor (`-1`
//! raw) sort first. Existing room data depends on that ordering; see
//! DESIGN.md before "fixing" it.

use frameline_common::model::{Resource, ThreadData};
use frameline_common::time::format_time;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Resolution filter for the thread list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum ResolutionFilter {
    #[default]
    All,
    Open,
    Resolved,
}

impl ResolutionFilter {
    fn matches(&self, thread: &ThreadData) -> bool {
        match self {
            ResolutionFilter::All => true,
            ResolutionFilter::Open => !thread.resolved,
            ResolutionFilter::Resolved => thread.resolved,
        }
    }
}

/// One pin on the player timeline
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePin {
    pub thread_id: Uuid,
    /// Horizontal position as a percentage of the timeline width
    pub offset_percent: f64,
    /// `m:ss` label shown in the preview tooltip
    pub time_label: String,
    /// Author of the first comment (resolved to a profile by the client)
    pub user_id: String,
    /// First comment body for the preview tooltip
    pub preview: String,
    /// The pin is currently lit by the highlight channel
    pub highlighted: bool,
}

/// One row of the thread-list response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadListEntry {
    #[serde(flatten)]
    pub thread: ThreadData,
    /// Jump affordance: only threads with a set timeline position on a
    /// timeline resource offer "jump to time"
    pub can_jump: bool,
    /// The row is currently lit by the highlight channel
    pub highlighted: bool,
}

/// Insertion-ordered thread storage for one room
#[derive(Debug, Default)]
pub struct ThreadStore {
    threads: RwLock<Vec<ThreadData>>,
}

impl ThreadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, thread: ThreadData) {
        self.threads.write().await.push(thread);
    }

    pub async fn get(&self, thread_id: Uuid) -> Option<ThreadData> {
        self.threads
            .read()
            .await
            .iter()
            .find(|t| t.id == thread_id)
            .cloned()
    }

    pub async fn all(&self) -> Vec<ThreadData> {
        self.threads.read().await.clone()
    }

    /// The ordered thread list for the side panel: only threads of this
    /// resource, filtered by resolution, stably sorted by raw percentage
    /// (ties keep arrival order; unset anchors sort first).
    pub async fn filtered(&self, resource_id: &str, filter: ResolutionFilter) -> Vec<ThreadData> {
        let mut result: Vec<ThreadData> = self
            .threads
            .read()
            .await
            .iter()
            .filter(|t| t.metadata.resource_id == resource_id && filter.matches(t))
            .cloned()
            .collect();

        // Vec::sort_by is stable, which the tie-break contract relies on
        result.sort_by(|a, b| {
            a.metadata
                .time_percentage
                .raw()
                .total_cmp(&b.metadata.time_percentage.raw())
        });
        result
    }

    /// Pins for the timeline overlay. Threads without an anchored time,
    /// without comments, or on resources that have no timeline produce no
    /// pin. Pins start unlit; the room marks the highlighted one from its
    /// trackers.
    pub async fn timeline_pins(&self, resource: &Resource) -> Vec<TimelinePin> {
        if !resource.kind.has_timeline() {
            return Vec::new();
        }

        self.threads
            .read()
            .await
            .iter()
            .filter(|t| t.metadata.resource_id == resource.id)
            .filter_map(|t| {
                let time = t.metadata.time.get()?;
                let offset = t.metadata.time_percentage.get()?;
                let root = t.root_comment()?;
                Some(TimelinePin {
                    thread_id: t.id,
                    offset_percent: offset,
                    time_label: format_time(time),
                    user_id: root.user_id.clone(),
                    preview: root.body.clone(),
                    highlighted: false,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frameline_common::model::{
        CommentData, ResourceKind, ThreadMetadata, TimeAnchor,
    };

    fn thread(resource_id: &str, percentage: f64, resolved: bool) -> ThreadData {
        ThreadData {
            id: Uuid::new_v4(),
            resolved,
            comments: vec![CommentData {
                id: Uuid::new_v4(),
                user_id: "user-1".to_string(),
                body: "Looks off here".to_string(),
                created_at: chrono::Utc::now(),
            }],
            metadata: ThreadMetadata {
                resource_id: resource_id.to_string(),
                resource_kind: ResourceKind::Video,
                time: TimeAnchor::new(if percentage < 0.0 { -1.0 } else { percentage / 4.0 }),
                time_percentage: TimeAnchor::new(percentage),
            },
        }
    }

    fn video_resource(id: &str) -> Resource {
        Resource {
            id: id.to_string(),
            url: "https://media.example.com/review/clip-01.mp4".to_string(),
            kind: ResourceKind::Video,
            name: "Clip".to_string(),
        }
    }

    #[tokio::test]
    async fn test_filtered_by_resource_id() {
        let store = ThreadStore::new();
        store.insert(thread("1", 10.0, false)).await;
        store.insert(thread("2", 20.0, false)).await;

        let result = store.filtered("1", ResolutionFilter::All).await;
        assert_eq!(result.len(), 1);
        assert!(result.iter().all(|t| t.metadata.resource_id == "1"));
    }

    #[tokio::test]
    async fn test_filtered_by_resolution() {
        let store = ThreadStore::new();
        store.insert(thread("1", 10.0, false)).await;
        store.insert(thread("1", 20.0, true)).await;

        let open = store.filtered("1", ResolutionFilter::Open).await;
        assert_eq!(open.len(), 1);
        assert!(!open[0].resolved);

        let resolved = store.filtered("1", ResolutionFilter::Resolved).await;
        assert_eq!(resolved.len(), 1);
        assert!(resolved[0].resolved);

        let all = store.filtered("1", ResolutionFilter::All).await;
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_sorted_ascending_unset_first() {
        let store = ThreadStore::new();
        store.insert(thread("1", 60.0, false)).await;
        store.insert(thread("1", -1.0, false)).await;
        store.insert(thread("1", 15.0, false)).await;

        let result = store.filtered("1", ResolutionFilter::All).await;
        let raws: Vec<f64> = result
            .iter()
            .map(|t| t.metadata.time_percentage.raw())
            .collect();
        // Raw -1 (unset) sorts before every real percentage
        assert_eq!(raws, vec![-1.0, 15.0, 60.0]);
    }

    #[tokio::test]
    async fn test_sort_is_stable_on_equal_percentages() {
        let store = ThreadStore::new();
        let first = thread("1", 42.0, false);
        let second = thread("1", 42.0, false);
        let first_id = first.id;
        let second_id = second.id;
        store.insert(first).await;
        store.insert(second).await;

        let result = store.filtered("1", ResolutionFilter::All).await;
        assert_eq!(result[0].id, first_id);
        assert_eq!(result[1].id, second_id);
    }

    #[tokio::test]
    async fn test_timeline_pin_placement() {
        let store = ThreadStore::new();
        let mut t = thread("1", 42.0, false);
        t.metadata.time = TimeAnchor::new(12.5);
        store.insert(t).await;

        let pins = store.timeline_pins(&video_resource("1")).await;
        assert_eq!(pins.len(), 1);
        assert_eq!(pins[0].offset_percent, 42.0);
        assert_eq!(pins[0].time_label, "0:12");
        assert_eq!(pins[0].preview, "Looks off here");
    }

    #[tokio::test]
    async fn test_timeline_excludes_unanchored_threads() {
        let store = ThreadStore::new();
        store.insert(thread("1", -1.0, false)).await;

        let mut no_comments = thread("1", 30.0, false);
        no_comments.comments.clear();
        store.insert(no_comments).await;

        let pins = store.timeline_pins(&video_resource("1")).await;
        assert!(pins.is_empty());
    }

    #[tokio::test]
    async fn test_timeline_empty_for_image_resource() {
        let store = ThreadStore::new();
        let mut t = thread("3", 42.0, false);
        t.metadata.resource_id = "3".to_string();
        store.insert(t).await;

        let image = Resource {
            id: "3".to_string(),
            url: "https://media.example.com/review/still-01.jpeg".to_string(),
            kind: ResourceKind::Image,
            name: "Still".to_string(),
        };
        assert!(store.timeline_pins(&image).await.is_empty());
    }
}
