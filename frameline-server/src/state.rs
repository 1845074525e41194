//! Shared state: the room registry and per-room orchestration
//!
//! A [`Room`] is created lazily per catalog resource and lives for the
//! process lifetime. It owns the playback session behind a RwLock, the
//! thread store, the signal hub, the presence roster, and the event bus the
//! SSE endpoint relays to clients. All mutation goes through room methods so
//! every state change is paired with its broadcast.

use std::collections::HashMap;
use std::sync::Arc;

use frameline_common::events::{EventBus, ParticipantInfo, ReviewEvent};
use frameline_common::model::{Quality, Resource, ThreadData, TransportSnapshot, UserInfo};
use frameline_common::time::now;
use tokio::sync::{broadcast, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::composer::{compose_thread, ThreadDraft};
use crate::error::{Error, Result};
use crate::presence::PresenceRoster;
use crate::session::{KeyCode, PlaybackSession, SeekRequest};
use crate::signal::{HighlightLane, HighlightTracker, PinSignal, SignalHub};
use crate::threads::{ResolutionFilter, ThreadListEntry, ThreadStore, TimelinePin};

/// One review room, keyed by its resource id
pub struct Room {
    pub resource: Resource,
    session: RwLock<PlaybackSession>,
    pub threads: ThreadStore,
    pub signals: SignalHub,
    pub roster: PresenceRoster,
    events: EventBus,
    /// Two trackers per thread (list row and pin) driving the
    /// `highlighted` flags in list and timeline responses
    trackers: RwLock<Vec<HighlightTracker>>,
}

impl Room {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            session: RwLock::new(PlaybackSession::new()),
            threads: ThreadStore::new(),
            signals: SignalHub::default(),
            roster: PresenceRoster::new(),
            events: EventBus::new(100),
            trackers: RwLock::new(Vec::new()),
        }
    }

    /// Subscribe to the room's event stream (SSE relay).
    pub fn subscribe_events(&self) -> broadcast::Receiver<ReviewEvent> {
        self.events.subscribe()
    }

    /// Playback control makes no sense on resources without a timeline.
    fn require_timeline(&self) -> Result<()> {
        if self.resource.kind.has_timeline() {
            Ok(())
        } else {
            Err(Error::Unsupported(format!(
                "Resource {} is an image and has no timeline",
                self.resource.id
            )))
        }
    }

    // ------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------

    pub async fn transport(&self) -> TransportSnapshot {
        self.session.read().await.snapshot()
    }

    pub async fn set_playing(&self, playing: bool) -> Result<()> {
        self.require_timeline()?;
        let mut session = self.session.write().await;
        session.set_playing(playing);
        self.emit_state(&session);
        Ok(())
    }

    pub async fn toggle_playing(&self) -> Result<bool> {
        self.require_timeline()?;
        let mut session = self.session.write().await;
        session.toggle_playing();
        self.emit_state(&session);
        Ok(session.is_playing())
    }

    /// Progress tick from the playback backend. Stale or scrub-suspended
    /// ticks are dropped; applied ticks are broadcast as position updates.
    pub async fn report_progress(&self, played: f64) -> Result<bool> {
        self.require_timeline()?;
        let mut session = self.session.write().await;
        let applied = session.handle_progress(played);
        if applied {
            let snap = session.snapshot();
            self.events.emit_lossy(ReviewEvent::PlaybackPosition {
                time: snap.time,
                duration_secs: snap.duration_secs,
                playing: snap.playing,
                timestamp: now(),
            });
        }
        Ok(applied)
    }

    pub async fn report_duration(&self, duration_secs: f64) -> Result<()> {
        self.require_timeline()?;
        self.session.write().await.set_duration(duration_secs);
        Ok(())
    }

    pub async fn report_ended(&self) -> Result<()> {
        self.require_timeline()?;
        let mut session = self.session.write().await;
        session.handle_ended();
        self.emit_state(&session);
        Ok(())
    }

    pub async fn scrub(&self, value: f64) -> Result<()> {
        self.require_timeline()?;
        let mut session = self.session.write().await;
        session.scrub(value);
        self.emit_state(&session);
        Ok(())
    }

    pub async fn scrub_commit(&self, value: f64) -> Result<SeekRequest> {
        self.require_timeline()?;
        let mut session = self.session.write().await;
        let seek = session.scrub_commit(value);
        self.emit_state(&session);
        Ok(seek)
    }

    /// Jump to a timeline percentage and tell every mounted view about it.
    pub async fn skip_to(&self, percentage: f64) -> Result<SeekRequest> {
        self.require_timeline()?;
        let mut session = self.session.write().await;
        let seek = session.skip_to_percentage(percentage)?;

        self.signals.emit(PinSignal::SkipTo { percentage });
        self.events.emit_lossy(ReviewEvent::SkipTo {
            percentage,
            timestamp: now(),
        });
        self.emit_state(&session);
        Ok(seek)
    }

    pub async fn set_volume(&self, volume: f64) -> Result<()> {
        self.require_timeline()?;
        let mut session = self.session.write().await;
        session.set_volume(volume);
        self.emit_volume(&session);
        Ok(())
    }

    pub async fn toggle_mute(&self) -> Result<bool> {
        self.require_timeline()?;
        let mut session = self.session.write().await;
        session.toggle_mute();
        self.emit_volume(&session);
        Ok(session.snapshot().muted)
    }

    pub async fn toggle_loop(&self) -> Result<bool> {
        self.require_timeline()?;
        let mut session = self.session.write().await;
        session.toggle_loop();
        Ok(session.snapshot().looping)
    }

    pub async fn toggle_fullscreen(&self) -> Result<bool> {
        self.require_timeline()?;
        let mut session = self.session.write().await;
        Ok(session.toggle_fullscreen())
    }

    pub async fn set_fullscreen_supported(&self, supported: bool) -> Result<()> {
        self.require_timeline()?;
        self.session.write().await.set_fullscreen_supported(supported);
        Ok(())
    }

    pub async fn set_speed(&self, speed: f64) -> Result<()> {
        self.require_timeline()?;
        let mut session = self.session.write().await;
        session.set_speed(speed)?;
        self.events.emit_lossy(ReviewEvent::SpeedChanged {
            speed,
            timestamp: now(),
        });
        Ok(())
    }

    pub async fn set_quality(&self, quality: Quality) -> Result<()> {
        self.require_timeline()?;
        let mut session = self.session.write().await;
        session.set_quality(quality);
        self.events.emit_lossy(ReviewEvent::QualityChanged {
            quality,
            timestamp: now(),
        });
        Ok(())
    }

    /// Document-level shortcut. Broadcasts whatever the key changed.
    pub async fn handle_key(&self, key: KeyCode) -> Result<()> {
        self.require_timeline()?;
        let mut session = self.session.write().await;
        let before = session.snapshot();
        session.handle_key(key);
        let after = session.snapshot();

        if before.playing != after.playing {
            self.emit_state(&session);
        }
        if before.volume != after.volume || before.muted != after.muted {
            self.emit_volume(&session);
        }
        Ok(())
    }

    fn emit_state(&self, session: &PlaybackSession) {
        let snap = session.snapshot();
        self.events.emit_lossy(ReviewEvent::PlaybackStateChanged {
            playing: snap.playing,
            seeking: snap.seeking,
            timestamp: now(),
        });
    }

    fn emit_volume(&self, session: &PlaybackSession) {
        let snap = session.snapshot();
        self.events.emit_lossy(ReviewEvent::VolumeChanged {
            volume: snap.volume,
            muted: snap.muted,
            timestamp: now(),
        });
    }

    // ------------------------------------------------------------------
    // Threads and composer
    // ------------------------------------------------------------------

    pub async fn thread_list(&self, filter: ResolutionFilter) -> Vec<ThreadListEntry> {
        let highlighted = self.highlighted_in(HighlightLane::Thread).await;
        self.threads
            .filtered(&self.resource.id, filter)
            .await
            .into_iter()
            .map(|thread| ThreadListEntry {
                can_jump: thread.metadata.has_timeline_position(),
                highlighted: highlighted == Some(thread.id),
                thread,
            })
            .collect()
    }

    pub async fn timeline_pins(&self) -> Vec<TimelinePin> {
        let highlighted = self.highlighted_in(HighlightLane::Pin).await;
        let mut pins = self.threads.timeline_pins(&self.resource).await;
        for pin in pins.iter_mut() {
            pin.highlighted = highlighted == Some(pin.thread_id);
        }
        pins
    }

    /// Composer submit: capture time metadata under the same lock that the
    /// transport mutates, then store and broadcast the new thread.
    pub async fn create_thread(&self, draft: ThreadDraft) -> ThreadData {
        let thread = {
            let session = self.session.read().await;
            compose_thread(&draft, &self.resource, &session)
        };

        self.threads.insert(thread.clone()).await;
        {
            let mut trackers = self.trackers.write().await;
            trackers.push(HighlightTracker::new(thread.id, HighlightLane::Thread));
            trackers.push(HighlightTracker::new(thread.id, HighlightLane::Pin));
        }
        self.events.emit_lossy(ReviewEvent::ThreadCreated {
            thread: thread.clone(),
            timestamp: now(),
        });
        thread
    }

    /// Composer focus pauses playback and suppresses shortcuts while typing.
    pub async fn composer_focus(&self) {
        let mut session = self.session.write().await;
        session.set_playing(false);
        session.set_typing(true);
        self.emit_state(&session);
    }

    pub async fn composer_blur(&self) {
        self.session.write().await.set_typing(false);
    }

    // ------------------------------------------------------------------
    // Highlight signals
    // ------------------------------------------------------------------

    /// Pin hovered or clicked: highlight its thread in the list.
    pub async fn highlight_thread(&self, thread_id: Uuid) -> Result<()> {
        self.require_known_thread(thread_id).await?;
        let signal = PinSignal::HighlightThread { thread_id };
        self.apply_signal(signal).await;
        self.signals.emit(signal);
        self.events.emit_lossy(ReviewEvent::HighlightThread {
            thread_id,
            timestamp: now(),
        });
        Ok(())
    }

    /// Thread hovered: highlight its pin on the timeline.
    pub async fn highlight_pin(&self, thread_id: Uuid) -> Result<()> {
        self.require_known_thread(thread_id).await?;
        let signal = PinSignal::HighlightPin { thread_id };
        self.apply_signal(signal).await;
        self.signals.emit(signal);
        self.events.emit_lossy(ReviewEvent::HighlightPin {
            thread_id,
            timestamp: now(),
        });
        Ok(())
    }

    pub async fn reset_highlights(&self) {
        self.apply_signal(PinSignal::ResetHighlights).await;
        self.signals.emit(PinSignal::ResetHighlights);
        self.events.emit_lossy(ReviewEvent::HighlightsReset { timestamp: now() });
    }

    /// Run one signal through the room's trackers: observe, then settle the
    /// deferred half of the pulse.
    async fn apply_signal(&self, signal: PinSignal) {
        let mut trackers = self.trackers.write().await;
        for tracker in trackers.iter_mut() {
            tracker.observe(signal);
            tracker.settle();
        }
    }

    /// The thread currently highlighted in the given lane, if any.
    async fn highlighted_in(&self, lane: HighlightLane) -> Option<Uuid> {
        self.trackers
            .read()
            .await
            .iter()
            .find(|t| t.lane() == lane && t.is_highlighted())
            .map(|t| t.thread_id())
    }

    async fn require_known_thread(&self, thread_id: Uuid) -> Result<()> {
        self.threads
            .get(thread_id)
            .await
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("Thread {}", thread_id)))
    }

    // ------------------------------------------------------------------
    // Presence
    // ------------------------------------------------------------------

    pub async fn presence_join(&self, user: UserInfo) -> Uuid {
        let connection_id = self.roster.join(user).await;
        self.emit_roster().await;
        connection_id
    }

    pub async fn presence_leave(&self, connection_id: Uuid) -> Result<()> {
        self.roster.leave(connection_id).await?;
        self.emit_roster().await;
        Ok(())
    }

    /// Refresh a connection's presence from the transport state (seeking
    /// wins over playing/paused).
    pub async fn presence_sync(&self, connection_id: Uuid) -> Result<()> {
        let status = self.session.read().await.presence_status();
        self.roster.update_status(connection_id, status).await?;
        self.emit_roster().await;
        Ok(())
    }

    pub async fn presence_snapshot(&self) -> Vec<ParticipantInfo> {
        self.roster.snapshot().await
    }

    async fn emit_roster(&self) {
        self.events.emit_lossy(ReviewEvent::PresenceChanged {
            roster: self.roster.snapshot().await,
            timestamp: now(),
        });
    }

    /// Full snapshot for newly connected SSE clients.
    pub async fn initial_state(&self) -> ReviewEvent {
        ReviewEvent::InitialState {
            resource: self.resource.clone(),
            transport: self.transport().await,
            threads: self.threads.all().await,
            roster: self.roster.snapshot().await,
            timestamp: now(),
        }
    }
}

/// Shared state accessible by all handlers
pub struct SharedState {
    pub catalog: Catalog,
    rooms: RwLock<HashMap<String, Arc<Room>>>,
}

impl SharedState {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Get or lazily create the room for a catalog resource. Unknown ids
    /// are a not-found error, never a silent room creation.
    pub async fn room(&self, resource_id: &str) -> Result<Arc<Room>> {
        if let Some(room) = self.rooms.read().await.get(resource_id) {
            return Ok(Arc::clone(room));
        }

        let resource = self.catalog.get(resource_id)?.clone();
        let mut rooms = self.rooms.write().await;
        // Double-checked: another task may have created it between locks
        let room = rooms
            .entry(resource.id.clone())
            .or_insert_with(|| {
                info!(resource_id = %resource.id, kind = %resource.kind, "Opening review room");
                Arc::new(Room::new(resource))
            });
        Ok(Arc::clone(room))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frameline_common::model::ResourceKind;

    fn shared() -> SharedState {
        SharedState::new(Catalog::demo())
    }

    #[tokio::test]
    async fn test_room_lazily_created_once() {
        let state = shared();
        let a = state.room("1").await.unwrap();
        let b = state.room("1").await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(state.room("missing").await.is_err());
    }

    #[tokio::test]
    async fn test_playback_rejected_on_image_room() {
        let state = shared();
        let room = state.room("3").await.unwrap();
        assert_eq!(room.resource.kind, ResourceKind::Image);

        assert!(matches!(
            room.set_playing(true).await,
            Err(Error::Unsupported(_))
        ));
        assert!(room.skip_to(42.0).await.is_err());
    }

    #[tokio::test]
    async fn test_skip_to_broadcasts_signal_and_event() {
        let state = shared();
        let room = state.room("1").await.unwrap();
        room.report_duration(25.0).await.unwrap();

        let mut signals = room.signals.subscribe();
        let mut events = room.subscribe_events();

        let seek = room.skip_to(42.0).await.unwrap();
        assert_eq!(seek.to, 0.42);

        assert_eq!(
            signals.recv().await.unwrap(),
            PinSignal::SkipTo { percentage: 42.0 }
        );

        let event = events.recv().await.unwrap();
        assert_eq!(event.event_type(), "SkipTo");
    }

    #[tokio::test]
    async fn test_create_thread_attaches_current_time() {
        let state = shared();
        let room = state.room("1").await.unwrap();
        room.report_duration(25.0).await.unwrap();
        room.report_progress(0.42).await.unwrap();

        let thread = room
            .create_thread(ThreadDraft {
                body: "Check this frame".to_string(),
                user_id: "user-1".to_string(),
                attach_time: true,
            })
            .await;

        assert!((thread.metadata.time_percentage.get().unwrap() - 42.0).abs() < 1e-9);
        assert_eq!(room.thread_list(ResolutionFilter::All).await.len(), 1);
        assert_eq!(room.timeline_pins().await.len(), 1);
    }

    #[tokio::test]
    async fn test_highlight_requires_known_thread() {
        let state = shared();
        let room = state.room("1").await.unwrap();
        assert!(room.highlight_thread(Uuid::new_v4()).await.is_err());
    }

    #[tokio::test]
    async fn test_thread_list_carries_jump_and_highlight_flags() {
        let state = shared();
        let room = state.room("1").await.unwrap();
        room.report_duration(25.0).await.unwrap();
        room.report_progress(0.42).await.unwrap();

        let anchored = room
            .create_thread(ThreadDraft {
                body: "Color shift".to_string(),
                user_id: "user-1".to_string(),
                attach_time: true,
            })
            .await;
        room.create_thread(ThreadDraft {
            body: "General note".to_string(),
            user_id: "user-2".to_string(),
            attach_time: false,
        })
        .await;

        // Unanchored thread sorts first and offers no jump
        let list = room.thread_list(ResolutionFilter::All).await;
        assert!(!list[0].can_jump);
        assert!(list[1].can_jump);
        assert!(list.iter().all(|e| !e.highlighted));

        room.highlight_thread(anchored.id).await.unwrap();
        let lit: Vec<bool> = room
            .thread_list(ResolutionFilter::All)
            .await
            .iter()
            .map(|e| e.highlighted)
            .collect();
        assert_eq!(lit, vec![false, true]);

        // Repeated highlight pulses; it does not toggle off
        room.highlight_thread(anchored.id).await.unwrap();
        assert!(room.thread_list(ResolutionFilter::All).await[1].highlighted);

        room.reset_highlights().await;
        let list = room.thread_list(ResolutionFilter::All).await;
        assert!(list.iter().all(|e| !e.highlighted));
    }

    #[tokio::test]
    async fn test_highlight_lanes_light_list_and_pins_independently() {
        let state = shared();
        let room = state.room("1").await.unwrap();
        room.report_duration(25.0).await.unwrap();
        room.report_progress(0.42).await.unwrap();

        let thread = room
            .create_thread(ThreadDraft {
                body: "Check this frame".to_string(),
                user_id: "user-1".to_string(),
                attach_time: true,
            })
            .await;

        room.highlight_pin(thread.id).await.unwrap();
        assert!(room.timeline_pins().await[0].highlighted);
        // The list lane is untouched by a pin highlight
        assert!(!room.thread_list(ResolutionFilter::All).await[0].highlighted);
    }

    #[tokio::test]
    async fn test_composer_focus_pauses() {
        let state = shared();
        let room = state.room("1").await.unwrap();
        room.report_duration(25.0).await.unwrap();
        room.set_playing(true).await.unwrap();

        room.composer_focus().await;
        let snap = room.transport().await;
        assert!(!snap.playing);

        // Shortcuts are dead while typing
        room.handle_key(KeyCode::Space).await.unwrap();
        assert!(!room.transport().await.playing);

        room.composer_blur().await;
        room.handle_key(KeyCode::Space).await.unwrap();
        assert!(room.transport().await.playing);
    }

    #[tokio::test]
    async fn test_presence_sync_follows_transport() {
        let state = shared();
        let room = state.room("2").await.unwrap();
        room.report_duration(170.0).await.unwrap();

        let user = UserInfo {
            name: "ada".to_string(),
            avatar: "https://avatars.example.com/ada.png".to_string(),
        };
        let conn = room.presence_join(user).await;

        room.set_playing(true).await.unwrap();
        room.presence_sync(conn).await.unwrap();
        assert_eq!(
            room.presence_snapshot().await[0].status,
            frameline_common::model::PresenceStatus::Playing
        );

        room.scrub(0.5).await.unwrap();
        room.presence_sync(conn).await.unwrap();
        assert_eq!(
            room.presence_snapshot().await[0].status,
            frameline_common::model::PresenceStatus::Seeking
        );
    }
}
