//! Server-Sent Events (SSE) broadcaster
//!
//! Streams room events to connected review clients. Each new connection
//! first receives an `InitialState` snapshot, then the live event stream;
//! events emitted before the subscription are never replayed.

use crate::api::server::AppContext;
use crate::error::Result;
use axum::{
    extract::{Path, State},
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use frameline_common::events::ReviewEvent;

/// GET /rooms/:id/events - SSE event stream
pub async fn event_stream(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let room = ctx.state.room(&id).await?;
    debug!(room = %id, "New SSE client connected");

    // Subscribe before snapshotting so nothing falls between the two
    let rx = room.subscribe_events();
    let initial = room.initial_state().await;

    let stream = async_stream::stream! {
        if let Some(event) = encode(&initial) {
            yield Ok(event);
        }

        let mut live = BroadcastStream::new(rx);
        while let Some(result) = live.next().await {
            match result {
                Ok(event) => {
                    if let Some(event) = encode(&event) {
                        yield Ok(event);
                    }
                }
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    // Slow client: drop and keep streaming
                    warn!(skipped, "SSE client lagged behind event stream");
                }
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}

/// Serialize one event for the wire; serialization failures are logged and
/// the event skipped rather than tearing the stream down.
fn encode(event: &ReviewEvent) -> Option<Event> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Event::default().event(event.event_type()).data(json)),
        Err(e) => {
            warn!("Failed to serialize event: {}", e);
            None
        }
    }
}
