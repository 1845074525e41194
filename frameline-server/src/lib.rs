//! # Frameline Review-Room Service
//!
//! One room per media resource: reviewers watch or listen together, leave
//! timestamped comment threads rendered as pins on the timeline, and see
//! each other's transport state. The service owns the playback session
//! state machine, the thread list and timeline, the highlight/skip
//! coordination channel, the composer contract, and the presence roster,
//! exposed over an HTTP/SSE control interface.

pub mod api;
pub mod catalog;
pub mod composer;
pub mod error;
pub mod presence;
pub mod session;
pub mod signal;
pub mod state;
pub mod threads;

pub use error::{Error, Result};
pub use state::SharedState;
