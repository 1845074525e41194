//! # Frameline Common Library
//!
//! Shared code for the frameline review-room service:
//! - Model types (resources, threads, transport snapshots)
//! - Event types (ReviewEvent enum) and the EventBus
//! - Configuration loading
//! - Utility functions (time formatting)

pub mod config;
pub mod error;
pub mod events;
pub mod model;
pub mod time;

pub use error::{Error, Result};
pub use events::{EventBus, ReviewEvent};
