//! HTTP/SSE control interface for the review-room service

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{create_router, run, AppContext};
