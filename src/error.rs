//! Error types for cadence-queue
//!
//! Defines module-specific error types using thiserror for clear error
//! propagation.
//!
//! Only recoverable conditions are represented here. Out-of-range positions,
//! orders, or identifiers are bugs in the caller: those are guarded with
//! `debug_assert!` and panic instead of returning an error.

use thiserror::Error;

/// Main error type for the queue engine
#[derive(Error, Debug)]
pub enum Error {
    /// Append refused because the queue is at capacity
    ///
    /// Recoverable: the caller may delete entries or reject the request.
    #[error("queue is full (capacity {capacity})")]
    QueueFull {
        capacity: usize,
    },

    /// Song ownership violation
    ///
    /// The handle still aliases a record owned by the library database.
    /// Enqueueing is refused before any queue state is touched.
    #[error("song is still attached to the library database: {uri}")]
    AttachedSong {
        uri: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience Result type using the cadence-queue Error
pub type Result<T> = std::result::Result<T, Error>;
