//! # Cadence Playback Queue (cadence-queue)
//!
//! Playback scheduling engine for the Cadence music player daemon.
//!
//! **Purpose:** Maintain the play queue — a dense item store with stable
//! identifiers, a parallel playback-order permutation, priority-aware
//! shuffling, and version stamps that let clients poll for changes.
//!
//! **Scope:** The engine performs no I/O. Audio output, the tag database,
//! playlist parsing, and the control protocol live in their own services
//! and consume this crate through [`Queue`].
//!
//! **Architecture:** Single-owner, synchronous. One logical actor (the
//! playback/control loop) owns the queue; external callers serialize
//! through a mutex of their own.

pub mod config;
pub mod error;
pub mod queue;
pub mod song;

pub use error::{Error, Result};
pub use queue::{next_order, Item, ModeFlags, Queue};
pub use song::SongHandle;
