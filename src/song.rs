//! Song handles and detached-copy semantics
//!
//! The queue never stores references into the library database. A
//! [`SongHandle`] records where its storage lives: handles that alias a
//! library record must be copied to a detached form (via [`SongHandle::detach`])
//! before they may be enqueued. Detached copies remember the library UUID
//! they were made from so callers can still correlate them with the library.

use serde::Serialize;
use uuid::Uuid;

/// Where a song handle's storage lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SongOrigin {
    /// The handle aliases a record in the library database
    Library {
        /// Library song UUID
        song_id: Uuid,
    },

    /// The handle owns its storage, independent of the database
    Detached {
        /// Library song UUID this copy was made from, if any
        library_id: Option<Uuid>,
    },
}

/// Reference to a song record
///
/// Carries the displayable metadata the queue hands to clients. Equality is
/// structural; content hashing is not required anywhere in the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongHandle {
    uri: String,
    origin: SongOrigin,

    /// Song title, if tagged
    pub title: Option<String>,

    /// Artist name, if tagged
    pub artist: Option<String>,

    /// Album name, if tagged
    pub album: Option<String>,

    /// Total duration in milliseconds, if known
    pub duration_ms: Option<u64>,
}

impl SongHandle {
    /// Create a handle aliasing a library database record
    pub fn library(song_id: Uuid, uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            origin: SongOrigin::Library { song_id },
            title: None,
            artist: None,
            album: None,
            duration_ms: None,
        }
    }

    /// Create a detached handle for a song outside the library
    /// (e.g. a stream URL or an ad-hoc local file)
    pub fn local(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            origin: SongOrigin::Detached { library_id: None },
            title: None,
            artist: None,
            album: None,
            duration_ms: None,
        }
    }

    /// Make a detached copy of this handle
    ///
    /// The copy owns its storage and may be enqueued. A copy of a library
    /// handle keeps the library UUID for correlation; copying an
    /// already-detached handle is a plain clone.
    pub fn detach(&self) -> SongHandle {
        let library_id = match self.origin {
            SongOrigin::Library { song_id } => Some(song_id),
            SongOrigin::Detached { library_id } => library_id,
        };

        SongHandle {
            uri: self.uri.clone(),
            origin: SongOrigin::Detached { library_id },
            title: self.title.clone(),
            artist: self.artist.clone(),
            album: self.album.clone(),
            duration_ms: self.duration_ms,
        }
    }

    /// Whether this handle owns its storage independent of the database
    pub fn is_detached(&self) -> bool {
        matches!(self.origin, SongOrigin::Detached { .. })
    }

    /// Library UUID of the underlying record, if any
    pub fn library_id(&self) -> Option<Uuid> {
        match self.origin {
            SongOrigin::Library { song_id } => Some(song_id),
            SongOrigin::Detached { library_id } => library_id,
        }
    }

    /// Song URI
    pub fn uri(&self) -> &str {
        &self.uri
    }
}
