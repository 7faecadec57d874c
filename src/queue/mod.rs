//! Play queue core
//!
//! The queue keeps two interlocking views of the same songs:
//!
//! - **position**: the user-visible ordering (`items[position]`), used for
//!   display and index-based edits;
//! - **order**: the playback permutation (`order[k]` is the position that
//!   plays at ordinal `k`). In non-random mode the permutation starts as the
//!   identity; in random mode it is shuffled under priority-group rules.
//!
//! Every mutation must repair both views plus the identifier table, and
//! stamp touched items with the version counter so polling clients can
//! detect changes without diffs.
//!
//! **Concurrency:** single-threaded cooperative. The queue is owned by one
//! logical actor (the playback/control loop); multi-threaded callers must
//! serialize access through their own mutex.

mod id_table;
mod lazy_rng;
mod priority;
mod selector;

pub use id_table::HASH_MULT;
pub use selector::{next_order, ModeFlags};

use crate::config::QueueConfig;
use crate::error::{Error, Result};
use crate::song::SongHandle;
use id_table::IdTable;
use lazy_rng::LazyRng;
use rand::Rng;
use tracing::debug;

/// Ceiling for the version counter
///
/// Stamps must stay representable as positive signed 32-bit integers on the
/// wire, so the counter wraps at 2^31 - 1: all stamps reset to 0 and the
/// counter restarts at 1, keeping remembered values strictly "older".
const VERSION_MAX: u32 = (1 << 31) - 1;

/// A single queue slot
///
/// Owns its song exclusively; dropping the item releases the song.
#[derive(Debug, Clone)]
pub struct Item {
    song: SongHandle,
    id: u32,
    version: u32,
    priority: u8,
}

impl Item {
    /// The detached song this slot owns
    pub fn song(&self) -> &SongHandle {
        &self.song
    }

    /// Stable identifier, assigned at append and kept across moves
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Version stamp written when the item was created or last touched
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Priority byte; higher plays sooner under random mode
    pub fn priority(&self) -> u8 {
        self.priority
    }
}

/// The play queue
///
/// All arrays are sized for `max_length` at construction and never
/// reallocated.
#[derive(Debug)]
pub struct Queue {
    max_length: usize,
    items: Vec<Item>,
    order: Vec<usize>,
    ids: IdTable,
    version: u32,
    flags: ModeFlags,
    rng: LazyRng,
}

impl Queue {
    /// Create an empty queue holding at most `max_length` songs
    pub fn new(max_length: usize) -> Self {
        assert!(max_length > 0, "queue capacity must be positive");

        Self {
            max_length,
            items: Vec::with_capacity(max_length),
            order: Vec::with_capacity(max_length),
            ids: IdTable::new(max_length),
            version: 1,
            flags: ModeFlags::default(),
            rng: LazyRng::new(),
        }
    }

    /// Create a queue from a validated configuration
    pub fn with_config(config: &QueueConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.max_length))
    }

    // --- queries ---

    /// Number of songs currently queued
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.max_length
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.max_length
    }

    /// Current value of the version counter
    ///
    /// Any item whose stamp is >= a caller's last-seen counter has been
    /// touched since that read.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Current mode flags
    pub fn flags(&self) -> ModeFlags {
        self.flags
    }

    /// Item at a user-visible position
    pub fn get(&self, position: usize) -> &Item {
        &self.items[position]
    }

    /// Item at a playback ordinal
    pub fn get_order(&self, order: usize) -> &Item {
        &self.items[self.order[order]]
    }

    /// Position that plays at the given ordinal
    pub fn order_to_position(&self, order: usize) -> usize {
        self.order[order]
    }

    /// Playback ordinal of the given position
    pub fn position_to_order(&self, position: usize) -> usize {
        debug_assert!(position < self.len());
        self.order
            .iter()
            .position(|&p| p == position)
            .expect("order array references every live position")
    }

    /// Stable identifier of the item at a position
    pub fn position_to_id(&self, position: usize) -> u32 {
        self.items[position].id
    }

    /// Current position of an identifier, or None if it is not queued
    pub fn id_to_position(&self, id: u32) -> Option<usize> {
        self.ids.lookup(id)
    }

    pub fn contains_id(&self, id: u32) -> bool {
        self.ids.lookup(id).is_some()
    }

    /// Which ordinal plays after `order`, under the current mode flags.
    /// None means end of queue.
    pub fn next_order(&self, order: usize) -> Option<usize> {
        selector::next_order(self.flags, self.items.len(), order)
    }

    // --- mode flags ---

    pub fn set_repeat(&mut self, value: bool) {
        self.flags.repeat = value;
        debug!(repeat = value, "mode changed");
    }

    pub fn set_single(&mut self, value: bool) {
        self.flags.single = value;
        debug!(single = value, "mode changed");
    }

    pub fn set_consume(&mut self, value: bool) {
        self.flags.consume = value;
        debug!(consume = value, "mode changed");
    }

    pub fn set_random(&mut self, value: bool) {
        self.flags.random = value;
        debug!(random = value, "mode changed");
    }

    // --- version stamping ---

    /// Bump the version counter, handling the 31-bit wrap
    fn increment_version(&mut self) {
        self.version += 1;

        if self.version >= VERSION_MAX {
            for item in &mut self.items {
                item.version = 0;
            }
            self.version = 1;
        }
    }

    /// Mark the item at a playback ordinal as modified
    pub fn modify_at_order(&mut self, order: usize) {
        debug_assert!(order < self.len());
        let position = self.order[order];
        self.items[position].version = self.version;
        self.increment_version();
    }

    /// Mark every item as modified
    pub fn modify_all(&mut self) {
        for item in &mut self.items {
            item.version = self.version;
        }
        self.increment_version();
    }

    // --- mutations ---

    /// Append a detached copy of `song` at the end of the queue
    ///
    /// The new item receives a fresh identifier, the current version stamp,
    /// and the given priority. Returns the identifier.
    pub fn append(&mut self, song: &SongHandle, priority: u8) -> Result<u32> {
        if self.is_full() {
            return Err(Error::QueueFull {
                capacity: self.max_length,
            });
        }

        Ok(self.push_item(song.detach(), priority))
    }

    /// Append an already-detached song, taking ownership without a copy
    ///
    /// Refused before any mutation if the handle still aliases the library
    /// database.
    pub fn append_detached(&mut self, song: SongHandle, priority: u8) -> Result<u32> {
        if !song.is_detached() {
            return Err(Error::AttachedSong {
                uri: song.uri().to_string(),
            });
        }
        if self.is_full() {
            return Err(Error::QueueFull {
                capacity: self.max_length,
            });
        }

        Ok(self.push_item(song, priority))
    }

    fn push_item(&mut self, song: SongHandle, priority: u8) -> u32 {
        debug_assert!(song.is_detached());

        let id = self.ids.allocate();
        let position = self.items.len();

        self.items.push(Item {
            song,
            id,
            version: self.version,
            priority,
        });
        self.order.push(position);
        self.ids.bind(id, position);
        self.increment_version();

        debug!(id, position, "appended song");
        id
    }

    /// Exchange two items, updating both id map entries and stamping both
    /// items. Shared by the public swap and the position shuffle.
    fn swap_items(&mut self, position1: usize, position2: usize) {
        let id1 = self.items[position1].id;
        let id2 = self.items[position2].id;

        self.items.swap(position1, position2);
        self.items[position1].version = self.version;
        self.items[position2].version = self.version;

        self.ids.rebind(id1, position2);
        self.ids.rebind(id2, position1);
    }

    /// Exchange the items at two positions
    pub fn swap_positions(&mut self, position1: usize, position2: usize) {
        debug_assert!(position1 < self.len() && position2 < self.len());

        self.swap_items(position1, position2);
        self.increment_version();
    }

    /// Exchange two entries of the order array
    pub fn swap_orders(&mut self, order1: usize, order2: usize) {
        debug_assert!(order1 < self.len() && order2 < self.len());
        self.order.swap(order1, order2);
    }

    /// Move the item at `from` so it ends up at position `to`
    ///
    /// Positions between the two endpoints shift by one in the opposite
    /// direction. Under random mode the order array is rewritten in place
    /// so the playback sequence keeps referring to the same songs.
    pub fn move_position(&mut self, from: usize, to: usize) {
        debug_assert!(from < self.len() && to < self.len());

        let item = self.items.remove(from);
        self.items.insert(to, item);

        let lo = from.min(to);
        let hi = from.max(to);
        for i in lo..=hi {
            self.items[i].version = self.version;
            let id = self.items[i].id;
            self.ids.rebind(id, i);
        }

        if self.flags.random {
            for entry in self.order.iter_mut() {
                let x = *entry;
                if x > from && x <= to {
                    *entry = x - 1;
                } else if x < from && x >= to {
                    *entry = x + 1;
                } else if x == from {
                    *entry = to;
                }
            }
        }

        self.increment_version();
        debug!(from, to, "moved queue item");
    }

    /// Move the block `[start, end)` so it begins at position `to`
    ///
    /// `to` addresses the index space after the block's removal, so
    /// `to + (end - start) <= len()` must hold. Items outside the union of
    /// the source and destination ranges keep their positions.
    pub fn move_range(&mut self, start: usize, end: usize, to: usize) {
        debug_assert!(start <= end && end <= self.len());
        debug_assert!(to + (end - start) <= self.len());

        let count = end - start;
        if count == 0 {
            return;
        }

        let block: Vec<Item> = self.items.drain(start..end).collect();
        self.items.splice(to..to, block);

        // Everything in the union of the vacated and occupied ranges moved.
        let lo = start.min(to);
        let hi = (to + count).max(end);
        for i in lo..hi {
            self.items[i].version = self.version;
            let id = self.items[i].id;
            self.ids.rebind(id, i);
        }

        if self.flags.random {
            for entry in self.order.iter_mut() {
                let x = *entry;
                if x >= end && x < to + count {
                    *entry = x - count;
                } else if x < start && x >= to {
                    *entry = x + count;
                } else if x >= start && x < end {
                    *entry = x + to - start;
                }
            }
        }

        self.increment_version();
        debug!(start, end, to, "moved queue range");
    }

    /// Remove the item at a position, releasing its song and identifier
    pub fn delete_position(&mut self, position: usize) {
        debug_assert!(position < self.len());

        let order_idx = self.position_to_order(position);
        let item = self.items.remove(position);
        debug_assert!(item.song.is_detached());
        self.ids.release(item.id);

        // Shift the tail down, updating the id map as we go.
        for i in position..self.items.len() {
            self.items[i].version = self.version;
            let id = self.items[i].id;
            self.ids.rebind(id, i);
        }

        // Drop the order entry for the removed position, then readjust
        // entries that referenced the shifted tail.
        self.order.remove(order_idx);
        for entry in self.order.iter_mut() {
            if *entry > position {
                *entry -= 1;
            }
        }

        self.increment_version();
        debug!(position, id = item.id, "deleted queue item");
    }

    /// Remove the item with the given identifier.
    /// Returns false if the identifier is not queued.
    pub fn delete_id(&mut self, id: u32) -> bool {
        match self.ids.lookup(id) {
            Some(position) => {
                self.delete_position(position);
                true
            }
            None => false,
        }
    }

    /// Remove every item, releasing all songs and identifiers
    ///
    /// Mode flags and the version counter are preserved.
    pub fn clear(&mut self) {
        for item in self.items.drain(..) {
            debug_assert!(item.song.is_detached());
            self.ids.release(item.id);
        }
        self.order.clear();
        debug!("cleared queue");
    }

    /// Fisher-Yates over positions: for each `i` in `[start, end)` swap
    /// with a uniform partner in `[start, end)`. Stamps all touched items.
    pub fn shuffle_range(&mut self, start: usize, end: usize) {
        debug_assert!(start <= end && end <= self.len());
        if start == end {
            return;
        }

        for i in start..end {
            let partner = self.rng.get().gen_range(start..end);
            self.swap_items(i, partner);
        }
        self.increment_version();
        debug!(start, end, "shuffled positions");
    }
}
