//! Priority-aware order maintenance
//!
//! Under random mode the order array is not a uniform shuffle: items with a
//! higher priority byte must occupy strictly earlier ordinals. The shuffle
//! therefore sorts the order slice by descending priority first and then
//! shuffles each maximal constant-priority run independently.
//!
//! Priority changes can also re-enqueue an already-played song: see
//! [`Queue::set_priority`] for the exact policy.

use super::Queue;
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Reverse;
use tracing::debug;

impl Queue {
    /// Group the order slice `[start, end)` by descending priority.
    /// Stability between equal keys is not required.
    fn sort_order_by_priority(&mut self, start: usize, end: usize) {
        debug_assert!(self.flags.random);
        debug_assert!(start <= end && end <= self.items.len());

        let items = &self.items;
        self.order[start..end].sort_unstable_by_key(|&position| Reverse(items[position].priority));
    }

    /// Priority of the item playing at the given ordinal
    fn order_priority(&self, order: usize) -> u8 {
        self.items[self.order[order]].priority
    }

    /// Uniformly permute the order slice `[start, end)`
    pub(crate) fn shuffle_order_range(&mut self, start: usize, end: usize) {
        debug_assert!(self.flags.random);
        debug_assert!(start <= end && end <= self.order.len());

        let rng = self.rng.get();
        self.order[start..end].shuffle(rng);
    }

    /// Sort the order slice `[start, end)` by descending priority, then
    /// shuffle each maximal constant-priority run
    pub fn shuffle_order_range_with_priority(&mut self, start: usize, end: usize) {
        debug_assert!(self.flags.random);
        debug_assert!(start <= end && end <= self.len());

        if start == end {
            return;
        }

        self.sort_order_by_priority(start, end);

        let mut group_start = start;
        let mut group_priority = self.order_priority(start);

        for i in (start + 1)..end {
            let priority = self.order_priority(i);
            debug_assert!(priority <= group_priority);

            if priority != group_priority {
                // Start of a new group: shuffle the one that just ended.
                self.shuffle_order_range(group_start, i);
                group_start = i;
                group_priority = priority;
            }
        }

        self.shuffle_order_range(group_start, end);
    }

    /// Rebuild the whole playback order under priority-group rules
    pub fn shuffle_order(&mut self) {
        self.shuffle_order_range_with_priority(0, self.len());
        debug!("shuffled playback order");
    }

    /// Single random swap: the first slot of `[start, end)` gets a uniform
    /// partner from the range
    pub fn shuffle_order_first(&mut self, start: usize, end: usize) {
        debug_assert!(start < end && end <= self.len());

        let partner = self.rng.get().gen_range(start..end);
        self.swap_orders(start, partner);
    }

    /// Single random swap: the last slot of `[start, end)` gets a uniform
    /// partner from the range
    pub fn shuffle_order_last(&mut self, start: usize, end: usize) {
        debug_assert!(start < end && end <= self.len());

        let partner = self.rng.get().gen_range(start..end);
        self.swap_orders(end - 1, partner);
    }

    /// First ordinal at or after `start_order` whose item's priority is
    /// <= `priority`, skipping `exclude_order`. Returns `len()` if none.
    fn find_priority_order(&self, start_order: usize, priority: u8, exclude_order: usize) -> usize {
        debug_assert!(self.flags.random);
        debug_assert!(start_order <= self.len());

        for order in start_order..self.len() {
            if self.order_priority(order) <= priority && order != exclude_order {
                return order;
            }
        }

        self.len()
    }

    /// Length of the run of ordinals starting at `start_order` whose items
    /// all have exactly `priority`
    fn count_same_priority(&self, start_order: usize, priority: u8) -> usize {
        debug_assert!(self.flags.random);
        debug_assert!(start_order <= self.len());

        for order in start_order..self.len() {
            if self.order_priority(order) != priority {
                return order - start_order;
            }
        }

        self.len() - start_order
    }

    /// Move an entry of the order array from one ordinal to another,
    /// shifting the entries in between
    fn move_order(&mut self, from_order: usize, to_order: usize) {
        debug_assert!(from_order < self.len() && to_order < self.len());

        if from_order < to_order {
            self.order[from_order..=to_order].rotate_left(1);
        } else {
            self.order[to_order..=from_order].rotate_right(1);
        }
    }

    /// Change the priority of the item at `position`
    ///
    /// Returns false (touching nothing) when the priority is unchanged.
    /// In non-random mode only the priority byte and stamp change. In
    /// random mode the item is repositioned within the order array:
    ///
    /// - `after_order` names the last-played ordinal (None if nothing has
    ///   played); the item at that ordinal itself is never repositioned;
    /// - a song earlier than `after_order` (already played) is re-enqueued
    ///   only when the new priority would place it ahead of the
    ///   `after_order` item and the old priority would not have;
    /// - the item moves to the head of its new priority group and is then
    ///   shuffled into that group with a single random swap.
    pub fn set_priority(&mut self, position: usize, priority: u8, after_order: Option<usize>) -> bool {
        let changed = self.set_priority_inner(position, priority, after_order);
        if changed {
            self.increment_version();
        }
        changed
    }

    fn set_priority_inner(
        &mut self,
        position: usize,
        priority: u8,
        after_order: Option<usize>,
    ) -> bool {
        debug_assert!(position < self.len());

        let old_priority = self.items[position].priority;
        if old_priority == priority {
            return false;
        }

        self.items[position].version = self.version;
        self.items[position].priority = priority;
        debug!(position, priority, "priority changed");

        if !self.flags.random {
            // Nothing to reorder outside random mode.
            return true;
        }

        let order = self.position_to_order(position);
        if let Some(after) = after_order {
            if order == after {
                // Never reposition the current song.
                return true;
            }

            if order < after {
                // The song has been played already: enqueue it again only
                // if its priority has just become bigger than the current
                // song's.
                let after_priority = self.order_priority(after);
                if old_priority > after_priority || priority <= after_priority {
                    return true;
                }
            }
        }

        // Move the item to the beginning of its priority group (or create
        // a new group), then shuffle it within the group.
        let start = after_order.map_or(0, |after| after + 1);
        let before_order = self.find_priority_order(start, priority, order);
        let new_order = if before_order > order {
            before_order - 1
        } else {
            before_order
        };
        self.move_order(order, new_order);

        let group_len = self.count_same_priority(new_order, priority);
        debug_assert!(group_len >= 1);
        self.shuffle_order_first(new_order, new_order + group_len);

        true
    }

    /// Apply [`Queue::set_priority`] to every position in `[start, end)`
    ///
    /// The last-played ordinal is re-derived through the order array on
    /// every iteration, since each step may have moved it.
    pub fn set_priority_range(
        &mut self,
        start: usize,
        end: usize,
        priority: u8,
        after_order: Option<usize>,
    ) -> bool {
        debug_assert!(start <= end && end <= self.len());

        let after_position = after_order.map(|order| self.order_to_position(order));

        let mut modified = false;
        for position in start..end {
            let after = after_position.map(|p| self.position_to_order(p));
            modified |= self.set_priority_inner(position, priority, after);
        }

        if modified {
            self.increment_version();
        }
        modified
    }
}
