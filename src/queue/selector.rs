//! Next-song selection
//!
//! Pure decision function mapping the current order index and the playback
//! mode flags to the next order index. Conditions are evaluated top to
//! bottom; the first match wins.

/// Playback mode flags
///
/// Four independent booleans. `random` governs whether the order array is a
/// shuffled permutation; the other three drive [`next_order`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeFlags {
    /// Restart from the top when the queue runs out
    pub repeat: bool,

    /// Replay the current song instead of advancing
    pub single: bool,

    /// Songs are removed once played
    pub consume: bool,

    /// Play in shuffled order
    pub random: bool,
}

/// Decide which order index plays after `order`
///
/// Returns `None` at end of queue. With `single` and `repeat` set (and not
/// `consume`) the same song replays forever. Wrapping to the start requires
/// `repeat`, and additionally either a non-zero position or `consume` off:
/// a consumed one-song queue must end rather than loop.
///
/// # Arguments
/// * `flags` - Current mode flags
/// * `length` - Queue length; must be non-zero
/// * `order` - Order index of the song that just finished
pub fn next_order(flags: ModeFlags, length: usize, order: usize) -> Option<usize> {
    debug_assert!(order < length);

    if flags.single && flags.repeat && !flags.consume {
        Some(order)
    } else if order + 1 < length {
        Some(order + 1)
    } else if flags.repeat && (order > 0 || !flags.consume) {
        // restart at the first song
        Some(0)
    } else {
        // end of queue
        None
    }
}
