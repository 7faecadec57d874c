//! Queue Integrity Tests
//!
//! Whole-queue checks across operation sequences:
//! - id map / order array / item store consistency after every mutation
//! - play-sequence preservation under the random-mode order rewrites
//! - table-driven cases for the three order-rewrite rules
//!   (MovePosition, MoveRange, DeletePosition)
//! - end-to-end playback advancement scenarios

use cadence_queue::{ModeFlags, Queue, SongHandle};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadence_queue=debug".into()),
        )
        .try_init();
}

fn song(n: u32) -> SongHandle {
    SongHandle::local(format!("music/{:04}.flac", n))
}

/// Check every structural invariant reachable through the public surface:
/// capacity bound, order-array permutation, id round-trips, order
/// round-trips, and the version-stamp bound.
fn assert_queue_consistent(queue: &Queue) {
    assert!(queue.len() <= queue.capacity());

    let mut seen = vec![false; queue.len()];
    for order in 0..queue.len() {
        let position = queue.order_to_position(order);
        assert!(position < queue.len(), "order entry out of range");
        assert!(!seen[position], "order array repeats position {}", position);
        seen[position] = true;
    }

    for position in 0..queue.len() {
        let id = queue.position_to_id(position);
        assert_eq!(queue.id_to_position(id), Some(position));
        assert!(queue.contains_id(id));

        let order = queue.position_to_order(position);
        assert_eq!(queue.order_to_position(order), position);

        assert!(queue.get(position).version() <= queue.version());
        assert!(queue.get(position).song().is_detached());
    }
}

/// Song identifiers along the playback order
fn play_sequence(queue: &Queue) -> Vec<u32> {
    (0..queue.len()).map(|k| queue.get_order(k).id()).collect()
}

// --- random operation sequences ---

#[test]
fn test_random_operation_sequences_preserve_invariants() {
    init_logging();

    for seed in 0..8u64 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut queue = Queue::new(32);
        let mut last_version = queue.version();

        for _ in 0..500 {
            let len = queue.len();
            match rng.gen_range(0..14u32) {
                0..=3 => {
                    if !queue.is_full() {
                        queue.append(&song(rng.gen()), rng.gen_range(0..4)).unwrap();
                    }
                }
                4 => {
                    if len > 0 {
                        queue.delete_position(rng.gen_range(0..len));
                    }
                }
                5 => {
                    if len > 0 {
                        queue.swap_positions(rng.gen_range(0..len), rng.gen_range(0..len));
                    }
                }
                6 => {
                    if len > 0 {
                        queue.move_position(rng.gen_range(0..len), rng.gen_range(0..len));
                    }
                }
                7 => {
                    if len > 0 {
                        let start = rng.gen_range(0..=len);
                        let end = rng.gen_range(start..=len);
                        let to = rng.gen_range(0..=(len - (end - start)));
                        queue.move_range(start, end, to);
                    }
                }
                8 => {
                    if len > 0 {
                        let start = rng.gen_range(0..=len);
                        let end = rng.gen_range(start..=len);
                        queue.shuffle_range(start, end);
                    }
                }
                9 => {
                    let after = if queue.flags().random && len > 0 && rng.gen() {
                        Some(rng.gen_range(0..len))
                    } else {
                        None
                    };
                    if len > 0 {
                        queue.set_priority(rng.gen_range(0..len), rng.gen_range(0..4), after);
                    }
                }
                10 => {
                    if queue.flags().random && len > 0 {
                        queue.shuffle_order();
                    }
                }
                11 => {
                    if len > 0 {
                        queue.modify_at_order(rng.gen_range(0..len));
                    }
                }
                12 => {
                    queue.set_random(rng.gen());
                    queue.set_repeat(rng.gen());
                }
                _ => {
                    if rng.gen_range(0..10) == 0 {
                        queue.clear();
                    } else {
                        queue.modify_all();
                    }
                }
            }

            assert_queue_consistent(&queue);

            // The counter never rewinds.
            assert!(queue.version() >= last_version || queue.version() == 1);
            last_version = queue.version();
        }
    }
}

#[test]
fn test_priority_groups_contiguous_after_reorder() {
    // The reorder pass runs whenever priorities or the song set change
    // under random mode; afterwards the order-wise priority sequence must
    // be non-increasing.
    let mut rng = SmallRng::seed_from_u64(42);
    let mut queue = Queue::new(24);
    queue.set_random(true);

    for _ in 0..200 {
        let len = queue.len();
        match rng.gen_range(0..4u32) {
            0 => {
                if !queue.is_full() {
                    queue.append(&song(rng.gen()), rng.gen_range(0..5)).unwrap();
                }
            }
            1 => {
                if len > 0 {
                    queue.delete_position(rng.gen_range(0..len));
                }
            }
            2 => {
                if len > 0 {
                    queue.set_priority(rng.gen_range(0..len), rng.gen_range(0..5), None);
                }
            }
            _ => {}
        }

        queue.shuffle_order_range_with_priority(0, queue.len());

        let priorities: Vec<u8> = (0..queue.len())
            .map(|k| queue.get_order(k).priority())
            .collect();
        assert!(
            priorities.windows(2).all(|w| w[0] >= w[1]),
            "priority groups not contiguous: {:?}",
            priorities
        );
        assert_queue_consistent(&queue);
    }
}

// --- order-rewrite rule tables ---

#[test]
fn test_move_position_order_rewrite_table() {
    struct Case {
        len: u32,
        from: usize,
        to: usize,
        expected_order: &'static [usize],
    }

    let cases = [
        Case { len: 5, from: 1, to: 3, expected_order: &[0, 3, 1, 2, 4] },
        Case { len: 5, from: 3, to: 1, expected_order: &[0, 2, 3, 1, 4] },
        Case { len: 5, from: 0, to: 4, expected_order: &[4, 0, 1, 2, 3] },
        Case { len: 5, from: 4, to: 0, expected_order: &[1, 2, 3, 4, 0] },
        Case { len: 5, from: 2, to: 2, expected_order: &[0, 1, 2, 3, 4] },
    ];

    for case in &cases {
        let mut queue = Queue::new(8);
        for n in 0..case.len {
            queue.append(&song(n), 0).unwrap();
        }
        queue.set_random(true);

        // The order array starts as the identity, so the rewritten entries
        // are exactly the rule table applied entrywise.
        let sequence_before = play_sequence(&queue);
        queue.move_position(case.from, case.to);

        let order: Vec<usize> = (0..queue.len()).map(|k| queue.order_to_position(k)).collect();
        assert_eq!(order, case.expected_order, "from={} to={}", case.from, case.to);

        // The rewrite exists to keep the playback sequence pointing at the
        // same songs.
        assert_eq!(play_sequence(&queue), sequence_before);
        assert_queue_consistent(&queue);
    }
}

#[test]
fn test_move_range_order_rewrite_table() {
    struct Case {
        len: u32,
        start: usize,
        end: usize,
        to: usize,
        expected_order: &'static [usize],
    }

    let cases = [
        Case { len: 5, start: 1, end: 3, to: 3, expected_order: &[0, 3, 4, 1, 2] },
        Case { len: 5, start: 2, end: 4, to: 0, expected_order: &[2, 3, 0, 1, 4] },
        Case { len: 5, start: 0, end: 2, to: 3, expected_order: &[3, 4, 0, 1, 2] },
        Case { len: 5, start: 1, end: 4, to: 1, expected_order: &[0, 1, 2, 3, 4] },
        Case { len: 6, start: 2, end: 3, to: 4, expected_order: &[0, 1, 4, 2, 3, 5] },
    ];

    for case in &cases {
        let mut queue = Queue::new(8);
        for n in 0..case.len {
            queue.append(&song(n), 0).unwrap();
        }
        queue.set_random(true);

        let sequence_before = play_sequence(&queue);
        queue.move_range(case.start, case.end, case.to);

        let order: Vec<usize> = (0..queue.len()).map(|k| queue.order_to_position(k)).collect();
        assert_eq!(
            order, case.expected_order,
            "start={} end={} to={}",
            case.start, case.end, case.to
        );
        assert_eq!(play_sequence(&queue), sequence_before);
        assert_queue_consistent(&queue);
    }
}

#[test]
fn test_delete_position_order_rewrite_preserves_sequence() {
    for delete_at in 0..5 {
        let mut queue = Queue::new(8);
        for n in 0..5 {
            queue.append(&song(n), 0).unwrap();
        }
        queue.set_random(true);
        queue.shuffle_order();

        let sequence_before = play_sequence(&queue);
        let deleted = queue.position_to_id(delete_at);

        queue.delete_position(delete_at);

        let expected: Vec<u32> = sequence_before
            .into_iter()
            .filter(|&id| id != deleted)
            .collect();
        assert_eq!(play_sequence(&queue), expected);
        assert_queue_consistent(&queue);
    }
}

// --- playback advancement scenarios ---

#[test]
fn test_next_after_first_append_is_end_of_queue() {
    let mut queue = Queue::new(4);
    queue.append(&song(0), 0).unwrap();

    assert_eq!(queue.next_order(0), None);
}

#[test]
fn test_repeat_wraps_and_consume_stops_the_last_song() {
    let mut queue = Queue::new(4);
    for n in 0..3 {
        queue.append(&song(n), 0).unwrap();
    }

    queue.set_repeat(true);
    assert_eq!(queue.next_order(2), Some(0));

    // A consumed queue down to its last song must end instead of looping.
    let mut queue = Queue::new(4);
    queue.append(&song(0), 0).unwrap();
    queue.set_repeat(true);
    queue.set_consume(true);
    assert_eq!(queue.next_order(0), None);
}

#[test]
fn test_single_repeat_replays_current_song() {
    let mut queue = Queue::new(4);
    for n in 0..3 {
        queue.append(&song(n), 0).unwrap();
    }

    queue.set_repeat(true);
    queue.set_single(true);
    assert_eq!(queue.next_order(1), Some(1));
}

#[test]
fn test_raised_priority_plays_next() {
    // Append A, B, C at priority 0 under random mode, then raise C:
    // C takes ordinal 0 and its stamp records the pre-operation counter.
    let mut queue = Queue::new(4);
    for n in 0..3 {
        queue.append(&song(n), 0).unwrap();
    }
    queue.set_random(true);

    let version_before = queue.version();
    let changed = queue.set_priority(2, 10, None);

    assert!(changed);
    assert_eq!(queue.order_to_position(0), 2);
    assert_eq!(queue.get(2).version(), version_before);
    assert!(queue.version() > version_before);
    assert_queue_consistent(&queue);
}

#[test]
fn test_move_range_end_to_end() {
    // Queue [A,B,C,D,E]; moving [B,C] to begin at post-removal position 3
    // yields [A,D,E,B,C], with B and C now mapped to positions 3 and 4.
    let mut queue = Queue::new(8);
    let mut ids = Vec::new();
    for n in 0..5 {
        ids.push(queue.append(&song(n), 0).unwrap());
    }

    queue.move_range(1, 3, 3);

    let uris: Vec<&str> = (0..5).map(|p| queue.get(p).song().uri()).collect();
    assert_eq!(
        uris,
        [
            "music/0000.flac",
            "music/0003.flac",
            "music/0004.flac",
            "music/0001.flac",
            "music/0002.flac",
        ]
    );
    assert_eq!(queue.id_to_position(ids[1]), Some(3));
    assert_eq!(queue.id_to_position(ids[2]), Some(4));
    assert_queue_consistent(&queue);
}

#[test]
fn test_set_priority_is_idempotent_for_equal_priority() {
    let mut queue = Queue::new(8);
    for n in 0..4 {
        queue.append(&song(n), 2).unwrap();
    }
    queue.set_random(true);
    queue.shuffle_order();

    let version = queue.version();
    let order_before: Vec<usize> = (0..4).map(|k| queue.order_to_position(k)).collect();
    let stamps_before: Vec<u32> = (0..4).map(|p| queue.get(p).version()).collect();

    let changed = queue.set_priority(1, queue.get(1).priority(), Some(0));

    assert!(!changed);
    assert_eq!(queue.version(), version);
    let order_after: Vec<usize> = (0..4).map(|k| queue.order_to_position(k)).collect();
    assert_eq!(order_after, order_before);
    let stamps_after: Vec<u32> = (0..4).map(|p| queue.get(p).version()).collect();
    assert_eq!(stamps_after, stamps_before);
}

#[test]
fn test_mode_flags_round_trip() {
    let mut queue = Queue::new(4);
    assert_eq!(queue.flags(), ModeFlags::default());

    queue.set_repeat(true);
    queue.set_single(true);
    queue.set_consume(true);
    queue.set_random(true);

    let flags = queue.flags();
    assert!(flags.repeat && flags.single && flags.consume && flags.random);
}
