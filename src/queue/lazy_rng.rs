//! Lazily seeded random source
//!
//! All shuffling operations draw from one generator per queue. Seeding is
//! deferred until the first shuffle so queues that never enter random mode
//! never touch the entropy source.

use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Per-queue PRNG, created on first use
#[derive(Debug, Default)]
pub(crate) struct LazyRng {
    rng: Option<SmallRng>,
}

impl LazyRng {
    pub fn new() -> Self {
        Self { rng: None }
    }

    /// Get the generator, seeding it from the OS on first call
    pub fn get(&mut self) -> &mut SmallRng {
        self.rng.get_or_insert_with(SmallRng::from_entropy)
    }
}
