//! Identifier generation for new books.

use rand::Rng;
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of ids for records created without one.
pub trait IdGenerator: Send + Sync + 'static {
    /// Produce the next id.
    fn next_id(&self) -> i64;
}

/// Uniform random ids in `0..ceiling`.
///
/// Not unique: two books may draw the same id, in which case the second
/// insert fails with a duplicate-key conflict.
#[derive(Debug, Clone, Copy)]
pub struct RandomIds {
    ceiling: u32,
}

impl RandomIds {
    /// Draw ids below `ceiling`. A ceiling of zero is treated as one.
    pub fn new(ceiling: u32) -> Self {
        Self {
            ceiling: ceiling.max(1),
        }
    }

    /// The exclusive upper bound.
    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }
}

impl IdGenerator for RandomIds {
    fn next_id(&self) -> i64 {
        rand::rng().random_range(0..i64::from(self.ceiling))
    }
}

/// Consecutive ids, starting from a given value.
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicI64,
}

impl SequentialIds {
    /// Start counting at `first`.
    pub fn starting_at(first: i64) -> Self {
        Self {
            next: AtomicI64::new(first),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> i64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}
