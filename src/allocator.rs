//! Tag allocation over a persisted counter.
//!
//! # Invariants
//! - The in-memory counter is always >= 1.
//! - Every mutation is followed by a write of the new value under
//!   `TAG_COUNT_KEY`; a failed write never rolls back the allocation.
//! - An allocation that would overflow the tag width leaves the counter
//!   untouched.

use crate::error::{StoreError, TagError};
use crate::storage::{KeyValueStore, TAG_COUNT_KEY};
use crate::tag::Tag;
use log::{debug, warn};
use std::num::ParseIntError;

const INITIAL_COUNTER: u64 = 1;

/// Result of a single `next_tag` call.
#[derive(Debug)]
pub struct Allocation {
    pub tag: Tag,
    /// Set when the advanced counter could not be written to storage.
    pub persist_error: Option<StoreError>,
}

impl Allocation {
    pub fn is_durable(&self) -> bool {
        self.persist_error.is_none()
    }
}

#[derive(Debug)]
pub struct TagAllocator<S: KeyValueStore> {
    store: S,
    counter: u64,
}

impl<S: KeyValueStore> TagAllocator<S> {
    /// Load the counter from `store`, falling back to 1 when the stored
    /// value is absent, blank, not a number or below 1.
    pub fn initialize(store: S) -> Self {
        let counter = match store.load_value(TAG_COUNT_KEY) {
            None => INITIAL_COUNTER,
            Some(raw) => match parse_counter(&raw) {
                Ok(n) if n >= INITIAL_COUNTER => n,
                Ok(n) => {
                    warn!("event=counter_below_floor value={n}; using {INITIAL_COUNTER}");
                    INITIAL_COUNTER
                }
                Err(err) => {
                    if !raw.trim().is_empty() {
                        warn!(
                            "event=counter_unparseable raw={raw:?} error={err}; using {INITIAL_COUNTER}"
                        );
                    }
                    INITIAL_COUNTER
                }
            },
        };
        debug!("event=counter_loaded value={counter}");
        Self { store, counter }
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Tag the next allocation will return. No state changes.
    pub fn peek(&self) -> Result<Tag, TagError> {
        Tag::from_counter(self.counter)
    }

    pub fn next_tag(&mut self) -> Result<Allocation, TagError> {
        let tag = Tag::from_counter(self.counter)?;
        self.counter += 1;
        let persist_error = self.persist().err();
        debug!("event=tag_allocated tag={tag} next={}", self.counter);
        Ok(Allocation { tag, persist_error })
    }

    /// Overwrite the counter. Values below 1 are clamped to 1.
    pub fn reset(&mut self, value: u64) -> Result<(), StoreError> {
        self.counter = value.max(INITIAL_COUNTER);
        self.persist()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let value = self.counter.to_string();
        self.store.save_value(TAG_COUNT_KEY, &value).inspect_err(|err| {
            warn!(
                "event=counter_persist_failed value={value} error={err}; memory and storage diverge until the next successful write"
            );
        })
    }
}

fn parse_counter(raw: &str) -> Result<u64, ParseIntError> {
    raw.trim().parse::<u64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::tag::TAG_CAPACITY;

    fn allocator_with(raw: &str) -> TagAllocator<MemoryStore> {
        TagAllocator::initialize(MemoryStore::with_value(TAG_COUNT_KEY, raw))
    }

    #[test]
    fn test_initialize_defaults() {
        assert_eq!(TagAllocator::initialize(MemoryStore::new()).counter(), 1);
        assert_eq!(allocator_with("").counter(), 1);
        assert_eq!(allocator_with("abc").counter(), 1);
        assert_eq!(allocator_with("0").counter(), 1);
        assert_eq!(allocator_with("-5").counter(), 1);
        assert_eq!(allocator_with(" 42 ").counter(), 42);
    }

    #[test]
    fn test_next_tag_sequence_and_persistence() {
        let mut allocator = allocator_with("35");
        let tags: Vec<String> = (0..3)
            .map(|_| allocator.next_tag().unwrap().tag.to_string())
            .collect();
        assert_eq!(tags, vec!["000Z", "0010", "0011"]);
        assert_eq!(allocator.counter(), 38);
        assert_eq!(
            allocator.store().load_value(TAG_COUNT_KEY).as_deref(),
            Some("38")
        );
    }

    #[test]
    fn test_consecutive_allocations_are_distinct() {
        let mut allocator = TagAllocator::initialize(MemoryStore::new());
        let a = allocator.next_tag().unwrap().tag;
        let b = allocator.next_tag().unwrap().tag;
        assert_ne!(a, b);
        assert!(a < b);
    }

    #[test]
    fn test_peek_does_not_advance() {
        let allocator = allocator_with("10");
        assert_eq!(allocator.peek().unwrap().as_str(), "000A");
        assert_eq!(allocator.peek().unwrap().as_str(), "000A");
        assert_eq!(allocator.counter(), 10);
    }

    #[test]
    fn test_persist_failure_still_allocates() {
        let mut store = MemoryStore::with_value(TAG_COUNT_KEY, "5");
        store.fail_writes(true);
        let mut allocator = TagAllocator::initialize(store);
        let allocation = allocator.next_tag().unwrap();
        assert_eq!(allocation.tag.as_str(), "0005");
        assert!(!allocation.is_durable());
        assert_eq!(allocator.counter(), 6);
        assert_eq!(
            allocator.store().load_value(TAG_COUNT_KEY).as_deref(),
            Some("5")
        );
    }

    #[test]
    fn test_overflow_leaves_counter_unchanged() {
        let mut allocator = allocator_with(&(TAG_CAPACITY - 1).to_string());
        assert_eq!(allocator.next_tag().unwrap().tag.as_str(), "ZZZZ");
        assert!(matches!(allocator.next_tag(), Err(TagError::Overflow(_))));
        assert_eq!(allocator.counter(), TAG_CAPACITY);
    }

    #[test]
    fn test_reset_persists_and_clamps() {
        let mut allocator = allocator_with("9");
        allocator.reset(0).unwrap();
        assert_eq!(allocator.counter(), 1);
        allocator.reset(100).unwrap();
        assert_eq!(
            allocator.store().load_value(TAG_COUNT_KEY).as_deref(),
            Some("100")
        );
    }
}
