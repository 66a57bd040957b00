//! Usage History Module
//!
//! Tracks key recency for LRU eviction as an arena-backed doubly-linked list.

use std::collections::HashMap;

// == Slot Handle ==
/// Stable position of a key inside a [`LinkedHistory`].
///
/// A handle stays valid until its key is removed; after that the slot may be
/// reused for another key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

impl SlotId {
    /// Wraps a raw slot index, for custom [`UsageHistory`] implementations.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

// == Usage History Trait ==
/// Recency ordering of keys. The head is the least recently used key and
/// the tail is the most recently used one.
pub trait UsageHistory: Send + Sync {
    /// Marks a key as most recently used, appending it if it is new.
    ///
    /// The returned handle stays the same for as long as the key is recorded.
    fn record(&mut self, key: &str) -> SlotId;

    /// Marks the key at `position` as most recently used.
    ///
    /// `position` must be a handle returned by [`record`](Self::record) for a
    /// key that is still recorded.
    fn touch(&mut self, position: SlotId);

    /// Forgets a key.
    ///
    /// # Panics
    /// Panics if the key was never recorded. Callers only remove keys they
    /// recorded, so hitting this means the caller's bookkeeping is broken.
    fn remove(&mut self, key: &str);

    /// Key at the head, without touching it.
    fn least_used(&self) -> Option<&str>;

    /// Key at the tail, without touching it.
    fn most_recently_used(&self) -> Option<&str>;

    /// Whether the key has a recorded position.
    fn contains(&self, key: &str) -> bool;

    /// Keys ordered from least to most recently used.
    fn keys(&self) -> Vec<String>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
struct Slot {
    key: String,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

// == Linked History ==
/// Doubly-linked list stored in a `Vec` of slots, addressed by [`SlotId`].
///
/// - `head` = least recently used
/// - `tail` = most recently used
///
/// Freed slots go to a free list and are reused by later records. The
/// `index` map gives O(1) access from a key to its slot.
#[derive(Debug, Default)]
pub struct LinkedHistory {
    slots: Vec<Slot>,
    free: Vec<SlotId>,
    index: HashMap<String, SlotId>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

impl LinkedHistory {
    // == Constructor ==
    /// Creates a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty history with room for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            index: HashMap::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    fn allocate(&mut self, key: String) -> SlotId {
        match self.free.pop() {
            Some(id) => {
                self.slots[id.0].key = key;
                id
            }
            None => {
                self.slots.push(Slot {
                    key,
                    prev: None,
                    next: None,
                });
                SlotId(self.slots.len() - 1)
            }
        }
    }

    fn unlink(&mut self, id: SlotId) {
        let (prev, next) = {
            let slot = &self.slots[id.0];
            (slot.prev, slot.next)
        };

        match prev {
            Some(p) => self.slots[p.0].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n.0].prev = prev,
            None => self.tail = prev,
        }

        let slot = &mut self.slots[id.0];
        slot.prev = None;
        slot.next = None;
    }

    fn push_back(&mut self, id: SlotId) {
        self.slots[id.0].prev = self.tail;
        self.slots[id.0].next = None;

        match self.tail {
            Some(t) => self.slots[t.0].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
    }

    fn key_at(&self, id: Option<SlotId>) -> Option<&str> {
        id.map(|id| self.slots[id.0].key.as_str())
    }
}

impl UsageHistory for LinkedHistory {
    // == Record ==
    fn record(&mut self, key: &str) -> SlotId {
        if let Some(&id) = self.index.get(key) {
            self.touch(id);
            return id;
        }

        let id = self.allocate(key.to_owned());
        self.push_back(id);
        self.index.insert(key.to_owned(), id);
        id
    }

    // == Touch ==
    fn touch(&mut self, position: SlotId) {
        if self.tail != Some(position) {
            self.unlink(position);
            self.push_back(position);
        }
    }

    // == Remove ==
    fn remove(&mut self, key: &str) {
        let id = match self.index.remove(key) {
            Some(id) => id,
            None => panic!("usage history has no record of key '{key}'"),
        };

        self.unlink(id);
        self.slots[id.0].key.clear();
        self.free.push(id);
    }

    fn least_used(&self) -> Option<&str> {
        self.key_at(self.head)
    }

    fn most_recently_used(&self) -> Option<&str> {
        self.key_at(self.tail)
    }

    fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    fn keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.index.len());
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let slot = &self.slots[id.0];
            keys.push(slot.key.clone());
            cursor = slot.next;
        }
        keys
    }

    fn len(&self) -> usize {
        self.index.len()
    }
}
