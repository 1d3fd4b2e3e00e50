//! Linked Index Module
//!
//! The eviction-ordered index backing the memory cache: a hash index over
//! an arena of entry slots, threaded through a doubly-linked recency list.
//!
//! The list is ordered strictly by recency: `head` is the most recently
//! touched entry, `tail` the least. Every operation below is O(1)
//! (`remove_all` amortized), and the `total_count`/`total_cost` aggregates
//! are updated inside the same mutation that changes membership, so they
//! can never drift from the live entries.

use std::collections::HashMap;

use crate::memory::entry::{CacheEntry, SlotHandle};

// == Linked Index ==
/// Hash index plus recency list over an arena of entry slots.
///
/// Freed slots are recycled through a free list, so long-lived caches do
/// not grow the arena beyond their high-water entry count.
#[derive(Debug)]
pub struct LinkedIndex<T> {
    /// Entry arena; `None` marks a free slot
    slots: Vec<Option<CacheEntry<T>>>,
    /// Indices of free slots available for reuse
    free: Vec<SlotHandle>,
    /// Key -> slot handle
    index: HashMap<String, SlotHandle>,
    /// Most recently used entry
    head: Option<SlotHandle>,
    /// Least recently used entry
    tail: Option<SlotHandle>,
    /// Number of live entries
    total_count: usize,
    /// Sum of live entries' costs
    total_cost: u64,
}

impl<T> Default for LinkedIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LinkedIndex<T> {
    // == Constructor ==
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
            total_count: 0,
            total_cost: 0,
        }
    }

    // == Aggregates ==
    /// Number of live entries.
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Sum of live entries' costs.
    pub fn total_cost(&self) -> u64 {
        self.total_cost
    }

    /// Returns true if the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// Rebalances the cost aggregate after an in-place entry update.
    ///
    /// `old_cost` must be the cost the entry carried when it was inserted
    /// or last adjusted, so the subtraction cannot underflow.
    pub fn adjust_cost(&mut self, old_cost: u64, new_cost: u64) {
        self.total_cost = self.total_cost - old_cost + new_cost;
    }

    // == Lookup ==
    /// Slot handle for a key, if present.
    pub fn handle_of(&self, key: &str) -> Option<SlotHandle> {
        self.index.get(key).copied()
    }

    /// Checks key membership without touching recency.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Shared access to an entry by handle.
    pub fn entry(&self, handle: SlotHandle) -> Option<&CacheEntry<T>> {
        self.slots.get(handle).and_then(|slot| slot.as_ref())
    }

    /// Exclusive access to an entry by handle.
    pub fn entry_mut(&mut self, handle: SlotHandle) -> Option<&mut CacheEntry<T>> {
        self.slots.get_mut(handle).and_then(|slot| slot.as_mut())
    }

    /// The least recently used entry, if any.
    pub fn tail_entry(&self) -> Option<&CacheEntry<T>> {
        self.tail.and_then(|h| self.entry(h))
    }

    // == Insert At Head ==
    /// Adds a new entry as the most recently used.
    ///
    /// The key must not already be present; `MemoryCache` routes repeat
    /// sets through an in-place update instead.
    pub fn insert_at_head(&mut self, entry: CacheEntry<T>) -> SlotHandle {
        self.total_count += 1;
        self.total_cost += entry.cost;

        let handle = match self.free.pop() {
            Some(h) => {
                self.index.insert(entry.key.clone(), h);
                self.slots[h] = Some(entry);
                h
            }
            None => {
                let h = self.slots.len();
                self.index.insert(entry.key.clone(), h);
                self.slots.push(Some(entry));
                h
            }
        };

        self.attach_at_head(handle);
        handle
    }

    // == Move To Head ==
    /// Marks an entry as the most recently used.
    ///
    /// No-op if the handle is already the head or is not live.
    pub fn move_to_head(&mut self, handle: SlotHandle) {
        if self.head == Some(handle) || self.entry(handle).is_none() {
            return;
        }
        self.detach(handle);
        self.attach_at_head(handle);
    }

    // == Remove ==
    /// Removes the entry for `key`, returning it.
    pub fn remove(&mut self, key: &str) -> Option<CacheEntry<T>> {
        let handle = self.index.remove(key)?;
        self.detach(handle);
        self.release_slot(handle)
    }

    // == Remove Tail ==
    /// Evicts the least recently used entry, returning it.
    pub fn remove_tail(&mut self) -> Option<CacheEntry<T>> {
        let handle = self.tail?;
        self.detach(handle);
        let entry = self.release_slot(handle)?;
        self.index.remove(&entry.key);
        Some(entry)
    }

    // == Remove All ==
    /// Clears every entry and resets the aggregates.
    pub fn remove_all(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
        self.total_count = 0;
        self.total_cost = 0;
    }

    // == List Surgery ==
    /// Unlinks `handle` from the recency list, repairing neighbor links
    /// and the head/tail anchors. The entry stays in its slot.
    fn detach(&mut self, handle: SlotHandle) {
        let (prev, next) = match self.entry(handle) {
            Some(e) => (e.prev, e.next),
            None => return,
        };

        match prev {
            Some(p) => {
                if let Some(e) = self.entry_mut(p) {
                    e.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(e) = self.entry_mut(n) {
                    e.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(e) = self.entry_mut(handle) {
            e.prev = None;
            e.next = None;
        }
    }

    /// Links a detached `handle` in as the new head. An empty list gains
    /// the entry as both head and tail.
    fn attach_at_head(&mut self, handle: SlotHandle) {
        let old_head = self.head;
        if let Some(e) = self.entry_mut(handle) {
            e.prev = None;
            e.next = old_head;
        }
        match old_head {
            Some(h) => {
                if let Some(e) = self.entry_mut(h) {
                    e.prev = Some(handle);
                }
            }
            None => self.tail = Some(handle),
        }
        self.head = Some(handle);
    }

    /// Takes the entry out of its slot, adjusts aggregates, and recycles
    /// the slot. The caller has already detached the handle.
    fn release_slot(&mut self, handle: SlotHandle) -> Option<CacheEntry<T>> {
        let entry = self.slots.get_mut(handle).and_then(|slot| slot.take())?;
        self.free.push(handle);
        self.total_count -= 1;
        self.total_cost -= entry.cost;
        Some(entry)
    }
}
