//! Recency List Module
//!
//! Doubly linked list over a slab of nodes, ordering entries from most
//! recently updated (front) to least recently updated (back). Links are
//! slab indices, so touch, unlink and pop are all O(1) without unsafe code.

use crate::cache::Entry;

// == Node ==
#[derive(Debug)]
struct Node {
    /// None while the slot sits on the free list
    entry: Option<Entry>,
    /// Toward the front (more recent)
    prev: Option<usize>,
    /// Toward the back (less recent)
    next: Option<usize>,
}

// == Recency List ==
/// Ordered sequence of entries; front = most recently updated.
#[derive(Debug, Default)]
pub struct RecencyList {
    nodes: Vec<Node>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl RecencyList {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.len
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Push Front ==
    /// Inserts an entry at the most-recent end and returns its slot.
    pub fn push_front(&mut self, entry: Entry) -> usize {
        let node = Node {
            entry: Some(entry),
            prev: None,
            next: self.head,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        if let Some(old_head) = self.head {
            self.nodes[old_head].prev = Some(slot);
        }
        self.head = Some(slot);
        if self.tail.is_none() {
            self.tail = Some(slot);
        }
        self.len += 1;
        slot
    }

    // == Entry Access ==
    /// Borrows the entry in a slot, if occupied.
    pub fn entry(&self, slot: usize) -> Option<&Entry> {
        self.nodes.get(slot)?.entry.as_ref()
    }

    /// Mutably borrows the entry in a slot, if occupied.
    pub fn entry_mut(&mut self, slot: usize) -> Option<&mut Entry> {
        self.nodes.get_mut(slot)?.entry.as_mut()
    }

    // == Move To Front ==
    /// Marks a slot as most recently used.
    pub fn move_to_front(&mut self, slot: usize) {
        if self.head == Some(slot) {
            return;
        }
        self.unlink(slot);
        self.nodes[slot].prev = None;
        self.nodes[slot].next = self.head;
        if let Some(old_head) = self.head {
            self.nodes[old_head].prev = Some(slot);
        }
        self.head = Some(slot);
        if self.tail.is_none() {
            self.tail = Some(slot);
        }
    }

    // == Remove ==
    /// Unlinks a slot and returns its entry, freeing the slot for reuse.
    pub fn remove(&mut self, slot: usize) -> Option<Entry> {
        let entry = self.nodes.get_mut(slot)?.entry.take()?;
        self.unlink(slot);
        self.free.push(slot);
        self.len -= 1;
        Some(entry)
    }

    // == Pop Back ==
    /// Removes and returns the least recently updated entry.
    pub fn pop_back(&mut self) -> Option<Entry> {
        let tail = self.tail?;
        self.remove(tail)
    }

    // == Back ==
    /// Borrows the least recently updated entry without removing it.
    pub fn back(&self) -> Option<&Entry> {
        self.entry(self.tail?)
    }

    // == Iteration ==
    /// Walks entries from the least-recent end toward the front.
    pub fn iter_oldest(&self) -> OldestIter<'_> {
        OldestIter {
            list: self,
            cursor: self.tail,
        }
    }

    /// Walks entries from the most-recent end toward the back.
    pub fn iter_recent(&self) -> RecentIter<'_> {
        RecentIter {
            list: self,
            cursor: self.head,
        }
    }

    // == Unlink ==
    /// Detaches a slot from its neighbors. Does not free the slot.
    fn unlink(&mut self, slot: usize) {
        let (prev, next) = {
            let node = &self.nodes[slot];
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }
        self.nodes[slot].prev = None;
        self.nodes[slot].next = None;
    }
}

// == Oldest-First Iterator ==
pub struct OldestIter<'a> {
    list: &'a RecencyList,
    cursor: Option<usize>,
}

impl<'a> Iterator for OldestIter<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        self.cursor = self.list.nodes[slot].prev;
        self.list.nodes[slot].entry.as_ref()
    }
}

// == Recent-First Iterator ==
pub struct RecentIter<'a> {
    list: &'a RecencyList,
    cursor: Option<usize>,
}

impl<'a> Iterator for RecentIter<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        self.cursor = self.list.nodes[slot].next;
        self.list.nodes[slot].entry.as_ref()
    }
}
