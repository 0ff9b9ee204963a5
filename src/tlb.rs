//! Translation lookaside buffer
//!
//! A fully associative cache of `TLB_ENTRIES` page -> frame mappings,
//! searched linearly. Replacement is always FIFO over insertion order,
//! whatever policy the frame store uses.
//!
//! Slots form a circular buffer. `cursor` is the slot the next new mapping
//! goes into; walking forward from it visits the empty slots first and then
//! the live entries from oldest to newest.

use log::trace;

use crate::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlbEntry {
    pub page: PageNumber,
    pub frame: FrameId,
}

#[derive(Debug, Default)]
pub struct Tlb {
    slots: [Option<TlbEntry>; TLB_ENTRIES],
    cursor: usize,
}

impl Tlb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame cached for `page`, if any
    pub fn lookup(&self, page: PageNumber) -> Option<FrameId> {
        self.slots
            .iter()
            .flatten()
            .find(|entry| entry.page == page)
            .map(|entry| entry.frame)
    }

    /// Cache a mapping. An existing entry for `page` is updated in place
    /// without touching the FIFO order; otherwise the oldest entry (or an
    /// empty slot) is overwritten.
    pub fn insert(&mut self, page: PageNumber, frame: FrameId) {
        if let Some(entry) = self.slots.iter_mut().flatten().find(|e| e.page == page) {
            entry.frame = frame;
            return;
        }

        self.slots[self.cursor] = Some(TlbEntry { page, frame });
        self.cursor = (self.cursor + 1) % TLB_ENTRIES;
    }

    /// Drop every entry naming `frame`. Entries inserted after the dropped
    /// one shift back a slot and the cursor steps back with them, so the
    /// freed slot is the next one filled and the remaining entries keep
    /// their FIFO order. Returns whether anything was removed.
    pub fn invalidate(&mut self, frame: FrameId) -> bool {
        let mut removed = false;
        while let Some(slot) = self.slots.iter().position(|s| matches!(s, Some(e) if e.frame == frame)) {
            trace!("TLB slot {} dropped (frame {})", slot, frame);
            self.close_gap(slot);
            removed = true;
        }
        removed
    }

    fn close_gap(&mut self, mut slot: usize) {
        let newest = (self.cursor + TLB_ENTRIES - 1) % TLB_ENTRIES;
        while slot != newest {
            let next = (slot + 1) % TLB_ENTRIES;
            self.slots[slot] = self.slots[next];
            slot = next;
        }
        self.slots[newest] = None;
        self.cursor = newest;
    }

    /// Live entries from oldest to newest
    pub fn entries(&self) -> impl Iterator<Item = TlbEntry> + '_ {
        (0..TLB_ENTRIES)
            .filter_map(move |i| self.slots[(self.cursor + i) % TLB_ENTRIES])
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
