//! Frame replacement policies
//!
//! A policy is picked once per run and turned into a [`Replacer`], which is
//! asked for a target frame every time a page fault needs somewhere to go.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use crate::constants::*;
use crate::error::SimError;
use crate::memory::PhysicalMemory;
use crate::translation::VirtualAddress;

/// Replacement policy identifier, as named on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Fifo,
    Lru,
    Opt,
}

impl FromStr for Policy {
    type Err = SimError;

    /// Exact, case-sensitive match on `FIFO`, `LRU` or `OPT`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FIFO" => Ok(Policy::Fifo),
            "LRU" => Ok(Policy::Lru),
            "OPT" => Ok(Policy::Opt),
            _ => Err(SimError::InvalidPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Policy::Fifo => "FIFO",
            Policy::Lru => "LRU",
            Policy::Opt => "OPT",
        })
    }
}

/// Frame ids ordered from least to most recently touched. Holds every frame
/// at all times.
#[derive(Debug, Clone)]
pub struct RecencyQueue {
    order: VecDeque<FrameId>,
}

impl RecencyQueue {
    pub fn new(num_frames: usize) -> Self {
        RecencyQueue {
            order: (0..num_frames).collect(),
        }
    }

    /// Mark `frame` as the most recently used
    pub fn touch(&mut self, frame: FrameId) {
        if let Some(pos) = self.order.iter().position(|&f| f == frame) {
            self.order.remove(pos);
        }
        self.order.push_back(frame);
    }

    /// Least recently used frame, left in place
    pub fn least_recent(&self) -> FrameId {
        self.order[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = FrameId> + '_ {
        self.order.iter().copied()
    }
}

/// What a replacer may inspect when choosing a frame
pub struct VictimContext<'a> {
    pub memory: &'a PhysicalMemory,
    pub recency: &'a RecencyQueue,
    /// Addresses not yet processed, excluding the faulting one
    pub upcoming: &'a [VirtualAddress],
}

/// Per-policy replacement state
#[derive(Debug, Clone)]
pub enum Replacer {
    /// Next frame to fill; moves only when a fault actually fills a frame
    Fifo { cursor: FrameId, num_frames: usize },
    /// Stateless; reads the shared recency queue
    Lru,
    /// Stateless; rescans the remaining address stream on every fault
    Opt,
}

impl Replacer {
    pub fn new(policy: Policy, num_frames: usize) -> Self {
        match policy {
            Policy::Fifo => Replacer::Fifo {
                cursor: 0,
                num_frames,
            },
            Policy::Lru => Replacer::Lru,
            Policy::Opt => Replacer::Opt,
        }
    }

    pub fn policy(&self) -> Policy {
        match self {
            Replacer::Fifo { .. } => Policy::Fifo,
            Replacer::Lru => Policy::Lru,
            Replacer::Opt => Policy::Opt,
        }
    }

    /// Frame that should receive the faulting page
    pub fn select_victim(&self, ctx: &VictimContext<'_>) -> FrameId {
        match self {
            Replacer::Fifo { cursor, .. } => *cursor,
            Replacer::Lru => ctx.recency.least_recent(),
            Replacer::Opt => optimal_victim(ctx.memory, ctx.upcoming),
        }
    }

    /// A fault has just written new content into `frame`
    pub fn frame_filled(&mut self, _frame: FrameId) {
        if let Replacer::Fifo { cursor, num_frames } = self {
            *cursor = (*cursor + 1) % *num_frames;
        }
    }
}

/// Belady's choice: the first frame (by id) that is empty or whose page is
/// never referenced again, otherwise the frame whose page is next referenced
/// furthest in the future. Ties go to the lowest frame id.
pub fn optimal_victim(memory: &PhysicalMemory, upcoming: &[VirtualAddress]) -> FrameId {
    let mut victim: Option<(FrameId, usize)> = None;

    for (frame, owner) in memory.owners() {
        let Some(page) = owner else {
            return frame;
        };
        let Some(next_use) = upcoming.iter().position(|va| va.page == page) else {
            return frame;
        };
        if victim.is_none_or(|(_, furthest)| next_use > furthest) {
            victim = Some((frame, next_use));
        }
    }
    victim.map_or(0, |(frame, _)| frame)
}
