use std::fmt;

use crate::constants::*;

/// A 16-bit virtual address split into page number and offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualAddress {
    pub raw: u16,
    pub page: PageNumber,
    pub offset: u8,
}

impl VirtualAddress {
    /// Decompose a raw VA into its components
    pub fn from_raw(raw: u16) -> Self {
        VirtualAddress {
            raw,
            page: (raw >> OFFSET_BITS) as PageNumber,
            offset: (raw & OFFSET_MASK) as u8,
        }
    }
}

impl fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VA({}) = (page={}, offset={})", self.raw, self.page, self.offset)
    }
}

/// How an address was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    TlbHit,
    /// TLB miss on a page that was still resident
    SoftMiss,
    /// Page had to be fetched from the backing store
    HardFault,
}

/// Outcome of translating one address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRecord {
    pub address: VirtualAddress,
    pub value: i8,
    pub frame: FrameId,
    pub content: PageContent,
    pub kind: AccessKind,
}

impl TranslationRecord {
    /// Whole page as uppercase hex, two digits per byte, no separators
    pub fn content_hex(&self) -> String {
        use fmt::Write;

        let mut hex = String::with_capacity(PAGE_SIZE * 2);
        for byte in &self.content {
            let _ = write!(hex, "{:02X}", byte);
        }
        hex
    }
}

impl fmt::Display for TranslationRecord {
    /// `address, value, page, frame, HEX`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}, {}",
            self.address.raw,
            self.value,
            self.address.page,
            self.frame,
            self.content_hex()
        )
    }
}

/// Running counters for a simulation. Every address is exactly one TLB hit
/// or one TLB miss; faults are a subset of the misses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    pub faults: u64,
    pub tlb_hits: u64,
    pub tlb_misses: u64,
}

impl Metrics {
    pub fn record(&mut self, kind: AccessKind) {
        match kind {
            AccessKind::TlbHit => self.tlb_hits += 1,
            AccessKind::SoftMiss => self.tlb_misses += 1,
            AccessKind::HardFault => {
                self.tlb_misses += 1;
                self.faults += 1;
            }
        }
    }

    /// Number of addresses translated so far
    #[inline]
    pub fn translated(&self) -> u64 {
        self.tlb_hits + self.tlb_misses
    }

    pub fn fault_rate(&self) -> f64 {
        ratio(self.faults, self.translated())
    }

    pub fn hit_rate(&self) -> f64 {
        ratio(self.tlb_hits, self.translated())
    }
}

fn ratio(n: u64, total: u64) -> f64 {
    if total == 0 { 0.0 } else { n as f64 / total as f64 }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of Translated Addresses = {}", self.translated())?;
        writeln!(f, "Page Faults = {}", self.faults)?;
        writeln!(f, "Page Fault Rate = {:.3}", self.fault_rate())?;
        writeln!(f, "TLB Hits = {}", self.tlb_hits)?;
        writeln!(f, "TLB Misses = {}", self.tlb_misses)?;
        write!(f, "TLB Hit Rate = {:.3}", self.hit_rate())
    }
}
