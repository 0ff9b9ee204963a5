use std::num::NonZeroUsize;

use log::{debug, trace};

use crate::error::Result;
use crate::memory::{BackingStore, PhysicalMemory};
use crate::replacement::{Policy, RecencyQueue, Replacer, VictimContext};
use crate::tlb::Tlb;
use crate::translation::{AccessKind, Metrics, TranslationRecord, VirtualAddress};

/// Owns the whole simulated MMU for one run: TLB, page table and frames,
/// replacement state, counters and the backing store pages come from.
pub struct VmManager<B> {
    memory: PhysicalMemory,
    tlb: Tlb,
    replacer: Replacer,
    recency: RecencyQueue,
    metrics: Metrics,
    store: B,
}

impl<B: BackingStore> VmManager<B> {
    pub fn new(num_frames: NonZeroUsize, policy: Policy, store: B) -> Self {
        VmManager {
            memory: PhysicalMemory::new(num_frames),
            tlb: Tlb::new(),
            replacer: Replacer::new(policy, num_frames.get()),
            recency: RecencyQueue::new(num_frames.get()),
            metrics: Metrics::default(),
            store,
        }
    }

    /// Translate `addresses[index]`. Later entries of `addresses` are the
    /// remaining stream the optimal policy looks ahead into.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    pub fn step(&mut self, addresses: &[VirtualAddress], index: usize) -> Result<TranslationRecord> {
        let va = addresses[index];

        let (frame, kind) = if let Some(frame) = self.tlb.lookup(va.page) {
            trace!("{}: TLB hit in frame {}", va, frame);
            (frame, AccessKind::TlbHit)
        } else if let Some(frame) = self.memory.resolve(va.page) {
            trace!("{}: soft miss, resident in frame {}", va, frame);
            self.tlb.insert(va.page, frame);
            (frame, AccessKind::SoftMiss)
        } else {
            let frame = self.handle_fault(va, &addresses[index + 1..])?;
            self.tlb.insert(va.page, frame);
            (frame, AccessKind::HardFault)
        };

        self.recency.touch(frame);
        self.metrics.record(kind);

        let value = self.memory.read_byte(frame, va.offset);
        Ok(TranslationRecord {
            address: va,
            value,
            frame,
            content: self.memory.frame(frame).content,
            kind,
        })
    }

    /// Fetch the faulting page into the frame the replacer picks
    fn handle_fault(&mut self, va: VirtualAddress, upcoming: &[VirtualAddress]) -> Result<usize> {
        let frame = self.replacer.select_victim(&VictimContext {
            memory: &self.memory,
            recency: &self.recency,
            upcoming,
        });

        let content = self.store.read_page(va.page)?;
        let last_byte = content[va.offset as usize] as i8;

        match self.memory.install(va.page, frame, content, last_byte) {
            Some(evicted) => {
                self.tlb.invalidate(frame);
                debug!("{}: page fault, page {} replaces page {} in frame {}", va, va.page, evicted, frame);
            }
            None => debug!("{}: page fault, page {} loaded into frame {}", va, va.page, frame),
        }
        self.replacer.frame_filled(frame);

        Ok(frame)
    }

    /// Translate every address in order, handing each record to `emit`.
    /// The run stops at the first error from either side; an `Err` from
    /// `emit` is how a caller aborts between addresses.
    pub fn run<F>(&mut self, addresses: &[VirtualAddress], mut emit: F) -> Result<Metrics>
    where
        F: FnMut(&TranslationRecord) -> Result<()>,
    {
        for index in 0..addresses.len() {
            let record = self.step(addresses, index)?;
            emit(&record)?;
        }
        Ok(self.metrics)
    }

    /// Translate every address and collect the records
    pub fn translate_all(&mut self, addresses: &[VirtualAddress]) -> Result<Vec<TranslationRecord>> {
        let mut records = Vec::with_capacity(addresses.len());
        self.run(addresses, |record| {
            records.push(record.clone());
            Ok(())
        })?;
        Ok(records)
    }

    pub fn policy(&self) -> Policy {
        self.replacer.policy()
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    pub fn memory(&self) -> &PhysicalMemory {
        &self.memory
    }

    pub fn tlb(&self) -> &Tlb {
        &self.tlb
    }
}
