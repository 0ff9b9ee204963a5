pub const OFFSET_BITS: u32 = 8;

pub const PAGE_SIZE: usize = 1 << OFFSET_BITS;
pub const NUM_PAGES: usize = 256;
pub const TLB_ENTRIES: usize = 16;

pub const BACKING_STORE_SIZE: usize = NUM_PAGES * PAGE_SIZE;
pub const MAX_ADDRESS: u32 = (BACKING_STORE_SIZE - 1) as u32;

pub const OFFSET_MASK: u16 = (PAGE_SIZE - 1) as u16;

pub const DEFAULT_BACKING_STORE: &str = "BACKING_STORE.bin";

/// Raw bytes of one page (or one frame)
pub type PageContent = [u8; PAGE_SIZE];
pub type PageNumber = u8;
pub type FrameId = usize;
