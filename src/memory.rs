use std::num::NonZeroUsize;

use log::trace;

use crate::constants::*;
use crate::error::{Result, SimError};

/// One slot of the page table. `frame` keeps the last frame the page lived
/// in, but only counts while `valid` is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageTableEntry {
    pub frame: Option<FrameId>,
    pub valid: bool,
}

impl PageTableEntry {
    /// The frame this page is resident in, if any
    #[inline]
    pub fn resident_frame(&self) -> Option<FrameId> {
        if self.valid { self.frame } else { None }
    }
}

/// A physical frame. `owner` is a plain back-reference to the page mapped
/// here; it is bookkeeping only and never drives any release.
#[derive(Debug, Clone)]
pub struct Frame {
    pub content: PageContent,
    pub last_byte: i8,
    pub owner: Option<PageNumber>,
}

impl Frame {
    fn empty() -> Self {
        Frame {
            content: [0; PAGE_SIZE],
            last_byte: 0,
            owner: None,
        }
    }
}

/// Page table plus frame store. Both are sized once at construction and
/// populated lazily as faults install pages.
pub struct PhysicalMemory {
    page_table: Box<[PageTableEntry; NUM_PAGES]>,
    frames: Vec<Frame>,
}

impl PhysicalMemory {
    /// Create a memory with `num_frames` empty frames and an all-invalid page table
    pub fn new(num_frames: NonZeroUsize) -> Self {
        PhysicalMemory {
            page_table: Box::new([PageTableEntry::default(); NUM_PAGES]),
            frames: vec![Frame::empty(); num_frames.get()],
        }
    }

    #[inline]
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Look a page up in the page table. `None` means the access is a hard
    /// fault; `Some` is a resident page that simply was not TLB-cached.
    #[inline]
    pub fn resolve(&self, page: PageNumber) -> Option<FrameId> {
        self.page_table[page as usize].resident_frame()
    }

    #[inline]
    pub fn entry(&self, page: PageNumber) -> &PageTableEntry {
        &self.page_table[page as usize]
    }

    #[inline]
    pub fn frame(&self, frame: FrameId) -> &Frame {
        &self.frames[frame]
    }

    /// Owning page of every frame, in ascending frame order
    pub fn owners(&self) -> impl Iterator<Item = (FrameId, Option<PageNumber>)> + '_ {
        self.frames.iter().enumerate().map(|(id, f)| (id, f.owner))
    }

    /// Number of valid page-table entries pointing at `frame`
    pub fn pages_mapped_to(&self, frame: FrameId) -> usize {
        self.page_table
            .iter()
            .filter(|e| e.resident_frame() == Some(frame))
            .count()
    }

    /// Detach whatever page currently owns `frame`, invalidating its
    /// page-table entry. Returns the page that was evicted.
    pub fn evict(&mut self, frame: FrameId) -> Option<PageNumber> {
        let owner = self.frames[frame].owner.take()?;
        self.page_table[owner as usize].valid = false;
        trace!("page {} evicted from frame {}", owner, frame);
        Some(owner)
    }

    /// Map `page` into `frame` with freshly fetched content.
    ///
    /// If the frame belonged to another page, that page is evicted first and
    /// returned so the caller can purge stale TLB entries for `frame`.
    pub fn install(
        &mut self,
        page: PageNumber,
        frame: FrameId,
        content: PageContent,
        last_byte: i8,
    ) -> Option<PageNumber> {
        let evicted = match self.frames[frame].owner {
            Some(owner) if owner != page => self.evict(frame),
            _ => None,
        };

        self.page_table[page as usize] = PageTableEntry {
            frame: Some(frame),
            valid: true,
        };
        self.frames[frame] = Frame {
            content,
            last_byte,
            owner: Some(page),
        };
        evicted
    }

    /// Read the signed byte at `offset` from a resident frame, refreshing
    /// the frame's `last_byte` from the stored content.
    pub fn read_byte(&mut self, frame: FrameId, offset: u8) -> i8 {
        let f = &mut self.frames[frame];
        f.last_byte = f.content[offset as usize] as i8;
        f.last_byte
    }
}

/// Random-access source of page content, `BACKING_STORE_SIZE` bytes long
/// with page `p` at `[p * PAGE_SIZE, (p + 1) * PAGE_SIZE)`.
pub trait BackingStore {
    /// Fetch all bytes of `page`
    fn read_page(&mut self, page: PageNumber) -> Result<PageContent>;

    /// Fetch a single byte of `page` as a signed value
    fn read_byte_signed(&mut self, page: PageNumber, offset: u8) -> Result<i8> {
        Ok(self.read_page(page)?[offset as usize] as i8)
    }
}

/// Backing store held entirely in memory
pub struct Disk {
    data: Box<[u8; BACKING_STORE_SIZE]>,
}

impl Disk {
    /// Create a disk initialized to all zeros
    pub fn new() -> Self {
        Disk {
            data: Box::new([0; BACKING_STORE_SIZE]),
        }
    }

    /// Wrap an existing image; anything but exactly `BACKING_STORE_SIZE`
    /// bytes is rejected.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let len = bytes.len();
        let data: Box<[u8; BACKING_STORE_SIZE]> =
            bytes.into_boxed_slice().try_into().map_err(|_| {
                SimError::StorageCorruption(format!(
                    "image is {} bytes, expected {}",
                    len, BACKING_STORE_SIZE
                ))
            })?;
        Ok(Disk { data })
    }

    /// Get direct access to a page (for initialization)
    pub fn page_mut(&mut self, page: PageNumber) -> &mut [u8] {
        let base = page as usize * PAGE_SIZE;
        &mut self.data[base..base + PAGE_SIZE]
    }
}

impl Default for Disk {
    fn default() -> Self {
        Self::new()
    }
}

impl BackingStore for Disk {
    fn read_page(&mut self, page: PageNumber) -> Result<PageContent> {
        let base = page as usize * PAGE_SIZE;
        let mut content = [0; PAGE_SIZE];
        content.copy_from_slice(&self.data[base..base + PAGE_SIZE]);
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn filled(byte: u8) -> PageContent {
        [byte; PAGE_SIZE]
    }

    #[test]
    fn test_memory_initialization() {
        let pm = PhysicalMemory::new(frames(4));
        assert_eq!(pm.num_frames(), 4);

        // Every page starts invalid and every frame unowned
        for page in 0..=255u8 {
            assert_eq!(pm.resolve(page), None);
            assert_eq!(*pm.entry(page), PageTableEntry::default());
        }
        assert!(pm.owners().all(|(_, owner)| owner.is_none()));
    }

    #[test]
    fn test_install_into_empty_frame() {
        let mut pm = PhysicalMemory::new(frames(2));

        let evicted = pm.install(7, 1, filled(0xAB), -85);
        assert_eq!(evicted, None);

        assert_eq!(pm.resolve(7), Some(1));
        assert_eq!(pm.frame(1).owner, Some(7));
        assert_eq!(pm.frame(1).last_byte, -85);
        assert_eq!(pm.frame(1).content[200], 0xAB);
    }

    #[test]
    fn test_install_evicts_previous_owner() {
        let mut pm = PhysicalMemory::new(frames(1));
        pm.install(3, 0, filled(1), 1);

        let evicted = pm.install(9, 0, filled(2), 2);
        assert_eq!(evicted, Some(3));

        // Page 3 keeps its stale frame number but is no longer valid
        assert_eq!(pm.resolve(3), None);
        assert_eq!(pm.entry(3).frame, Some(0));
        assert!(!pm.entry(3).valid);

        assert_eq!(pm.resolve(9), Some(0));
        assert_eq!(pm.pages_mapped_to(0), 1);
    }

    #[test]
    fn test_reinstall_same_page_is_not_an_eviction() {
        let mut pm = PhysicalMemory::new(frames(1));
        pm.install(5, 0, filled(1), 1);
        assert_eq!(pm.install(5, 0, filled(1), 1), None);
        assert_eq!(pm.resolve(5), Some(0));
    }

    #[test]
    fn test_evict() {
        let mut pm = PhysicalMemory::new(frames(2));
        assert_eq!(pm.evict(0), None);

        pm.install(4, 0, filled(0), 0);
        assert_eq!(pm.evict(0), Some(4));
        assert_eq!(pm.frame(0).owner, None);
        assert_eq!(pm.resolve(4), None);
        assert_eq!(pm.pages_mapped_to(0), 0);
    }

    #[test]
    fn test_read_byte_refreshes_last_byte() {
        let mut pm = PhysicalMemory::new(frames(1));
        let mut content = filled(0);
        content[0] = 0x7F;
        content[10] = 0x80;
        pm.install(2, 0, content, 0x7F);

        assert_eq!(pm.read_byte(0, 10), -128);
        assert_eq!(pm.frame(0).last_byte, -128);
        assert_eq!(pm.read_byte(0, 0), 127);
        assert_eq!(pm.frame(0).last_byte, 127);
    }

    #[test]
    fn test_disk_initialization() {
        let mut disk = Disk::new();
        assert_eq!(disk.read_page(0).unwrap(), [0; PAGE_SIZE]);
        assert_eq!(disk.read_page(255).unwrap(), [0; PAGE_SIZE]);
    }

    #[test]
    fn test_disk_page_layout() {
        let mut disk = Disk::new();
        disk.page_mut(1)[0] = 13;
        disk.page_mut(1)[255] = 0xFF;

        let page = disk.read_page(1).unwrap();
        assert_eq!(page[0], 13);
        assert_eq!(page[255], 0xFF);
        assert_eq!(disk.read_byte_signed(1, 255).unwrap(), -1);
        assert_eq!(disk.read_page(0).unwrap(), [0; PAGE_SIZE]);
        assert_eq!(disk.read_page(2).unwrap(), [0; PAGE_SIZE]);
    }

    #[test]
    fn test_disk_from_bytes() {
        let bytes: Vec<u8> = (0..BACKING_STORE_SIZE).map(|i| (i / PAGE_SIZE) as u8).collect();
        let mut disk = Disk::from_bytes(bytes).unwrap();
        assert_eq!(disk.read_page(42).unwrap(), [42; PAGE_SIZE]);
    }

    #[test]
    fn test_disk_from_bytes_wrong_size() {
        let result = Disk::from_bytes(vec![0; BACKING_STORE_SIZE - 1]);
        assert!(matches!(result, Err(SimError::StorageCorruption(_))));

        let result = Disk::from_bytes(vec![0; BACKING_STORE_SIZE + 1]);
        assert!(matches!(result, Err(SimError::StorageCorruption(_))));
    }
}
