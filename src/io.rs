use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use crate::constants::*;
use crate::error::{Result, SimError};
use crate::memory::BackingStore;
use crate::translation::VirtualAddress;

/// Parse an address list: one decimal address per line. Blank lines are
/// skipped; anything else that is not an integer in `0..=MAX_ADDRESS`
/// fails the whole list.
pub fn parse_addresses(content: &str) -> Result<Vec<VirtualAddress>> {
    let mut addresses = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let token = line.trim();
        if token.is_empty() {
            continue;
        }
        let raw: u16 = token.parse().map_err(|_| SimError::MalformedAddress {
            line: index + 1,
            text: token.to_string(),
        })?;
        addresses.push(VirtualAddress::from_raw(raw));
    }
    Ok(addresses)
}

pub fn read_virtual_addresses<P: AsRef<Path>>(path: P) -> Result<Vec<VirtualAddress>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_addresses(&content)
}

/// Backing store read on demand from a seekable source, one page per fault
pub struct FileBackingStore<R = File> {
    reader: R,
}

impl FileBackingStore<File> {
    /// Open a backing store file, which must be exactly
    /// `BACKING_STORE_SIZE` bytes long.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let io_err = |source| SimError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(io_err)?;
        let len = file.metadata().map_err(io_err)?.len();
        if len != BACKING_STORE_SIZE as u64 {
            return Err(SimError::StorageCorruption(format!(
                "{} is {} bytes, expected {}",
                path.display(),
                len,
                BACKING_STORE_SIZE
            )));
        }
        Ok(FileBackingStore::new(file))
    }
}

impl<R: Read + Seek> FileBackingStore<R> {
    pub fn new(reader: R) -> Self {
        FileBackingStore { reader }
    }
}

impl<R: Read + Seek> BackingStore for FileBackingStore<R> {
    fn read_page(&mut self, page: PageNumber) -> Result<PageContent> {
        let base = page as u64 * PAGE_SIZE as u64;
        let mut content = [0; PAGE_SIZE];

        self.reader
            .seek(SeekFrom::Start(base))
            .and_then(|_| self.reader.read_exact(&mut content))
            .map_err(|e| match e.kind() {
                io::ErrorKind::UnexpectedEof => {
                    SimError::StorageCorruption(format!("short read of page {} at offset {}", page, base))
                }
                _ => SimError::StorageCorruption(format!("reading page {}: {}", page, e)),
            })?;
        Ok(content)
    }
}
