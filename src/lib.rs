pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod memory;
pub mod replacement;
pub mod tlb;
pub mod translation;
pub mod vm_manager;

// Re-export commonly used items for convenience
pub use config::SimConfig;
pub use constants::*;
pub use error::{Result, SimError};
pub use memory::{BackingStore, Disk, PhysicalMemory};
pub use replacement::Policy;
pub use translation::{AccessKind, Metrics, TranslationRecord, VirtualAddress};
pub use vm_manager::VmManager;
