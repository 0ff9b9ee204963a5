use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::error::{Result, SimError};
use crate::replacement::Policy;

/// Validated settings for one simulation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    pub addresses: PathBuf,
    pub backing_store: PathBuf,
    pub frames: NonZeroUsize,
    pub policy: Policy,
}

impl SimConfig {
    /// Build a config from raw user input. The policy is checked first, so
    /// a run with both a bad policy and a bad frame count reports the policy.
    pub fn new(
        addresses: impl Into<PathBuf>,
        backing_store: impl Into<PathBuf>,
        frames: i64,
        policy: &str,
    ) -> Result<Self> {
        let policy: Policy = policy.parse()?;
        let frames = usize::try_from(frames)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or_else(|| {
                SimError::Configuration(format!("frame count must be a positive integer, got {}", frames))
            })?;

        Ok(SimConfig {
            addresses: addresses.into(),
            backing_store: backing_store.into(),
            frames,
            policy,
        })
    }
}
