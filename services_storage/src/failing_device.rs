//! # Failing Block Device
//!
//! A [`BlockDevice`] wrapper that injects write failures, for exercising
//! interrupted saves without real hardware faults.

use hal::{BlockDevice, BlockError};

/// When writes should fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Pass everything through
    Never,
    /// Let the first N writes through, fail every one after
    AfterWrites(usize),
    /// Fail writes to the listed sectors
    OnSectors(Vec<u64>),
}

pub struct FailingBlockDevice<D: BlockDevice> {
    inner: D,
    policy: FailurePolicy,
    write_count: usize,
}

impl<D: BlockDevice> FailingBlockDevice<D> {
    pub fn new(inner: D, policy: FailurePolicy) -> Self {
        Self {
            inner,
            policy,
            write_count: 0,
        }
    }

    fn should_fail(&self, sector: u64) -> bool {
        match &self.policy {
            FailurePolicy::Never => false,
            FailurePolicy::AfterWrites(n) => self.write_count >= *n,
            FailurePolicy::OnSectors(sectors) => sectors.contains(&sector),
        }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut D {
        &mut self.inner
    }

    pub fn into_inner(self) -> D {
        self.inner
    }

    /// Writes that reached the inner device
    pub fn write_count(&self) -> usize {
        self.write_count
    }

    /// Replaces the policy and resets the write counter
    pub fn set_policy(&mut self, policy: FailurePolicy) {
        self.policy = policy;
        self.write_count = 0;
    }
}

impl<D: BlockDevice> BlockDevice for FailingBlockDevice<D> {
    fn sector_count(&self) -> u64 {
        self.inner.sector_count()
    }

    fn read_sector(&mut self, sector: u64, buffer: &mut [u8]) -> Result<(), BlockError> {
        self.inner.read_sector(sector, buffer)
    }

    fn write_sector(&mut self, sector: u64, buffer: &[u8]) -> Result<(), BlockError> {
        if self.should_fail(sector) {
            return Err(BlockError::IoError);
        }
        self.write_count += 1;
        self.inner.write_sector(sector, buffer)
    }

    fn flush(&mut self) -> Result<(), BlockError> {
        if matches!(self.policy, FailurePolicy::AfterWrites(n) if self.write_count >= n) {
            return Err(BlockError::IoError);
        }
        self.inner.flush()
    }
}
