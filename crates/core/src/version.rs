//! Optimistic concurrency primitives.

/// Something persisted under a monotonically increasing version counter.
///
/// Version `0` means "never persisted"; the store assigns `1` on the first
/// successful write and increments on every subsequent one.
pub trait Versioned {
    fn version(&self) -> u64;

    /// Expectation that the stored record is still at this value's version.
    fn expected_version(&self) -> ExpectedVersion {
        ExpectedVersion::Exact(self.version())
    }
}

/// Optimistic concurrency expectation for a conditional write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking (unconditional overwrite).
    Any,
    /// Require the stored record to be at an exact version (`0` = absent).
    Exact(u64),
}

impl ExpectedVersion {
    /// Expect the record not to exist yet.
    pub const fn absent() -> Self {
        ExpectedVersion::Exact(0)
    }

    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }
}
