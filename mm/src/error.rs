//! Error type for the memory subsystem.
//!
//! Only recoverable conditions get a variant: resource exhaustion and
//! reservation conflicts. Contract violations (freeing memory the
//! allocator never handed out, overlapping area registrations, corrupt
//! metadata) are assertions, because the allocator's own invariants are
//! ground truth and continuing past a violation would corrupt memory.

use core::fmt;

use halcyon_abi::Pfn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MmError {
    /// No free block large enough in any of the requested areas.
    NoMemory,
    /// The frame is not covered by any initialized area.
    OutsideAreas { pfn: Pfn },
    /// The frame is already allocated or already reserved.
    PageBusy { pfn: Pfn },
}

impl fmt::Display for MmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMemory => write!(f, "out of memory for page allocation"),
            Self::OutsideAreas { pfn } => {
                write!(f, "pfn {:#x} does not belong to any memory area", pfn)
            }
            Self::PageBusy { pfn } => {
                write!(f, "pfn {:#x} is already allocated or reserved", pfn)
            }
        }
    }
}

/// Convenience result type for memory management operations.
pub type MmResult<T = ()> = Result<T, MmError>;
