//! Halcyon ABI-stable value types.
//!
//! Canonical definitions shared by every layer of the system: page geometry
//! and the typed address/frame-number vocabulary the memory subsystem speaks.
//! Keeping them in one dependency-free crate means the kernel proper, the
//! memory manager, and any host-side tooling agree on the representation.

#![no_std]
#![forbid(unsafe_code)]

pub mod addr;

/// Size of one page frame in bytes.
pub const PAGE_SIZE: u64 = 0x1000;

/// log2 of [`PAGE_SIZE`].
pub const PAGE_SHIFT: u32 = 12;

/// Page frame number: a physical address divided by the page size.
pub type Pfn = u64;

pub use addr::{PhysAddr, VirtAddr};
