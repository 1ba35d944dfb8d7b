//! Direct-map translation between physical and virtual addresses.
//!
//! The allocator's metadata and free-list nodes live inside the managed
//! pages themselves, so it constantly needs a virtual view of a physical
//! frame. This module is the single source of truth for the direct-map
//! offset; the embedding system initializes it once during boot with
//! whatever offset its mapping uses.

use core::sync::atomic::{AtomicU64, Ordering};

use halcyon_abi::{PhysAddr, Pfn, VirtAddr};
use halcyon_lib::InitFlag;

static HHDM_OFFSET: AtomicU64 = AtomicU64::new(0);
static HHDM_INIT: InitFlag = InitFlag::new();

/// Record the direct-map offset. Must run before any area is initialized.
///
/// # Panics
///
/// Panics when called a second time.
pub fn init(offset: u64) {
    HHDM_OFFSET.store(offset, Ordering::Release);
    if !HHDM_INIT.init_once() {
        panic!("direct map offset initialized twice");
    }
}

#[inline]
pub fn is_available() -> bool {
    HHDM_INIT.is_set()
}

#[inline]
pub fn offset() -> u64 {
    debug_assert!(is_available(), "direct map not initialized");
    HHDM_OFFSET.load(Ordering::Acquire)
}

/// Replace the offset so a test fixture can install its own mapping.
#[cfg(test)]
pub(crate) fn reset_for_tests(offset: u64) {
    HHDM_OFFSET.store(offset, Ordering::Release);
    HHDM_INIT.mark_set();
}

/// The virtual address of the first byte of frame `pfn`.
#[inline]
pub fn pfn_to_virt(pfn: Pfn) -> VirtAddr {
    PhysAddr::from_pfn(pfn).to_virt()
}

/// The frame number backing a direct-mapped virtual address.
#[inline]
pub fn virt_to_pfn(addr: VirtAddr) -> Pfn {
    addr.to_phys_hhdm().pfn()
}

/// Extension trait adding direct-map translation to `PhysAddr`.
pub trait PhysAddrHhdm {
    /// Translate through the direct map.
    ///
    /// # Panics
    ///
    /// Panics if the direct map has not been initialized.
    fn to_virt(self) -> VirtAddr;

    /// Translate, `None` when null or when the direct map is unavailable.
    fn try_to_virt(self) -> Option<VirtAddr>;
}

impl PhysAddrHhdm for PhysAddr {
    #[inline]
    fn to_virt(self) -> VirtAddr {
        if self.is_null() {
            return VirtAddr::NULL;
        }
        assert!(is_available(), "direct map not initialized");
        VirtAddr::new(self.as_u64() + offset())
    }

    #[inline]
    fn try_to_virt(self) -> Option<VirtAddr> {
        if self.is_null() || !is_available() {
            return None;
        }
        Some(VirtAddr::new(self.as_u64() + offset()))
    }
}

/// Extension trait adding the reverse translation to `VirtAddr`.
pub trait VirtAddrHhdm {
    /// Subtract the direct-map offset. Only meaningful for addresses that
    /// came out of [`PhysAddrHhdm::to_virt`].
    fn to_phys_hhdm(self) -> PhysAddr;
}

impl VirtAddrHhdm for VirtAddr {
    #[inline]
    fn to_phys_hhdm(self) -> PhysAddr {
        if self.is_null() {
            return PhysAddr::NULL;
        }
        PhysAddr::new(self.as_u64().wrapping_sub(offset()))
    }
}
