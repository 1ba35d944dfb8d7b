//! Halcyon memory management: the physical page allocator.
//!
//! The crate is organized leaves-first: `free_list` is the intrusive list
//! primitive, `page_state` the per-page metadata encoding, `hhdm` the
//! phys/virt seam, and `page_alloc` the buddy engine, the area manager,
//! the reservation layer, and the public surface on top of them all.

#![cfg_attr(not(test), no_std)]
#![allow(unsafe_op_in_unsafe_fn)]

pub mod error;
pub mod free_list;
pub mod hhdm;
pub mod mm_constants;
pub mod page_alloc;
pub mod page_state;

#[cfg(test)]
mod test_fixtures;
#[cfg(test)]
mod tests_reserve;

use core::sync::atomic::{AtomicPtr, Ordering};

use halcyon_abi::VirtAddr;

/// The allocation interface generic code programs against: page-granular
/// `memalign`/`free` over raw addresses, null signalling failure.
pub struct AllocOps {
    pub memalign: fn(alignment: usize, size: usize) -> VirtAddr,
    pub free: fn(mem: VirtAddr),
}

/// Null until an allocator installs itself.
static ALLOC_OPS: AtomicPtr<AllocOps> = AtomicPtr::new(core::ptr::null_mut());

/// Route generic allocations through `ops` from now on.
pub fn install_alloc_ops(ops: &'static AllocOps) {
    ALLOC_OPS.store(ops as *const AllocOps as *mut AllocOps, Ordering::Release);
}

/// The currently installed allocation ops, if any.
pub fn alloc_ops() -> Option<&'static AllocOps> {
    let ptr = ALLOC_OPS.load(Ordering::Acquire);
    // SAFETY: only `install_alloc_ops` stores here, and it only accepts
    // 'static references.
    unsafe { ptr.cast_const().as_ref() }
}

pub use error::{MmError, MmResult};
pub use page_alloc::{
    AreaStats, OwnedPages, alloc_page, alloc_pages, alloc_pages_area, area_stats, free_page,
    free_pages, memalign_pages, memalign_pages_area, page_alloc_init_area, page_alloc_initialized,
    page_alloc_ops_enable, page_state_of, reserve_pages, unreserve_pages,
};
pub use page_state::PageState;
