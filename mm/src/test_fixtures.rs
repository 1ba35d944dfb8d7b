//! Host-memory fixtures for allocator tests.
//!
//! Allocator state is process-global, so each test builds a [`TestArena`]:
//! it takes a global lock for the test's duration, resets the allocator,
//! backs a synthetic pfn range with a page-aligned heap buffer, and points
//! the direct-map offset at it. Synthetic frame numbers mean tests can use
//! small, precisely aligned pfns regardless of where the host buffer lands.

use std::alloc::{Layout, alloc, dealloc, handle_alloc_error};

use halcyon_abi::{PAGE_SIZE, Pfn};
use halcyon_lib::{SpinLock, SpinLockGuard, klog_register_backend};

use crate::mm_constants::AREA_ANY_NUMBER;
use crate::{hhdm, page_alloc};

static TEST_MEM_LOCK: SpinLock<()> = SpinLock::new(());

fn stdout_backend(args: core::fmt::Arguments<'_>) {
    println!("{args}");
}

pub(crate) struct TestArena {
    buf: *mut u8,
    layout: Layout,
    base_pfn: Pfn,
    pages: usize,
    _guard: SpinLockGuard<'static, ()>,
}

impl TestArena {
    /// Back pfns `[base_pfn, base_pfn + pages)` with host memory.
    pub(crate) fn new(base_pfn: Pfn, pages: usize) -> Self {
        assert!(base_pfn > 0 && pages > 0);
        let guard = TEST_MEM_LOCK.lock();
        klog_register_backend(stdout_backend);
        page_alloc::reset_for_tests();

        let layout =
            Layout::from_size_align(pages * PAGE_SIZE as usize, PAGE_SIZE as usize).unwrap();
        let buf = unsafe { alloc(layout) };
        if buf.is_null() {
            handle_alloc_error(layout);
        }

        // Choose the offset so that pfn_to_virt(base_pfn) lands on the
        // buffer start; the synthetic numbering carries all the alignment
        // structure the buddy engine cares about.
        hhdm::reset_for_tests(buf as u64 - base_pfn * PAGE_SIZE);

        Self {
            buf,
            layout,
            base_pfn,
            pages,
            _guard: guard,
        }
    }

    pub(crate) fn top_pfn(&self) -> Pfn {
        self.base_pfn + self.pages as u64
    }

    /// Register `[start, top)` as area `n`.
    pub(crate) fn init_area(&self, n: u32, start: Pfn, top: Pfn) {
        assert!(start >= self.base_pfn && top <= self.top_pfn());
        unsafe { page_alloc::page_alloc_init_area(n, start, top) };
    }

    /// Hand the whole arena to the auto-partitioner.
    pub(crate) fn init_area_auto(&self) {
        unsafe { page_alloc::page_alloc_init_area(AREA_ANY_NUMBER, self.base_pfn, self.top_pfn()) };
    }
}

impl Drop for TestArena {
    fn drop(&mut self) {
        // The allocator must not keep metadata pointers into the buffer
        // past this point.
        page_alloc::reset_for_tests();
        unsafe { dealloc(self.buf, self.layout) };
    }
}
