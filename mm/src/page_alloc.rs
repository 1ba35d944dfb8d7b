//! Physical page frame allocator.
//!
//! A buddy allocator over up to [`MAX_AREAS`] disjoint physical memory
//! areas. Each area self-hosts its metadata: the first pages of the range
//! hold one state byte per usable page (order plus ALLOC/SPECIAL flags),
//! and the usable pages follow immediately after. Free blocks are chained
//! through intrusive list nodes planted in their own first page, one
//! circular list per block order per area.
//!
//! Areas exist to satisfy address-constrained allocations: callers pass a
//! bit mask of acceptable areas and the allocator serves the request from
//! the first (lowest numbered) area that can. Individual pages can also be
//! carved out entirely for external agents such as DMA targets or firmware
//! tables: marked SPECIAL and withdrawn from the allocator.
//!
//! One process-wide spin lock covers every area, the metadata tables, and
//! the area mask. All public entry points take it; everything on the
//! `PageAllocator`/`MemArea` impls below assumes it is held.

use halcyon_abi::{PAGE_SIZE, PhysAddr, Pfn, VirtAddr};
use halcyon_lib::{SpinLock, align_up_usize, klog_debug, klog_info};

use crate::error::{MmError, MmResult};
use crate::free_list::{self, ListNode};
use crate::hhdm::{pfn_to_virt, virt_to_pfn};
use crate::mm_constants::{AREA_ANY_NUMBER, AREA_CUTOFFS, AREA_MASK_ANY, MAX_AREAS, NLISTS};
use crate::page_state::{ORDER_MASK, PageState, PageStateFlags};
use crate::{AllocOps, install_alloc_ops};

const ALLOC: u8 = PageStateFlags::ALLOC.bits();
const SPECIAL: u8 = PageStateFlags::SPECIAL.bits();

#[inline]
fn is_aligned_order(pfn: Pfn, order: u8) -> bool {
    pfn & ((1u64 << order) - 1) == 0
}

/// One disjoint physical range with its own metadata table and free lists.
struct MemArea {
    /// First usable pfn (right after the metadata table).
    base: Pfn,
    /// First pfn past the end of the area.
    top: Pfn,
    /// One state byte per usable page, indexed by `pfn - base`. The table
    /// lives in the pages `[metadata_pfn() .. base)` of the area itself.
    page_states: *mut u8,
    /// One free list per block order.
    freelists: [ListNode; NLISTS],
}

impl MemArea {
    const fn new() -> Self {
        Self {
            base: 0,
            top: 0,
            page_states: core::ptr::null_mut(),
            freelists: [const { ListNode::unlinked() }; NLISTS],
        }
    }

    /// First pfn of the metadata table, which is also the first pfn of the
    /// whole area.
    fn metadata_pfn(&self) -> Pfn {
        virt_to_pfn(VirtAddr::from(self.page_states))
    }

    /// True if `pfn` falls anywhere inside the area, metadata included.
    fn contains_pfn(&self, pfn: Pfn) -> bool {
        pfn >= self.metadata_pfn() && pfn < self.top
    }

    /// True if `pfn` falls in the allocatable part of the area. The
    /// metadata pages themselves are not tracked and fail this test.
    fn usable_contains_pfn(&self, pfn: Pfn) -> bool {
        pfn >= self.base && pfn < self.top
    }

    fn freelist(&mut self, order: u8) -> *mut ListNode {
        &mut self.freelists[order as usize] as *mut ListNode
    }

    /// # Safety
    ///
    /// The area must be initialized and `idx` within `top - base`.
    #[inline]
    unsafe fn state(&self, idx: u64) -> u8 {
        debug_assert!(idx < self.top - self.base);
        *self.page_states.add(idx as usize)
    }

    /// # Safety
    ///
    /// The area must be initialized and `idx` within `top - base`.
    #[inline]
    unsafe fn set_state(&mut self, idx: u64, byte: u8) {
        debug_assert!(idx < self.top - self.base);
        *self.page_states.add(idx as usize) = byte;
    }

    /// Split the free block starting at `addr` into two buddies of half the
    /// size, relinking both into the next-lower free list.
    ///
    /// The block must be free and non-special, start at `addr`, carry a
    /// homogeneous nonzero order, and sit on its free list.
    ///
    /// # Safety
    ///
    /// Lock held; `addr` translates to a pfn inside this area.
    unsafe fn split(&mut self, addr: VirtAddr) {
        let pfn = virt_to_pfn(addr);
        assert!(self.usable_contains_pfn(pfn));
        let idx = pfn - self.base;
        let order = self.state(idx);
        assert!(order & !ORDER_MASK == 0 && order != 0 && (order as usize) < NLISTS);
        assert!(is_aligned_order(pfn, order));
        assert!(self.usable_contains_pfn(pfn + (1u64 << order) - 1));

        free_list::remove(ListNode::from_block_addr(addr));

        for i in 0..1u64 << order {
            assert!(self.state(idx + i) == order);
            self.set_state(idx + i, order - 1);
        }
        let order = order - 1;
        free_list::add(self.freelist(order), ListNode::from_block_addr(addr));
        free_list::add(
            self.freelist(order),
            ListNode::from_block_addr(pfn_to_virt(pfn + (1u64 << order))),
        );
    }

    /// Merge the two adjacent blocks at `pfn` and `pfn2 = pfn + 2^order`
    /// into one block of the next order. Succeeds only when both blocks lie
    /// in the usable range, both carry exactly `order`, and both are free;
    /// returns `false` without touching anything otherwise.
    ///
    /// # Safety
    ///
    /// Lock held; area initialized.
    unsafe fn coalesce(&mut self, order: u8, pfn: Pfn, pfn2: Pfn) -> bool {
        assert!(is_aligned_order(pfn, order) && is_aligned_order(pfn2, order));
        assert!(pfn2 == pfn + (1u64 << order));

        if !self.usable_contains_pfn(pfn) || !self.usable_contains_pfn(pfn2 + (1u64 << order) - 1)
        {
            return false;
        }
        let first = pfn - self.base;
        let second = pfn2 - self.base;
        // A differing byte means a different order or a non-free page;
        // either way the buddies cannot merge.
        if self.state(first) != order || self.state(second) != order {
            return false;
        }

        free_list::remove(ListNode::from_block_addr(pfn_to_virt(pfn2)));
        free_list::remove(ListNode::from_block_addr(pfn_to_virt(pfn)));
        for i in 0..2u64 << order {
            assert!(self.state(first + i) == order);
            self.set_state(first + i, order + 1);
        }
        free_list::add(self.freelist(order + 1), ListNode::from_block_addr(pfn_to_virt(pfn)));
        true
    }

    /// Take a block whose alignment and size are both at least the given
    /// orders. Blocks are naturally aligned, so any block of sufficient
    /// order is sufficiently aligned; oversized blocks are split down,
    /// keeping the leftmost half so the original alignment survives.
    ///
    /// Returns `None` when this area has no block big enough.
    ///
    /// # Safety
    ///
    /// Lock held; area initialized.
    unsafe fn memalign_order(&mut self, align_order: u8, size_order: u8) -> Option<VirtAddr> {
        assert!((align_order as usize) < NLISTS && (size_order as usize) < NLISTS);
        let start = size_order.max(align_order);

        let mut order = start;
        while (order as usize) < NLISTS && free_list::is_empty(self.freelist(order)) {
            order += 1;
        }
        if order as usize >= NLISTS {
            return None;
        }

        let node = free_list::first(self.freelist(order))?;
        let addr = ListNode::block_addr(node);
        // The leftmost half stays at `addr` and at the head of the next
        // list down, so the same address survives every split.
        while order > size_order {
            self.split(addr);
            order -= 1;
        }

        free_list::remove(ListNode::from_block_addr(addr));
        let idx = virt_to_pfn(addr) - self.base;
        debug_assert!(self.state(idx) == order);
        for i in 0..1u64 << order {
            self.set_state(idx + i, ALLOC | order);
        }
        Some(addr)
    }
}

/// Whole-allocator state: the area table plus the presence mask.
struct PageAllocator {
    areas: [MemArea; MAX_AREAS],
    areas_mask: u32,
}

// SAFETY: the raw metadata pointers inside MemArea refer to memory the
// allocator owns exclusively; the surrounding SpinLock serializes access.
unsafe impl Send for PageAllocator {}

impl PageAllocator {
    const fn new() -> Self {
        Self {
            areas: [const { MemArea::new() }; MAX_AREAS],
            areas_mask: 0,
        }
    }

    fn area_present(&self, n: u32) -> bool {
        (n as usize) < MAX_AREAS && self.areas_mask & (1 << n) != 0
    }

    /// The initialized area whose usable range covers `pfn`, if any.
    fn get_area_mut(&mut self, pfn: Pfn) -> Option<&mut MemArea> {
        for i in 0..MAX_AREAS {
            if self.areas_mask & (1 << i) != 0 && self.areas[i].usable_contains_pfn(pfn) {
                return Some(&mut self.areas[i]);
            }
        }
        None
    }

    /// Register `[start_pfn, top_pfn)` as area `n`: size and place the
    /// metadata table at the head of the range, check disjointness against
    /// every existing area in both directions (metadata included), then
    /// seed the free lists with the coarsest blocks consistent with
    /// natural alignment.
    ///
    /// # Safety
    ///
    /// Lock held. The pfn range must be unused RAM reachable through the
    /// direct map.
    unsafe fn init_area(&mut self, n: u32, start_pfn: Pfn, top_pfn: Pfn) {
        assert!((n as usize) < MAX_AREAS, "area number {} out of range", n);
        assert!(!self.area_present(n), "area {} registered twice", n);

        assert!(top_pfn > start_pfn);
        assert!(top_pfn - start_pfn > 4, "area too small to be worth tracking");
        assert!(top_pfn < 1u64 << (usize::BITS as u64 - halcyon_abi::PAGE_SHIFT as u64));

        // One metadata byte per usable page, the table itself carved from
        // the head of the range: the smallest t with
        // (top - start - t) <= t * PAGE_SIZE.
        let table_size = (top_pfn - start_pfn + PAGE_SIZE) / (PAGE_SIZE + 1);
        let base = start_pfn + table_size;
        let npages = top_pfn - base;
        assert!((base - start_pfn) * PAGE_SIZE >= npages);

        for i in 0..MAX_AREAS {
            if self.areas_mask & (1 << i) == 0 {
                continue;
            }
            let other = &self.areas[i];
            assert!(!other.contains_pfn(start_pfn), "area {} overlaps area {}", n, i);
            assert!(!other.contains_pfn(top_pfn - 1), "area {} overlaps area {}", n, i);
            let other_meta = other.metadata_pfn();
            assert!(
                !(other_meta >= start_pfn && other_meta < top_pfn),
                "area {} overlaps area {}",
                n,
                i
            );
            assert!(
                !(other.top - 1 >= start_pfn && other.top - 1 < top_pfn),
                "area {} overlaps area {}",
                n,
                i
            );
        }

        let a = &mut self.areas[n as usize];
        a.page_states = pfn_to_virt(start_pfn).as_mut_ptr::<u8>();
        a.base = base;
        a.top = top_pfn;
        for order in 0..NLISTS {
            free_list::init_head(a.freelist(order as u8));
        }

        // Seed: walk the usable range picking, at each position, the
        // largest order that stays naturally aligned and inside the area.
        // This yields the minimum number of blocks; anything finer would
        // leave uncoalesced buddies.
        let mut order: u8 = 0;
        let mut i = a.base;
        while i < a.top {
            while i + (1u64 << order) > a.top {
                assert!(order > 0);
                order -= 1;
            }
            // Both directions matter: the block may grow past a power of
            // two boundary as well as run off the end of the area.
            while is_aligned_order(i, order + 1) && i + (1u64 << (order + 1)) <= a.top {
                order += 1;
            }
            assert!((order as usize) < NLISTS);
            let idx = i - a.base;
            for j in 0..1u64 << order {
                a.set_state(idx + j, order);
            }
            free_list::add(a.freelist(order), ListNode::from_block_addr(pfn_to_virt(i)));
            i += 1u64 << order;
        }

        self.areas_mask |= 1 << n;
        klog_info!(
            "page_alloc: area {} pfns {:#x}..{:#x}, {} usable pages, {} metadata pages",
            n,
            base,
            top_pfn,
            npages,
            table_size
        );
    }

    /// Serve an allocation from the first area in `mask` that can.
    ///
    /// # Safety
    ///
    /// Lock held.
    unsafe fn memalign_order_area(
        &mut self,
        mask: u32,
        align_order: u8,
        size_order: u8,
    ) -> Option<VirtAddr> {
        let mask = mask & self.areas_mask;
        for i in 0..MAX_AREAS {
            if mask & (1 << i) != 0 {
                if let Some(addr) = self.areas[i].memalign_order(align_order, size_order) {
                    return Some(addr);
                }
            }
        }
        None
    }

    /// Return a block to its area and coalesce as far as possible.
    ///
    /// # Safety
    ///
    /// Lock held. `mem` must be null or the start of a block previously
    /// handed out by this allocator and not yet freed.
    unsafe fn free_pages_locked(&mut self, mem: VirtAddr) {
        if mem.is_null() {
            return;
        }
        assert!(mem.is_page_aligned(), "freeing unaligned address {:#x}", mem);

        let mut pfn = virt_to_pfn(mem);
        let Some(a) = self.get_area_mut(pfn) else {
            panic!("freeing {:#x}, which belongs to no area", mem);
        };

        // `p` stays fixed on the originally freed page; its state byte
        // tracks the growing enclosing block as coalescing proceeds.
        let p = pfn - a.base;
        let order = a.state(p) & ORDER_MASK;

        assert!(a.state(p) == order | ALLOC, "freeing a page that is not allocated");
        assert!((order as usize) < NLISTS);
        assert!(is_aligned_order(pfn, order));
        assert!(a.usable_contains_pfn(pfn + (1u64 << order) - 1));

        for i in 0..1u64 << order {
            assert!(a.state(p + i) == ALLOC | order, "inconsistent metadata inside block");
            a.set_state(p + i, order);
        }
        free_list::add(a.freelist(order), ListNode::from_block_addr(mem));

        loop {
            // Reread: a successful merge bumps the order stored at `p`.
            let order = a.state(p) & ORDER_MASK;
            // Merge with the next block when this one leads the pair,
            // otherwise fold leftward onto the previous one.
            if !is_aligned_order(pfn, order + 1) {
                pfn -= 1u64 << order;
            }
            let pfn2 = pfn + (1u64 << order);
            if !a.coalesce(order, pfn, pfn2) {
                break;
            }
        }
    }

    /// Withdraw a single page from the allocator: split its enclosing
    /// block down to order 0, unlink the lone page, stamp it SPECIAL.
    ///
    /// # Safety
    ///
    /// Lock held.
    unsafe fn reserve_one(&mut self, pfn: Pfn) -> MmResult<()> {
        let Some(a) = self.get_area_mut(pfn) else {
            return Err(MmError::OutsideAreas { pfn });
        };
        let i = pfn - a.base;
        if a.state(i) & (ALLOC | SPECIAL) != 0 {
            return Err(MmError::PageBusy { pfn });
        }
        // Each split halves the enclosing block while keeping the target
        // page inside; the state byte at `i` is the current order.
        while a.state(i) != 0 {
            let order = a.state(i);
            a.split(pfn_to_virt(pfn & !((1u64 << order) - 1)));
        }
        // The page now stands alone at order 0. Take it off its free list
        // before stamping, so no allocation path can ever see it again.
        free_list::remove(ListNode::from_block_addr(pfn_to_virt(pfn)));
        a.set_state(i, SPECIAL);
        Ok(())
    }

    /// Hand a reserved page back: flip it to an order-0 allocation and run
    /// the normal free path so coalescing proceeds.
    ///
    /// # Safety
    ///
    /// Lock held.
    unsafe fn unreserve_one(&mut self, pfn: Pfn) {
        let Some(a) = self.get_area_mut(pfn) else {
            panic!("unreserving pfn {:#x}, which belongs to no area", pfn);
        };
        let i = pfn - a.base;
        assert!(a.state(i) == SPECIAL, "unreserving pfn {:#x}, which is not reserved", pfn);
        a.set_state(i, ALLOC);
        self.free_pages_locked(pfn_to_virt(pfn));
    }
}

static PAGE_ALLOCATOR: SpinLock<PageAllocator> = SpinLock::new(PageAllocator::new());

/// True once at least one memory area has been registered.
pub fn page_alloc_initialized() -> bool {
    PAGE_ALLOCATOR.lock().areas_mask != 0
}

/// Allocate `2^order` physically contiguous, naturally aligned pages from
/// the first area selected by `mask` that can satisfy the request.
pub fn alloc_pages_area(mask: u32, order: u32) -> Option<VirtAddr> {
    assert!((order as usize) < NLISTS, "order {} out of range", order);
    let res = unsafe {
        PAGE_ALLOCATOR
            .lock()
            .memalign_order_area(mask, order as u8, order as u8)
    };
    if res.is_none() {
        klog_debug!("page_alloc: no order-{} block in areas {:#x}", order, mask);
    }
    res
}

/// Allocate `2^order` pages from any area.
pub fn alloc_pages(order: u32) -> Option<VirtAddr> {
    alloc_pages_area(AREA_MASK_ANY, order)
}

/// Allocate a single page from any area.
pub fn alloc_page() -> Option<VirtAddr> {
    alloc_pages(0)
}

/// The smallest order whose block covers `pages` pages.
fn order_of(pages: usize) -> u8 {
    pages.max(1).next_power_of_two().trailing_zeros() as u8
}

fn pages_of(bytes: usize) -> usize {
    align_up_usize(bytes, PAGE_SIZE as usize) / PAGE_SIZE as usize
}

/// Allocate `size` bytes of physically contiguous pages aligned to
/// `alignment` bytes, both rounded up to whole power-of-two page counts.
pub fn memalign_pages_area(mask: u32, alignment: usize, size: usize) -> Option<VirtAddr> {
    assert!(alignment.is_power_of_two());
    let align_order = order_of(pages_of(alignment));
    let size_order = order_of(pages_of(size));
    assert!((align_order as usize) < NLISTS);
    assert!((size_order as usize) < NLISTS);
    unsafe {
        PAGE_ALLOCATOR
            .lock()
            .memalign_order_area(mask, align_order, size_order)
    }
}

/// Any-area [`memalign_pages_area`] with the raw null-on-failure convention
/// of the generic allocation ops.
pub fn memalign_pages(alignment: usize, size: usize) -> VirtAddr {
    memalign_pages_area(AREA_MASK_ANY, alignment, size).unwrap_or(VirtAddr::NULL)
}

/// Free a block previously returned by one of the allocation entry points.
/// Null is a no-op. Anything else that was not handed out by this
/// allocator is a fatal error.
pub fn free_pages(mem: VirtAddr) {
    unsafe { PAGE_ALLOCATOR.lock().free_pages_locked(mem) }
}

/// Alias of [`free_pages`] for single-page allocations.
pub fn free_page(mem: VirtAddr) {
    free_pages(mem)
}

/// Reserve `n` consecutive pages starting at `addr` for an external agent.
/// All-or-nothing: on conflict, pages reserved so far are released again
/// before the error is returned.
pub fn reserve_pages(addr: PhysAddr, n: usize) -> MmResult<()> {
    assert!(addr.is_page_aligned());
    let pfn = addr.pfn();
    let mut alloc = PAGE_ALLOCATOR.lock();
    for i in 0..n {
        if let Err(err) = unsafe { alloc.reserve_one(pfn + i as u64) } {
            for j in 0..i {
                unsafe { alloc.unreserve_one(pfn + j as u64) };
            }
            return Err(err);
        }
    }
    Ok(())
}

/// Release `n` consecutive reserved pages starting at `addr`. Every page
/// must currently be reserved.
pub fn unreserve_pages(addr: PhysAddr, n: usize) {
    assert!(addr.is_page_aligned());
    let pfn = addr.pfn();
    let mut alloc = PAGE_ALLOCATOR.lock();
    for i in 0..n {
        unsafe { alloc.unreserve_one(pfn + i as u64) };
    }
}

unsafe fn init_area_with_cutoff(n: u32, cutoff: Pfn, base_pfn: Pfn, top_pfn: &mut Pfn) {
    if *top_pfn > cutoff {
        let mut alloc = PAGE_ALLOCATOR.lock();
        if base_pfn >= cutoff {
            alloc.init_area(n, base_pfn, *top_pfn);
            *top_pfn = 0;
        } else {
            alloc.init_area(n, cutoff, *top_pfn);
            *top_pfn = cutoff;
        }
    }
}

/// Add the pfn range `[base_pfn, top_pfn)` to the allocator.
///
/// With an explicit `n` the whole range becomes area `n`. With
/// [`AREA_ANY_NUMBER`] the range is partitioned across the preset areas:
/// each configured cutoff, highest first, peels off the portion of the
/// range above it into the corresponding slot, and the remainder continues
/// downward.
///
/// # Safety
///
/// The range must be unused RAM, disjoint from every registered area and
/// reachable through the direct map for its whole extent.
pub unsafe fn page_alloc_init_area(n: u32, base_pfn: Pfn, top_pfn: Pfn) {
    let mut top = top_pfn;
    if n != AREA_ANY_NUMBER {
        init_area_with_cutoff(n, 0, base_pfn, &mut top);
        return;
    }
    for slot in AREA_CUTOFFS {
        let Some((number, cutoff)) = slot else { continue };
        init_area_with_cutoff(number, cutoff, base_pfn, &mut top);
    }
}

static PAGE_ALLOC_OPS: AllocOps = AllocOps {
    memalign: memalign_pages,
    free: free_pages,
};

/// Route the generic allocation ops through the page allocator. At least
/// one area must have been registered.
pub fn page_alloc_ops_enable() {
    let alloc = PAGE_ALLOCATOR.lock();
    assert!(alloc.areas_mask != 0, "enabling page allocator with no areas");
    install_alloc_ops(&PAGE_ALLOC_OPS);
    drop(alloc);
    klog_info!("page_alloc: allocation ops enabled");
}

/// Read-only snapshot of one area's free lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AreaStats {
    pub base: Pfn,
    pub top: Pfn,
    /// Total free pages across all orders.
    pub free_pages: u64,
    /// Number of free blocks per order.
    pub free_blocks: [u32; NLISTS],
}

/// Snapshot area `n`, or `None` if that slot is not initialized.
pub fn area_stats(n: u32) -> Option<AreaStats> {
    let mut alloc = PAGE_ALLOCATOR.lock();
    if !alloc.area_present(n) {
        return None;
    }
    let a = &mut alloc.areas[n as usize];
    let mut stats = AreaStats {
        base: a.base,
        top: a.top,
        free_pages: 0,
        free_blocks: [0; NLISTS],
    };
    for order in 0..NLISTS {
        let count = unsafe { free_list::len(a.freelist(order as u8)) } as u32;
        stats.free_blocks[order] = count;
        stats.free_pages += (count as u64) << order;
    }
    Some(stats)
}

/// Decode the tracked state of one page frame. `None` for frames outside
/// every area's usable range.
pub fn page_state_of(pfn: Pfn) -> Option<PageState> {
    let mut alloc = PAGE_ALLOCATOR.lock();
    let a = alloc.get_area_mut(pfn)?;
    let byte = unsafe { a.state(pfn - a.base) };
    PageState::decode(byte)
}

#[cfg(test)]
pub(crate) fn reset_for_tests() {
    *PAGE_ALLOCATOR.lock() = PageAllocator::new();
}

// =============================================================================
// OwnedPages - RAII wrapper for automatic deallocation
// =============================================================================

/// An owned block of `2^order` pages, freed back to the allocator on drop.
///
/// # Example
///
/// ```ignore
/// let block = OwnedPages::alloc(2)?;
/// unsafe { block.as_mut_ptr::<u8>().write(0x42) };
/// // freed here
/// ```
pub struct OwnedPages {
    addr: VirtAddr,
    order: u32,
}

impl OwnedPages {
    /// Allocate `2^order` pages from any area.
    #[inline]
    pub fn alloc(order: u32) -> Option<Self> {
        Self::alloc_in(AREA_MASK_ANY, order)
    }

    /// Allocate `2^order` pages from the areas selected by `mask`.
    #[inline]
    pub fn alloc_in(mask: u32, order: u32) -> Option<Self> {
        alloc_pages_area(mask, order).map(|addr| Self { addr, order })
    }

    #[inline]
    pub fn addr(&self) -> VirtAddr {
        self.addr
    }

    #[inline]
    pub fn order(&self) -> u32 {
        self.order
    }

    #[inline]
    pub fn pfn(&self) -> Pfn {
        virt_to_pfn(self.addr)
    }

    #[inline]
    pub fn as_mut_ptr<T>(&self) -> *mut T {
        self.addr.as_mut_ptr()
    }

    /// Give up ownership without freeing; the caller becomes responsible
    /// for passing the address to [`free_pages`] eventually.
    #[inline]
    pub fn into_raw(self) -> VirtAddr {
        let addr = self.addr;
        core::mem::forget(self);
        addr
    }

    /// Reassemble from [`into_raw`](Self::into_raw) output.
    ///
    /// # Safety
    ///
    /// `addr` must be an unfreed block of exactly `2^order` pages handed
    /// out by this allocator, and no other owner may remain.
    #[inline]
    pub unsafe fn from_raw(addr: VirtAddr, order: u32) -> Self {
        debug_assert!(!addr.is_null());
        Self { addr, order }
    }
}

impl Drop for OwnedPages {
    fn drop(&mut self) {
        free_pages(self.addr);
    }
}

impl core::fmt::Debug for OwnedPages {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OwnedPages")
            .field("addr", &format_args!("{:#x}", self.addr))
            .field("order", &self.order)
            .finish()
    }
}
