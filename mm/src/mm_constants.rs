//! Memory-management constants: free-list geometry and area presets.

use halcyon_abi::Pfn;

pub use halcyon_abi::{PAGE_SHIFT, PAGE_SIZE};

/// Number of free lists per area, one per block order. A block of the
/// largest order spans the whole addressable space, so the count is the
/// machine word width minus the page shift.
pub const NLISTS: usize = (u64::BITS - PAGE_SHIFT) as usize;

// The per-page metadata byte stores the order in 6 bits.
const _: () = assert!(NLISTS <= 64, "block order does not fit the metadata byte");

/// Upper bound on distinct memory areas: the four presets plus two free
/// slots for explicitly numbered areas.
pub const MAX_AREAS: usize = 6;

/// Passing this instead of an area number lets the allocator partition the
/// range across the preset areas by physical address.
pub const AREA_ANY_NUMBER: u32 = u32::MAX;

/// Mask selecting every initialized area.
pub const AREA_MASK_ANY: u32 = u32::MAX;

/// Mask with only area `n` selected.
#[inline]
pub const fn area_mask(n: u32) -> u32 {
    1 << n
}

/// Memory at and above 4 GiB.
pub const AREA_NORMAL_NUMBER: u32 = 1;
pub const AREA_NORMAL_PFN: Pfn = 1 << (32 - PAGE_SHIFT);

/// Memory between 1 MiB and 4 GiB.
pub const AREA_LOW_NUMBER: u32 = 2;
pub const AREA_LOW_PFN: Pfn = 1 << (20 - PAGE_SHIFT);

/// Memory below 1 MiB.
pub const AREA_LOWEST_NUMBER: u32 = 3;
pub const AREA_LOWEST_PFN: Pfn = 0;

/// Preset cutoffs in descending address order, as consulted by
/// auto-partitioning. A slot configured `None` is skipped; this platform
/// has no high area.
pub const AREA_CUTOFFS: [Option<(u32, Pfn)>; 4] = [
    None, // high
    Some((AREA_NORMAL_NUMBER, AREA_NORMAL_PFN)),
    Some((AREA_LOW_NUMBER, AREA_LOW_PFN)),
    Some((AREA_LOWEST_NUMBER, AREA_LOWEST_PFN)),
];
