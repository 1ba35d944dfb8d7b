//! Reservation layer tests.
//!
//! Same 16-page arena as the buddy tests: area 0 over pfns [16, 32),
//! usable [17, 32), seeded as 17/0, 18/1, 20/2, 24/3.

use halcyon_abi::PhysAddr;

use crate::error::MmError;
use crate::hhdm::virt_to_pfn;
use crate::page_alloc::{
    alloc_pages, area_stats, free_pages, page_state_of, reserve_pages, unreserve_pages,
};
use crate::page_state::PageState;
use crate::test_fixtures::TestArena;

fn small_area() -> TestArena {
    let arena = TestArena::new(16, 16);
    arena.init_area(0, 16, 32);
    arena
}

#[test]
fn reserving_one_page_splits_its_block_down() {
    let _arena = small_area();

    reserve_pages(PhysAddr::from_pfn(24), 1).unwrap();

    // The order-3 block at 24 decomposed around the reserved page.
    assert_eq!(page_state_of(24), Some(PageState::Reserved));
    assert_eq!(page_state_of(25), Some(PageState::Free { order: 0 }));
    assert_eq!(page_state_of(26), Some(PageState::Free { order: 1 }));
    assert_eq!(page_state_of(27), Some(PageState::Free { order: 1 }));
    assert_eq!(page_state_of(28), Some(PageState::Free { order: 2 }));
    assert_eq!(page_state_of(31), Some(PageState::Free { order: 2 }));

    // No order-3 block is left, and the largest survivor is the order-2
    // block at 28.
    assert_eq!(alloc_pages(3), None);
    let addr = alloc_pages(2).unwrap();
    assert_eq!(virt_to_pfn(addr), 28);
}

#[test]
fn unreserving_coalesces_back_to_the_original_block() {
    let _arena = small_area();
    let seeded = area_stats(0).unwrap();

    reserve_pages(PhysAddr::from_pfn(24), 1).unwrap();
    unreserve_pages(PhysAddr::from_pfn(24), 1);

    assert_eq!(page_state_of(24), Some(PageState::Free { order: 3 }));
    assert_eq!(area_stats(0).unwrap(), seeded);

    let addr = alloc_pages(3).unwrap();
    assert_eq!(virt_to_pfn(addr), 24);
}

#[test]
fn reserving_an_allocated_page_fails() {
    let _arena = small_area();

    let addr = alloc_pages(0).unwrap();
    let pfn = virt_to_pfn(addr);
    assert_eq!(
        reserve_pages(PhysAddr::from_pfn(pfn), 1),
        Err(MmError::PageBusy { pfn })
    );
    free_pages(addr);
}

#[test]
fn reserving_outside_every_area_fails() {
    let _arena = small_area();
    assert_eq!(
        reserve_pages(PhysAddr::from_pfn(0x100), 1),
        Err(MmError::OutsideAreas { pfn: 0x100 })
    );
}

#[test]
fn double_reservation_fails() {
    let _arena = small_area();

    reserve_pages(PhysAddr::from_pfn(20), 1).unwrap();
    assert_eq!(
        reserve_pages(PhysAddr::from_pfn(20), 1),
        Err(MmError::PageBusy { pfn: 20 })
    );
    unreserve_pages(PhysAddr::from_pfn(20), 1);
}

#[test]
fn reserved_pages_are_never_allocated() {
    let _arena = small_area();

    reserve_pages(PhysAddr::from_pfn(24), 1).unwrap();

    // Drain the allocator completely; pfn 24 must never appear in any
    // returned block.
    let mut blocks = Vec::new();
    for order in (0..4u32).rev() {
        while let Some(addr) = alloc_pages(order) {
            let start = virt_to_pfn(addr);
            let end = start + (1u64 << order);
            assert!(!(start..end).contains(&24), "order {} block covers the reserved page", order);
            blocks.push(addr);
        }
    }
    assert_eq!(area_stats(0).unwrap().free_pages, 0);

    for addr in blocks {
        free_pages(addr);
    }
    unreserve_pages(PhysAddr::from_pfn(24), 1);
    assert_eq!(area_stats(0).unwrap().free_pages, 15);
}

#[test]
fn reserve_unreserve_round_trip_preserves_capability() {
    let _arena = small_area();
    let seeded = area_stats(0).unwrap();

    reserve_pages(PhysAddr::from_pfn(26), 2).unwrap();
    assert_eq!(page_state_of(26), Some(PageState::Reserved));
    assert_eq!(page_state_of(27), Some(PageState::Reserved));
    unreserve_pages(PhysAddr::from_pfn(26), 2);

    assert_eq!(area_stats(0).unwrap(), seeded);
    let addr = alloc_pages(3).unwrap();
    assert_eq!(virt_to_pfn(addr), 24);
}

#[test]
fn failed_multi_page_reserve_rolls_back() {
    let _arena = small_area();

    // Occupy 20..24 so a reservation sweeping 18..22 trips over it.
    let busy = alloc_pages(2).unwrap();
    assert_eq!(virt_to_pfn(busy), 20);
    let before = area_stats(0).unwrap();

    assert_eq!(
        reserve_pages(PhysAddr::from_pfn(18), 4),
        Err(MmError::PageBusy { pfn: 20 })
    );

    // Pages 18 and 19 were reserved and then released again; nothing in
    // the swept range stayed special.
    for pfn in 18..22 {
        assert_ne!(page_state_of(pfn), Some(PageState::Reserved), "pfn {:#x}", pfn);
    }
    assert_eq!(page_state_of(18), Some(PageState::Free { order: 1 }));
    assert_eq!(page_state_of(19), Some(PageState::Free { order: 1 }));
    assert_eq!(area_stats(0).unwrap(), before);

    free_pages(busy);
}

#[test]
fn reserving_a_whole_seeded_block_forces_splits_elsewhere() {
    let _arena = small_area();

    // Take both pages of the order-1 block at 18.
    reserve_pages(PhysAddr::from_pfn(18), 2).unwrap();
    assert_eq!(page_state_of(18), Some(PageState::Reserved));
    assert_eq!(page_state_of(19), Some(PageState::Reserved));

    // An order-1 request must now come from splitting the order-2 block.
    let addr = alloc_pages(1).unwrap();
    assert_eq!(virt_to_pfn(addr), 20);

    free_pages(addr);
    unreserve_pages(PhysAddr::from_pfn(18), 2);
    assert_eq!(page_state_of(18), Some(PageState::Free { order: 1 }));
}

#[test]
#[should_panic(expected = "not reserved")]
fn unreserving_a_free_page_panics() {
    let arena = TestArena::new(16, 16);
    arena.init_area(0, 16, 32);
    unreserve_pages(PhysAddr::from_pfn(17), 1);
}

#[test]
#[should_panic(expected = "not reserved")]
fn double_unreserve_panics() {
    let arena = TestArena::new(16, 16);
    arena.init_area(0, 16, 32);
    reserve_pages(PhysAddr::from_pfn(24), 1).unwrap();
    unreserve_pages(PhysAddr::from_pfn(24), 1);
    unreserve_pages(PhysAddr::from_pfn(24), 1);
}
