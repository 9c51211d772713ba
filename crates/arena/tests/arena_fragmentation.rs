//! Integration tests for FixedArena reuse and fragmentation behaviour

#![allow(unsafe_code)]

use fixmem_arena::{ArenaConfig, ArenaError, FixedArena, MemoryResource};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::alloc::Layout;

#[test]
fn test_arena_basic_write_read() {
    let arena = FixedArena::new(4096).expect("Failed to create arena");

    let ptr = arena.allocate(128, 8).expect("Allocation failed");
    unsafe {
        std::ptr::write_bytes(ptr.as_ptr(), 0x55, 128);
        assert_eq!(*ptr.as_ptr(), 0x55);
        assert_eq!(*ptr.as_ptr().add(127), 0x55);
        arena.deallocate(ptr, 128, 8);
    }
}

#[test]
fn test_allocations_do_not_overlap() {
    let arena = FixedArena::new(1024).expect("Failed to create arena");

    let a = arena.allocate(100, 4).expect("Allocation A failed");
    let b = arena.allocate(100, 4).expect("Allocation B failed");
    let c = arena.allocate(100, 4).expect("Allocation C failed");

    unsafe {
        std::ptr::write_bytes(a.as_ptr(), 0xAA, 100);
        std::ptr::write_bytes(b.as_ptr(), 0xBB, 100);
        std::ptr::write_bytes(c.as_ptr(), 0xCC, 100);

        assert!((0..100).all(|i| *a.as_ptr().add(i) == 0xAA));
        assert!((0..100).all(|i| *b.as_ptr().add(i) == 0xBB));
        assert!((0..100).all(|i| *c.as_ptr().add(i) == 0xCC));

        arena.deallocate(b, 100, 4);
        arena.deallocate(a, 100, 4);
        arena.deallocate(c, 100, 4);
    }
    assert_eq!(arena.free_bytes(), 1024);
}

#[rstest]
#[case(1)]
#[case(8)]
#[case(16)]
#[case(64)]
#[case(512)]
fn test_layout_requests_are_aligned(#[case] align: usize) {
    let arena = FixedArena::new(2048).expect("Failed to create arena");
    let layout = Layout::from_size_align(24, align).unwrap();

    let _skew = arena.allocate(3, 1).unwrap();
    let ptr = arena.allocate_layout(layout).expect("Allocation failed");
    assert_eq!(ptr.as_ptr().addr() % align, 0);
    unsafe { arena.deallocate_layout(ptr, layout) };
}

#[test]
fn test_freeing_everything_restores_bytes_but_not_contiguity() {
    let arena = FixedArena::new(256).expect("Failed to create arena");

    let blocks: Vec<_> = (0..4)
        .map(|_| arena.allocate(64, 16).expect("Allocation failed"))
        .collect();
    assert!(arena.allocate(1, 1).is_err());

    // return the blocks out of address order
    for index in [2, 0, 3, 1] {
        unsafe { arena.deallocate(blocks[index], 64, 16) };
    }

    // no bytes were lost ...
    assert_eq!(arena.free_bytes(), arena.capacity());
    assert_eq!(arena.free_blocks().len(), 4);
    // ... but the blocks were never merged, so the full buffer does not fit
    assert_eq!(
        arena.allocate(256, 1),
        Err(ArenaError::OutOfMemory {
            requested: 256,
            alignment: 1
        })
    );
    // while each original slot is still usable
    for _ in 0..4 {
        assert!(arena.allocate(64, 16).is_ok());
    }
}

#[test]
fn test_alignment_gap_is_reusable() {
    let arena =
        FixedArena::with_config(ArenaConfig::new(256).with_base_align(64)).expect("arena");

    // 1 byte at offset 0, then a 64-aligned request leaves a 63-byte gap
    let _first = arena.allocate(1, 1).unwrap();
    let aligned = arena.allocate(32, 64).unwrap();
    assert_eq!(aligned.as_ptr().addr() % 64, 0);

    // the gap sits in the free list and serves a later small request
    let small = arena.allocate(63, 1).unwrap();
    assert!(small.as_ptr().addr() < aligned.as_ptr().addr());
    assert_eq!(arena.free_bytes(), 256 - 1 - 32 - 63);
}

#[test]
fn test_resource_through_trait_object() {
    let arena = FixedArena::new(512).expect("Failed to create arena");
    let other = FixedArena::new(512).expect("Failed to create arena");
    let resource: &dyn MemoryResource = &arena;

    let ptr = resource.allocate(48, 8).unwrap();
    assert!(arena.contains(ptr));
    assert!(!other.contains(ptr));
    unsafe { resource.deallocate(ptr, 48, 8) };

    assert!(resource.is_equal(&arena));
    assert!(!resource.is_equal(&other));
    assert!(other.is_equal(&other));
}
