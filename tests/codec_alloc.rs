use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

use candbc_parser::{ByteOrder, Signal, ValueKind, codec};

/// Counts allocations made by the current thread.
struct CountingAllocator;

thread_local! {
    static ALLOCATIONS: Cell<usize> = const { Cell::new(0) };
}

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        ALLOCATIONS.with(|count| count.set(count.get() + 1));
        unsafe { System.alloc(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) }
    }
}

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

fn allocations() -> usize {
    ALLOCATIONS.with(Cell::get)
}

#[test]
fn integer_unpack_does_not_allocate() {
    let signal = Signal {
        name: "Temp".into(),
        start_bit: 16,
        length: 16,
        byte_order: ByteOrder::Intel,
        value_kind: ValueKind::Signed,
        factor: 0.1,
        offset: -40.0,
        ..Default::default()
    };
    let frame: u64 = codec::pack(21.5, &signal);
    let payload: [u8; 8] = frame.to_le_bytes();

    let before = allocations();
    let value = codec::unpack(frame, &signal);
    let from_bytes = codec::unpack_bytes(&payload, &signal);
    let state = codec::unpack_state(frame, &signal);
    let after = allocations();

    assert_eq!(after, before);
    assert_eq!(value, 21.5);
    assert_eq!(from_bytes, 21.5);
    assert_eq!(state, 615);
}
