//! Per-request bump allocator.
//!
//! Mirrors `katana::monotonic_arena` from the original C++ core: a sequence of
//! cache-line-aligned blocks that grow geometrically, bump-allocated, and reset
//! in O(blocks) rather than freed allocation-by-allocation. Allocation borrows
//! `&self` (interior mutability via `Cell`/`RefCell`, following `bumpalo`'s
//! approach) so that every returned reference is tied to the arena's lifetime —
//! [`Arena::reset`] takes `&mut self` and the borrow checker refuses to let it run
//! while any allocation from this arena is still reachable.

use std::alloc::{alloc, dealloc, Layout};
use std::cell::{Cell, RefCell};
use std::ptr::NonNull;
use std::str;

/// Default block size: 64 KiB, matching the original core's geometric growth policy.
pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

/// Upper bound on any single allocation's alignment. Alignments above this are rejected.
pub const MAX_ALIGNMENT: usize = 4096;

/// Cache-line alignment used for the blocks themselves.
const BLOCK_ALIGNMENT: usize = 64;

struct Block {
    data: NonNull<u8>,
    layout: Layout,
    size: usize,
    used: Cell<usize>,
}

impl Block {
    fn new(size: usize) -> Option<Self> {
        let layout = Layout::from_size_align(size, BLOCK_ALIGNMENT).ok()?;
        // SAFETY: layout has non-zero size (callers never request a zero-size block).
        let data = unsafe { alloc(layout) };
        let data = NonNull::new(data)?;
        Some(Block {
            data,
            layout,
            size,
            used: Cell::new(0),
        })
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        // SAFETY: `data` was allocated with `layout` by `alloc` and never freed elsewhere.
        unsafe { dealloc(self.data.as_ptr(), self.layout) };
    }
}

/// A bump-allocating arena scoped to a single request's lifetime.
///
/// # Invariants
/// - Allocations never move once handed out.
/// - References derived from an allocation remain valid until the next [`reset`](Self::reset).
/// - `bytes_allocated() <= total_capacity()` always holds.
pub struct Arena {
    blocks: RefCell<Vec<Block>>,
    block_size: usize,
    bytes_allocated: Cell<usize>,
    total_capacity: Cell<usize>,
}

impl Arena {
    /// Create an empty arena that grows in `block_size`-byte increments (minimum one byte).
    pub fn new(block_size: usize) -> Self {
        Arena {
            blocks: RefCell::new(Vec::new()),
            block_size: block_size.max(1),
            bytes_allocated: Cell::new(0),
            total_capacity: Cell::new(0),
        }
    }

    fn align_up(addr: usize, alignment: usize) -> usize {
        (addr + alignment - 1) & !(alignment - 1)
    }

    /// Allocate `bytes` with the given `alignment`, returning a pointer valid until
    /// the next [`reset`](Self::reset).
    ///
    /// Returns `None` when `alignment` is zero, not a power of two, exceeds
    /// [`MAX_ALIGNMENT`], `bytes` is zero, or the allocator is exhausted (a fresh
    /// block failed to allocate from the system).
    pub fn allocate(&self, bytes: usize, alignment: usize) -> Option<NonNull<u8>> {
        if bytes == 0 {
            return None;
        }
        if alignment == 0 || !alignment.is_power_of_two() || alignment > MAX_ALIGNMENT {
            return None;
        }

        let blocks = self.blocks.borrow();
        for block in blocks.iter() {
            let used = block.used.get();
            if used >= block.size {
                continue;
            }
            let current = block.data.as_ptr() as usize + used;
            let aligned = Self::align_up(current, alignment);
            let padding = aligned - current;
            if used + padding + bytes <= block.size {
                block.used.set(used + padding + bytes);
                self.bytes_allocated.set(self.bytes_allocated.get() + bytes);
                return NonNull::new(aligned as *mut u8);
            }
        }
        drop(blocks);

        let min_size = self.block_size.max(bytes + MAX_ALIGNMENT);
        let block = Block::new(min_size)?;
        self.total_capacity.set(self.total_capacity.get() + min_size);

        let current = block.data.as_ptr() as usize;
        let aligned = Self::align_up(current, alignment);
        let padding = aligned - current;
        if padding + bytes > block.size {
            // Unreachable given `min_size` accounts for MAX_ALIGNMENT padding.
            return None;
        }
        block.used.set(padding + bytes);
        self.blocks.borrow_mut().push(block);
        self.bytes_allocated.set(self.bytes_allocated.get() + bytes);
        NonNull::new(aligned as *mut u8)
    }

    /// Copy `bytes` into the arena and return a slice borrowing from it.
    pub fn alloc_bytes<'a>(&'a self, bytes: &[u8]) -> Option<&'a [u8]> {
        if bytes.is_empty() {
            return Some(&[]);
        }
        let ptr = self.allocate(bytes.len(), 1)?;
        // SAFETY: `ptr` designates `bytes.len()` freshly allocated bytes from this
        // arena, not aliased by any other live reference, valid until `reset`.
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr.as_ptr(), bytes.len());
            Some(std::slice::from_raw_parts(ptr.as_ptr(), bytes.len()))
        }
    }

    /// Copy a string into the arena and return a `&str` borrowing from it.
    pub fn alloc_str<'a>(&'a self, s: &str) -> Option<&'a str> {
        let bytes = self.alloc_bytes(s.as_bytes())?;
        // SAFETY: `bytes` is a verbatim copy of `s`'s already-valid UTF-8.
        Some(unsafe { str::from_utf8_unchecked(bytes) })
    }

    /// Concatenate `a` and `b` with a single ASCII space between them, as arena storage.
    /// Used to implement obs-fold header-value continuation (`spec.md` §4.2 rule 2).
    pub fn alloc_joined<'a>(&'a self, a: &str, b: &str) -> Option<&'a str> {
        let mut buf = Vec::with_capacity(a.len() + 1 + b.len());
        buf.extend_from_slice(a.as_bytes());
        buf.push(b' ');
        buf.extend_from_slice(b.as_bytes());
        let bytes = self.alloc_bytes(&buf)?;
        Some(unsafe { str::from_utf8_unchecked(bytes) })
    }

    /// Rewind every block's used counter to zero. Capacity is retained for reuse.
    ///
    /// Requires `&mut self`: the borrow checker will not allow this to run while any
    /// reference returned by [`allocate`](Self::allocate) (or the `alloc_*` helpers)
    /// is still reachable, so there is no way to observe a dangling arena reference
    /// from safe code.
    pub fn reset(&mut self) {
        for block in self.blocks.get_mut() {
            block.used.set(0);
        }
        self.bytes_allocated.set(0);
    }

    /// Bytes currently considered "live" (allocated since the last reset).
    pub fn bytes_allocated(&self) -> usize {
        self.bytes_allocated.get()
    }

    /// Total bytes reserved across all blocks, regardless of use.
    pub fn total_capacity(&self) -> usize {
        self.total_capacity.get()
    }

    /// Number of blocks currently owned by the arena.
    pub fn block_count(&self) -> usize {
        self.blocks.borrow().len()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Arena::new(DEFAULT_BLOCK_SIZE)
    }
}

// Arena is thread-local to its owning reactor worker by convention; it does not
// need to be Sync, and is not shared across threads.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_respects_alignment() {
        let arena = Arena::new(256);
        for align in [1usize, 2, 4, 8, 16, 32, 64] {
            let ptr = arena.allocate(3, align).expect("allocation should succeed");
            assert_eq!(ptr.as_ptr() as usize % align, 0);
        }
    }

    #[test]
    fn rejects_invalid_alignment() {
        let arena = Arena::new(256);
        assert!(arena.allocate(8, 0).is_none());
        assert!(arena.allocate(8, 3).is_none());
        assert!(arena.allocate(8, MAX_ALIGNMENT * 2).is_none());
    }

    #[test]
    fn rejects_zero_size() {
        let arena = Arena::new(256);
        assert!(arena.allocate(0, 8).is_none());
    }

    #[test]
    fn reset_reclaims_without_releasing_blocks() {
        let mut arena = Arena::new(64);
        {
            let _ = arena.allocate(32, 8).unwrap();
        }
        let blocks_before = arena.block_count();
        assert!(arena.bytes_allocated() > 0);
        arena.reset();
        assert_eq!(arena.bytes_allocated(), 0);
        assert_eq!(arena.block_count(), blocks_before);
    }

    #[test]
    fn oversized_allocation_gets_its_own_block() {
        let arena = Arena::new(64);
        let big = arena.allocate(1024, 8);
        assert!(big.is_some());
        assert!(arena.total_capacity() >= 1024);
    }

    #[test]
    fn no_two_allocations_overlap() {
        let arena = Arena::new(128);
        let mut ptrs = Vec::new();
        for _ in 0..20 {
            let p = arena.allocate(7, 8).unwrap();
            ptrs.push((p.as_ptr() as usize, 7usize));
        }
        for i in 0..ptrs.len() {
            for j in (i + 1)..ptrs.len() {
                let (a_start, a_len) = ptrs[i];
                let (b_start, b_len) = ptrs[j];
                let a_end = a_start + a_len;
                let b_end = b_start + b_len;
                assert!(a_end <= b_start || b_end <= a_start, "allocations overlap");
            }
        }
    }

    #[test]
    fn alloc_str_round_trips() {
        let arena = Arena::new(256);
        let s = arena.alloc_str("hello arena").unwrap();
        assert_eq!(s, "hello arena");
    }

    #[test]
    fn alloc_joined_inserts_single_space() {
        let arena = Arena::new(256);
        let s = arena.alloc_joined("first", "second").unwrap();
        assert_eq!(s, "first second");
    }

    #[quickcheck_macros::quickcheck]
    fn bytes_allocated_never_exceeds_capacity(sizes: Vec<u16>) -> bool {
        let arena = Arena::new(DEFAULT_BLOCK_SIZE);
        for size in sizes {
            let size = (size as usize).max(1);
            arena.allocate(size, 8);
        }
        arena.bytes_allocated() <= arena.total_capacity()
    }
}
