//! The heap substrate: the one external collaborator this allocator leans
//! on for actual memory.
//!
//! The allocator core never calls `sbrk`/`mmap` directly; it goes through
//! this trait, so the free-list/coalescing/fit-search machinery can be
//! exercised against a fake, bounded substrate in tests without mutating
//! the real process break. [`SbrkHeap`] is the real default, and calls
//! `libc::sbrk` exactly the way this allocator's ancestor did.

use std::ptr;

use libc::{intptr_t, sbrk};

/// A monotonically-extensible region of memory.
///
/// # Contract
///
/// - `extend` appends exactly `bytes` bytes to the managed region and
///   returns the start of the new region, or null on failure. The region
///   only ever grows; there is no way to give memory back.
/// - `lo`/`hi` are the inclusive bounds of the region as of the last
///   successful `extend` call. Before the first successful `extend`,
///   both may be null.
///
/// # Safety
///
/// Implementors must ensure `extend` never returns overlapping memory
/// across calls, and that the region named by `[lo, hi]` is entirely
/// valid, writable memory once `extend` has succeeded at least once.
pub unsafe trait HeapSubstrate {
  /// Grows the managed region by `bytes` bytes. Returns a pointer to the
  /// start of the newly appended region, or null on failure.
  ///
  /// # Safety
  ///
  /// `bytes` must be a multiple of the allocator's minimum block size;
  /// callers are responsible for that rounding.
  unsafe fn extend(&mut self, bytes: usize) -> *mut u8;

  /// Inclusive lower bound of the currently mapped region, or null if
  /// nothing has been mapped yet.
  fn lo(&self) -> *const u8;

  /// Inclusive upper bound of the currently mapped region, or null if
  /// nothing has been mapped yet.
  fn hi(&self) -> *const u8;
}

/// The default heap substrate: extends the process break via `sbrk(2)`.
///
/// # Safety
///
/// `sbrk` manipulates process-global state. A `SbrkHeap` instance assumes
/// it is the only thing in the process calling `sbrk`; mixing it with
/// direct `sbrk` calls elsewhere, or using more than one `SbrkHeap`, is a
/// contract violation (same single-threaded, non-reentrant contract the
/// rest of this allocator carries).
pub struct SbrkHeap {
  lo: *mut u8,
  hi: *mut u8,
}

impl SbrkHeap {
  /// Creates a substrate that has not yet claimed any memory.
  pub const fn new() -> Self {
    Self { lo: ptr::null_mut(), hi: ptr::null_mut() }
  }
}

impl Default for SbrkHeap {
  fn default() -> Self {
    Self::new()
  }
}

// Safety: `sbrk` is the only memory-granting operation here, and the
// contract above already forbids concurrent/overlapping use.
unsafe impl HeapSubstrate for SbrkHeap {
  unsafe fn extend(&mut self, bytes: usize) -> *mut u8 {
    let raw = unsafe { sbrk(bytes as intptr_t) };
    if raw as usize == usize::MAX {
      // sbrk returns (void*)-1 on failure.
      return ptr::null_mut();
    }

    let base = raw as *mut u8;
    if self.lo.is_null() {
      self.lo = base;
    }
    // hi is inclusive; the region just granted is [base, base+bytes).
    self.hi = unsafe { base.add(bytes.saturating_sub(1)) };

    base
  }

  fn lo(&self) -> *const u8 {
    self.lo
  }

  fn hi(&self) -> *const u8 {
    self.hi
  }
}


/// A fixed-capacity, `sbrk`-shaped substrate backed by a single heap
/// allocation made once up front. Addresses handed out by `extend` stay
/// stable for the struct's lifetime (unlike `Vec<u8>`, which would move on
/// growth), and running out of capacity is a normal, hermetic way to
/// exercise the allocator's OOM path without touching the real process
/// break — real `sbrk` is process-global, so parallel `cargo test` threads
/// sharing it would corrupt each other's heaps.
#[cfg(test)]
pub(crate) struct VecHeap {
  arena: Box<[u8]>,
  used: usize,
}

#[cfg(test)]
impl VecHeap {
  pub(crate) fn with_capacity(capacity: usize) -> Self {
    Self { arena: vec![0u8; capacity].into_boxed_slice(), used: 0 }
  }
}

#[cfg(test)]
// Safety: `extend` only ever hands out non-overlapping sub-slices of the
// single backing allocation, which is never moved or resized.
unsafe impl HeapSubstrate for VecHeap {
  unsafe fn extend(&mut self, bytes: usize) -> *mut u8 {
    if self.used + bytes > self.arena.len() {
      return ptr::null_mut();
    }
    let base = unsafe { self.arena.as_mut_ptr().add(self.used) };
    self.used += bytes;
    base
  }

  fn lo(&self) -> *const u8 {
    if self.used == 0 { ptr::null() } else { self.arena.as_ptr() }
  }

  fn hi(&self) -> *const u8 {
    if self.used == 0 { ptr::null() } else { unsafe { self.arena.as_ptr().add(self.used - 1) } }
  }
}
