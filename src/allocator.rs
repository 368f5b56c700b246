//! Public entry points: `SegAllocator`, the `malloc`/`free`/`realloc`/
//! `calloc`-shaped allocator this crate builds up to.
//!
//! Unlike the teacher's bump allocator (and unlike the original C lab this
//! one is modeled on, which kept its heap as process-global `static`
//! state), state here lives in an explicit struct. Nothing stops a caller
//! from running more than one `SegAllocator` over more than one
//! [`HeapSubstrate`] — though per spec, a single instance is still not
//! safe to share across threads without external synchronization.

use std::ptr;

use crate::align::align_up_16;
use crate::block::BlockPtr;
use crate::check::check_heap;
use crate::coalesce::coalesce_block;
use crate::config::{CHUNK_SIZE, MIN_BLOCK_SIZE, WORD_SIZE};
use crate::error::AllocError;
use crate::extend::extend_heap;
use crate::fit::find_fit;
use crate::seglist::SegList;
use crate::split::split_block;
use crate::substrate::HeapSubstrate;

/// A segregated free-list allocator over a single [`HeapSubstrate`].
///
/// Not `Sync`: nothing here is synchronized, matching the original's
/// single-threaded contract (spec "Non-goals").
pub struct SegAllocator<S: HeapSubstrate> {
  substrate: S,
  lists: SegList,
  heap_start: Option<BlockPtr>,
}

impl<S: HeapSubstrate> SegAllocator<S> {
  /// Builds an allocator that has not yet claimed any heap memory. Call
  /// [`init`](Self::init) before the first allocation.
  pub fn new(substrate: S) -> Self {
    Self { substrate, lists: SegList::new(), heap_start: None }
  }

  /// Lays down the prologue/epilogue sentinels and performs the first
  /// heap extension. Must be called exactly once before any other method.
  /// Returns `false` if the substrate can't even grant the initial chunk.
  pub fn init(&mut self) -> bool {
    let raw = unsafe { self.substrate.extend(2 * WORD_SIZE) };
    if raw.is_null() {
      log_warn(AllocError::OutOfMemory);
      return false;
    }

    // Prologue footer: a zero-size allocated sentinel. `find_prev` reads
    // this to recognize "there is no real block before here".
    let prologue_footer: *mut u64 = raw.cast();
    unsafe { prologue_footer.write(crate::block::pack(0, true, false, false)) };

    let epilogue = BlockPtr::new(unsafe { raw.add(WORD_SIZE) }).expect("substrate returned null");
    epilogue.set_header(crate::block::pack(0, true, false, false));

    match extend_heap(&mut self.lists, &mut self.substrate, CHUNK_SIZE) {
      Some(block) => {
        self.heap_start = Some(block);
        self.lists.insert(block);
        true
      }
      None => {
        log_warn(AllocError::OutOfMemory);
        false
      }
    }
  }

  /// Allocates at least `size` bytes, 16-byte aligned. Returns a null
  /// pointer if `size` is 0 or the heap cannot be grown far enough.
  pub fn allocate(&mut self, size: usize) -> *mut u8 {
    if size == 0 {
      return ptr::null_mut();
    }

    let asize = align_up_16(size + WORD_SIZE).max(MIN_BLOCK_SIZE);

    let block = match find_fit(&self.lists, asize) {
      Some(block) => {
        self.lists.remove(block);
        block
      }
      None => match extend_heap(&mut self.lists, &mut self.substrate, asize) {
        Some(block) => block,
        None => {
          log_warn(AllocError::OutOfMemory);
          return ptr::null_mut();
        }
      },
    };

    block.write(block.size(), true, block.prev_alloc());
    split_block(&mut self.lists, block, asize);

    #[cfg(feature = "trace")]
    log::trace!("allocate({size}) -> {:p}", block.payload());

    block.payload()
  }

  /// Frees a pointer previously returned by [`allocate`](Self::allocate),
  /// [`reallocate`](Self::reallocate), or [`calloc`](Self::calloc). A null
  /// pointer is a no-op, matching C `free`.
  pub fn free(&mut self, payload: *mut u8) {
    if payload.is_null() {
      return;
    }

    let block = unsafe { BlockPtr::from_payload(payload) };
    block.write(block.size(), false, block.prev_alloc());
    let merged = coalesce_block(&mut self.lists, block);
    self.lists.insert(merged);

    #[cfg(feature = "trace")]
    log::trace!("free({:p})", payload);
  }

  /// Resizes the allocation at `payload` to `new_size` bytes.
  ///
  /// `payload == null` behaves like `allocate(new_size)`. `new_size == 0`
  /// behaves like `free(payload)` followed by returning null. Otherwise a
  /// fresh block is allocated and the old contents are copied in before
  /// the old block is freed — in that order, so the old block can never be
  /// coalesced into the very allocation being made to replace it.
  pub fn reallocate(&mut self, payload: *mut u8, new_size: usize) -> *mut u8 {
    if payload.is_null() {
      return self.allocate(new_size);
    }
    if new_size == 0 {
      self.free(payload);
      return ptr::null_mut();
    }

    let old_block = unsafe { BlockPtr::from_payload(payload) };
    let old_payload_size = old_block.payload_size();

    let new_payload = self.allocate(new_size);
    if new_payload.is_null() {
      return ptr::null_mut();
    }

    let copy_len = old_payload_size.min(new_size);
    unsafe { ptr::copy_nonoverlapping(payload, new_payload, copy_len) };
    self.free(payload);

    new_payload
  }

  /// Allocates zeroed space for `count` elements of `size` bytes each.
  /// Returns null (without touching the heap) if `count * size` would
  /// overflow `usize`.
  pub fn calloc(&mut self, count: usize, size: usize) -> *mut u8 {
    let total = match count.checked_mul(size) {
      Some(total) => total,
      None => {
        log_warn(AllocError::CountOverflow);
        return ptr::null_mut();
      }
    };

    let payload = self.allocate(total);
    if !payload.is_null() {
      unsafe { ptr::write_bytes(payload, 0, total) };
    }
    payload
  }

  /// Runs the full consistency checker over the current heap state.
  /// `line` is forwarded into the checker's diagnostics, so call sites
  /// typically pass `line!()`.
  pub fn check(&self, line: u32) -> bool {
    match self.heap_start {
      Some(start) => check_heap(&self.lists, start, &self.substrate, line),
      None => true,
    }
  }
}

fn log_warn(_err: AllocError) {
  #[cfg(feature = "trace")]
  log::warn!("{_err}");
}
