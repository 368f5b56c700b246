//! Heap extension: growing the managed region and folding the new space
//! into a single free block.

use crate::align::align_up_16;
use crate::block::{BlockPtr, extract_alloc_prev, pack};
use crate::coalesce::coalesce_block;
use crate::config::CHUNK_SIZE;
use crate::nav::find_next;
use crate::seglist::SegList;
use crate::substrate::HeapSubstrate;

/// Extends the heap by at least `size` bytes (rounded up to 16 and to
/// [`CHUNK_SIZE`], whichever is larger), turns the new space into one free
/// block, coalesces it with the previous last block if that one is free,
/// and returns the resulting free block. The caller still owns inserting
/// that block into the segregated lists. Returns `None` if the substrate
/// refuses to grow.
pub(crate) fn extend_heap(
  lists: &mut SegList,
  substrate: &mut dyn HeapSubstrate,
  size: usize,
) -> Option<BlockPtr> {
  let extend_size = align_up_16(size).max(CHUNK_SIZE);
  let raw = unsafe { substrate.extend(extend_size) };
  if raw.is_null() {
    return None;
  }

  // `raw` is exactly where the stale epilogue header used to sit: the
  // substrate only ever appends, so the old top-of-heap sentinel becomes
  // the start of the new block. `write` reads the current header's
  // prev_mini bit before overwriting, so the stale epilogue's prev_mini
  // carries over automatically; we only need to pull prev_alloc out by hand
  // since `write` takes it as an explicit argument.
  let new_block = BlockPtr::new(raw)?;
  let stale_epilogue = new_block.header();
  let prev_alloc = extract_alloc_prev(stale_epilogue);
  new_block.write(extend_size, false, prev_alloc);

  let epilogue = find_next(new_block);
  epilogue.set_header(pack(0, true, false, false));

  Some(coalesce_block(lists, new_block))
}
