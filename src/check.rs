//! Heap consistency checker.
//!
//! A full linear heap traversal cross-checked against a full segregated-list
//! traversal. Intended for debug builds and tests, not the hot allocation
//! path — callers gate it behind `cfg(debug_assertions)` or an explicit
//! feature, the same way the original gated `mm_checkheap` behind an
//! external `verbose` flag.

use crate::block::{BlockPtr, extract_alloc, extract_size};
use crate::config::MIN_BLOCK_SIZE;
use crate::nav::find_next;
use crate::seglist::{SegList, bucket_index};
use crate::substrate::HeapSubstrate;

#[cfg(feature = "trace")]
macro_rules! report {
  ($($arg:tt)*) => { log::error!($($arg)*) };
}
#[cfg(not(feature = "trace"))]
macro_rules! report {
  ($($arg:tt)*) => {};
}

/// Walks the heap from `heap_start` to the epilogue, then separately walks
/// every segregated list, and confirms the two views agree. `substrate` is
/// consulted only for its `[lo, hi]` bounds. `line` is the caller's source
/// line, reported alongside any failure (mirroring the original's
/// `mm_checkheap(int line)` signature, used to tell call sites apart in the
/// log).
///
/// Returns `false` on the first violation found; every violation is logged
/// at `error` level when the `trace` feature is enabled before that.
pub(crate) fn check_heap(
  lists: &SegList,
  heap_start: BlockPtr,
  substrate: &dyn HeapSubstrate,
  line: u32,
) -> bool {
  let mut ok = true;

  let prologue_word = unsafe { (heap_start.as_ptr().sub(8) as *const u64).read() };
  if !extract_alloc(prologue_word) || extract_size(prologue_word) != 0 {
    report!("check_heap[{line}]: prologue is not a zero-size allocated sentinel");
    ok = false;
  }

  let mut free_count_by_traversal = 0usize;
  let mut prev_was_free = false;

  let mut curr = heap_start;
  loop {
    let size = curr.size();
    if size == 0 {
      // Epilogue reached; it must be the zero-size allocated sentinel.
      if !curr.is_alloc() {
        report!("check_heap[{line}]: epilogue at {:p} is not marked allocated", curr.as_ptr());
        ok = false;
      }
      break;
    }

    if size % 16 != 0 {
      report!("check_heap[{line}]: block {:p} has unaligned size {size}", curr.as_ptr());
      ok = false;
    }
    if size < MIN_BLOCK_SIZE {
      report!("check_heap[{line}]: block {:p} is smaller than the minimum block size", curr.as_ptr());
      ok = false;
    }
    if !curr.is_alloc() && prev_was_free {
      report!("check_heap[{line}]: two consecutive free blocks at {:p} were not coalesced", curr.as_ptr());
      ok = false;
    }
    if !curr.is_alloc() {
      free_count_by_traversal += 1;
    }

    prev_was_free = !curr.is_alloc();
    curr = find_next(curr);
  }

  let lo = substrate.lo() as usize;
  let hi = substrate.hi() as usize;

  let mut free_count_by_lists = 0usize;
  for (bucket, block) in lists.iter_all() {
    free_count_by_lists += 1;
    if block.is_alloc() {
      report!("check_heap[{line}]: allocated block {:p} found on a free list", block.as_ptr());
      ok = false;
    }

    let addr = block.as_ptr() as usize;
    if addr < lo || addr > hi {
      report!("check_heap[{line}]: listed block {:p} lies outside [lo, hi]", block.as_ptr());
      ok = false;
    }

    if !block.is_mini() && block.footer() != block.header() {
      report!("check_heap[{line}]: block {:p} footer disagrees with its header", block.as_ptr());
      ok = false;
    }

    if !block.is_mini() {
      if let Some(next) = block.next() {
        if next.prev() != Some(block) {
          report!("check_heap[{line}]: block {:p}'s next does not point back to it", block.as_ptr());
          ok = false;
        }
      }
    }

    let expected = bucket_index(block.size());
    if expected != bucket {
      report!(
        "check_heap[{line}]: block {:p} of size {} sits in bucket {} but belongs in {}",
        block.as_ptr(),
        block.size(),
        bucket,
        expected
      );
      ok = false;
    }
  }

  if free_count_by_traversal != free_count_by_lists {
    report!(
      "check_heap[{line}]: heap traversal found {} free blocks, segregated lists found {}",
      free_count_by_traversal,
      free_count_by_lists
    );
    ok = false;
  }

  ok
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::block::BlockPtr;
  use crate::substrate::VecHeap;

  /// Builds a `VecHeap` whose entire backing storage is already granted
  /// (so `lo`/`hi` span it), with a prologue footer written at its base,
  /// and returns the heap plus the base pointer of the first real block.
  fn init_heap(len: usize) -> (VecHeap, *mut u8) {
    let mut heap = VecHeap::with_capacity(len);
    let raw = unsafe { heap.extend(len) };
    let prologue_footer: *mut u64 = raw.cast();
    unsafe { prologue_footer.write(crate::block::pack(0, true, false, false)) };
    (heap, unsafe { raw.add(8) })
  }

  fn write_epilogue(at: BlockPtr) {
    at.set_header(crate::block::pack(0, true, false, false));
  }

  #[test]
  fn clean_heap_with_no_free_blocks_passes() {
    let (heap, base) = init_heap(80);
    let a = BlockPtr::new(base).unwrap();
    a.write(32, true, true);
    let b = BlockPtr::new(unsafe { base.add(32) }).unwrap();
    b.write(32, true, true);
    write_epilogue(BlockPtr::new(unsafe { base.add(64) }).unwrap());

    let lists = SegList::new();
    assert!(check_heap(&lists, a, &heap, 0));
  }

  #[test]
  fn free_block_missing_from_lists_fails() {
    let (heap, base) = init_heap(48);
    let a = BlockPtr::new(base).unwrap();
    a.write(32, false, true);
    write_epilogue(BlockPtr::new(unsafe { base.add(32) }).unwrap());

    let lists = SegList::new(); // `a` deliberately not inserted
    assert!(!check_heap(&lists, a, &heap, 0));
  }

  #[test]
  fn uncoalesced_adjacent_free_blocks_fail() {
    let (heap, base) = init_heap(80);
    let a = BlockPtr::new(base).unwrap();
    a.write(32, false, true);
    let b = BlockPtr::new(unsafe { base.add(32) }).unwrap();
    b.write(32, false, false);
    write_epilogue(BlockPtr::new(unsafe { base.add(64) }).unwrap());

    let mut lists = SegList::new();
    lists.insert(a);
    lists.insert(b);

    assert!(!check_heap(&lists, a, &heap, 0));
  }

  #[test]
  fn block_filed_in_wrong_bucket_fails() {
    let (heap, base) = init_heap(48);
    let a = BlockPtr::new(base).unwrap();
    a.write(32, false, true);
    write_epilogue(BlockPtr::new(unsafe { base.add(32) }).unwrap());

    let mut lists = SegList::new();
    // Plant `a` (a bucket-1-sized block) directly at bucket 0, bypassing
    // `insert`'s own bucket_index lookup.
    lists.heads_mut()[0] = Some(a);

    assert!(!check_heap(&lists, a, &heap, 0));
  }

  #[test]
  fn corrupted_epilogue_with_alloc_bit_clear_fails() {
    let (heap, base) = init_heap(48);
    let a = BlockPtr::new(base).unwrap();
    a.write(32, true, true);
    let epilogue = BlockPtr::new(unsafe { base.add(32) }).unwrap();
    epilogue.set_header(crate::block::pack(0, false, true, false));

    let lists = SegList::new();
    assert!(!check_heap(&lists, a, &heap, 0));
  }

  #[test]
  fn corrupted_prologue_fails() {
    let (heap, base) = init_heap(48);
    // Stomp the prologue footer so it no longer reads size=0, allocated.
    let prologue_footer: *mut u64 = unsafe { base.sub(8).cast() };
    unsafe { prologue_footer.write(crate::block::pack(16, true, false, false)) };

    let a = BlockPtr::new(base).unwrap();
    a.write(32, true, true);
    write_epilogue(BlockPtr::new(unsafe { base.add(32) }).unwrap());

    let lists = SegList::new();
    assert!(!check_heap(&lists, a, &heap, 0));
  }

  #[test]
  fn footer_disagreeing_with_header_fails() {
    let (heap, base) = init_heap(48);
    let a = BlockPtr::new(base).unwrap();
    a.write(32, false, true);
    write_epilogue(BlockPtr::new(unsafe { base.add(32) }).unwrap());

    // Corrupt the footer after the fact, leaving the header untouched.
    let footer: *mut u64 = unsafe { base.add(32 - 8).cast() };
    unsafe { footer.write(crate::block::pack(16, false, true, false)) };

    let mut lists = SegList::new();
    lists.insert(a);

    assert!(!check_heap(&lists, a, &heap, 0));
  }

  #[test]
  fn broken_reciprocal_next_prev_link_fails() {
    let (heap, base) = init_heap(112);
    let a = BlockPtr::new(base).unwrap();
    a.write(32, false, true);
    let b = BlockPtr::new(unsafe { base.add(32) }).unwrap();
    b.write(32, true, false);
    let c = BlockPtr::new(unsafe { base.add(64) }).unwrap();
    c.write(32, false, true);
    write_epilogue(BlockPtr::new(unsafe { base.add(96) }).unwrap());

    let mut lists = SegList::new();
    lists.insert(a);
    lists.insert(c);
    // `c.next` points at `a`, so a correct list has `a.prev == Some(c)`.
    // Stomp it to point at itself instead, breaking that reciprocal link.
    a.set_prev(Some(a));

    assert!(!check_heap(&lists, a, &heap, 0));
  }

  #[test]
  fn block_outside_lo_hi_bounds_fails() {
    let (heap, base) = init_heap(48);
    let a = BlockPtr::new(base).unwrap();
    a.write(32, true, true);
    write_epilogue(BlockPtr::new(unsafe { base.add(32) }).unwrap());

    // A "free" block living in memory the checked heap's substrate never
    // granted. Padded 8 bytes past its own 32-byte span since `write` also
    // pokes the following block's header bits.
    let mut ghost_arena = vec![0u8; 40];
    let ghost = BlockPtr::new(ghost_arena.as_mut_ptr()).unwrap();
    ghost.write(32, false, true);

    let mut lists = SegList::new();
    lists.insert(ghost);

    assert!(!check_heap(&lists, a, &heap, 0));
  }
}
