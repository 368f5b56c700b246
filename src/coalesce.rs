//! Coalescing: merging a newly-freed block with whichever of its
//! physical neighbors are also free.

use crate::block::BlockPtr;
use crate::nav::{find_next, find_prev};
use crate::seglist::SegList;

#[cfg(feature = "trace")]
macro_rules! trace_case {
  ($n:expr) => {
    log::trace!("coalesce: case {}", $n)
  };
}
#[cfg(not(feature = "trace"))]
macro_rules! trace_case {
  ($n:expr) => {};
}

/// Merges `block` (already marked free, with its header/footer already
/// written) with its free physical neighbors, removing any merged-away
/// neighbor from its segregated list first. Returns the block that now
/// represents the merged region; the caller is responsible for inserting
/// *that* block into the segregated lists.
pub(crate) fn coalesce_block(lists: &mut SegList, block: BlockPtr) -> BlockPtr {
  let next = find_next(block);
  let size = block.size();

  match (block.prev_alloc(), next.is_alloc()) {
    // Case 1: both physical neighbors allocated. Nothing to merge.
    (true, true) => {
      trace_case!(1);
      block
    }
    // Case 2: only the next block is free.
    (true, false) => {
      trace_case!(2);
      lists.remove(next);
      block.write(size + next.size(), false, true);
      block
    }
    // Case 3: only the previous block is free.
    (false, true) => {
      trace_case!(3);
      let prev = find_prev(block).expect("prev_alloc=false implies a previous block exists");
      lists.remove(prev);
      prev.write(prev.size() + size, false, prev.prev_alloc());
      prev
    }
    // Case 4: both physical neighbors are free.
    (false, false) => {
      trace_case!(4);
      let prev = find_prev(block).expect("prev_alloc=false implies a previous block exists");
      lists.remove(prev);
      lists.remove(next);
      prev.write(prev.size() + size + next.size(), false, prev.prev_alloc());
      prev
    }
  }
}
