//! Splitting: carving the unused tail off an over-sized selected block.

use crate::block::BlockPtr;
use crate::config::MIN_BLOCK_SIZE;
use crate::nav::find_next;
use crate::seglist::SegList;

/// `block` has just been marked allocated at its full (over-sized) block
/// size. If the leftover tail is at least [`MIN_BLOCK_SIZE`], carve it off
/// into a new free block and insert it into the segregated lists. If the
/// leftover is smaller than that, it can't stand on its own as a block, so
/// the whole thing stays allocated — this is the source of internal
/// fragmentation in this allocator.
pub(crate) fn split_block(lists: &mut SegList, block: BlockPtr, asize: usize) {
  debug_assert!(block.is_alloc());
  debug_assert!(asize >= MIN_BLOCK_SIZE);

  let block_size = block.size();
  if block_size - asize < MIN_BLOCK_SIZE {
    return;
  }

  block.write(asize, true, block.prev_alloc());

  let tail = find_next(block);
  tail.write(block_size - asize, false, true);
  lists.insert(tail);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn splits_when_remainder_is_large_enough() {
    let mut arena = vec![0u8; 128];
    let base = arena.as_mut_ptr();
    let block = BlockPtr::new(base).unwrap();
    block.write(96, true, true); // pretend already marked allocated at full size

    let mut lists = SegList::new();
    split_block(&mut lists, block, 32);

    assert_eq!(block.size(), 32);
    assert!(block.is_alloc());

    let tail = BlockPtr::new(unsafe { base.add(32) }).unwrap();
    assert_eq!(tail.size(), 64);
    assert!(!tail.is_alloc());
    assert_eq!(lists.iter_all().map(|(_, b)| b).collect::<Vec<_>>(), vec![tail]);
  }

  #[test]
  fn does_not_split_when_remainder_too_small() {
    let mut arena = vec![0u8; 64];
    let base = arena.as_mut_ptr();
    let block = BlockPtr::new(base).unwrap();
    block.write(48, true, true); // 48 - 32 = 16, right at MIN_BLOCK_SIZE: should split

    let mut lists = SegList::new();
    split_block(&mut lists, block, 32);
    assert_eq!(block.size(), 32, "16-byte remainder is exactly MIN_BLOCK_SIZE, must split");

    // Now try a remainder of 8, which cannot stand alone.
    let block2 = BlockPtr::new(unsafe { base.add(32) }).unwrap();
    // Rebuild the arena tail for a fresh block of size 24 (not 16-aligned
    // in practice, but fine for exercising the no-split branch in
    // isolation).
    block2.write(24, true, true);
    split_block(&mut lists, block2, 16);
    assert_eq!(block2.size(), 24, "8-byte remainder is below MIN_BLOCK_SIZE, must not split");
  }
}
