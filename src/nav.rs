//! Heap-linear navigation: stepping from one physical block to its
//! immediate neighbor on the heap, independent of any free-list linkage.

use crate::block::{BlockPtr, extract_size};

/// Returns the block immediately following `block` on the heap.
///
/// # Safety
///
/// `block` must not be the epilogue (its size is 0, which would return
/// `block` itself).
pub(crate) fn find_next(block: BlockPtr) -> BlockPtr {
  debug_assert_ne!(block.size(), 0, "find_next called on the epilogue");
  BlockPtr::new(unsafe { block.as_ptr().add(block.size()) }).expect("heap pointer never null")
}

/// Returns the block immediately preceding `block` on the heap, or `None`
/// if `block` is the first real block (i.e. its predecessor is the
/// prologue).
///
/// If `block`'s `prev_mini` bit is set, the previous block is known to be
/// exactly 16 bytes, so its header sits 16 bytes back with no footer read
/// required. Otherwise the word immediately before `block`'s header is
/// the previous block's footer; its size gives the previous block's start.
pub(crate) fn find_prev(block: BlockPtr) -> Option<BlockPtr> {
  if block.prev_mini() {
    let header = unsafe { block.as_ptr().sub(16) };
    return BlockPtr::new(header);
  }

  let footer_word = find_prev_footer(block);
  if extract_size(footer_word) == 0 {
    // `block` is the first real block; what we just read was the
    // prologue footer.
    return None;
  }

  let prev_size = extract_size(footer_word);
  BlockPtr::new(unsafe { block.as_ptr().sub(prev_size) })
}

/// Reads the word immediately preceding `block`'s header: the previous
/// block's footer (or the prologue footer, if `block` is first).
fn find_prev_footer(block: BlockPtr) -> u64 {
  let ptr: *const u64 = unsafe { block.as_ptr().sub(8).cast() };
  unsafe { ptr.read() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::MIN_BLOCK_SIZE;

  #[test]
  fn find_next_steps_by_size() {
    let mut arena = vec![0u8; 64];
    let base = arena.as_mut_ptr();
    let block = BlockPtr::new(base).unwrap();
    block.write(32, true, true);

    let next = find_next(block);
    assert_eq!(next.as_ptr(), unsafe { base.add(32) });
  }

  #[test]
  fn find_prev_returns_none_for_first_real_block() {
    let mut arena = vec![0u8; 64];
    let base = arena.as_mut_ptr();
    // Prologue footer: size 0, allocated.
    let prologue: *mut u64 = base.cast();
    unsafe { prologue.write(crate::block::pack(0, true, false, false)) };

    let first = BlockPtr::new(unsafe { base.add(8) }).unwrap();
    first.write(MIN_BLOCK_SIZE, true, false);

    assert_eq!(find_prev(first), None);
  }

  #[test]
  fn find_prev_via_footer_for_non_mini_block() {
    let mut arena = vec![0u8; 96];
    let base = arena.as_mut_ptr();
    let prologue: *mut u64 = base.cast();
    unsafe { prologue.write(crate::block::pack(0, true, false, false)) };

    let first = BlockPtr::new(unsafe { base.add(8) }).unwrap();
    // Free, non-mini: carries a footer.
    first.write(48, false, false);

    let second = find_next(first);
    second.write(16, true, true);

    assert_eq!(find_prev(second), Some(first));
  }

  #[test]
  fn find_prev_via_mini_bit_skips_footer_read() {
    let mut arena = vec![0u8; 96];
    let base = arena.as_mut_ptr();
    let prologue: *mut u64 = base.cast();
    unsafe { prologue.write(crate::block::pack(0, true, false, false)) };

    let first = BlockPtr::new(unsafe { base.add(8) }).unwrap();
    // Allocated mini-block: no footer, but sets next header's prev_mini.
    first.write(MIN_BLOCK_SIZE, true, false);

    let second = find_next(first);
    second.write(32, true, true);

    assert_eq!(find_prev(second), Some(first));
  }
}
