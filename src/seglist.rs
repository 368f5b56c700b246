//! Segregated free list registry: 15 buckets indexed by size class.
//!
//! Bucket 0 holds mini-blocks on a singly-linked list (`next` only, LIFO).
//! Buckets 1..14 are doubly-linked (`next`/`prev`), also LIFO at the head.

use crate::block::BlockPtr;
use crate::config::{BUCKET_BOUNDARIES, NUM_BUCKETS};

/// Picks the bucket a block of this size belongs in.
///
/// The first two boundaries (16, 32) are inclusive upper bounds; every
/// boundary after that is a strict upper bound. This mixed comparison is
/// not an accident of the table layout — it is the exact corner-size
/// behavior of the allocator this crate is modeled on, and getting it
/// backwards silently misfiles blocks of size exactly 49, 65, 90, ... into
/// the wrong bucket.
pub(crate) fn bucket_index(size: usize) -> usize {
  for (i, &boundary) in BUCKET_BOUNDARIES.iter().enumerate() {
    let fits = if i < 2 { size <= boundary } else { size < boundary };
    if fits {
      return i;
    }
  }
  NUM_BUCKETS - 1
}

/// The 15 bucket heads.
pub(crate) struct SegList {
  heads: [Option<BlockPtr>; NUM_BUCKETS],
}

impl SegList {
  pub(crate) fn new() -> Self {
    Self { heads: [None; NUM_BUCKETS] }
  }

  pub(crate) fn head(&self, bucket: usize) -> Option<BlockPtr> {
    self.heads[bucket]
  }

  /// Inserts a free block at the head of its bucket (LIFO).
  pub(crate) fn insert(&mut self, block: BlockPtr) {
    if block.is_mini() {
      block.set_next(self.heads[0]);
      self.heads[0] = Some(block);
      return;
    }

    let index = bucket_index(block.size());
    block.set_next(self.heads[index]);
    block.set_prev(None);
    if let Some(head) = self.heads[index] {
      head.set_prev(Some(block));
    }
    self.heads[index] = Some(block);
  }

  /// Removes `block` from whichever bucket it is currently threaded
  /// through. `block` must actually be free and on a list.
  pub(crate) fn remove(&mut self, block: BlockPtr) {
    if block.is_mini() {
      self.remove_mini(block);
      return;
    }

    let index = bucket_index(block.size());
    debug_assert!(self.contains(index, block), "block not on its expected bucket");

    match (block.prev(), block.next()) {
      (None, None) => {
        self.heads[index] = None;
      }
      (None, Some(next)) => {
        self.heads[index] = Some(next);
        next.set_prev(None);
      }
      (Some(prev), None) => {
        prev.set_next(None);
      }
      (Some(prev), Some(next)) => {
        prev.set_next(Some(next));
        next.set_prev(Some(prev));
      }
    }
    block.set_next(None);
    block.set_prev(None);
  }

  /// Mini-blocks are singly-linked, so removal (other than the head) is
  /// an O(n) walk to find the predecessor.
  fn remove_mini(&mut self, block: BlockPtr) {
    if self.heads[0] == Some(block) {
      self.heads[0] = block.next();
      block.set_next(None);
      return;
    }

    let mut prev = self.heads[0];
    while let Some(curr) = prev.and_then(BlockPtr::next) {
      if curr == block {
        prev.unwrap().set_next(curr.next());
        block.set_next(None);
        return;
      }
      prev = Some(curr);
    }
    debug_assert!(false, "mini-block not found on bucket 0 during removal");
  }

  /// Debug-only reachability check: is `block` actually threaded through
  /// `bucket`? Used to guard removal against silent list corruption.
  fn contains(&self, bucket: usize, block: BlockPtr) -> bool {
    let mut curr = self.heads[bucket];
    while let Some(b) = curr {
      if b == block {
        return true;
      }
      curr = b.next();
    }
    false
  }

  /// Test-only escape hatch: direct access to the bucket heads, for tests
  /// that need to construct a deliberately-corrupt list state.
  #[cfg(test)]
  pub(crate) fn heads_mut(&mut self) -> &mut [Option<BlockPtr>; NUM_BUCKETS] {
    &mut self.heads
  }

  /// Iterates every free block across every bucket. Used by the
  /// consistency checker and by stress tests.
  pub(crate) fn iter_all(&self) -> impl Iterator<Item = (usize, BlockPtr)> + '_ {
    (0..NUM_BUCKETS).flat_map(move |bucket| {
      let mut curr = self.heads[bucket];
      std::iter::from_fn(move || {
        let b = curr?;
        curr = b.next();
        Some((bucket, b))
      })
    })
  }
}
