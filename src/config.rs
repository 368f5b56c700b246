//! Tunable constants.
//!
//! Everything here is a compile-time constant, matching the original
//! implementation this allocator is modeled on: there is no runtime
//! configuration surface, just named magic numbers collected in one place.

/// Machine word size in bytes. Headers and footers are one word.
pub const WORD_SIZE: usize = size_of::<u64>();

/// Double-word size in bytes. Block sizes are always a multiple of this.
pub const DWORD_SIZE: usize = 2 * WORD_SIZE;

/// Minimum block size in bytes: a mini-block is exactly this size.
pub const MIN_BLOCK_SIZE: usize = DWORD_SIZE;

/// Default amount the heap grows by, both at `init` and whenever no fit
/// is found for an allocation request.
pub const CHUNK_SIZE: usize = 1 << 12;

/// Number of segregated-list buckets. Bucket 0 is the mini-block list.
pub const NUM_BUCKETS: usize = 15;

/// Maximum number of blocks walked per bucket during a fit search before
/// giving up on that bucket and moving to the next.
pub const FIT_SEARCH_HORIZON: usize = 35;

/// Inclusive upper bound (in bytes) of each size class, in bucket order.
/// The first two boundaries (16, 32) are inclusive; every boundary after
/// that is a strict upper bound (`size < boundary`), matching the original
/// `find_size_list` exactly. The last bucket has no upper bound.
///
/// `bucket_index` in [`crate::seglist`] is the only place this table is
/// consulted; see its doc comment for the exact comparison semantics.
pub const BUCKET_BOUNDARIES: [usize; NUM_BUCKETS - 1] =
  [16, 32, 49, 65, 90, 113, 129, 145, 161, 177, 257, 513, 900, 5000];
