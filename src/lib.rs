//! # segalloc - A Segregated Free-List Memory Allocator
//!
//! This crate provides a `malloc`/`free`/`realloc`/`calloc`-shaped heap
//! allocator built on explicit free lists segregated by size class, with
//! boundary-tag coalescing and a compact fast path for tiny allocations.
//!
//! ## Overview
//!
//! ```text
//!   Segregated Free Lists:
//!
//!   bucket 0  (mini, <=16B, singly-linked) -> o -> o -> o
//!   bucket 1  (<=32B)                      -> o <-> o
//!   bucket 2  (<49B)                       -> o
//!   ...
//!   bucket 14 (>=5000B)                    -> o <-> o <-> o
//!
//!   Each bucket is a LIFO list of free blocks whose size falls in that
//!   bucket's class. Allocation walks from the requested size's bucket
//!   upward until a fit is found or the heap has to grow.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   segalloc
//!   ├── align      - Alignment macros/helpers
//!   ├── config     - Tunable constants
//!   ├── error      - Internal error kinds (never public)
//!   ├── substrate  - HeapSubstrate trait + SbrkHeap
//!   ├── block      - Block header/footer codec (BlockPtr)
//!   ├── nav        - Heap-linear next/prev navigation
//!   ├── seglist    - The 15-bucket segregated list registry
//!   ├── coalesce   - Boundary-tag free-neighbor merging
//!   ├── fit        - Bounded best-fit search
//!   ├── split      - Carve-and-reinsert on over-sized fits
//!   ├── extend     - Heap growth + prologue/epilogue bookkeeping
//!   ├── check      - Full heap/list consistency checker
//!   └── allocator  - SegAllocator: the public entry points
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use segalloc::{SegAllocator, SbrkHeap};
//!
//! fn main() {
//!     let mut allocator = SegAllocator::new(SbrkHeap::new());
//!     assert!(allocator.init());
//!
//!     unsafe {
//!         let ptr = allocator.allocate(64) as *mut u64;
//!         *ptr = 42;
//!         println!("Value: {}", *ptr);
//!         allocator.free(ptr as *mut u8);
//!     }
//! }
//! ```
//!
//! ## How It Works
//!
//! Every block on the heap carries a header word packing its size together
//! with three status bits (whether it's allocated, whether its physical
//! predecessor is allocated, and whether that predecessor is a mini-block).
//! Free non-mini blocks also carry a matching footer, which is what lets
//! backward heap traversal find a block's predecessor without consulting
//! any list. Mini-blocks (exactly [`config::MIN_BLOCK_SIZE`] bytes) skip the footer
//! and the `prev` link entirely and thread through bucket 0 singly-linked,
//! trading O(n) removal for a smaller minimum block.
//!
//! ```text
//!   Block Layout:
//!   ┌─────────┬──────────────────────────────────┬─────────┐
//!   │ header  │           payload / next,prev     │ footer  │
//!   │ 8 bytes │         size - 16 bytes           │ 8 bytes │  (free, non-mini)
//!   └─────────┴──────────────────────────────────┴─────────┘
//!   ┌─────────┬──────────┐
//!   │ header  │   next   │                                     (free, mini)
//!   │ 8 bytes │ 8 bytes  │
//!   └─────────┴──────────┘
//! ```
//!
//! ## Features
//!
//! - `trace` (off by default): emits `log::trace!`/`log::warn!`/
//!   `log::error!` diagnostics from the coalescer, the extender, and the
//!   consistency checker. No logging crate is pulled in without it.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no synchronization primitives.
//! - **No memory return**: the heap only ever grows; blocks are recycled,
//!   never given back to the substrate.
//! - **Unix-only by default substrate**: [`SbrkHeap`] requires `libc`'s
//!   `sbrk` (POSIX systems). Anything implementing [`HeapSubstrate`] works.
//!
//! ## Safety
//!
//! This crate is inherently unsafe: block metadata lives in raw memory with
//! no typed Rust representation, and the public entry points hand out and
//! consume raw pointers in the C `malloc` style. Misusing `free`/
//! `reallocate` with a pointer not obtained from this allocator is
//! undefined behavior, exactly as it would be for the C functions they
//! mirror.

pub mod align;
pub mod config;
mod error;

pub mod substrate;
pub use substrate::{HeapSubstrate, SbrkHeap};

mod block;
mod nav;
mod seglist;

mod coalesce;
mod fit;
mod split;
mod extend;

mod check;

mod allocator;
pub use allocator::SegAllocator;
