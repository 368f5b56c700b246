//! Internal error kinds.
//!
//! These never cross the public API: every public entry point follows the
//! C `malloc` convention of returning a null pointer (or, for `free`, doing
//! nothing) on failure. `AllocError` exists only so the failure path has
//! something concrete to log before collapsing to that pointer-level
//! contract — see spec "Error Handling Design" for the three kinds this
//! enum distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AllocError {
  /// The heap substrate refused to grow.
  OutOfMemory,
  /// `count * size` overflowed `usize` in `calloc`.
  CountOverflow,
}

impl core::fmt::Display for AllocError {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      AllocError::OutOfMemory => write!(f, "heap substrate refused to extend"),
      AllocError::CountOverflow => write!(f, "element count * size overflowed usize"),
    }
  }
}
