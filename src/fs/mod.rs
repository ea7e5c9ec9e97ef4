//! Filesystem utilities for pipewright.
//!
//! Rendered artifacts are written atomically, and collected files are moved
//! into place only when a run succeeds.

pub mod atomic;
mod move_tree;

pub use atomic::{atomic_write, atomic_write_file};
pub use move_tree::{copy_file, move_tree};
