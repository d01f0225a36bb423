//! Storage abstraction layer for Microsearch.
//!
//! The index lives in a flat namespace of named files behind the [`Storage`]
//! trait. [`FileStorage`] maps it onto a directory, [`MemoryStorage`] keeps it
//! in process memory.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::*;
pub use memory::*;
pub use traits::*;
