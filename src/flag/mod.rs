//! Flag declarations, storage and argument parsing
//!
//! This module is the value engine underneath commands: typed storage,
//! literal parsing, and the flag set that walks an argument vector.

pub mod set;
pub mod value;

// Re-export main types
pub use set::*;
pub use value::*;
