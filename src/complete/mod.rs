//! Shell completion
//!
//! This module turns a completion specification into candidates for the
//! word under the cursor, driven by the line the shell passes in the
//! environment.

pub mod args;
pub mod command;
pub mod completer;
pub mod predict;

// Re-export main types
pub use args::*;
pub use command::*;
pub use completer::*;
pub use predict::*;
