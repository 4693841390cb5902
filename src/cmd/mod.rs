//! Commands, binding and dispatch
//!
//! This module holds the declarative command model and the entry point that
//! turns one program run into either a completion answer or a selected
//! subcommand.

pub mod command;
pub mod dispatch;
pub mod invocation;

// Re-export main types
pub use command::{Command, Flag, RunFn};
pub use dispatch::*;
pub use invocation::*;
