//! cmdflag - commands, typed flags and shell completion from one declaration
//!
//! A program declares its main command, its subcommands and their flags
//! once. The same declarations drive argument parsing, subcommand dispatch
//! and the candidates offered to a shell through `complete -C`.

// Public modules
pub mod cmd;
pub mod complete;
pub mod error;
pub mod flag;

// Re-export commonly used types
pub use cmd::{dispatch, parse, Command, Flag, Invocation, Resolution};
pub use complete::{Args, Predictor};
pub use error::{Error, FlagError, Result};
pub use flag::{FlagSet, FlagType, FlagValue, Slot, Var};

/// Current version of cmdflag
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
