// vidprep-cli/src/lib.rs
//
// Library portion of the Vidprep CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod terminal;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, ProcessArgs, ShardArgs};
pub use commands::process::run_process;
pub use commands::shard::run_shard;
