//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// `process`: archive of clips to chunk tree, optionally followed by sharding.
pub mod process;

/// `shard`: chunk tree to tar shards.
pub mod shard;
