// vidprep-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use vidprep_core::config::{DEFAULT_FPS, DEFAULT_SHARD_SIZE, DEFAULT_TARGET_FRAMES};

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Vidprep: video clip chunking for dataset preparation",
    long_about = "Converts a tar archive of video clips into fixed-length frame chunks (NPY arrays or JPEG directories) and packs them into tar shards."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging (RUST_LOG overrides this)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extracts clips from a tar archive and writes fixed-length chunks
    Process(ProcessArgs),
    /// Packs an existing chunk tree into tar shards
    Shard(ShardArgs),
}

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Tar archive containing the video clips
    #[arg(long = "tar", required = true, value_name = "PATH")]
    pub tar_path: PathBuf,

    /// Directory where per-clip chunk directories are created
    #[arg(short = 'o', long = "out", default_value = "output", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Output frame rate
    #[arg(long, default_value_t = DEFAULT_FPS, value_name = "FPS")]
    pub fps: u32,

    /// Output frame size
    #[arg(long, default_value = "256x256", value_name = "WxH")]
    pub size: String,

    /// Chunk format: jpg (frame directories) or npy (arrays)
    #[arg(long, default_value = "jpg", value_name = "FORMAT")]
    pub format: String,

    /// Frames per chunk
    #[arg(long, default_value_t = DEFAULT_TARGET_FRAMES, value_name = "N")]
    pub frames: usize,

    /// Zero-pad the last partial chunk instead of dropping it
    #[arg(long)]
    pub pad: bool,

    /// Number of clips processed concurrently (defaults to the CPU count)
    #[arg(short, long, env = "VIDPREP_WORKERS", value_name = "N")]
    pub workers: Option<usize>,

    /// Directory for temporary clip files (defaults to the system temp dir)
    #[arg(long, env = "VIDPREP_TEMP_DIR", value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Pack the chunks into tar shards in this directory after processing
    #[arg(long, value_name = "DIR")]
    pub shard_dir: Option<PathBuf>,

    /// Chunks per shard
    #[arg(long, default_value_t = DEFAULT_SHARD_SIZE, value_name = "N")]
    pub shard_size: usize,
}

#[derive(Args, Debug)]
pub struct ShardArgs {
    /// Root of a chunk tree written by `process`
    #[arg(short = 'i', long = "input", required = true, value_name = "DIR")]
    pub input_dir: PathBuf,

    /// Directory where shard_NNNNN.tar files are written
    #[arg(long, required = true, value_name = "DIR")]
    pub shard_dir: PathBuf,

    /// Chunks per shard
    #[arg(long, default_value_t = DEFAULT_SHARD_SIZE, value_name = "N")]
    pub shard_size: usize,

    /// Chunk format of the tree: jpg or npy
    #[arg(long, default_value = "jpg", value_name = "FORMAT")]
    pub format: String,
}
