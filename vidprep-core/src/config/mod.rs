//! Configuration structures and constants for the vidprep-core library.
//!
//! Worker count, chunk length and shard capacity all live in [`CoreConfig`]
//! and are passed explicitly to the orchestrator and the shard packer.

mod builder;

use crate::error::{CoreError, CoreResult};
use crate::types::{ChunkPolicy, Dimensions, OutputFormat};

use std::path::PathBuf;

pub use builder::CoreConfigBuilder;

// Default constants

/// Default output frame rate after conversion.
pub const DEFAULT_FPS: u32 = 8;

/// Default output frame size.
pub const DEFAULT_WIDTH: u32 = 256;
pub const DEFAULT_HEIGHT: u32 = 256;

/// Default number of frames in every chunk.
pub const DEFAULT_TARGET_FRAMES: usize = 16;

/// Default number of chunk artifacts per tar shard.
pub const DEFAULT_SHARD_SIZE: usize = 1000;

/// Image-format frame files are named `frame_NNN`, so a chunk holds at most 999.
pub const MAX_IMAGE_FRAMES_PER_CHUNK: usize = 999;

/// Worker count used when none is configured: one per available CPU.
#[must_use]
pub fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

/// Main configuration structure for the vidprep-core library.
///
/// Created by the consumer (the CLI) and passed to
/// [`crate::ParallelOrchestrator`] and [`crate::pack_shards`]. Only
/// `output_dir` normally needs setting; every other field has a default.
///
/// # Examples
///
/// ```rust
/// use vidprep_core::config::CoreConfigBuilder;
/// use vidprep_core::{ChunkPolicy, OutputFormat};
///
/// let config = CoreConfigBuilder::new()
///     .output_dir("/data/chunks")
///     .fps(8)
///     .size("256x256")
///     .unwrap()
///     .format(OutputFormat::Npy)
///     .target_frames(16)
///     .chunk_policy(ChunkPolicy::Truncate)
///     .workers(4)
///     .build();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Root under which `<clip key>/` output directories are created
    pub output_dir: PathBuf,

    /// Where clip bytes are materialised for the decode engine
    /// (defaults to the system temp directory)
    pub temp_dir: Option<PathBuf>,

    /// Output frame rate handed to the decode engine
    pub fps: u32,

    /// Output frame size handed to the decode engine
    pub dimensions: Dimensions,

    /// Binary array chunks or per-frame image directories
    pub format: OutputFormat,

    /// Frames per chunk
    pub target_frames: usize,

    /// Truncate or pad the trailing partial chunk
    pub chunk_policy: ChunkPolicy,

    /// Concurrent clip workers; values below 1 are treated as 1
    pub workers: usize,

    /// Where shards are written; sharding is skipped when unset
    pub shard_dir: Option<PathBuf>,

    /// Chunk artifacts per shard
    pub shard_size: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            temp_dir: None,
            fps: DEFAULT_FPS,
            dimensions: Dimensions::new(DEFAULT_WIDTH, DEFAULT_HEIGHT),
            format: OutputFormat::default(),
            target_frames: DEFAULT_TARGET_FRAMES,
            chunk_policy: ChunkPolicy::default(),
            workers: default_workers(),
            shard_dir: None,
            shard_size: DEFAULT_SHARD_SIZE,
        }
    }
}

impl CoreConfig {
    /// Creates a configuration with default settings writing to `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Directory clip inputs are materialised in.
    #[must_use]
    pub fn effective_temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Checks every setting before any clip is processed.
    pub fn validate(&self) -> CoreResult<()> {
        if self.fps == 0 {
            return Err(CoreError::Config("fps must be greater than zero".to_string()));
        }
        if self.dimensions.width == 0 || self.dimensions.height == 0 {
            return Err(CoreError::Config(format!(
                "frame size must be positive, got {}",
                self.dimensions
            )));
        }
        if self.target_frames == 0 {
            return Err(CoreError::Config(
                "frames per chunk must be greater than zero".to_string(),
            ));
        }
        if self.format == OutputFormat::Jpeg && self.target_frames > MAX_IMAGE_FRAMES_PER_CHUNK {
            return Err(CoreError::Config(format!(
                "image chunks hold at most {} frames, got {}",
                MAX_IMAGE_FRAMES_PER_CHUNK, self.target_frames
            )));
        }
        if self.shard_size == 0 {
            return Err(CoreError::Config(
                "shard size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CoreConfig::new("/tmp/out");
        assert_eq!(config.fps, 8);
        assert_eq!(config.dimensions, Dimensions::new(256, 256));
        assert_eq!(config.format, OutputFormat::Jpeg);
        assert_eq!(config.target_frames, 16);
        assert_eq!(config.shard_size, 1000);
        assert!(config.workers >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            CoreConfig { fps: 0, ..CoreConfig::default() },
            CoreConfig { target_frames: 0, ..CoreConfig::default() },
            CoreConfig { shard_size: 0, ..CoreConfig::default() },
            CoreConfig { dimensions: Dimensions::new(0, 10), ..CoreConfig::default() },
            CoreConfig {
                format: OutputFormat::Jpeg,
                target_frames: 1000,
                ..CoreConfig::default()
            },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(CoreError::Config(_))),
                "expected {config:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_npy_allows_long_chunks_and_zero_workers() {
        let config = CoreConfig {
            format: OutputFormat::Npy,
            target_frames: 5000,
            workers: 0,
            ..CoreConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
