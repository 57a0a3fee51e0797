// ============================================================================
// vidprep-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Fluent construction of CoreConfig. Every setter starts from the defaults in
// config/mod.rs, so callers only name what they change. Parsing of the
// user-facing size and format strings happens here, which is where malformed
// input is first rejected.

// ---- Standard library imports ----
use std::path::PathBuf;

// ---- Internal crate imports ----
use super::CoreConfig;
use crate::error::CoreResult;
use crate::types::{ChunkPolicy, Dimensions, OutputFormat};

/// Builder for creating CoreConfig instances.
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    /// Creates a new builder seeded with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    #[must_use]
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn fps(mut self, fps: u32) -> Self {
        self.config.fps = fps;
        self
    }

    #[must_use]
    pub fn dimensions(mut self, dimensions: Dimensions) -> Self {
        self.config.dimensions = dimensions;
        self
    }

    /// Sets the frame size from a `"WxH"` string.
    pub fn size(self, size: &str) -> CoreResult<Self> {
        Ok(self.dimensions(size.parse()?))
    }

    #[must_use]
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Sets the output format from its name (`jpg` or `npy`).
    pub fn format_name(self, name: &str) -> CoreResult<Self> {
        Ok(self.format(name.parse()?))
    }

    #[must_use]
    pub fn target_frames(mut self, frames: usize) -> Self {
        self.config.target_frames = frames;
        self
    }

    #[must_use]
    pub fn chunk_policy(mut self, policy: ChunkPolicy) -> Self {
        self.config.chunk_policy = policy;
        self
    }

    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    #[must_use]
    pub fn shard_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.shard_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn shard_size(mut self, size: usize) -> Self {
        self.config.shard_size = size;
        self
    }

    /// Builds the CoreConfig instance. Call `validate` on the result before use.
    #[must_use]
    pub fn build(self) -> CoreConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_builder_sets_fields() {
        let config = CoreConfigBuilder::new()
            .output_dir("/data/out")
            .temp_dir("/data/tmp")
            .fps(12)
            .size("320x240")
            .unwrap()
            .format_name("npy")
            .unwrap()
            .target_frames(32)
            .chunk_policy(ChunkPolicy::Pad)
            .workers(3)
            .shard_dir("/data/shards")
            .shard_size(50)
            .build();

        assert_eq!(config.output_dir, PathBuf::from("/data/out"));
        assert_eq!(config.temp_dir, Some(PathBuf::from("/data/tmp")));
        assert_eq!(config.fps, 12);
        assert_eq!(config.dimensions, Dimensions::new(320, 240));
        assert_eq!(config.format, OutputFormat::Npy);
        assert_eq!(config.target_frames, 32);
        assert_eq!(config.chunk_policy, ChunkPolicy::Pad);
        assert_eq!(config.workers, 3);
        assert_eq!(config.shard_dir, Some(PathBuf::from("/data/shards")));
        assert_eq!(config.shard_size, 50);
    }

    #[test]
    fn test_builder_rejects_bad_strings() {
        assert!(matches!(
            CoreConfigBuilder::new().size("256"),
            Err(CoreError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            CoreConfigBuilder::new().format_name("gif"),
            Err(CoreError::UnsupportedFormat(_))
        ));
    }
}
