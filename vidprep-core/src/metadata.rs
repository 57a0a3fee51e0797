//! JSON sidecar describing one chunk.
//!
//! The field names and shapes are a contract with downstream dataset loaders:
//! `size` is `[height, width]`, and `is_padded`, `is_trimmed` and
//! `original_fps` are left out entirely when false or unknown.

use crate::error::CoreResult;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Name of the sidecar inside an image-format chunk directory.
pub const METADATA_FILENAME: &str = "metadata.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// `<clip key>/chunk_NNNNN`
    pub key: String,
    pub fps: u32,
    pub frame_count: usize,
    /// `[height, width]`
    pub size: [u32; 2],
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_padded: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_trimmed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_fps: Option<u32>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl ChunkMetadata {
    /// Renders the record as two-space indented JSON.
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the sidecar to `path`, replacing any existing file.
    pub fn write_to(&self, path: &Path) -> CoreResult<()> {
        fs::write(path, self.to_json()?)?;
        log::debug!("Wrote chunk metadata {} to {}", self.key, path.display());
        Ok(())
    }

    pub fn read_from(path: &Path) -> CoreResult<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
