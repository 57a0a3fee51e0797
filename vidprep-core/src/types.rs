//! Shared value types: clips, frame dimensions, output formats and chunk policies.

use crate::error::{CoreError, CoreResult};

use std::fmt;
use std::str::FromStr;

/// Number of colour channels in every decoded frame (packed RGB24).
pub const CHANNELS: usize = 3;

/// One encoded video pulled out of the input archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clip {
    /// Unique key within a batch; also names the clip's output directory.
    pub key: String,
    /// The encoded video bytes exactly as stored in the archive.
    pub data: Vec<u8>,
}

impl Clip {
    pub fn new(key: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            data,
        }
    }
}

/// Target frame size in pixels, parsed from a `"WxH"` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Size in bytes of one RGB24 frame at these dimensions.
    #[must_use]
    pub fn frame_size(&self) -> usize {
        self.width as usize * self.height as usize * CHANNELS
    }

    /// `scale` filter argument for ffmpeg.
    #[must_use]
    pub fn scale_filter(&self) -> String {
        format!("scale={}:{}", self.width, self.height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Dimensions {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let invalid = |reason: String| CoreError::InvalidDimensions {
            input: s.to_string(),
            reason,
        };

        let parts: Vec<&str> = s.split('x').collect();
        if parts.len() != 2 {
            return Err(invalid("expected WIDTHxHEIGHT".to_string()));
        }

        let width = parts[0]
            .parse::<u32>()
            .map_err(|_| invalid(format!("invalid width: {}", parts[0])))?;
        let height = parts[1]
            .parse::<u32>()
            .map_err(|_| invalid(format!("invalid height: {}", parts[1])))?;

        if width == 0 || height == 0 {
            return Err(invalid("width and height must be positive".to_string()));
        }

        Ok(Self { width, height })
    }
}

/// How chunks are persisted on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One directory of numbered JPEG frames per chunk.
    #[default]
    Jpeg,
    /// One `.npy` array of shape `(frames, height, width, 3)` per chunk.
    Npy,
}

impl OutputFormat {
    /// File extension used for artifacts of this format.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Npy => "npy",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "npy" => Ok(OutputFormat::Npy),
            _ => Err(CoreError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// What happens to the trailing frames that do not fill a whole chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChunkPolicy {
    /// Drop the remainder.
    #[default]
    Truncate,
    /// Emit one final chunk and zero-fill it up to the target length.
    Pad,
}
