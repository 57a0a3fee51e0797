// ============================================================================
// vidprep-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: The Decode Engine Boundary
//
// Frame-rate conversion, resizing and pixel extraction all happen in an
// external tool. This module defines the trait the clip pipeline talks to
// (`DecodeEngine`) and the ffmpeg-backed implementation behind it.
//
// KEY COMPONENTS:
// - DecodeEngine: what the pipeline needs from a decoder
// - FfmpegSpawner / FfmpegProcess: process seam over ffmpeg-sidecar
// - FfmpegDecodeEngine: DecodeEngine built on ffmpeg and ffprobe
// - check_dependency: PATH check run before a batch starts
//
// Tests supply their own DecodeEngine implementations, so nothing below the
// trait needs an ffmpeg binary to exercise the pipeline.

use crate::error::{CoreError, CoreResult};
use crate::types::Dimensions;

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// ffmpeg/ffprobe backed DecodeEngine
pub mod decoder;

/// Traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Mock spawner and decode engine for tests
pub mod mocks;

pub use decoder::FfmpegDecodeEngine;
pub use ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner};

// ============================================================================
// DECODE ENGINE
// ============================================================================

/// The external video processor that turns one encoded clip into frames.
///
/// Implementations must be shareable across the orchestrator's worker
/// threads; every call works on its own input and output paths.
pub trait DecodeEngine: Send + Sync {
    /// Decodes `input` at `fps` and `dims` into one contiguous RGB24 buffer.
    fn decode_raw(&self, input: &Path, fps: u32, dims: Dimensions) -> CoreResult<Vec<u8>>;

    /// Decodes `input` into numbered image files with `extension` inside
    /// `out_dir`, returning them sorted by file name (temporal order).
    fn decode_images(
        &self,
        input: &Path,
        fps: u32,
        dims: Dimensions,
        out_dir: &Path,
        extension: &str,
    ) -> CoreResult<Vec<PathBuf>>;

    /// Frame rate of the source video, when the engine can tell.
    fn probe_frame_rate(&self, _input: &Path) -> CoreResult<Option<f64>> {
        Ok(None)
    }
}

/// Lists the files in `dir` with `extension`, sorted by file name.
pub fn sorted_frame_files(dir: &Path, extension: &str) -> CoreResult<Vec<PathBuf>> {
    let mut frames = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches {
            frames.push(path);
        }
    }
    frames.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(frames)
}

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that `cmd_name` can be executed with `-version`.
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}
