// ============================================================================
// vidprep-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Custom Error Types for vidprep-core
//
// This module defines the error types used throughout the vidprep-core library.
// Errors fall into three groups that callers treat differently:
//
// - Validation errors (bad size strings, zero chunk length, unknown formats)
//   are fatal and surface before any clip is touched.
// - Per-clip errors (decode engine failures, filesystem failures while writing
//   chunks) are isolated to one clip and collected by the orchestrator.
// - Per-shard errors abort only the shard being written.

use std::fmt;
use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Custom error type for vidprep-core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Directory traversal error: {0}")]
    Walkdir(#[from] walkdir::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    // ---- Validation ----
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid size format '{input}': {reason}")]
    InvalidDimensions { input: String, reason: String },

    #[error("Unsupported format '{0}'. Supported formats are: jpg, npy")]
    UnsupportedFormat(String),

    // ---- External commands ----
    #[error("Required dependency '{0}' not found in PATH")]
    DependencyNotFound(String),

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed waiting for command '{0}': {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("Command '{command}' failed with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Decode engine error: {0}")]
    DecodeEngine(String),

    // ---- Chunk serialization ----
    #[error("Frame buffer of {len} bytes is not a multiple of the {frame_size}-byte frame size")]
    FrameSizeMismatch { len: usize, frame_size: usize },

    #[error("Clip would produce {0} chunks; at most 100000 chunks per clip are supported")]
    ChunkIndexOverflow(usize),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("Invalid NPY header: {0}")]
    NpyHeader(String),

    // ---- Aggregates ----
    #[error("Failed to initialize worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("{}", describe_failures(.0))]
    BatchFailed(Vec<ClipFailure>),

    #[error("Error creating shard {index}: {source}")]
    Shard {
        index: usize,
        #[source]
        source: Box<CoreError>,
    },
}

/// Result type for vidprep-core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// One clip that failed during a batch run, kept with the error that stopped it.
#[derive(Debug)]
pub struct ClipFailure {
    pub key: String,
    pub error: CoreError,
}

impl fmt::Display for ClipFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error processing {}: {}", self.key, self.error)
    }
}

fn describe_failures(failures: &[ClipFailure]) -> String {
    let mut message = format!("encountered {} errors:", failures.len());
    for failure in failures {
        message.push_str("\n  ");
        message.push_str(&failure.to_string());
    }
    message
}

// ---- Helper constructors ----

pub fn command_start_error(command: impl Into<String>, error: io::Error) -> CoreError {
    CoreError::CommandStart(command.into(), error)
}

pub fn command_wait_error(command: impl Into<String>, error: io::Error) -> CoreError {
    CoreError::CommandWait(command.into(), error)
}

pub fn command_failed_error(
    command: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        command: command.into(),
        status,
        stderr: stderr.into(),
    }
}
