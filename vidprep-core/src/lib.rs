//! Core library for turning a tar of video clips into fixed-length frame chunks.
//!
//! Clips are decoded by ffmpeg (through the [`external::DecodeEngine`] trait),
//! cut into chunks of a fixed number of frames, and written either as NPY
//! arrays or as directories of JPEG frames, each with a JSON metadata sidecar.
//! The resulting tree can then be regrouped into fixed-capacity tar shards.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vidprep_core::config::CoreConfigBuilder;
//! use vidprep_core::external::FfmpegDecodeEngine;
//! use vidprep_core::{OutputFormat, extract_clips_from_tar, pack_shards, process_all};
//! use std::path::Path;
//!
//! let config = CoreConfigBuilder::new()
//!     .output_dir("/data/chunks")
//!     .format(OutputFormat::Npy)
//!     .target_frames(16)
//!     .build();
//! config.validate().unwrap();
//!
//! let clips = extract_clips_from_tar(Path::new("/data/clips.tar")).unwrap();
//! let report = process_all(Arc::new(FfmpegDecodeEngine::new()), &clips, &config).unwrap();
//! println!("{} chunks written", report.chunks_written());
//!
//! let shards = pack_shards(&config.output_dir, Path::new("/data/shards"), 1000, config.format).unwrap();
//! println!("{shards} shards written");
//! ```

pub mod archive;
pub mod chunking;
pub mod config;
pub mod error;
pub mod external;
pub mod metadata;
pub mod npy;
pub mod orchestrator;
pub mod pipeline;
pub mod serializer;
pub mod sharding;
pub mod types;

// Re-exports for public API
pub use archive::extract_clips_from_tar;
pub use chunking::{ChunkPlan, ChunkRange, plan_chunks};
pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{ClipFailure, CoreError, CoreResult};
pub use metadata::ChunkMetadata;
pub use orchestrator::{BatchReport, ParallelOrchestrator, process_all};
pub use pipeline::{ClipReport, process_clip};
pub use serializer::{ChunkArtifact, ClipChunkSerializer, FrameStream};
pub use sharding::pack_shards;
pub use types::{ChunkPolicy, Clip, Dimensions, OutputFormat};
