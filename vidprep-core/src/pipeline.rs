//! End-to-end processing of a single clip.
//!
//! `materialize temp input -> decode -> plan -> serialize -> cleanup`. The temp
//! input and the image staging directory are scoped values, so they are
//! removed on every exit path including decode failures. Nothing here retries.

use crate::chunking::plan_chunks;
use crate::config::CoreConfig;
use crate::error::CoreResult;
use crate::external::DecodeEngine;
use crate::serializer::{ChunkArtifact, ClipChunkSerializer, FrameStream};
use crate::types::{Clip, OutputFormat};

use log::{debug, info, warn};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Outcome of one successfully processed clip.
#[derive(Debug, Clone)]
pub struct ClipReport {
    pub key: String,
    /// Frames the decode engine produced.
    pub total_frames: usize,
    /// Trailing frames dropped by the truncate policy.
    pub discarded_frames: usize,
    pub artifacts: Vec<ChunkArtifact>,
}

impl ClipReport {
    #[must_use]
    pub fn chunks_written(&self) -> usize {
        self.artifacts.len()
    }
}

/// Runs one clip through the decode engine and writes its chunks under
/// `config.output_dir/<clip key>/`.
pub fn process_clip<D>(engine: &D, clip: &Clip, config: &CoreConfig) -> CoreResult<ClipReport>
where
    D: DecodeEngine + ?Sized,
{
    info!("Processing clip {}", clip.key);

    let temp_root = config.effective_temp_dir();
    fs::create_dir_all(&temp_root)?;
    let mut input = tempfile::Builder::new()
        .prefix(&format!("{}_", clip.key))
        .suffix(".mp4")
        .tempfile_in(&temp_root)?;
    input.write_all(&clip.data)?;
    input.flush()?;
    debug!("Materialized {} to {}", clip.key, input.path().display());

    let clip_dir = config.output_dir.join(&clip.key);
    let created_clip_dir = !clip_dir.exists();
    fs::create_dir_all(&clip_dir)?;

    let result = decode_and_serialize(engine, clip, config, input.path(), &clip_dir);
    if result.is_err() && created_clip_dir {
        // A failed clip leaves nothing behind in the output tree.
        if let Err(e) = fs::remove_dir_all(&clip_dir) {
            warn!("Could not remove {}: {}", clip_dir.display(), e);
        }
    }
    let report = result?;
    input.close()?;

    info!(
        "Finished clip {}: {} chunk(s) from {} frames",
        clip.key,
        report.chunks_written(),
        report.total_frames
    );
    Ok(report)
}

fn decode_and_serialize<D>(
    engine: &D,
    clip: &Clip,
    config: &CoreConfig,
    input: &Path,
    clip_dir: &Path,
) -> CoreResult<ClipReport>
where
    D: DecodeEngine + ?Sized,
{
    let original_fps = probe_original_fps(engine, &clip.key, input);

    // Held until serialization has moved every frame out of it.
    let mut staging = None;
    let stream = match config.format {
        OutputFormat::Npy => FrameStream::Raw(engine.decode_raw(input, config.fps, config.dimensions)?),
        OutputFormat::Jpeg => {
            let dir = tempfile::Builder::new()
                .prefix(".frames-")
                .tempdir_in(clip_dir)?;
            let frames = engine.decode_images(
                input,
                config.fps,
                config.dimensions,
                dir.path(),
                config.format.extension(),
            )?;
            staging = Some(dir);
            FrameStream::Images(frames)
        }
    };

    let total_frames = stream.frame_count(config.dimensions)?;
    let plan = plan_chunks(total_frames, config.target_frames, config.chunk_policy)?;
    if plan.is_empty() {
        warn!(
            "Clip {} produced 0 chunks ({} frames, {} needed per chunk)",
            clip.key, total_frames, config.target_frames
        );
    }

    let artifacts = ClipChunkSerializer::new(&clip.key, clip_dir, config.fps, config.dimensions)
        .original_fps(original_fps)
        .serialize(stream, &plan)?;

    if let Some(dir) = staging {
        dir.close()?;
    }

    Ok(ClipReport {
        key: clip.key.clone(),
        total_frames,
        discarded_frames: plan.discarded_frames,
        artifacts,
    })
}

/// Source frame rate rounded to whole frames; a failed probe only loses the field.
fn probe_original_fps<D>(engine: &D, key: &str, input: &Path) -> Option<u32>
where
    D: DecodeEngine + ?Sized,
{
    match engine.probe_frame_rate(input) {
        Ok(rate) => rate.map(|fps| fps.round() as u32),
        Err(e) => {
            warn!("Could not probe frame rate of {}: {}", key, e);
            None
        }
    }
}
