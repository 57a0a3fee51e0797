// ============================================================================
// vidprep-core/src/sharding.rs
// ============================================================================
//
// SHARD PACKING: Regrouping Chunk Artifacts into Fixed-Capacity Tar Archives
//
// Runs after every clip has been processed. The output tree is walked in
// file-name order, each chunk artifact becomes one sample, and consecutive
// groups of up to `capacity` samples are written to `shard_NNNNN.tar`.
//
// - npy: every `.npy` file is a sample, stored under its base name.
// - jpg: every directory holding a `metadata.json` is a sample, stored with
//   its chunk directory name as the path prefix.
//
// Each shard is written to a temporary file in the shard directory and only
// renamed into place once complete. A failure aborts that shard and is
// reported with its index; earlier shards stay on disk.

use crate::error::{CoreError, CoreResult};
use crate::metadata::METADATA_FILENAME;
use crate::types::OutputFormat;

use log::{debug, info, warn};
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Formats a shard index with the fixed five-digit width.
#[must_use]
pub fn shard_name(index: usize) -> String {
    format!("shard_{index:05}.tar")
}

/// Collects the chunk artifacts under `input_root`, in file-name order.
pub fn discover_samples(input_root: &Path, format: OutputFormat) -> CoreResult<Vec<PathBuf>> {
    let mut samples = Vec::new();
    for entry in WalkDir::new(input_root).sort_by_file_name() {
        let entry = entry?;
        let is_sample = match format {
            OutputFormat::Npy => {
                entry.file_type().is_file()
                    && entry
                        .path()
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case(format.extension()))
            }
            OutputFormat::Jpeg => {
                entry.file_type().is_dir() && entry.path().join(METADATA_FILENAME).is_file()
            }
        };
        if is_sample {
            samples.push(entry.into_path());
        }
    }
    Ok(samples)
}

/// Packs the chunk artifacts under `input_root` into shards in `output_root`.
///
/// Returns the number of shards written.
pub fn pack_shards(
    input_root: &Path,
    output_root: &Path,
    capacity: usize,
    format: OutputFormat,
) -> CoreResult<usize> {
    if capacity == 0 {
        return Err(CoreError::Config(
            "shard size must be greater than zero".to_string(),
        ));
    }
    if !input_root.is_dir() {
        return Err(CoreError::PathError(format!(
            "Shard input '{}' is not a directory",
            input_root.display()
        )));
    }

    let samples = discover_samples(input_root, format)?;
    if samples.is_empty() {
        warn!("No {} samples found under {}", format, input_root.display());
        return Ok(0);
    }

    fs::create_dir_all(output_root)?;
    let shard_count = samples.len().div_ceil(capacity);
    info!(
        "Packing {} sample(s) into {} shard(s) of up to {}",
        samples.len(),
        shard_count,
        capacity
    );

    for (index, group) in samples.chunks(capacity).enumerate() {
        let path = write_shard(output_root, index, group, format).map_err(|e| CoreError::Shard {
            index,
            source: Box::new(e),
        })?;
        info!("Created {} with {} sample(s)", path.display(), group.len());
    }

    Ok(shard_count)
}

fn write_shard(
    output_root: &Path,
    index: usize,
    samples: &[PathBuf],
    format: OutputFormat,
) -> CoreResult<PathBuf> {
    let temp = tempfile::Builder::new()
        .prefix(".shard_")
        .suffix(".tar.partial")
        .tempfile_in(output_root)?;

    let mut builder = tar::Builder::new(BufWriter::new(temp));
    builder.mode(tar::HeaderMode::Deterministic);

    for sample in samples {
        let name = sample.file_name().ok_or_else(|| {
            CoreError::PathError(format!("Sample path has no file name: {}", sample.display()))
        })?;
        match format {
            OutputFormat::Npy => builder.append_path_with_name(sample, name)?,
            OutputFormat::Jpeg => append_chunk_dir(&mut builder, sample, Path::new(name))?,
        }
        debug!("Added {} to shard {}", sample.display(), index);
    }

    let temp = builder
        .into_inner()?
        .into_inner()
        .map_err(|e| CoreError::Io(e.into_error()))?;
    let path = output_root.join(shard_name(index));
    temp.persist(&path).map_err(|e| CoreError::Io(e.error))?;
    Ok(path)
}

/// Adds `dir` and everything below it, prefixed with `prefix`, in file-name order.
fn append_chunk_dir<W: std::io::Write>(
    builder: &mut tar::Builder<W>,
    dir: &Path,
    prefix: &Path,
) -> CoreResult<()> {
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| CoreError::PathError(e.to_string()))?;
        let name = prefix.join(relative);
        if entry.file_type().is_dir() {
            builder.append_dir(&name, entry.path())?;
        } else {
            builder.append_path_with_name(entry.path(), &name)?;
        }
    }
    Ok(())
}
