// ============================================================================
// vidprep-core/src/serializer.rs
// ============================================================================
//
// CHUNK SERIALIZATION: Writing One Clip's Chunks to Disk
//
// Takes the frames the decode engine produced for a clip and the plan the
// chunk planner computed, and persists one artifact per planned range. The
// shape of the frame stream selects the layout once per clip:
//
// - Raw buffer: `<clip>/chunk_NNNNN.npy` + `<clip>/chunk_NNNNN_metadata.json`
// - Image files: `<clip>/chunk_NNNNN/frame_NNN.jpg` + `<clip>/chunk_NNNNN/metadata.json`
//
// Image frames are moved into their chunk directories by rename. Frames that
// no range claims are deleted once every chunk has been written.
//
// KEY COMPONENTS:
// - FrameStream: decoded frames, either one RGB24 buffer or sorted image files
// - ChunkArtifact: what was written for one chunk
// - ClipChunkSerializer: per-clip writer for both layouts

use crate::chunking::{ChunkPlan, ChunkRange};
use crate::error::{CoreError, CoreResult};
use crate::metadata::{ChunkMetadata, METADATA_FILENAME};
use crate::npy;
use crate::types::{CHANNELS, Dimensions, OutputFormat};

use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Decoded frames for one clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameStream {
    /// Packed RGB24 frames, back to back.
    Raw(Vec<u8>),
    /// One image per frame, sorted so that file name order is temporal order.
    Images(Vec<PathBuf>),
}

impl FrameStream {
    /// Number of frames in the stream.
    ///
    /// A raw buffer whose length is not a whole number of frames is rejected.
    pub fn frame_count(&self, dims: Dimensions) -> CoreResult<usize> {
        match self {
            FrameStream::Raw(data) => {
                let frame_size = dims.frame_size();
                if frame_size == 0 || data.len() % frame_size != 0 {
                    return Err(CoreError::FrameSizeMismatch {
                        len: data.len(),
                        frame_size,
                    });
                }
                Ok(data.len() / frame_size)
            }
            FrameStream::Images(frames) => Ok(frames.len()),
        }
    }
}

/// The persisted output for one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkArtifact {
    pub index: usize,
    /// `.npy` file or chunk directory.
    pub path: PathBuf,
    pub metadata_path: PathBuf,
    pub metadata: ChunkMetadata,
}

/// Writes the chunks of a single clip under `clip_dir`.
#[derive(Debug, Clone)]
pub struct ClipChunkSerializer<'a> {
    clip_key: &'a str,
    clip_dir: &'a Path,
    fps: u32,
    dims: Dimensions,
    original_fps: Option<u32>,
}

impl<'a> ClipChunkSerializer<'a> {
    pub fn new(clip_key: &'a str, clip_dir: &'a Path, fps: u32, dims: Dimensions) -> Self {
        Self {
            clip_key,
            clip_dir,
            fps,
            dims,
            original_fps: None,
        }
    }

    /// Records the source frame rate in every chunk's metadata.
    #[must_use]
    pub fn original_fps(mut self, fps: Option<u32>) -> Self {
        self.original_fps = fps;
        self
    }

    /// Writes one artifact per range in `plan`, in plan order.
    ///
    /// Any filesystem failure aborts the clip; artifacts already written are
    /// left in place.
    pub fn serialize(&self, stream: FrameStream, plan: &ChunkPlan) -> CoreResult<Vec<ChunkArtifact>> {
        let available = stream.frame_count(self.dims)?;
        if plan.consumed_frames() > available {
            return Err(CoreError::Config(format!(
                "chunk plan for {} covers {} frames but only {} were decoded",
                self.clip_key,
                plan.consumed_frames(),
                available
            )));
        }

        fs::create_dir_all(self.clip_dir)?;
        match stream {
            FrameStream::Raw(data) => self.write_arrays(&data, plan),
            FrameStream::Images(frames) => self.write_image_dirs(&frames, plan),
        }
    }

    fn metadata_for(&self, range: &ChunkRange, plan: &ChunkPlan) -> ChunkMetadata {
        let is_last = range.index + 1 == plan.ranges.len();
        ChunkMetadata {
            key: format!("{}/{}", self.clip_key, range.name()),
            fps: self.fps,
            frame_count: plan.target_frames,
            size: [self.dims.height, self.dims.width],
            is_padded: range.padded,
            is_trimmed: is_last && plan.is_trimmed(),
            original_fps: self.original_fps,
        }
    }

    fn write_arrays(&self, data: &[u8], plan: &ChunkPlan) -> CoreResult<Vec<ChunkArtifact>> {
        let frame_size = self.dims.frame_size();
        let shape = [
            plan.target_frames,
            self.dims.height as usize,
            self.dims.width as usize,
            CHANNELS,
        ];

        let mut artifacts = Vec::with_capacity(plan.ranges.len());
        for range in &plan.ranges {
            let slice = &data[range.start * frame_size..range.end * frame_size];
            let path = self.clip_dir.join(format!("{}.npy", range.name()));

            if range.padded {
                let mut padded = Vec::with_capacity(plan.target_frames * frame_size);
                padded.extend_from_slice(slice);
                padded.resize(plan.target_frames * frame_size, 0);
                npy::write_npy(&path, &padded, &shape)?;
            } else {
                npy::write_npy(&path, slice, &shape)?;
            }

            let metadata = self.metadata_for(range, plan);
            let metadata_path = self
                .clip_dir
                .join(format!("{}_metadata.json", range.name()));
            metadata.write_to(&metadata_path)?;

            debug!("Wrote {} ({} source frames)", path.display(), range.len());
            artifacts.push(ChunkArtifact {
                index: range.index,
                path,
                metadata_path,
                metadata,
            });
        }
        Ok(artifacts)
    }

    fn write_image_dirs(&self, frames: &[PathBuf], plan: &ChunkPlan) -> CoreResult<Vec<ChunkArtifact>> {
        let extension = OutputFormat::Jpeg.extension();
        let mut artifacts = Vec::with_capacity(plan.ranges.len());

        for range in &plan.ranges {
            let chunk_dir = self.clip_dir.join(range.name());
            fs::create_dir_all(&chunk_dir)?;

            for (offset, source) in frames[range.start..range.end].iter().enumerate() {
                let dest = chunk_dir.join(frame_file_name(offset + 1, extension));
                fs::rename(source, &dest).map_err(|e| {
                    CoreError::PathError(format!(
                        "Failed to move frame {} to {}: {}",
                        source.display(),
                        dest.display(),
                        e
                    ))
                })?;
            }

            if range.padded {
                let blank = image::RgbImage::new(self.dims.width, self.dims.height);
                for position in range.len() + 1..=plan.target_frames {
                    blank.save(chunk_dir.join(frame_file_name(position, extension)))?;
                }
            }

            let metadata = self.metadata_for(range, plan);
            let metadata_path = chunk_dir.join(METADATA_FILENAME);
            metadata.write_to(&metadata_path)?;

            debug!("Wrote {} ({} source frames)", chunk_dir.display(), range.len());
            artifacts.push(ChunkArtifact {
                index: range.index,
                path: chunk_dir,
                metadata_path,
                metadata,
            });
        }

        let leftovers = &frames[plan.consumed_frames()..];
        for frame in leftovers {
            fs::remove_file(frame)?;
        }
        if !leftovers.is_empty() {
            debug!(
                "Removed {} unused frame(s) for {}",
                leftovers.len(),
                self.clip_key
            );
        }

        Ok(artifacts)
    }
}

/// `frame_001.jpg` style name; positions start at 1.
#[must_use]
pub fn frame_file_name(position: usize, extension: &str) -> String {
    format!("frame_{position:03}.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::plan_chunks;
    use crate::types::ChunkPolicy;

    fn dims() -> Dimensions {
        Dimensions::new(2, 2)
    }

    /// Frame `i` is filled with byte `i`.
    fn raw_frames(count: usize) -> Vec<u8> {
        (0..count)
            .flat_map(|i| std::iter::repeat(i as u8).take(dims().frame_size()))
            .collect()
    }

    fn image_frames(dir: &Path, count: usize) -> Vec<PathBuf> {
        (1..=count)
            .map(|i| {
                let path = dir.join(format!("frame_{i:06}.jpg"));
                fs::write(&path, format!("frame {i}")).unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn test_frame_count_rejects_partial_frames() {
        let stream = FrameStream::Raw(vec![0; 13]);
        assert!(matches!(
            stream.frame_count(dims()),
            Err(CoreError::FrameSizeMismatch { len: 13, frame_size: 12 })
        ));
        assert_eq!(FrameStream::Raw(raw_frames(3)).frame_count(dims()).unwrap(), 3);
    }

    #[test]
    fn test_arrays_slice_the_buffer_per_range() {
        let dir = tempfile::tempdir().unwrap();
        let clip_dir = dir.path().join("clip");
        let plan = plan_chunks(5, 2, ChunkPolicy::Truncate).unwrap();

        let artifacts = ClipChunkSerializer::new("clip", &clip_dir, 8, dims())
            .serialize(FrameStream::Raw(raw_frames(5)), &plan)
            .unwrap();
        assert_eq!(artifacts.len(), 2);

        let bytes = fs::read(clip_dir.join("chunk_00001.npy")).unwrap();
        let header = npy::read_header(&bytes).unwrap();
        assert_eq!(header.shape, vec![2, 2, 2, 3]);
        let payload = &bytes[header.data_offset..];
        assert_eq!(payload.len(), 24);
        assert!(payload[..12].iter().all(|&b| b == 2));
        assert!(payload[12..].iter().all(|&b| b == 3));

        assert!(artifacts[0].metadata_path.ends_with("chunk_00000_metadata.json"));
        assert!(!artifacts[0].metadata.is_trimmed);
        assert!(artifacts[1].metadata.is_trimmed);
        assert!(!clip_dir.join("chunk_00002.npy").exists());
    }

    #[test]
    fn test_arrays_zero_pad_the_tail() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan_chunks(3, 2, ChunkPolicy::Pad).unwrap();

        let artifacts = ClipChunkSerializer::new("clip", dir.path(), 8, dims())
            .serialize(FrameStream::Raw(raw_frames(3)), &plan)
            .unwrap();

        let tail = &artifacts[1];
        assert!(tail.metadata.is_padded);
        assert_eq!(tail.metadata.frame_count, 2);
        let bytes = fs::read(&tail.path).unwrap();
        let header = npy::read_header(&bytes).unwrap();
        let payload = &bytes[header.data_offset..];
        assert!(payload[..12].iter().all(|&b| b == 2));
        assert!(payload[12..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_images_are_moved_renumbered_and_leftovers_removed() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("staging");
        fs::create_dir_all(&staging).unwrap();
        let clip_dir = dir.path().join("clip");
        let frames = image_frames(&staging, 5);
        let plan = plan_chunks(5, 2, ChunkPolicy::Truncate).unwrap();

        let artifacts = ClipChunkSerializer::new("clip", &clip_dir, 8, dims())
            .original_fps(Some(30))
            .serialize(FrameStream::Images(frames), &plan)
            .unwrap();

        assert_eq!(artifacts.len(), 2);
        let second = clip_dir.join("chunk_00001");
        assert_eq!(fs::read_to_string(second.join("frame_001.jpg")).unwrap(), "frame 3");
        assert_eq!(fs::read_to_string(second.join("frame_002.jpg")).unwrap(), "frame 4");
        assert!(!second.join("frame_003.jpg").exists());

        let meta = ChunkMetadata::read_from(&second.join(METADATA_FILENAME)).unwrap();
        assert_eq!(meta.key, "clip/chunk_00001");
        assert_eq!(meta.original_fps, Some(30));
        assert!(meta.is_trimmed);

        assert_eq!(fs::read_dir(&staging).unwrap().count(), 0);
    }

    #[test]
    fn test_images_pad_with_blank_frames() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("staging");
        fs::create_dir_all(&staging).unwrap();
        let frames = image_frames(&staging, 3);
        let plan = plan_chunks(3, 4, ChunkPolicy::Pad).unwrap();

        let artifacts = ClipChunkSerializer::new("clip", dir.path(), 8, dims())
            .serialize(FrameStream::Images(frames), &plan)
            .unwrap();

        let chunk_dir = &artifacts[0].path;
        let blank = image::open(chunk_dir.join("frame_004.jpg")).unwrap();
        assert_eq!((blank.width(), blank.height()), (2, 2));
        assert!(artifacts[0].metadata.is_padded);
    }

    #[test]
    fn test_plan_longer_than_stream_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan_chunks(4, 2, ChunkPolicy::Truncate).unwrap();
        let result = ClipChunkSerializer::new("clip", dir.path(), 8, dims())
            .serialize(FrameStream::Raw(raw_frames(2)), &plan);
        assert!(matches!(result, Err(CoreError::Config(_))));
    }
}
