// ============================================================================
// vidprep-core/src/chunking.rs
// ============================================================================
//
// CHUNK PLANNING: Fixed-Length Partitioning of a Clip's Frame Stream
//
// Given how many frames a clip decoded to and how long each chunk should be,
// this module decides which frame ranges become chunks. The plan is the only
// place chunk indices are assigned: index = position in the plan, and ranges
// are strictly increasing by start frame.
//
// POLICIES:
// - Truncate: emit floor(total / target) complete ranges, drop the remainder.
// - Pad: as above, then one short range for the remainder which the
//   serializer zero-extends to the target length.

use crate::error::{CoreError, CoreResult};
use crate::types::ChunkPolicy;

/// Highest number of chunks a single clip may produce (indices 00000-99999).
pub const MAX_CHUNKS_PER_CLIP: usize = 100_000;

/// Width of the zero-padded chunk index in artifact names.
pub const CHUNK_INDEX_DIGITS: usize = 5;

/// A half-open range `[start, end)` of source frames that becomes one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    /// Position in the plan; names the artifact.
    pub index: usize,
    pub start: usize,
    pub end: usize,
    /// True when the range is shorter than the target and must be padded.
    pub padded: bool,
}

impl ChunkRange {
    /// Number of source frames the range covers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.padded
    }

    /// `chunk_00042` style name shared by every artifact of this chunk.
    #[must_use]
    pub fn name(&self) -> String {
        chunk_name(self.index)
    }
}

/// Formats a chunk index with the fixed five-digit width.
#[must_use]
pub fn chunk_name(index: usize) -> String {
    format!("chunk_{index:0width$}", width = CHUNK_INDEX_DIGITS)
}

/// The ordered ranges for one clip plus the bookkeeping around them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    pub ranges: Vec<ChunkRange>,
    pub total_frames: usize,
    pub target_frames: usize,
    /// Trailing frames not referenced by any range.
    pub discarded_frames: usize,
}

impl ChunkPlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of leading source frames consumed by the plan.
    #[must_use]
    pub fn consumed_frames(&self) -> usize {
        self.ranges.last().map_or(0, |r| r.end)
    }

    /// True when the truncate policy dropped frames from this clip.
    #[must_use]
    pub fn is_trimmed(&self) -> bool {
        self.discarded_frames > 0
    }
}

/// Computes the chunk boundaries for `total_frames` frames.
///
/// Fewer frames than `target_frames` under [`ChunkPolicy::Truncate`] yields an
/// empty plan rather than an error.
pub fn plan_chunks(
    total_frames: usize,
    target_frames: usize,
    policy: ChunkPolicy,
) -> CoreResult<ChunkPlan> {
    if target_frames == 0 {
        return Err(CoreError::Config(
            "target frames per chunk must be greater than zero".to_string(),
        ));
    }

    let complete = total_frames / target_frames;
    let remainder = total_frames % target_frames;
    let pad_tail = policy == ChunkPolicy::Pad && remainder > 0;
    let chunk_count = complete + usize::from(pad_tail);

    if chunk_count > MAX_CHUNKS_PER_CLIP {
        return Err(CoreError::ChunkIndexOverflow(chunk_count));
    }

    let mut ranges: Vec<ChunkRange> = (0..complete)
        .map(|index| ChunkRange {
            index,
            start: index * target_frames,
            end: (index + 1) * target_frames,
            padded: false,
        })
        .collect();

    if pad_tail {
        ranges.push(ChunkRange {
            index: complete,
            start: complete * target_frames,
            end: total_frames,
            padded: true,
        });
    }

    let discarded_frames = if pad_tail { 0 } else { remainder };

    log::debug!(
        "Planned {} chunk(s) from {} frames (target {}, {:?}), {} discarded",
        ranges.len(),
        total_frames,
        target_frames,
        policy,
        discarded_frames
    );

    Ok(ChunkPlan {
        ranges,
        total_frames,
        target_frames,
        discarded_frames,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_multiple_produces_complete_chunks() {
        let plan = plan_chunks(24, 8, ChunkPolicy::Truncate).unwrap();
        assert_eq!(plan.ranges.len(), 3);
        assert_eq!(plan.discarded_frames, 0);
        assert!(plan.ranges.iter().all(|r| r.len() == 8 && r.is_complete()));
        let names: Vec<String> = plan.ranges.iter().map(ChunkRange::name).collect();
        assert_eq!(names, ["chunk_00000", "chunk_00001", "chunk_00002"]);
    }

    #[test]
    fn test_truncate_drops_remainder() {
        let plan = plan_chunks(20, 7, ChunkPolicy::Truncate).unwrap();
        assert_eq!(plan.ranges.len(), 2);
        assert_eq!(plan.consumed_frames(), 14);
        assert_eq!(plan.discarded_frames, 6);
        assert!(plan.is_trimmed());
        assert!(plan.ranges.iter().all(|r| r.end <= 14));
    }

    #[test]
    fn test_truncate_chunk_count_matches_integer_division() {
        for total in 0..60 {
            for target in 1..12 {
                let plan = plan_chunks(total, target, ChunkPolicy::Truncate).unwrap();
                assert_eq!(plan.ranges.len(), total / target);
                assert_eq!(plan.discarded_frames, total % target);
                assert!(plan.ranges.iter().all(|r| r.len() == target));
                assert!(plan.ranges.windows(2).all(|w| w[0].end == w[1].start));
            }
        }
    }

    #[test]
    fn test_pad_emits_short_tail() {
        let plan = plan_chunks(20, 7, ChunkPolicy::Pad).unwrap();
        assert_eq!(plan.ranges.len(), 3);
        let tail = plan.ranges[2];
        assert_eq!((tail.start, tail.end), (14, 20));
        assert!(tail.padded);
        assert_eq!(plan.discarded_frames, 0);
        assert!(!plan.is_trimmed());
    }

    #[test]
    fn test_pad_without_remainder_matches_truncate() {
        let padded = plan_chunks(16, 8, ChunkPolicy::Pad).unwrap();
        let truncated = plan_chunks(16, 8, ChunkPolicy::Truncate).unwrap();
        assert_eq!(padded, truncated);
    }

    #[test]
    fn test_boundaries() {
        assert!(plan_chunks(0, 8, ChunkPolicy::Truncate).unwrap().is_empty());
        assert!(plan_chunks(0, 8, ChunkPolicy::Pad).unwrap().is_empty());
        assert!(plan_chunks(5, 8, ChunkPolicy::Truncate).unwrap().is_empty());

        let one = plan_chunks(8, 8, ChunkPolicy::Truncate).unwrap();
        assert_eq!(one.ranges.len(), 1);
        assert!(one.ranges[0].is_complete());
    }

    #[test]
    fn test_zero_target_is_rejected() {
        assert!(matches!(
            plan_chunks(10, 0, ChunkPolicy::Truncate),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn test_chunk_index_overflow_is_rejected() {
        let ok = plan_chunks(MAX_CHUNKS_PER_CLIP, 1, ChunkPolicy::Truncate).unwrap();
        assert_eq!(ok.ranges.last().unwrap().name(), "chunk_99999");

        assert!(matches!(
            plan_chunks(MAX_CHUNKS_PER_CLIP + 1, 1, ChunkPolicy::Truncate),
            Err(CoreError::ChunkIndexOverflow(100_001))
        ));
    }
}
