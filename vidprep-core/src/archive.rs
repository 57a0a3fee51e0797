//! Clip extraction from the input tar archive.
//!
//! Every regular entry with a video extension becomes a [`Clip`] keyed by its
//! file stem. Hidden entries (a leading `.` in the file name, which covers the
//! `._name.mp4` resource forks macOS adds to archives) are skipped.

use crate::error::{CoreError, CoreResult};
use crate::types::Clip;

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Extensions treated as video entries (compared case-insensitively).
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "webm", "avi"];

/// Upper bound on the buffer reserved from an entry's declared size.
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// Reads every video clip from the tar archive at `tar_path`, in archive order.
pub fn extract_clips_from_tar(tar_path: &Path) -> CoreResult<Vec<Clip>> {
    let file = File::open(tar_path).map_err(|e| {
        CoreError::PathError(format!(
            "Failed to open archive '{}': {}",
            tar_path.display(),
            e
        ))
    })?;
    let clips = read_clips(BufReader::new(file))?;
    log::info!(
        "Extracted {} clip(s) from {}",
        clips.len(),
        tar_path.display()
    );
    Ok(clips)
}

/// Reads clips from any tar stream.
pub fn read_clips<R: Read>(reader: R) -> CoreResult<Vec<Clip>> {
    let mut archive = tar::Archive::new(reader);
    let mut clips = Vec::new();
    let mut seen = HashSet::new();

    for entry in archive.entries()? {
        let mut entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let path = entry.path()?.into_owned();
        let Some(key) = clip_key(&path) else {
            log::debug!("Skipping non-video archive entry {}", path.display());
            continue;
        };

        if !seen.insert(key.clone()) {
            return Err(CoreError::Config(format!(
                "archive contains more than one clip named '{key}'"
            )));
        }

        // The header size is untrusted until the data has actually been read.
        let declared = entry.size();
        let mut data = Vec::with_capacity(declared.min(MAX_PREALLOCATION) as usize);
        entry.read_to_end(&mut data)?;
        if data.len() as u64 != declared {
            return Err(CoreError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "clip '{key}' is truncated: header declares {declared} bytes, archive holds {}",
                    data.len()
                ),
            )));
        }
        log::debug!("Read clip {} ({} bytes)", key, data.len());
        clips.push(Clip::new(key, data));
    }

    Ok(clips)
}

/// Clip key for an archive entry, or `None` when the entry is not a clip.
fn clip_key(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    if file_name.starts_with('.') {
        return None;
    }
    let extension = path.extension()?.to_str()?;
    if !VIDEO_EXTENSIONS
        .iter()
        .any(|ext| ext.eq_ignore_ascii_case(extension))
    {
        return None;
    }
    path.file_stem()?.to_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_tar(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (name, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, data.as_bytes()).unwrap();
        }
        builder.into_inner().unwrap()
    }

    #[test]
    fn test_reads_video_entries_and_skips_hidden_files() {
        let tar = build_tar(&[
            ("test_video.mp4", "dummy video data"),
            ("._test_video.mp4", "hidden file data"),
            ("notes.txt", "not a video"),
            ("nested/other.MP4", "second clip"),
        ]);

        let clips = read_clips(tar.as_slice()).unwrap();
        assert_eq!(clips.len(), 2);
        assert_eq!(clips[0], Clip::new("test_video", b"dummy video data".to_vec()));
        assert_eq!(clips[1].key, "other");
        assert_eq!(clips[1].data, b"second clip");
    }

    #[test]
    fn test_duplicate_keys_are_rejected() {
        let tar = build_tar(&[("a/clip.mp4", "one"), ("b/clip.mp4", "two")]);
        assert!(matches!(read_clips(tar.as_slice()), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_extract_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let tar_path = dir.path().join("clips.tar");
        std::fs::write(&tar_path, build_tar(&[("a.mp4", "aaa")])).unwrap();

        let clips = extract_clips_from_tar(&tar_path).unwrap();
        assert_eq!(clips, vec![Clip::new("a", b"aaa".to_vec())]);
    }

    #[test]
    fn test_oversized_header_is_an_io_error() {
        let mut header = tar::Header::new_gnu();
        header.set_path("huge.mp4").unwrap();
        header.set_size(1 << 46);
        header.set_mode(0o644);
        header.set_cksum();
        let mut tar = header.as_bytes().to_vec();
        tar.extend_from_slice(&[0u8; 1024]);

        let result = read_clips(tar.as_slice());
        assert!(matches!(result, Err(CoreError::Io(_))), "got {result:?}");
    }

    #[test]
    fn test_missing_archive_is_a_path_error() {
        let result = extract_clips_from_tar(Path::new("surely/missing/archive.tar"));
        assert!(matches!(result, Err(CoreError::PathError(_))));
    }
}
