//! ffmpeg-backed [`DecodeEngine`].
//!
//! Both output modes share one filter chain, `fps=<fps>,scale=<w>:<h>`. Raw
//! mode writes packed `rgb24` to a scratch file next to the input and reads it
//! back; image mode writes `frame_%06d.<ext>` into the directory it is given.

use super::ffmpeg_executor::{FfmpegSpawner, SidecarSpawner};
use super::{DecodeEngine, sorted_frame_files};
use crate::error::{CoreError, CoreResult};
use crate::types::Dimensions;

use ffmpeg_sidecar::command::FfmpegCommand;
use std::fs;
use std::path::{Path, PathBuf};

/// Decode engine that shells out to ffmpeg (and ffprobe for frame rates).
#[derive(Debug, Clone, Default)]
pub struct FfmpegDecodeEngine<S = SidecarSpawner> {
    spawner: S,
}

impl FfmpegDecodeEngine<SidecarSpawner> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: FfmpegSpawner> FfmpegDecodeEngine<S> {
    pub fn with_spawner(spawner: S) -> Self {
        Self { spawner }
    }

    pub fn spawner(&self) -> &S {
        &self.spawner
    }
}

fn filter_chain(fps: u32, dims: Dimensions) -> String {
    format!("fps={},{}", fps, dims.scale_filter())
}

/// `ffmpeg -hide_banner -y -i <input> -vf fps,scale -f rawvideo -pix_fmt rgb24 <output>`
pub fn build_raw_command(input: &Path, output: &Path, fps: u32, dims: Dimensions) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.hide_banner();
    cmd.overwrite();
    cmd.input(input.to_string_lossy().as_ref());
    cmd.args(["-vf", &filter_chain(fps, dims)]);
    cmd.args(["-f", "rawvideo"]);
    cmd.args(["-pix_fmt", "rgb24"]);
    cmd.output(output.to_string_lossy().as_ref());
    cmd
}

/// `ffmpeg -hide_banner -y -i <input> -vf fps,scale <out_dir>/frame_%06d.<ext>`
pub fn build_images_command(
    input: &Path,
    out_dir: &Path,
    fps: u32,
    dims: Dimensions,
    extension: &str,
) -> FfmpegCommand {
    let pattern = out_dir.join(format!("frame_%06d.{extension}"));
    let mut cmd = FfmpegCommand::new();
    cmd.hide_banner();
    cmd.overwrite();
    cmd.input(input.to_string_lossy().as_ref());
    cmd.args(["-vf", &filter_chain(fps, dims)]);
    cmd.output(pattern.to_string_lossy().as_ref());
    cmd
}

impl<S> DecodeEngine for FfmpegDecodeEngine<S>
where
    S: FfmpegSpawner + Send + Sync,
{
    fn decode_raw(&self, input: &Path, fps: u32, dims: Dimensions) -> CoreResult<Vec<u8>> {
        let scratch_dir = input.parent().unwrap_or_else(|| Path::new("."));
        let raw_output = tempfile::Builder::new()
            .prefix("vidprep_raw_")
            .suffix(".rgb")
            .tempfile_in(scratch_dir)?;

        self.spawner
            .run("raw frames", build_raw_command(input, raw_output.path(), fps, dims))?;

        let data = fs::read(raw_output.path())?;
        log::debug!(
            "Decoded {} bytes of raw frames from {}",
            data.len(),
            input.display()
        );
        Ok(data)
    }

    fn decode_images(
        &self,
        input: &Path,
        fps: u32,
        dims: Dimensions,
        out_dir: &Path,
        extension: &str,
    ) -> CoreResult<Vec<PathBuf>> {
        self.spawner.run(
            "image frames",
            build_images_command(input, out_dir, fps, dims, extension),
        )?;
        sorted_frame_files(out_dir, extension)
    }

    fn probe_frame_rate(&self, input: &Path) -> CoreResult<Option<f64>> {
        let probe = ffprobe::ffprobe(input)
            .map_err(|e| CoreError::DecodeEngine(format!("ffprobe failed: {e}")))?;
        Ok(probe
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .and_then(|s| parse_frame_rate(&s.r_frame_rate)))
    }
}

/// Parses ffprobe rates such as `"30000/1001"`, `"25/1"` or `"29.97"`.
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    let value = match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => rate.trim().parse().ok()?,
    };
    (value.is_finite() && value > 0.0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_of(cmd: &FfmpegCommand) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_raw_command_arguments() {
        let cmd = build_raw_command(
            Path::new("/tmp/in.mp4"),
            Path::new("/tmp/out.rgb"),
            8,
            Dimensions::new(256, 128),
        );
        let args = args_of(&cmd).join(" ");
        assert!(args.starts_with("-hide_banner"));
        assert!(args.contains("-y"));
        assert!(args.contains("-i /tmp/in.mp4"));
        assert!(args.contains("-vf fps=8,scale=256:128"));
        assert!(args.contains("-f rawvideo"));
        assert!(args.contains("-pix_fmt rgb24"));
        assert!(args.ends_with("/tmp/out.rgb"));
    }

    #[test]
    fn test_images_command_arguments() {
        let cmd = build_images_command(
            Path::new("/tmp/in.mp4"),
            Path::new("/tmp/frames"),
            4,
            Dimensions::new(64, 64),
            "jpg",
        );
        let args = args_of(&cmd).join(" ");
        assert!(args.contains("-vf fps=4,scale=64:64"));
        assert!(args.ends_with("/tmp/frames/frame_%06d.jpg"));
        assert!(!args.contains("rawvideo"));
    }

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("25/1"), Some(25.0));
        assert_eq!(parse_frame_rate("30"), Some(30.0));
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("garbage"), None);
    }
}
