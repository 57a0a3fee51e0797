// vidprep-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// This module is only compiled when the "test-mocks" feature is enabled.
#![cfg(feature = "test-mocks")]

use super::*;
use crate::error::{CoreError, CoreResult};
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::collections::HashMap;
use std::fs;
use std::os::unix::process::ExitStatusExt; // For ExitStatus::from_raw
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::Mutex;

// ============================================================================
// FFMPEG SPAWNER MOCK
// ============================================================================

/// Mock implementation of FfmpegProcess.
#[derive(Clone)]
pub struct MockFfmpegProcess {
    /// Events to emit when handle_events is called.
    pub events_to_emit: Vec<FfmpegEvent>,
    /// Exit status to return when wait is called.
    pub exit_status: ExitStatus,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        for event in self.events_to_emit.clone() {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }
}

/// What a matched command leaves behind at its output argument.
#[derive(Debug, Clone)]
pub enum MockOutput {
    Nothing,
    /// Bytes written to the output path (raw mode).
    Bytes(Vec<u8>),
    /// Number of `frame_NNNNNN.<ext>` files created next to the output pattern.
    Frames(usize),
}

/// Represents an expected ffmpeg command call and its mock result.
pub struct MockFfmpegExpectation {
    pub arg_pattern: String,
    pub result: CoreResult<MockFfmpegProcess>,
    pub output: MockOutput,
}

/// Mock implementation of FfmpegSpawner supporting multiple expectations.
#[derive(Default)]
pub struct MockFfmpegSpawner {
    expectations: Mutex<Vec<MockFfmpegExpectation>>,
    received_calls: Mutex<Vec<Vec<String>>>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_expectation(&self, arg_pattern: &str, result: CoreResult<MockFfmpegProcess>, output: MockOutput) {
        self.expectations.lock().unwrap().push(MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            result,
            output,
        });
    }

    pub fn add_success_expectation(&self, arg_pattern: &str, output: MockOutput) {
        let process = MockFfmpegProcess {
            events_to_emit: Vec::new(),
            exit_status: ExitStatus::from_raw(0),
        };
        self.add_expectation(arg_pattern, Ok(process), output);
    }

    pub fn add_spawn_error_expectation(&self, arg_pattern: &str, error: CoreError) {
        self.add_expectation(arg_pattern, Err(error), MockOutput::Nothing);
    }

    pub fn add_exit_error_expectation(&self, arg_pattern: &str, events: Vec<FfmpegEvent>, exit_code: i32) {
        let process = MockFfmpegProcess {
            events_to_emit: events,
            // Raw wait status: exit code lives in the second byte.
            exit_status: ExitStatus::from_raw(exit_code << 8),
        };
        self.add_expectation(arg_pattern, Ok(process), MockOutput::Nothing);
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.lock().unwrap().clone()
    }
}

fn create_mock_output(output_arg: &str, output: &MockOutput) -> CoreResult<()> {
    let output_path = PathBuf::from(output_arg);
    match output {
        MockOutput::Nothing => {}
        MockOutput::Bytes(bytes) => fs::write(&output_path, bytes)?,
        MockOutput::Frames(count) => {
            let dir = output_path.parent().unwrap_or_else(|| Path::new("."));
            let extension = output_path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("jpg");
            for i in 1..=*count {
                fs::write(dir.join(format!("frame_{i:06}.{extension}")), format!("frame {i}"))?;
            }
        }
    }
    Ok(())
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args: Vec<String> = cmd.get_args().map(|s| s.to_string_lossy().into_owned()).collect();
        self.received_calls.lock().unwrap().push(args.clone());

        let expectation = {
            let mut expectations = self.expectations.lock().unwrap();
            let found_index = expectations
                .iter()
                .position(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)));
            match found_index {
                Some(index) => expectations.remove(index),
                None => panic!("MockFfmpegSpawner: No expectation found for command args: {:?}", args),
            }
        };
        log::info!("MockFfmpegSpawner: Matched expectation with pattern '{}'", expectation.arg_pattern);

        let process = expectation.result?;
        if let Some(output_arg) = args.last() {
            create_mock_output(output_arg, &expectation.output)?;
        }
        Ok(process)
    }
}

// ============================================================================
// DECODE ENGINE MOCK
// ============================================================================

/// How the mock engine treats one clip.
#[derive(Debug, Clone)]
pub enum MockClipBehavior {
    /// Decode to this many frames. Raw frame `i` is filled with byte `i % 256`.
    Frames(usize),
    /// Fail the decode with this message.
    Fail(String),
}

/// DecodeEngine that fabricates frames instead of running ffmpeg.
///
/// Clips are identified by the bytes the pipeline materialised for them, so
/// tests build each clip with its own key as its data.
#[derive(Default)]
pub struct MockDecodeEngine {
    behaviors: Mutex<HashMap<String, MockClipBehavior>>,
    received_inputs: Mutex<Vec<PathBuf>>,
    frame_rate: Option<f64>,
}

impl MockDecodeEngine {
    pub fn new() -> Self {
        Default::default()
    }

    /// Reports `rate` from `probe_frame_rate` for every clip.
    pub fn with_frame_rate(mut self, rate: f64) -> Self {
        self.frame_rate = Some(rate);
        self
    }

    pub fn expect_clip(&self, data: &str, behavior: MockClipBehavior) {
        self.behaviors.lock().unwrap().insert(data.to_string(), behavior);
    }

    /// Temp input paths the engine was handed, in call order.
    pub fn get_received_inputs(&self) -> Vec<PathBuf> {
        self.received_inputs.lock().unwrap().clone()
    }

    /// Frame count for the clip at `input`, or its scripted failure.
    fn frames_for(&self, input: &Path) -> CoreResult<usize> {
        self.received_inputs.lock().unwrap().push(input.to_path_buf());
        let data = fs::read_to_string(input)?;
        match self.behaviors.lock().unwrap().get(&data) {
            Some(MockClipBehavior::Frames(count)) => Ok(*count),
            Some(MockClipBehavior::Fail(message)) => Err(CoreError::DecodeEngine(message.clone())),
            None => Err(CoreError::DecodeEngine(format!("MockDecodeEngine: no expectation for clip data {data:?}"))),
        }
    }
}

impl DecodeEngine for MockDecodeEngine {
    fn decode_raw(&self, input: &Path, _fps: u32, dims: Dimensions) -> CoreResult<Vec<u8>> {
        let count = self.frames_for(input)?;
        Ok((0..count)
            .flat_map(|i| std::iter::repeat((i % 256) as u8).take(dims.frame_size()))
            .collect())
    }

    fn decode_images(
        &self,
        input: &Path,
        _fps: u32,
        _dims: Dimensions,
        out_dir: &Path,
        extension: &str,
    ) -> CoreResult<Vec<PathBuf>> {
        let count = self.frames_for(input)?;
        create_mock_output(
            &out_dir.join(format!("frame_%06d.{extension}")).to_string_lossy(),
            &MockOutput::Frames(count),
        )?;
        sorted_frame_files(out_dir, extension)
    }

    fn probe_frame_rate(&self, _input: &Path) -> CoreResult<Option<f64>> {
        Ok(self.frame_rate)
    }
}
