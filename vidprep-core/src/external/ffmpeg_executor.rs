// ============================================================================
// vidprep-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: Spawning ffmpeg and Judging Its Outcome
//
// The decode engine never talks to ffmpeg-sidecar directly. It hands a built
// command to an FfmpegSpawner, which runs it to completion, keeps the error
// lines ffmpeg printed, and turns a non-zero exit into a CommandFailed error
// carrying those lines.
//
// KEY COMPONENTS:
// - FfmpegProcess: a running ffmpeg whose events can be drained
// - FfmpegSpawner: creates processes; `run` drives one to completion
// - SidecarSpawner / SidecarProcess: the ffmpeg-sidecar implementation

use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error, command_wait_error};

use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use std::process::ExitStatus;

/// An ffmpeg invocation that has been started.
pub trait FfmpegProcess {
    /// Feeds every parsed stderr/stdout event to `handler` until ffmpeg closes its pipes.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>;

    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Something that can start ffmpeg commands.
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;

    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;

    /// Runs `cmd` to completion. `label` names the step in logs and errors.
    fn run(&self, label: &str, cmd: FfmpegCommand) -> CoreResult<()> {
        log::debug!("Running ffmpeg ({}): {:?}", label, cmd);

        let mut process = self.spawn(cmd)?;
        let mut error_lines = Vec::new();
        let drained = process.handle_events(|event| {
            if let Some(line) = error_line(event) {
                log::debug!("ffmpeg ({}): {}", label, line);
                error_lines.push(line);
            }
            Ok(())
        });
        // Always reap the child, even when event parsing broke down.
        let status = process.wait()?;
        drained?;

        if status.success() {
            Ok(())
        } else {
            Err(command_failed_error(
                format!("ffmpeg ({label})"),
                status,
                error_lines.join("; "),
            ))
        }
    }
}

/// Returns the message of events that report an ffmpeg error.
fn error_line(event: FfmpegEvent) -> Option<String> {
    match event {
        FfmpegEvent::Error(line) => Some(line),
        FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, line) => Some(line),
        _ => None,
    }
}

/// `FfmpegChild` from ffmpeg-sidecar.
pub struct SidecarProcess(FfmpegChild);

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let events = self
            .0
            .iter()
            .map_err(|e| CoreError::DecodeEngine(format!("failed to read ffmpeg output: {e}")))?;
        for event in events {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.0.wait().map_err(|e| command_wait_error("ffmpeg", e))
    }
}

/// Spawns the `ffmpeg` found on PATH through ffmpeg-sidecar.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        cmd.spawn()
            .map(SidecarProcess)
            .map_err(|e| command_start_error("ffmpeg", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_line_keeps_only_errors() {
        assert_eq!(
            error_line(FfmpegEvent::Error("boom".to_string())),
            Some("boom".to_string())
        );
        assert_eq!(
            error_line(FfmpegEvent::Log(LogLevel::Fatal, "fatal".to_string())),
            Some("fatal".to_string())
        );
        assert_eq!(
            error_line(FfmpegEvent::Log(LogLevel::Info, "frame=1".to_string())),
            None
        );
    }
}
