// ============================================================================
// vidprep-cli/src/commands/process.rs
// ============================================================================
//
// PROCESS COMMAND: Archive -> Chunks (-> Shards)
//
// 1. Build and validate the core configuration (fatal before any work)
// 2. Extract clips from the tar archive
// 3. Check that ffmpeg is available
// 4. Run the parallel orchestrator with a clip progress bar
// 5. Optionally pack the output tree into shards

use crate::cli::ProcessArgs;
use crate::error::{CliErrorContext, CliResult};
use crate::terminal::{
    clip_progress_bar, print_section, print_status, print_success, print_warning,
};

use log::info;
use std::sync::Arc;
use std::time::Instant;
use vidprep_core::config::CoreConfigBuilder;
use vidprep_core::external::{FfmpegDecodeEngine, check_dependency};
use vidprep_core::{ChunkPolicy, CoreConfig, ParallelOrchestrator, extract_clips_from_tar};

/// Turns parsed arguments into a validated core configuration.
pub fn build_config(args: &ProcessArgs) -> CliResult<CoreConfig> {
    let mut builder = CoreConfigBuilder::new()
        .output_dir(&args.output_dir)
        .fps(args.fps)
        .size(&args.size)?
        .format_name(&args.format)?
        .target_frames(args.frames)
        .chunk_policy(if args.pad {
            ChunkPolicy::Pad
        } else {
            ChunkPolicy::Truncate
        })
        .shard_size(args.shard_size);

    if let Some(workers) = args.workers {
        builder = builder.workers(workers);
    }
    if let Some(temp_dir) = &args.temp_dir {
        builder = builder.temp_dir(temp_dir);
    }
    if let Some(shard_dir) = &args.shard_dir {
        builder = builder.shard_dir(shard_dir);
    }

    let config = builder.build();
    config.validate()?;
    Ok(config)
}

pub fn run_process(args: ProcessArgs) -> CliResult<()> {
    let start = Instant::now();
    let config = build_config(&args)?;

    print_section("Configuration");
    print_status("Archive", args.tar_path.display());
    print_status("Output", config.output_dir.display());
    print_status("Format", config.format);
    print_status("Frame size", config.dimensions);
    print_status("FPS", config.fps);
    print_status("Frames/chunk", config.target_frames);
    print_status("Policy", format!("{:?}", config.chunk_policy).to_lowercase());
    print_status("Workers", config.workers.max(1));

    let clips = extract_clips_from_tar(&args.tar_path).cli_context("Failed to read clip archive")?;
    if clips.is_empty() {
        print_warning("No video clips found in the archive");
        return Ok(());
    }

    check_dependency("ffmpeg")?;

    print_section("Processing");
    print_status("Clips", clips.len());

    let bar = clip_progress_bar(clips.len());
    let progress = bar.clone();
    let orchestrator = ParallelOrchestrator::new(Arc::new(FfmpegDecodeEngine::new()), config.clone())
        .on_progress(move |done, _total| progress.set_position(done as u64));
    let result = orchestrator.run(&clips);
    bar.finish_and_clear();
    let report = result?;

    print_success(&format!(
        "{} clip(s) processed, {} chunk(s) written",
        report.clips_processed(),
        report.chunks_written()
    ));
    if report.frames_discarded() > 0 {
        print_status("Frames dropped", report.frames_discarded());
    }
    for clip in report.clips.iter().filter(|c| c.chunks_written() == 0) {
        print_warning(&format!(
            "{} produced 0 chunks ({} frames)",
            clip.key, clip.total_frames
        ));
    }

    if let Some(shard_dir) = &config.shard_dir {
        print_section("Sharding");
        let shards = vidprep_core::pack_shards(
            &config.output_dir,
            shard_dir,
            config.shard_size,
            config.format,
        )?;
        print_success(&format!("{} shard(s) written to {}", shards, shard_dir.display()));
    }

    info!("Finished in {:.1?}", start.elapsed());
    Ok(())
}
