// ============================================================================
// vidprep-core/src/orchestrator.rs
// ============================================================================
//
// PARALLEL ORCHESTRATION: Fan-Out of Clips Across a Bounded Worker Pool
//
// Every clip of a batch is handed to a dedicated rayon pool of
// max(1, workers) threads. Workers never share output paths, so the only
// shared state is the failure list and the completed-clip counter. A failing
// clip is logged and recorded; its siblings keep running. Once the pool has
// drained, any recorded failures are returned together as one BatchFailed
// error.

use crate::config::CoreConfig;
use crate::error::{ClipFailure, CoreError, CoreResult};
use crate::external::DecodeEngine;
use crate::pipeline::{ClipReport, process_clip};
use crate::types::Clip;

use log::{error, info};
use rayon::prelude::*;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Called after each clip with `(completed, total)`.
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Totals for a batch in which every clip succeeded.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Per-clip reports sorted by clip key.
    pub clips: Vec<ClipReport>,
}

impl BatchReport {
    #[must_use]
    pub fn clips_processed(&self) -> usize {
        self.clips.len()
    }

    #[must_use]
    pub fn chunks_written(&self) -> usize {
        self.clips.iter().map(ClipReport::chunks_written).sum()
    }

    #[must_use]
    pub fn frames_discarded(&self) -> usize {
        self.clips.iter().map(|c| c.discarded_frames).sum()
    }
}

/// Runs the clip pipeline over a batch with bounded parallelism.
pub struct ParallelOrchestrator {
    engine: Arc<dyn DecodeEngine>,
    config: CoreConfig,
    on_progress: Option<ProgressCallback>,
}

impl ParallelOrchestrator {
    pub fn new(engine: Arc<dyn DecodeEngine>, config: CoreConfig) -> Self {
        Self {
            engine,
            config,
            on_progress: None,
        }
    }

    /// Number of worker threads the batch will use.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.config.workers.max(1)
    }

    /// Sets a callback invoked after every clip, successful or not.
    #[must_use]
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    /// Processes every clip and waits for all of them.
    pub fn run(&self, clips: &[Clip]) -> CoreResult<BatchReport> {
        self.config.validate()?;
        fs::create_dir_all(&self.config.output_dir)?;

        let total = clips.len();
        let workers = self.workers();
        info!("Processing {} clip(s) with {} worker(s)", total, workers);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("vidprep-worker-{i}"))
            .build()?;

        let completed = AtomicUsize::new(0);
        let reports = Mutex::new(Vec::with_capacity(total));
        let failures = Mutex::new(Vec::new());

        pool.install(|| {
            clips.par_iter().with_max_len(1).for_each(|clip| {
                match process_clip(self.engine.as_ref(), clip, &self.config) {
                    Ok(report) => reports
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(report),
                    Err(e) => {
                        error!("Error processing {}: {}", clip.key, e);
                        failures
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push(ClipFailure {
                                key: clip.key.clone(),
                                error: e,
                            });
                    }
                }

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(callback) = &self.on_progress {
                    callback(done, total);
                }
            });
        });

        let mut failures = failures.into_inner().unwrap_or_else(PoisonError::into_inner);
        if !failures.is_empty() {
            failures.sort_by(|a, b| a.key.cmp(&b.key));
            error!("{} of {} clip(s) failed", failures.len(), total);
            return Err(CoreError::BatchFailed(failures));
        }

        let mut clips = reports.into_inner().unwrap_or_else(PoisonError::into_inner);
        clips.sort_by(|a, b| a.key.cmp(&b.key));
        let report = BatchReport { clips };
        info!(
            "Processed {} clip(s): {} chunk(s) written, {} frame(s) discarded",
            report.clips_processed(),
            report.chunks_written(),
            report.frames_discarded()
        );
        Ok(report)
    }
}

/// Batch entry point: processes `clips` with the settings in `config`.
pub fn process_all(
    engine: Arc<dyn DecodeEngine>,
    clips: &[Clip],
    config: &CoreConfig,
) -> CoreResult<BatchReport> {
    ParallelOrchestrator::new(engine, config.clone()).run(clips)
}
