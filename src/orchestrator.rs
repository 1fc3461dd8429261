//! Pipeline orchestrator for vidsum.
//!
//! Coordinates a run from probing the video to writing its summary artifact. Three entry
//! modes exist: a fresh run over every chunk, reuse of a saved artifact, and a resume pass
//! that re-drives only the chunks a previous run recorded as failed.

use crate::chunking::{segment, Chunk};
use crate::config::{ModelProvider, Prompts, Settings};
use crate::error::{Result, VidsumError};
use crate::inference::{GeminiClient, InferenceClient, VisionModel};
use crate::media::{FfmpegDecoder, Frame, FrameSampler, MediaDecoder, VideoMeta};
use crate::rate_control::{RateController, RATE_LIMIT_RETRIES};
use crate::store::{ChunkOutcome, ChunkResult, ExistingRun, RunStateStore, RunSummary};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Allowed drift between stored and recomputed chunk boundaries, in seconds.
const LAYOUT_TOLERANCE_SECONDS: f64 = 0.01;

/// What to do with an existing artifact for the same video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunDecision {
    /// Return the stored summary untouched.
    Reuse,
    /// Re-process only the failed chunks.
    Resume,
    /// Ignore the artifact and process every chunk again.
    FullReprocess,
}

/// How a run produced its summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Fresh,
    Reused,
    Resumed,
}

/// Progress notifications for a front end.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Chunks about to be processed in this run.
    Planned { mode: RunMode, chunks: usize },
    ChunkStarted { index: u32, label: String },
    ChunkFinished { index: u32, success: bool },
}

/// Callback receiving [`ProgressEvent`]s.
pub type ProgressFn = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Result of processing a video.
#[derive(Debug)]
pub struct RunOutcome {
    pub summary: RunSummary,
    /// Where the artifact lives.
    pub path: PathBuf,
    pub mode: RunMode,
    /// Chunks sent to the model in this run.
    pub attempted: usize,
}

impl RunOutcome {
    pub fn failed_count(&self) -> usize {
        self.summary.failed_chunks().len()
    }
}

/// The main orchestrator for the vidsum pipeline.
pub struct Orchestrator {
    settings: Settings,
    decoder: Arc<dyn MediaDecoder>,
    sampler: FrameSampler,
    inference: InferenceClient,
    rate: RateController,
    store: RunStateStore,
    progress: Option<ProgressFn>,
}

impl Orchestrator {
    /// Create an orchestrator backed by ffmpeg and the configured model provider.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let model: Arc<dyn VisionModel> = match settings.model.provider {
            ModelProvider::Gemini => {
                info!("Using Gemini model {}", settings.model.model);
                Arc::new(GeminiClient::from_settings(&settings.model)?)
            }
        };

        Ok(Self::with_components(
            settings,
            prompts,
            Arc::new(FfmpegDecoder::new()),
            model,
        ))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        decoder: Arc<dyn MediaDecoder>,
        model: Arc<dyn VisionModel>,
    ) -> Self {
        let inference = InferenceClient::from_settings(model, prompts, &settings);
        let rate = RateController::from_settings(&settings.rate_limit);
        let store = RunStateStore::new(settings.output_dir());
        let sampler = FrameSampler::new(decoder.clone());

        Self {
            settings,
            decoder,
            sampler,
            inference,
            rate,
            store,
            progress: None,
        }
    }

    /// Report progress to `callback`.
    pub fn with_progress(mut self, callback: ProgressFn) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn chunk_seconds(&self) -> f64 {
        self.settings.processing.chunk_seconds
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(progress) = &self.progress {
            progress(event);
        }
    }

    /// Summarize a video, reusing or resuming a saved artifact when `decide` says so.
    ///
    /// `decide` is only consulted when an artifact exists and `force` is false. `output`
    /// overrides the artifact path of a fresh run.
    #[instrument(skip(self, output, decide), fields(video = %video_path.display()))]
    pub async fn process_video<F>(
        &self,
        video_path: &Path,
        force: bool,
        output: Option<&Path>,
        decide: F,
    ) -> Result<RunOutcome>
    where
        F: FnOnce(&ExistingRun) -> RunDecision,
    {
        if !force {
            if let Some(existing) = self.store.exists_for(video_path) {
                match decide(&existing) {
                    RunDecision::Reuse => return Ok(self.reuse(existing)),
                    RunDecision::Resume if existing.is_complete() => {
                        info!("No failed chunks in {}, reusing", existing.path.display());
                        return Ok(self.reuse(existing));
                    }
                    RunDecision::Resume => return self.resume(video_path, existing).await,
                    RunDecision::FullReprocess => {
                        info!("Reprocessing {} from scratch", video_path.display());
                    }
                }
            }
        }

        self.run_fresh(video_path, output).await
    }

    fn reuse(&self, existing: ExistingRun) -> RunOutcome {
        info!("Using existing summary {}", existing.path.display());
        self.emit(ProgressEvent::Planned {
            mode: RunMode::Reused,
            chunks: 0,
        });

        RunOutcome {
            summary: existing.summary,
            path: existing.path,
            mode: RunMode::Reused,
            attempted: 0,
        }
    }

    async fn run_fresh(&self, video_path: &Path, output: Option<&Path>) -> Result<RunOutcome> {
        let meta = self.probe(video_path).await?;
        let chunks = segment(meta.total_duration, self.chunk_seconds())?;

        info!(
            "Processing {} chunks of {}s from {} ({:.2}s)",
            chunks.len(),
            self.chunk_seconds(),
            meta.filename,
            meta.total_duration
        );
        self.emit(ProgressEvent::Planned {
            mode: RunMode::Fresh,
            chunks: chunks.len(),
        });

        let mut results = Vec::with_capacity(chunks.len());
        for (position, chunk) in chunks.iter().enumerate() {
            let outcome = self.process_chunk(video_path, chunk).await;
            results.push(ChunkResult::new(chunk, &outcome));

            if position + 1 < chunks.len() {
                self.rate.pace(position).await;
            }
        }

        let summary = RunSummary::new(&meta, self.chunk_seconds(), results);
        let path = self.store.save(&summary, output)?;

        Ok(RunOutcome {
            summary,
            path,
            mode: RunMode::Fresh,
            attempted: chunks.len(),
        })
    }

    async fn resume(&self, video_path: &Path, existing: ExistingRun) -> Result<RunOutcome> {
        let ExistingRun {
            mut summary,
            path,
            failed,
        } = existing;

        let meta = self.probe(video_path).await?;
        let chunks = segment(meta.total_duration, self.chunk_seconds())?;
        check_layout(&summary, &chunks, self.chunk_seconds())?;

        info!("Resuming {} failed chunks: {:?}", failed.len(), failed);
        self.emit(ProgressEvent::Planned {
            mode: RunMode::Resumed,
            chunks: failed.len(),
        });

        let mut attempted = 0;
        for chunk in chunks.iter().filter(|c| failed.contains(&c.index)) {
            self.rate.before_resume_attempt().await;
            let outcome = self.process_chunk(video_path, chunk).await;
            attempted += 1;

            if let Some(entry) = summary.chunk_mut(chunk.index) {
                entry.apply(&outcome);
            }
        }

        summary.touch();
        let path = self.store.save(&summary, Some(&path))?;

        Ok(RunOutcome {
            summary,
            path,
            mode: RunMode::Resumed,
            attempted,
        })
    }

    async fn probe(&self, video_path: &Path) -> Result<VideoMeta> {
        if !video_path.exists() {
            return Err(VidsumError::MediaNotFound(video_path.to_path_buf()));
        }

        let meta = self.decoder.probe(video_path).await?;
        debug!(
            "Probed {}: {:.2}s, {:.2} fps, {}x{}",
            meta.filename, meta.total_duration, meta.frame_rate, meta.frame_size.0, meta.frame_size.1
        );
        Ok(meta)
    }

    /// Sample and summarize one chunk. Frame extraction and inference failures are recorded
    /// on the chunk and never abort the run.
    async fn process_chunk(&self, video_path: &Path, chunk: &Chunk) -> ChunkOutcome {
        self.emit(ProgressEvent::ChunkStarted {
            index: chunk.index,
            label: chunk.timestamp_label(),
        });

        let outcome = match self.sampler.sample(video_path, chunk).await {
            Ok(frames) => self.summarize_frames(chunk, &frames).await,
            Err(e) => {
                warn!("Chunk {} frames unavailable: {}", chunk.index, e);
                ChunkOutcome::Failed(e.to_string())
            }
        };

        self.emit(ProgressEvent::ChunkFinished {
            index: chunk.index,
            success: outcome.is_success(),
        });
        outcome
    }

    async fn summarize_frames(&self, chunk: &Chunk, frames: &[Frame]) -> ChunkOutcome {
        let mut retries = 0;
        loop {
            match self.inference.summarize(chunk, frames).await {
                Ok(text) => break ChunkOutcome::Success(text),
                Err(e) if e.is_rate_limited() && retries < RATE_LIMIT_RETRIES => {
                    retries += 1;
                    self.rate.back_off(chunk.index).await;
                }
                Err(e) => {
                    warn!("Chunk {} failed: {}", chunk.index, e);
                    break ChunkOutcome::Failed(e.to_string());
                }
            }
        }
    }
}

/// Verify that a stored summary was produced with the same chunk boundaries.
fn check_layout(summary: &RunSummary, chunks: &[Chunk], chunk_length: f64) -> Result<()> {
    if (summary.chunk_length_seconds - chunk_length).abs() > LAYOUT_TOLERANCE_SECONDS {
        return Err(VidsumError::LayoutMismatch(format!(
            "stored chunk length is {}s, configured is {}s",
            summary.chunk_length_seconds, chunk_length
        )));
    }

    if summary.total_chunk_count != chunks.len() || summary.chunks.len() != chunks.len() {
        return Err(VidsumError::LayoutMismatch(format!(
            "stored summary has {} chunks, video now splits into {}",
            summary.chunks.len(),
            chunks.len()
        )));
    }

    for (stored, chunk) in summary.chunks.iter().zip(chunks) {
        let drifted = (stored.start_time - chunk.start_time).abs() > LAYOUT_TOLERANCE_SECONDS
            || (stored.end_time - chunk.end_time).abs() > LAYOUT_TOLERANCE_SECONDS;
        if stored.chunk_index != chunk.index || drifted {
            return Err(VidsumError::LayoutMismatch(format!(
                "chunk {} is stored as {:.2}-{:.2}s, expected chunk {} at {:.2}-{:.2}s",
                stored.chunk_index,
                stored.start_time,
                stored.end_time,
                chunk.index,
                chunk.start_time,
                chunk.end_time
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::testing::ScriptedModel;
    use crate::inference::InferenceError;
    use crate::store::ChunkStatus;
    use async_trait::async_trait;
    use image::RgbImage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Decoder for a video of fixed duration that returns blank frames.
    struct StillDecoder {
        duration: f64,
        /// Frames at or after this position fail to decode.
        fail_from: Option<f64>,
        probes: AtomicUsize,
        frames: AtomicUsize,
    }

    impl StillDecoder {
        fn new(duration: f64) -> Self {
            Self {
                duration,
                fail_from: None,
                probes: AtomicUsize::new(0),
                frames: AtomicUsize::new(0),
            }
        }

        fn broken(duration: f64) -> Self {
            Self::failing_from(duration, 0.0)
        }

        fn failing_from(duration: f64, seconds: f64) -> Self {
            Self {
                fail_from: Some(seconds),
                ..Self::new(duration)
            }
        }
    }

    #[async_trait]
    impl MediaDecoder for StillDecoder {
        async fn probe(&self, path: &Path) -> Result<VideoMeta> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            Ok(VideoMeta {
                path: path.to_path_buf(),
                total_duration: self.duration,
                frame_rate: 25.0,
                frame_size: (320, 180),
                filename: path.file_name().unwrap().to_string_lossy().to_string(),
            })
        }

        async fn frame_at(&self, _path: &Path, seconds: f64) -> Result<RgbImage> {
            if self.fail_from.is_some_and(|from| seconds >= from) {
                return Err(VidsumError::Decode("corrupt stream".into()));
            }
            self.frames.fetch_add(1, Ordering::SeqCst);
            Ok(RgbImage::new(8, 8))
        }
    }

    struct Fixture {
        dir: TempDir,
        video: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let video = dir.path().join("demo.mp4");
            std::fs::write(&video, b"not really a video").unwrap();
            Self { dir, video }
        }

        fn settings(&self) -> Settings {
            let mut settings = Settings::default();
            settings.general.output_dir = self.dir.path().join("out").to_string_lossy().to_string();
            settings
        }

        fn orchestrator(
            &self,
            decoder: Arc<StillDecoder>,
            model: Arc<ScriptedModel>,
        ) -> Orchestrator {
            Orchestrator::with_components(self.settings(), Prompts::default(), decoder, model)
        }

        fn artifact(&self) -> PathBuf {
            self.dir.path().join("out").join("demo_summary.json")
        }
    }

    fn never_asked(_: &ExistingRun) -> RunDecision {
        panic!("decision should not be requested")
    }

    fn chunk_json(summary: &RunSummary, index: u32) -> String {
        let chunk = summary.chunks.iter().find(|c| c.chunk_index == index).unwrap();
        serde_json::to_string(chunk).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_run_writes_all_chunks() {
        let fx = Fixture::new();
        let model = Arc::new(ScriptedModel::new());
        let orch = fx.orchestrator(Arc::new(StillDecoder::new(65.0)), model.clone());

        let outcome = orch
            .process_video(&fx.video, false, None, never_asked)
            .await
            .unwrap();

        assert_eq!(outcome.mode, RunMode::Fresh);
        assert_eq!(outcome.path, fx.artifact());
        assert_eq!(outcome.attempted, 3);
        assert_eq!(
            model.calls(),
            vec!["00:00 - 00:30", "00:30 - 01:00", "01:00 - 01:05"]
        );

        let saved = RunStateStore::load(&fx.artifact()).unwrap();
        assert_eq!(saved.video_name, "demo.mp4");
        assert_eq!(saved.total_chunk_count, 3);
        let indices: Vec<u32> = saved.chunks.iter().map(|c| c.chunk_index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert_eq!(saved.chunks[2].summary_text, "Summary of 01:00 - 01:05");
        assert!(saved.is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_run_paces_between_chunks_only() {
        let fx = Fixture::new();
        let orch = fx.orchestrator(
            Arc::new(StillDecoder::new(90.0)),
            Arc::new(ScriptedModel::new()),
        );

        let start = tokio::time::Instant::now();
        orch.process_video(&fx.video, false, None, never_asked)
            .await
            .unwrap();
        let elapsed = start.elapsed();

        // Three chunks, two 2s gaps.
        assert!(elapsed >= Duration::from_secs(4) && elapsed < Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_chunk_is_still_paced() {
        let fx = Fixture::new();
        let model = ScriptedModel::new()
            .script("00:00 - 00:30", vec![Err(InferenceError::Other("boom".into()))]);
        let orch = fx.orchestrator(Arc::new(StillDecoder::new(60.0)), Arc::new(model));

        let start = tokio::time::Instant::now();
        let outcome = orch
            .process_video(&fx.video, false, None, never_asked)
            .await
            .unwrap();
        let elapsed = start.elapsed();

        assert_eq!(outcome.failed_count(), 1);
        assert!(elapsed >= Duration::from_secs(2) && elapsed < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_inference_failure_is_recorded_and_run_continues() {
        let fx = Fixture::new();
        let model = ScriptedModel::new().script(
            "00:30 - 01:00",
            vec![Err(InferenceError::Other("server error".into()))],
        );
        let orch = fx.orchestrator(Arc::new(StillDecoder::new(90.0)), Arc::new(model));

        let outcome = orch
            .process_video(&fx.video, false, None, never_asked)
            .await
            .unwrap();

        let failed = &outcome.summary.chunks[1];
        assert_eq!(failed.status, Some(ChunkStatus::Failed));
        assert_eq!(failed.summary_text, "Error processing chunk: server error");
        assert_eq!(outcome.failed_count(), 1);
        assert_eq!(outcome.summary.chunks[2].status, Some(ChunkStatus::Success));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_then_success_is_stored_as_success() {
        let fx = Fixture::new();
        let model = Arc::new(ScriptedModel::new().script(
            "00:00 - 00:30",
            vec![
                Err(InferenceError::RateLimited("429".into())),
                Ok("Recovered summary".into()),
            ],
        ));
        let orch = fx.orchestrator(Arc::new(StillDecoder::new(30.0)), model.clone());

        let start = tokio::time::Instant::now();
        let outcome = orch
            .process_video(&fx.video, false, None, never_asked)
            .await
            .unwrap();

        assert!(start.elapsed() >= Duration::from_secs(60));
        assert_eq!(model.calls().len(), 2);
        assert_eq!(outcome.summary.chunks[0].summary_text, "Recovered summary");
        assert!(outcome.summary.is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_twice_fails_without_third_attempt() {
        let fx = Fixture::new();
        let model = Arc::new(ScriptedModel::new().script(
            "00:00 - 00:30",
            vec![
                Err(InferenceError::RateLimited("429".into())),
                Err(InferenceError::RateLimited("429 again".into())),
                Ok("never reached".into()),
            ],
        ));
        let orch = fx.orchestrator(Arc::new(StillDecoder::new(30.0)), model.clone());

        let outcome = orch
            .process_video(&fx.video, false, None, never_asked)
            .await
            .unwrap();

        assert_eq!(model.calls().len(), 2);
        let chunk = &outcome.summary.chunks[0];
        assert!(chunk.is_failed());
        assert!(chunk.summary_text.starts_with("Error processing chunk: rate limited"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_response_is_truncated() {
        let fx = Fixture::new();
        let model = ScriptedModel::new().script("00:00 - 00:20", vec![Ok("w".repeat(1600))]);
        let orch = fx.orchestrator(Arc::new(StillDecoder::new(20.0)), Arc::new(model));

        orch.process_video(&fx.video, false, None, never_asked)
            .await
            .unwrap();

        let saved = RunStateStore::load(&fx.artifact()).unwrap();
        let chunk = &saved.chunks[0];
        assert_eq!(chunk.summary_length, 1500);
        assert_eq!(chunk.summary_text.chars().count(), 1500);
        assert!(chunk.summary_text.ends_with("..."));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_only_reprocesses_failed_chunks() {
        let fx = Fixture::new();
        let first = ScriptedModel::new()
            .script("00:30 - 01:00", vec![Err(InferenceError::Other("timeout".into()))])
            .script("02:00 - 02:30", vec![Err(InferenceError::Other("timeout".into()))]);
        fx.orchestrator(Arc::new(StillDecoder::new(150.0)), Arc::new(first))
            .process_video(&fx.video, false, None, never_asked)
            .await
            .unwrap();

        let before = RunStateStore::load(&fx.artifact()).unwrap();
        assert_eq!(before.failed_chunks().into_iter().collect::<Vec<_>>(), vec![2, 5]);

        let second = Arc::new(ScriptedModel::new());
        let outcome = fx
            .orchestrator(Arc::new(StillDecoder::new(150.0)), second.clone())
            .process_video(&fx.video, false, None, |existing| {
                assert_eq!(existing.failed.len(), 2);
                RunDecision::Resume
            })
            .await
            .unwrap();

        assert_eq!(outcome.mode, RunMode::Resumed);
        assert_eq!(outcome.attempted, 2);
        assert_eq!(second.calls(), vec!["00:30 - 01:00", "02:00 - 02:30"]);

        let after = RunStateStore::load(&fx.artifact()).unwrap();
        for index in [1, 3, 4] {
            assert_eq!(chunk_json(&before, index), chunk_json(&after, index));
        }
        assert!(after.is_complete());
        assert_eq!(after.chunks[1].summary_text, "Summary of 00:30 - 01:00");
        let indices: Vec<u32> = after.chunks.iter().map(|c| c.chunk_index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_waits_before_each_attempt() {
        let fx = Fixture::new();
        let first = ScriptedModel::new()
            .script("00:00 - 00:30", vec![Err(InferenceError::Other("boom".into()))]);
        fx.orchestrator(Arc::new(StillDecoder::new(30.0)), Arc::new(first))
            .process_video(&fx.video, false, None, never_asked)
            .await
            .unwrap();

        let orch = fx.orchestrator(
            Arc::new(StillDecoder::new(30.0)),
            Arc::new(ScriptedModel::new()),
        );
        let start = tokio::time::Instant::now();
        orch.process_video(&fx.video, false, None, |_| RunDecision::Resume)
            .await
            .unwrap();

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(3) && elapsed < Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_backs_off_on_rate_limit() {
        let fx = Fixture::new();
        let first = ScriptedModel::new()
            .script("00:30 - 01:00", vec![Err(InferenceError::Other("boom".into()))]);
        fx.orchestrator(Arc::new(StillDecoder::new(90.0)), Arc::new(first))
            .process_video(&fx.video, false, None, never_asked)
            .await
            .unwrap();

        let model = Arc::new(ScriptedModel::new().script(
            "00:30 - 01:00",
            vec![
                Err(InferenceError::RateLimited("429".into())),
                Ok("Recovered".into()),
            ],
        ));
        let orch = fx.orchestrator(Arc::new(StillDecoder::new(90.0)), model.clone());
        let start = tokio::time::Instant::now();
        let outcome = orch
            .process_video(&fx.video, false, None, |_| RunDecision::Resume)
            .await
            .unwrap();

        assert!(start.elapsed() >= Duration::from_secs(63));
        assert_eq!(model.calls(), vec!["00:30 - 01:00", "00:30 - 01:00"]);
        assert_eq!(outcome.attempted, 1);
        let chunk = &outcome.summary.chunks[1];
        assert_eq!(chunk.status, Some(ChunkStatus::Success));
        assert_eq!(chunk.summary_text, "Recovered");
        assert!(outcome.summary.is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reuse_makes_no_calls_and_no_write() {
        let fx = Fixture::new();
        fx.orchestrator(
            Arc::new(StillDecoder::new(60.0)),
            Arc::new(ScriptedModel::new()),
        )
        .process_video(&fx.video, false, None, never_asked)
        .await
        .unwrap();
        let bytes = std::fs::read(fx.artifact()).unwrap();

        let decoder = Arc::new(StillDecoder::new(60.0));
        let model = Arc::new(ScriptedModel::new());
        let orch = fx.orchestrator(decoder.clone(), model.clone());

        for _ in 0..2 {
            let outcome = orch
                .process_video(&fx.video, false, None, |_| RunDecision::Reuse)
                .await
                .unwrap();
            assert_eq!(outcome.mode, RunMode::Reused);
            assert_eq!(outcome.attempted, 0);
        }

        assert!(model.calls().is_empty());
        assert_eq!(decoder.probes.load(Ordering::SeqCst), 0);
        assert_eq!(std::fs::read(fx.artifact()).unwrap(), bytes);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_without_failures_degrades_to_reuse() {
        let fx = Fixture::new();
        fx.orchestrator(
            Arc::new(StillDecoder::new(30.0)),
            Arc::new(ScriptedModel::new()),
        )
        .process_video(&fx.video, false, None, never_asked)
        .await
        .unwrap();

        let model = Arc::new(ScriptedModel::new());
        let outcome = fx
            .orchestrator(Arc::new(StillDecoder::new(30.0)), model.clone())
            .process_video(&fx.video, false, None, |_| RunDecision::Resume)
            .await
            .unwrap();

        assert_eq!(outcome.mode, RunMode::Reused);
        assert!(model.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_reprocess_and_force() {
        let fx = Fixture::new();
        fx.orchestrator(
            Arc::new(StillDecoder::new(30.0)),
            Arc::new(ScriptedModel::new()),
        )
        .process_video(&fx.video, false, None, never_asked)
        .await
        .unwrap();

        let model = Arc::new(ScriptedModel::new());
        let orch = fx.orchestrator(Arc::new(StillDecoder::new(30.0)), model.clone());

        let outcome = orch
            .process_video(&fx.video, false, None, |_| RunDecision::FullReprocess)
            .await
            .unwrap();
        assert_eq!(outcome.mode, RunMode::Fresh);

        let outcome = orch
            .process_video(&fx.video, true, None, never_asked)
            .await
            .unwrap();
        assert_eq!(outcome.mode, RunMode::Fresh);
        assert_eq!(model.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_layout_mismatch_blocks_resume() {
        let fx = Fixture::new();
        let first = ScriptedModel::new()
            .script("00:00 - 00:30", vec![Err(InferenceError::Other("boom".into()))]);
        fx.orchestrator(Arc::new(StillDecoder::new(60.0)), Arc::new(first))
            .process_video(&fx.video, false, None, never_asked)
            .await
            .unwrap();

        // The media now reports a different duration.
        let model = Arc::new(ScriptedModel::new());
        let result = fx
            .orchestrator(Arc::new(StillDecoder::new(95.0)), model.clone())
            .process_video(&fx.video, false, None, |_| RunDecision::Resume)
            .await;

        assert!(matches!(result, Err(VidsumError::LayoutMismatch(_))));
        assert!(model.calls().is_empty());
    }

    #[test]
    fn test_check_layout_rejects_changed_chunk_length() {
        let summary = crate::store::fixtures::summary(90.0, 30.0, &[1]);
        let chunks = segment(90.0, 30.0).unwrap();
        assert!(check_layout(&summary, &chunks, 30.0).is_ok());
        assert!(matches!(
            check_layout(&summary, &chunks, 45.0),
            Err(VidsumError::LayoutMismatch(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_media_fails_before_any_call() {
        let fx = Fixture::new();
        let model = Arc::new(ScriptedModel::new());
        let orch = fx.orchestrator(Arc::new(StillDecoder::new(30.0)), model.clone());

        let result = orch
            .process_video(&fx.dir.path().join("gone.mp4"), false, None, never_asked)
            .await;

        assert!(matches!(result, Err(VidsumError::MediaNotFound(_))));
        assert!(model.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreadable_frames_fail_the_chunk_not_the_run() {
        let fx = Fixture::new();
        let model = Arc::new(ScriptedModel::new());
        let orch = fx.orchestrator(Arc::new(StillDecoder::broken(30.0)), model.clone());

        let outcome = orch
            .process_video(&fx.video, false, None, never_asked)
            .await
            .unwrap();

        assert!(model.calls().is_empty());
        assert_eq!(outcome.failed_count(), 1);
        let chunk = &outcome.summary.chunks[0];
        assert_eq!(chunk.status, Some(ChunkStatus::Failed));
        assert!(chunk.summary_text.contains("corrupt stream"));
        assert!(fx.artifact().exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_undecodable_tail_keeps_earlier_chunks() {
        let fx = Fixture::new();
        let model = Arc::new(ScriptedModel::new());
        let decoder = Arc::new(StillDecoder::failing_from(60.02, 60.0));
        let orch = fx.orchestrator(decoder, model.clone());

        let outcome = orch
            .process_video(&fx.video, false, None, never_asked)
            .await
            .unwrap();

        assert_eq!(model.calls(), vec!["00:00 - 00:30", "00:30 - 01:00"]);
        assert_eq!(outcome.summary.total_chunk_count, 3);
        assert_eq!(
            outcome.summary.failed_chunks().into_iter().collect::<Vec<_>>(),
            vec![3]
        );
        assert_eq!(outcome.summary.chunks[0].summary_text, "Summary of 00:00 - 00:30");

        let saved = RunStateStore::load(&fx.artifact()).unwrap();
        assert_eq!(saved, outcome.summary);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_duration_saves_empty_summary() {
        let fx = Fixture::new();
        let model = Arc::new(ScriptedModel::new());
        let orch = fx.orchestrator(Arc::new(StillDecoder::new(0.0)), model.clone());

        let outcome = orch
            .process_video(&fx.video, false, None, never_asked)
            .await
            .unwrap();

        assert!(outcome.summary.chunks.is_empty());
        assert_eq!(outcome.summary.total_chunk_count, 0);
        assert!(fx.artifact().exists());
        assert!(model.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_output_override_and_progress_events() {
        let fx = Fixture::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let decoder = Arc::new(StillDecoder::new(35.0));
        let orch = fx
            .orchestrator(decoder.clone(), Arc::new(ScriptedModel::new()))
            .with_progress(Arc::new(move |e| sink.lock().unwrap().push(e)));

        let target = fx.dir.path().join("custom").join("report.json");
        let outcome = orch
            .process_video(&fx.video, false, Some(&target), never_asked)
            .await
            .unwrap();

        assert_eq!(outcome.path, target);
        assert!(target.exists());
        // Three frames for the 30s chunk, three for the 5s tail.
        assert_eq!(decoder.frames.load(Ordering::SeqCst), 6);

        let events = events.lock().unwrap();
        assert_eq!(
            events[0],
            ProgressEvent::Planned {
                mode: RunMode::Fresh,
                chunks: 2
            }
        );
        assert_eq!(
            events[1],
            ProgressEvent::ChunkStarted {
                index: 1,
                label: "00:00 - 00:30".into()
            }
        );
        assert_eq!(
            events.last(),
            Some(&ProgressEvent::ChunkFinished {
                index: 2,
                success: true
            })
        );
    }
}
