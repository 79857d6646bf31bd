//! Generation pipeline orchestrator.
//!
//! Owns the job state machine and the fatal-vs-recoverable decision for
//! every component outcome. Components return typed errors; ledger
//! compensation happens only here.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{info, warn};

use sreel_captions::{CaptionOutcome, CaptionSynthesizer};
use sreel_ledger::CreditLedger;
use sreel_media::{check_ffmpeg, check_ffprobe, probe_duration, probe_video, FfmpegRunner};
use sreel_models::{
    resolve_motion, CostBreakdown, DurationPlan, EncodingConfig, GenerationCostCalculator, Job,
    JobStage, Segment,
};
use sreel_storage::{final_video_key, StorageClient};

use crate::config::WorkerConfig;
use crate::credits::{
    charge_generation, ensure_balance, refund_caption_addon, refund_failed_segments,
};
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::request::{min_viable_segments, GenerationRequest};

/// Shared collaborators for running generation jobs.
pub struct PipelineContext {
    pub config: WorkerConfig,
    pub storage: StorageClient,
    pub ledger: Arc<dyn CreditLedger>,
    pub captions: CaptionSynthesizer,
    pub encoding: EncodingConfig,
    /// Caps concurrent FFmpeg processes across all clips of a job.
    ffmpeg_semaphore: Arc<Semaphore>,
}

impl PipelineContext {
    /// Create a context from the environment.
    pub async fn new(config: WorkerConfig) -> WorkerResult<Self> {
        check_ffmpeg()?;
        check_ffprobe()?;

        let storage = StorageClient::from_env().await?;
        let ledger = Arc::new(sreel_ledger::HttpLedger::from_env()?);
        let captions = CaptionSynthesizer::from_env();
        let ffmpeg_semaphore = Arc::new(Semaphore::new(config.max_ffmpeg_processes));

        Ok(Self {
            config,
            storage,
            ledger,
            captions,
            encoding: EncodingConfig::default(),
            ffmpeg_semaphore,
        })
    }

    /// Context with injected collaborators.
    pub fn with_collaborators(
        config: WorkerConfig,
        storage: StorageClient,
        ledger: Arc<dyn CreditLedger>,
        captions: CaptionSynthesizer,
    ) -> Self {
        let ffmpeg_semaphore = Arc::new(Semaphore::new(config.max_ffmpeg_processes));
        Self {
            config,
            storage,
            ledger,
            captions,
            encoding: EncodingConfig::default(),
            ffmpeg_semaphore,
        }
    }

    fn runner(&self, cancel_rx: &watch::Receiver<bool>) -> FfmpegRunner {
        FfmpegRunner::new()
            .with_timeout(self.config.ffmpeg_timeout.as_secs())
            .with_cancel(cancel_rx.clone())
    }

    /// Run one generation job end to end.
    ///
    /// The job's working directory is removed on every exit path, including
    /// cancellation. On failure the job carries a short user-facing reason.
    pub async fn run_job(
        &self,
        job: &mut Job,
        request: &GenerationRequest,
        cancel_rx: watch::Receiver<bool>,
    ) -> WorkerResult<()> {
        let logger = JobLogger::new(&job.id, "generate_video");
        logger.log_start(&format!(
            "{} segments, aspect {}, preset {}",
            request.segments.len(),
            job.aspect,
            job.effect_preset
        ));

        let work_dir = PathBuf::from(&self.config.work_dir).join(job.id.as_str());
        tokio::fs::create_dir_all(&work_dir).await?;

        let result = self.execute(job, request, &work_dir, &cancel_rx, &logger).await;

        if let Err(e) = tokio::fs::remove_dir_all(&work_dir).await {
            warn!("Failed to remove work dir {}: {}", work_dir.display(), e);
        }

        match &result {
            Ok(()) => logger.log_completion(job.final_url.as_deref().unwrap_or("")),
            Err(e) => {
                logger.log_error(&e.to_string());
                job.fail(e.user_message());
            }
        }
        result
    }

    async fn execute(
        &self,
        job: &mut Job,
        request: &GenerationRequest,
        work_dir: &Path,
        cancel_rx: &watch::Receiver<bool>,
        logger: &JobLogger,
    ) -> WorkerResult<()> {
        let segment_count = request.segments.len() as u32;

        // Precondition: charge nothing yet, but reject up front if even the
        // minimum-duration cost is unaffordable.
        let estimate = GenerationCostCalculator::new(segment_count, 0.0)
            .with_captions(request.wants_captions())
            .calculate();
        ensure_balance(self.ledger.as_ref(), &request.user_id, &estimate).await?;

        check_cancelled(cancel_rx)?;
        job.advance(JobStage::GeneratingAudio);
        job.set_progress(5);

        let audio_path = work_dir.join("narration.mp3");
        self.storage
            .download_url(&request.narration_audio_url, &audio_path)
            .await?;
        let audio_secs = probe_duration(&audio_path).await?;
        logger.log_progress(&format!("Narration audio: {audio_secs:.2}s"));

        let breakdown = GenerationCostCalculator::new(segment_count, audio_secs)
            .with_captions(request.wants_captions())
            .calculate();
        charge_generation(self.ledger.as_ref(), &request.user_id, &breakdown).await?;

        // Upstream generation failures arrive recorded on the request.
        let failed = request.failed_segment_indices();
        refund_failed_segments(self.ledger.as_ref(), &request.user_id, &breakdown, &failed).await?;
        let viable: Vec<usize> = (0..request.segments.len())
            .filter(|i| !failed.contains(i))
            .collect();
        let required = min_viable_segments(request.segments.len());
        if viable.len() < required {
            return Err(WorkerError::TooFewSegments {
                viable: viable.len(),
                total: request.segments.len(),
                required,
            });
        }

        check_cancelled(cancel_rx)?;
        job.advance(JobStage::RenderingVisuals);
        job.set_progress(15);

        let lines: Vec<&str> = viable
            .iter()
            .map(|&i| request.segments[i].narration.as_str())
            .collect();
        let plan = DurationPlan::allocate(&lines, audio_secs);

        let clips = self
            .render_segments(job, request, &viable, &plan, work_dir, cancel_rx)
            .await?;

        check_cancelled(cancel_rx)?;
        let silent_path = work_dir.join("silent.mp4");
        let runner = self.runner(cancel_rx);
        sreel_media::concat_clips(&clips, &silent_path, &runner).await?;

        let merged_path = work_dir.join("merged.mp4");
        sreel_media::merge_narration(&silent_path, &audio_path, &merged_path, &self.encoding, &runner)
            .await?;
        let merged_info = probe_video(&merged_path).await?;
        logger.log_progress(&format!(
            "Merged video: {:.2}s {}x{}",
            merged_info.duration, merged_info.width, merged_info.height
        ));
        job.set_progress(75);

        let publish_path = if let Some(style_id) = job.caption_style.clone() {
            check_cancelled(cancel_rx)?;
            job.advance(JobStage::CompositingCaptions);

            let script_path = work_dir.join("captions.ass");
            let burned_path = work_dir.join("captioned.mp4");
            let outcome = self
                .captions
                .synthesize(&audio_path, &style_id, job.aspect, &script_path)
                .await;

            let burn_attempt = match outcome {
                CaptionOutcome::Script { path, group_count } => {
                    logger.log_progress(&format!("Caption script ready ({group_count} groups)"));
                    match sreel_media::burn_captions(
                        &merged_path,
                        &path,
                        &burned_path,
                        &self.encoding,
                        &runner,
                    )
                    .await
                    {
                        Ok(()) => Ok(burned_path.clone()),
                        Err(e) => Err(e.to_string()),
                    }
                }
                CaptionOutcome::Unavailable { reason } => Err(reason),
            };

            settle_caption_stage(
                self.ledger.as_ref(),
                &request.user_id,
                &breakdown,
                &merged_path,
                burn_attempt,
            )
            .await
        } else {
            merged_path.clone()
        };
        job.set_progress(85);

        check_cancelled(cancel_rx)?;
        job.advance(JobStage::Uploading);

        let final_path = work_dir.join("final.mp4");
        sreel_media::move_file(&publish_path, &final_path).await?;

        let key = final_video_key(&request.user_id, job.id.as_str());
        let url = self
            .storage
            .upload_file(&final_path, &key, "video/mp4")
            .await?;

        job.complete(url);
        Ok(())
    }

    /// Download images and render per-segment clips in parallel.
    ///
    /// Rendering order is unconstrained but the returned clip list is in
    /// strict segment order for the concatenation step.
    async fn render_segments(
        &self,
        job: &mut Job,
        request: &GenerationRequest,
        viable: &[usize],
        plan: &DurationPlan,
        work_dir: &Path,
        cancel_rx: &watch::Receiver<bool>,
    ) -> WorkerResult<Vec<PathBuf>> {
        let seg_dir = work_dir.join("segments");
        tokio::fs::create_dir_all(&seg_dir).await?;

        let mut staged: Vec<Segment> = Vec::with_capacity(viable.len());
        for &index in viable {
            let url = request.segments[index].image_url.as_ref().ok_or_else(|| {
                WorkerError::download_failed(format!("segment {index} has no image"))
            })?;
            let image_path = seg_dir.join(format!("{index:03}.png"));
            self.storage.download_url(url, &image_path).await?;
            staged.push(Segment::new(
                index,
                &request.segments[index].narration,
                image_path.to_string_lossy(),
            ));
        }

        let mut tasks: JoinSet<(usize, WorkerResult<PathBuf>)> = JoinSet::new();
        for (position, segment) in staged.iter().enumerate() {
            let duration = plan.render_duration(position).ok_or_else(|| {
                WorkerError::render_failed(format!(
                    "no duration allocated for segment {}",
                    segment.order_index
                ))
            })?;
            let motion = resolve_motion(&job.effect_preset, segment.order_index);
            let frame_size = job.aspect.frame_size();
            let encoding = self.encoding.clone();
            let image_path = PathBuf::from(&segment.image_path);
            let clip_path = seg_dir.join(format!("{:03}.mp4", segment.order_index));
            let semaphore = Arc::clone(&self.ffmpeg_semaphore);
            let runner = self.runner(cancel_rx);

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (position, Err(WorkerError::Cancelled)),
                };
                let result = sreel_media::render_clip(
                    &image_path,
                    &clip_path,
                    duration,
                    motion,
                    frame_size,
                    &encoding,
                    &runner,
                )
                .await
                .map(|()| clip_path)
                .map_err(WorkerError::from);
                (position, result)
            });
        }

        let mut clips: Vec<Option<PathBuf>> = vec![None; viable.len()];
        let mut done = 0usize;
        while let Some(joined) = tasks.join_next().await {
            let (position, result) = joined
                .map_err(|e| WorkerError::render_failed(format!("render task panicked: {e}")))?;
            clips[position] = Some(result?);
            done += 1;
            job.set_progress(render_progress(done, viable.len()));
        }

        info!("Rendered {} clips", clips.len());
        Ok(clips.into_iter().flatten().collect())
    }
}

/// Decide which video to publish after the caption stage.
///
/// A failed burn attempt (or unavailable captions) refunds exactly the
/// caption portion and falls back to the uncaptioned video. Caption failure
/// never fails the job.
pub async fn settle_caption_stage(
    ledger: &dyn CreditLedger,
    user_id: &str,
    breakdown: &CostBreakdown,
    merged: &Path,
    burn_attempt: Result<PathBuf, String>,
) -> PathBuf {
    match burn_attempt {
        Ok(burned) => burned,
        Err(reason) => {
            warn!("Caption stage failed, publishing uncaptioned video: {reason}");
            refund_caption_addon(ledger, user_id, breakdown, &reason).await;
            merged.to_path_buf()
        }
    }
}

/// Map completed-clip count into the rendering stage's progress band
/// (15 at stage entry, 60 once every clip is done).
fn render_progress(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 60;
    }
    (15 + 45 * done / total) as u8
}

fn check_cancelled(cancel_rx: &watch::Receiver<bool>) -> WorkerResult<()> {
    if *cancel_rx.borrow() {
        return Err(WorkerError::Cancelled);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sreel_ledger::InMemoryLedger;
    use sreel_models::AspectRatio;
    use sreel_storage::StorageConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::request::SegmentSource;

    async fn test_context(work_dir: &Path, ledger: Arc<dyn CreditLedger>) -> PipelineContext {
        let storage = StorageClient::new(StorageConfig {
            endpoint_url: "http://127.0.0.1:9000".to_string(),
            access_key_id: "test".to_string(),
            secret_access_key: "test".to_string(),
            bucket_name: "sreel-test".to_string(),
            region: "auto".to_string(),
            public_base_url: "https://media.example.com".to_string(),
        })
        .await
        .unwrap();
        let config = WorkerConfig {
            work_dir: work_dir.to_string_lossy().into_owned(),
            ..WorkerConfig::default()
        };
        PipelineContext::with_collaborators(config, storage, ledger, CaptionSynthesizer::from_env())
    }

    fn four_segment_request(failed_index: Option<usize>) -> GenerationRequest {
        let segments = (0..4)
            .map(|i| {
                let ok = Some(i) != failed_index;
                SegmentSource {
                    narration: format!("Narration line number {i}."),
                    image_url: ok.then(|| format!("https://cdn.example.com/{i}.png")),
                    generation_error: (!ok).then(|| "image model error".to_string()),
                }
            })
            .collect();
        GenerationRequest {
            user_id: "u1".to_string(),
            title: "Test".to_string(),
            aspect: AspectRatio::Portrait,
            effect_preset: "ken_burns".to_string(),
            caption_style: Some("impact".to_string()),
            narration_audio_url: "https://cdn.example.com/narration.mp3".to_string(),
            segments,
        }
    }

    fn breakdown_for(request: &GenerationRequest, audio_secs: f64) -> CostBreakdown {
        GenerationCostCalculator::new(request.segments.len() as u32, audio_secs)
            .with_captions(request.wants_captions())
            .calculate()
    }

    #[tokio::test]
    async fn test_burn_failure_refunds_caption_portion_and_job_completes() {
        let request = four_segment_request(None);
        let breakdown = breakdown_for(&request, 90.0);
        let ledger = InMemoryLedger::with_balance("u1", 100);
        charge_generation(&ledger, "u1", &breakdown).await.unwrap();
        let after_charge = ledger.balance("u1").await.unwrap();

        let merged = PathBuf::from("/work/job/merged.mp4");
        let publish = settle_caption_stage(
            &ledger,
            "u1",
            &breakdown,
            &merged,
            Err("ffmpeg exited with code 1".to_string()),
        )
        .await;

        // Falls back to the uncaptioned video and refunds only the caption
        // addon, not the audio or segment charges.
        assert_eq!(publish, merged);
        assert_eq!(
            ledger.balance("u1").await.unwrap(),
            after_charge + i64::from(breakdown.caption_cost)
        );

        let mut job = Job::new("u1", "Test", AspectRatio::Portrait, "ken_burns", None);
        job.complete("https://cdn.example.com/final.mp4");
        assert_eq!(job.stage, JobStage::Completed);
    }

    #[tokio::test]
    async fn test_burn_success_publishes_captioned_video() {
        let request = four_segment_request(None);
        let breakdown = breakdown_for(&request, 90.0);
        let ledger = InMemoryLedger::with_balance("u1", 100);

        let merged = PathBuf::from("/work/job/merged.mp4");
        let burned = PathBuf::from("/work/job/captioned.mp4");
        let publish =
            settle_caption_stage(&ledger, "u1", &breakdown, &merged, Ok(burned.clone())).await;

        assert_eq!(publish, burned);
        assert_eq!(ledger.balance("u1").await.unwrap(), 100);
    }

    #[tokio::test]
    async fn test_one_failed_segment_refunds_one_segment_cost() {
        let request = four_segment_request(Some(2));
        let breakdown = breakdown_for(&request, 90.0);
        let ledger = InMemoryLedger::with_balance("u1", 200);

        charge_generation(&ledger, "u1", &breakdown).await.unwrap();
        let failed = request.failed_segment_indices();
        assert_eq!(failed, vec![2]);

        refund_failed_segments(&ledger, "u1", &breakdown, &failed)
            .await
            .unwrap();

        // Three segments' worth of cost remains charged.
        assert_eq!(
            ledger.balance("u1").await.unwrap(),
            200 - i64::from(breakdown.total) + i64::from(breakdown.per_segment)
        );

        // Three of four survivors clear the proceed threshold.
        assert!(4 - failed.len() >= min_viable_segments(4));
    }

    #[tokio::test]
    async fn test_insufficient_balance_rejected_before_any_work() {
        let request = four_segment_request(None);
        let estimate = breakdown_for(&request, 0.0);
        let ledger = InMemoryLedger::with_balance("u1", 3);

        let err = ensure_balance(&ledger, "u1", &estimate).await.unwrap_err();
        assert!(matches!(err, WorkerError::InsufficientCredits { .. }));
        // Nothing was charged.
        assert_eq!(ledger.balance("u1").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_cancelled_job_fails_and_removes_workdir() {
        let base = tempfile::tempdir().unwrap();
        let ledger: Arc<dyn CreditLedger> = Arc::new(InMemoryLedger::with_balance("u1", 500));
        let ctx = test_context(base.path(), Arc::clone(&ledger)).await;
        let request = four_segment_request(None);
        let mut job = Job::new(
            "u1",
            "Test",
            AspectRatio::Portrait,
            "ken_burns",
            Some("impact".to_string()),
        );

        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let err = ctx.run_job(&mut job, &request, rx).await.unwrap_err();
        assert!(matches!(err, WorkerError::Cancelled));
        assert_eq!(job.stage, JobStage::Failed);
        assert_eq!(job.error_message.as_deref(), Some("Generation was cancelled"));

        // The per-job working directory is gone and nothing was charged.
        assert!(!base.path().join(job.id.as_str()).exists());
        assert_eq!(ledger.balance("u1").await.unwrap(), 500);
    }

    #[tokio::test]
    async fn test_failed_narration_download_fails_job_and_removes_workdir() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/narration.mp3"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let base = tempfile::tempdir().unwrap();
        let ledger: Arc<dyn CreditLedger> = Arc::new(InMemoryLedger::with_balance("u1", 500));
        let ctx = test_context(base.path(), Arc::clone(&ledger)).await;
        let mut request = four_segment_request(None);
        request.narration_audio_url = format!("{}/narration.mp3", server.uri());
        let mut job = Job::new("u1", "Test", AspectRatio::Portrait, "ken_burns", None);

        let (_tx, rx) = watch::channel(false);
        let err = ctx.run_job(&mut job, &request, rx).await.unwrap_err();
        assert!(matches!(err, WorkerError::Storage(_)));
        assert_eq!(job.stage, JobStage::Failed);
        assert!(job.error_message.is_some());

        // Work directory removed on the error path; the precondition passed
        // but the post-probe charge was never reached.
        assert!(!base.path().join(job.id.as_str()).exists());
        assert_eq!(ledger.balance("u1").await.unwrap(), 500);
    }

    #[test]
    fn test_render_progress_spans_stage_band() {
        assert_eq!(render_progress(1, 4), 26);
        assert_eq!(render_progress(2, 4), 37);
        assert_eq!(render_progress(4, 4), 60);
    }

    #[test]
    fn test_cancel_check() {
        let (tx, rx) = watch::channel(false);
        assert!(check_cancelled(&rx).is_ok());
        tx.send(true).unwrap();
        assert!(matches!(check_cancelled(&rx), Err(WorkerError::Cancelled)));
    }
}
