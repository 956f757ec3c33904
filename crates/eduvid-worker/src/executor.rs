//! Background job executor.
//!
//! [`JobExecutor::submit`] returns as soon as the job is queued; the pipeline
//! runs on a Tokio task and its outcome is reported to a [`JobTracker`].
//! Cancellation never interrupts a running job. A job cancelled while queued
//! is skipped; a job cancelled while running has its published files deleted
//! and is reported as cancelled.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use eduvid_media::fs_utils::remove_if_exists;
use eduvid_models::{JobId, JobState, VideoArtifact, VideoJob};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::{WorkerError, WorkerResult};
use crate::pipeline::VideoPipeline;

/// State change reported to the tracker.
#[derive(Debug, Clone, PartialEq)]
pub enum JobUpdate {
    Processing,
    Completed(VideoArtifact),
    /// Bounded, human-readable failure message
    Failed(String),
    Cancelled,
}

impl JobUpdate {
    pub fn state(&self) -> JobState {
        match self {
            JobUpdate::Processing => JobState::Processing,
            JobUpdate::Completed(_) => JobState::Completed,
            JobUpdate::Failed(_) => JobState::Failed,
            JobUpdate::Cancelled => JobState::Cancelled,
        }
    }
}

/// External record keeper for job state.
#[async_trait]
pub trait JobTracker: Send + Sync {
    async fn update(&self, job_id: &JobId, update: JobUpdate);
}

/// Something that turns a job into published files.
#[async_trait]
pub trait VideoProducer: Send + Sync {
    async fn produce(&self, job_id: &JobId, question: &str, script: &str) -> WorkerResult<VideoArtifact>;

    /// Directory the artifact's file names are relative to.
    fn output_dir(&self) -> &Path;
}

#[async_trait]
impl VideoProducer for VideoPipeline {
    async fn produce(&self, job_id: &JobId, question: &str, script: &str) -> WorkerResult<VideoArtifact> {
        VideoPipeline::produce(self, job_id, question, script).await
    }

    fn output_dir(&self) -> &Path {
        VideoPipeline::output_dir(self)
    }
}

/// Queued or running jobs, each with its cancellation flag.
type PendingJobs = Arc<Mutex<HashMap<JobId, bool>>>;

/// Runs video jobs in the background.
pub struct JobExecutor {
    producer: Arc<dyn VideoProducer>,
    tracker: Arc<dyn JobTracker>,
    job_semaphore: Arc<Semaphore>,
    pending: PendingJobs,
}

impl JobExecutor {
    pub fn new(producer: Arc<dyn VideoProducer>, tracker: Arc<dyn JobTracker>, max_concurrent_jobs: usize) -> Self {
        Self {
            producer,
            tracker,
            job_semaphore: Arc::new(Semaphore::new(max_concurrent_jobs.max(1))),
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Queue `job` and return immediately. The handle resolves to the
    /// terminal state that was reported.
    pub fn submit(&self, job: VideoJob) -> JoinHandle<JobState> {
        let producer = Arc::clone(&self.producer);
        let tracker = Arc::clone(&self.tracker);
        let semaphore = Arc::clone(&self.job_semaphore);
        let pending = Arc::clone(&self.pending);

        if let Ok(mut jobs) = pending.lock() {
            jobs.insert(job.job_id.clone(), false);
        }

        info!(job_id = %job.job_id, "Job submitted");
        tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                Self::finish(&pending, &job.job_id);
                let message = WorkerError::job_failed("executor is shut down").user_message();
                let update = JobUpdate::Failed(message);
                tracker.update(&job.job_id, update).await;
                return JobState::Failed;
            };
            Self::execute_job(producer, tracker, pending, job).await
        })
    }

    /// Mark a queued or running job as cancelled so its result is not
    /// published. Returns false for jobs that are unknown or already done.
    pub fn cancel(&self, job_id: &JobId) -> bool {
        let marked = self
            .pending
            .lock()
            .map(|mut jobs| match jobs.get_mut(job_id) {
                Some(flag) => {
                    *flag = true;
                    true
                }
                None => false,
            })
            .unwrap_or(false);

        if marked {
            info!(job_id = %job_id, "Job cancellation requested");
        } else {
            debug!(job_id = %job_id, "Cancellation ignored, job is not pending");
        }
        marked
    }

    /// Stop accepting work; queued jobs report failure.
    pub fn shutdown(&self) {
        self.job_semaphore.close();
    }

    fn is_cancelled(pending: &PendingJobs, job_id: &JobId) -> bool {
        pending
            .lock()
            .map(|jobs| jobs.get(job_id).copied().unwrap_or(false))
            .unwrap_or(false)
    }

    /// Forget `job_id`, returning whether it was cancelled.
    fn finish(pending: &PendingJobs, job_id: &JobId) -> bool {
        pending
            .lock()
            .map(|mut jobs| jobs.remove(job_id).unwrap_or(false))
            .unwrap_or(false)
    }

    async fn execute_job(
        producer: Arc<dyn VideoProducer>,
        tracker: Arc<dyn JobTracker>,
        pending: PendingJobs,
        job: VideoJob,
    ) -> JobState {
        let job_id = job.job_id.clone();

        if Self::is_cancelled(&pending, &job_id) {
            Self::finish(&pending, &job_id);
            info!(job_id = %job_id, "Job cancelled before start");
            tracker.update(&job_id, JobUpdate::Cancelled).await;
            return JobState::Cancelled;
        }

        tracker.update(&job_id, JobUpdate::Processing).await;
        let result = producer.produce(&job_id, &job.question, &job.script).await;
        let was_cancelled = Self::finish(&pending, &job_id);

        let update = match (result, was_cancelled) {
            (Ok(artifact), false) => JobUpdate::Completed(artifact),
            (Ok(artifact), true) => {
                info!(job_id = %job_id, "Job cancelled while running, discarding artifacts");
                for path in artifact.published_paths(producer.output_dir()) {
                    if let Err(e) = remove_if_exists(&path).await {
                        warn!(job_id = %job_id, path = %path.display(), error = %e, "Failed to discard artifact");
                    }
                }
                JobUpdate::Cancelled
            }
            (Err(_), true) => JobUpdate::Cancelled,
            (Err(e), false) => {
                error!(job_id = %job_id, error = %e, "Job failed");
                JobUpdate::Failed(e.user_message())
            }
        };

        let state = update.state();
        tracker.update(&job_id, update).await;
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkerConfig;
    use eduvid_imagery::{FontContext, ImageSourcer};
    use eduvid_media::Narrator;
    use eduvid_models::RenderSettings;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct RecordingTracker {
        updates: Mutex<Vec<(JobId, JobUpdate)>>,
    }

    #[async_trait]
    impl JobTracker for RecordingTracker {
        async fn update(&self, job_id: &JobId, update: JobUpdate) {
            self.updates.lock().unwrap().push((job_id.clone(), update));
        }
    }

    fn offline_pipeline(root: &TempDir) -> Arc<VideoPipeline> {
        let config = WorkerConfig {
            render: RenderSettings::new(180, 320, 24),
            output_dir: root.path().join("out"),
            temp_dir: root.path().join("tmp"),
            ffmpeg_path: "/nonexistent/ffmpeg".to_string(),
            ffprobe_path: "/nonexistent/ffprobe".to_string(),
            ..WorkerConfig::default()
        };
        Arc::new(VideoPipeline::new(
            &config,
            Narrator::new(Vec::new()),
            ImageSourcer::offline(),
            Arc::new(FontContext::builtin()),
        ))
    }

    /// Publishes two files, then waits for the test to let it finish.
    struct GatedProducer {
        output_dir: PathBuf,
        started: Notify,
        release: Notify,
    }

    impl GatedProducer {
        fn new(output_dir: PathBuf) -> Arc<Self> {
            Arc::new(Self {
                output_dir,
                started: Notify::new(),
                release: Notify::new(),
            })
        }
    }

    #[async_trait]
    impl VideoProducer for GatedProducer {
        async fn produce(&self, job_id: &JobId, _question: &str, _script: &str) -> WorkerResult<VideoArtifact> {
            let artifact = VideoArtifact {
                video_file: format!("eduvid_{job_id}_0.mp4"),
                thumbnail_file: format!("thumb_{job_id}.png"),
                duration_secs: 15,
                subtitles: Vec::new(),
            };
            tokio::fs::create_dir_all(&self.output_dir).await?;
            for path in artifact.published_paths(&self.output_dir) {
                tokio::fs::write(path, b"published").await?;
            }
            self.started.notify_one();
            self.release.notified().await;
            Ok(artifact)
        }

        fn output_dir(&self) -> &Path {
            &self.output_dir
        }
    }

    #[tokio::test]
    async fn test_cancel_while_running_discards_artifacts() {
        let root = TempDir::new().unwrap();
        let producer = GatedProducer::new(root.path().join("out"));
        let tracker = Arc::new(RecordingTracker::default());
        let executor = JobExecutor::new(producer.clone(), tracker.clone(), 1);

        let job = VideoJob::new("What is the sun?", "The sun is a star. It provides light and heat.");
        let handle = executor.submit(job.clone());
        producer.started.notified().await;

        let published = std::fs::read_dir(root.path().join("out")).unwrap().count();
        assert_eq!(published, 2);
        assert!(executor.cancel(&job.job_id));
        producer.release.notify_one();

        assert_eq!(handle.await.unwrap(), JobState::Cancelled);
        assert_eq!(std::fs::read_dir(root.path().join("out")).unwrap().count(), 0);
        let updates = tracker.updates.lock().unwrap();
        let seen: Vec<&JobUpdate> = updates.iter().map(|(_, u)| u).collect();
        assert_eq!(seen, vec![&JobUpdate::Processing, &JobUpdate::Cancelled]);
        assert!(executor.pending.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_completed_job_keeps_artifacts() {
        let root = TempDir::new().unwrap();
        let producer = GatedProducer::new(root.path().join("out"));
        let tracker = Arc::new(RecordingTracker::default());
        let executor = JobExecutor::new(producer.clone(), tracker.clone(), 1);

        let handle = executor.submit(VideoJob::new("What is rain?", "Rain falls from clouds."));
        producer.started.notified().await;
        producer.release.notify_one();

        assert_eq!(handle.await.unwrap(), JobState::Completed);
        assert_eq!(std::fs::read_dir(root.path().join("out")).unwrap().count(), 2);
        let updates = tracker.updates.lock().unwrap();
        assert!(matches!(updates.last(), Some((_, JobUpdate::Completed(a))) if a.duration_secs == 15));
    }

    #[tokio::test]
    async fn test_cancel_ignores_unknown_and_finished_jobs() {
        let root = TempDir::new().unwrap();
        let producer = GatedProducer::new(root.path().join("out"));
        let tracker = Arc::new(RecordingTracker::default());
        let executor = JobExecutor::new(producer.clone(), tracker.clone(), 1);

        assert!(!executor.cancel(&JobId::from_string("never-submitted")));
        assert!(executor.pending.lock().unwrap().is_empty());

        let job = VideoJob::new("What is rain?", "Rain falls from clouds.");
        let handle = executor.submit(job.clone());
        assert_eq!(executor.pending.lock().unwrap().len(), 1);
        producer.started.notified().await;
        producer.release.notify_one();
        assert_eq!(handle.await.unwrap(), JobState::Completed);

        assert!(!executor.cancel(&job.job_id));
        assert!(executor.pending.lock().unwrap().is_empty());
        // Files of a finished job are left alone
        assert_eq!(std::fs::read_dir(root.path().join("out")).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_failure_reported_with_bounded_message() {
        let root = TempDir::new().unwrap();
        let tracker = Arc::new(RecordingTracker::default());
        let executor = JobExecutor::new(offline_pipeline(&root), tracker.clone(), 2);

        let job = VideoJob::new("What is the sun?", "The sun is a star. It provides light and heat.");
        let state = executor.submit(job.clone()).await.unwrap();
        assert_eq!(state, JobState::Failed);

        let updates = tracker.updates.lock().unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].1, JobUpdate::Processing);
        match &updates[1].1 {
            JobUpdate::Failed(message) => {
                assert!(message.starts_with("Assembly failed"));
                assert!(message.chars().count() <= 500);
            }
            other => panic!("unexpected update {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancel_before_start_skips_pipeline() {
        let root = TempDir::new().unwrap();
        let tracker = Arc::new(RecordingTracker::default());
        let executor = JobExecutor::new(offline_pipeline(&root), tracker.clone(), 1);

        let job = VideoJob::new("Why is the sky blue?", "Sunlight scatters off air molecules.");
        let handle = executor.submit(job.clone());
        // The spawned task has not been polled yet on the current-thread runtime
        assert!(executor.cancel(&job.job_id));
        let state = handle.await.unwrap();

        assert_eq!(state, JobState::Cancelled);
        let updates = tracker.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].1, JobUpdate::Cancelled);
        assert!(!root.path().join("tmp").exists());
    }

    #[tokio::test]
    async fn test_shutdown_fails_queued_jobs() {
        let root = TempDir::new().unwrap();
        let tracker = Arc::new(RecordingTracker::default());
        let executor = JobExecutor::new(offline_pipeline(&root), tracker.clone(), 1);
        executor.shutdown();

        let state = executor
            .submit(VideoJob::new("What is rain?", "Rain falls from clouds."))
            .await
            .unwrap();
        assert_eq!(state, JobState::Failed);
        let updates = tracker.updates.lock().unwrap();
        assert!(matches!(&updates[..], [(_, JobUpdate::Failed(m))] if m.starts_with("Job failed")));
        assert!(executor.pending.lock().unwrap().is_empty());
    }

    #[test]
    fn test_update_states() {
        assert_eq!(JobUpdate::Processing.state(), JobState::Processing);
        assert_eq!(JobUpdate::Failed("x".into()).state(), JobState::Failed);
        assert_eq!(JobUpdate::Cancelled.state(), JobState::Cancelled);
    }
}
