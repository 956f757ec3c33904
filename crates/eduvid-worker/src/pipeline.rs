//! The per-job video pipeline.
//!
//! Stages run strictly in order: narration, segmentation, images, frames,
//! captions, assembly, thumbnail. Everything intermediate lives in a
//! [`JobWorkspace`] that is removed on every exit path; only the final video
//! and thumbnail are written to the output directory, and only when both
//! succeed.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use eduvid_imagery::{
    AccentPalette, FontContext, FontSource, FrameCompositor, ImageOrigin, ImageRequest, ImageSourcer, SlotImage,
};
use eduvid_media::fs_utils::remove_if_exists;
use eduvid_media::narration::{build_cues, segment_script, to_srt};
use eduvid_media::{generate_thumbnail, Assembler, AssemblyRequest, NarrationTrack, Narrator};
use eduvid_models::{extract_topic, JobId, RenderSettings, SlideRole, SubtitleCue, VideoArtifact};
use tracing::{info, Instrument};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::workspace::JobWorkspace;

/// Intermediate artifacts ready for assembly.
#[derive(Debug)]
pub struct PreparedJob {
    /// Title frame first, then one per segment
    pub frames: Vec<PathBuf>,
    /// Seconds per frame; sums to the narration duration
    pub durations: Vec<f64>,
    pub narration: NarrationTrack,
    pub cues: Vec<SubtitleCue>,
    /// SRT file, absent when there are no cues
    pub subtitles: Option<PathBuf>,
    /// Which tier produced each sourced image
    pub image_origins: Vec<ImageOrigin>,
}

/// Uniform per-slide durations summing to `total`.
pub fn slide_durations(total: f64, slides: usize) -> Vec<f64> {
    if slides == 0 {
        return Vec::new();
    }
    vec![total / slides as f64; slides]
}

/// Image shown on `slide`; slides past the sourced images reuse the last one.
pub fn image_for_slide(images: &[SlotImage], slide: usize) -> Option<&SlotImage> {
    images.get(slide).or_else(|| images.last())
}

/// Video file name for a job published at `timestamp`.
pub fn video_file_name(job_id: &JobId, timestamp: i64) -> String {
    format!("eduvid_{}_{}.mp4", job_id, timestamp)
}

pub fn thumbnail_file_name(job_id: &JobId) -> String {
    format!("thumb_{}.png", job_id)
}

/// Orchestrates one video job from script to published artifacts.
pub struct VideoPipeline {
    narrator: Narrator,
    sourcer: ImageSourcer,
    compositor: Arc<FrameCompositor>,
    assembler: Assembler,
    output_dir: PathBuf,
    temp_dir: PathBuf,
}

impl VideoPipeline {
    /// Production pipeline: TTS command, network image tiers, system fonts.
    pub fn from_config(config: &WorkerConfig) -> WorkerResult<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| WorkerError::config_error(format!("failed to build HTTP client: {e}")))?;

        let narrator = Narrator::standard(config.speech.clone(), config.toolchain());
        let sourcer = ImageSourcer::standard(client, &config.sourcing);
        let fonts = Arc::new(FontContext::discover(&config.font_paths));
        Ok(Self::new(config, narrator, sourcer, fonts))
    }

    /// Pipeline with explicit narration and image strategies.
    pub fn new(config: &WorkerConfig, narrator: Narrator, sourcer: ImageSourcer, fonts: Arc<FontContext>) -> Self {
        let compositor = FrameCompositor::new(fonts, config.render).with_brand(config.brand_name.clone());
        Self {
            narrator,
            sourcer,
            compositor: Arc::new(compositor),
            assembler: Assembler::new(config.toolchain(), config.render)
                .with_encoding(config.encoding.clone())
                .with_caption_style(config.caption_style()),
            output_dir: config.output_dir.clone(),
            temp_dir: config.temp_dir.clone(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn render_settings(&self) -> &RenderSettings {
        self.compositor.settings()
    }

    /// Fonts the compositor resolved at startup.
    pub fn font_source(&self) -> FontSource {
        self.compositor.fonts().source()
    }

    /// Run the whole pipeline for one job.
    pub async fn produce(&self, job_id: &JobId, question: &str, script: &str) -> WorkerResult<VideoArtifact> {
        let logger = JobLogger::new(job_id, "produce_video");
        let span = logger.create_span();
        let started = Instant::now();

        let result = async {
            logger.log_start(&format!("question={question:?}"));
            let workspace = JobWorkspace::create(&self.temp_dir, job_id).await?;

            let outcome = match self.prepare(job_id, question, script, &workspace, &logger).await {
                Ok(prepared) => self.publish(job_id, prepared, &workspace, &logger).await,
                Err(e) => Err(e),
            };
            workspace.close().await;
            outcome
        }
        .instrument(span)
        .await;

        let outcome = if result.is_ok() { "completed" } else { "failed" };
        metrics::counter!("eduvid_jobs_total", "outcome" => outcome).increment(1);
        metrics::histogram!("eduvid_job_duration_seconds").record(started.elapsed().as_secs_f64());

        match &result {
            Ok(artifact) => logger.log_completion(&format!(
                "video={} duration={}s cues={}",
                artifact.video_file,
                artifact.duration_secs,
                artifact.subtitles.len()
            )),
            Err(e) => logger.log_error(&e.to_string()),
        }
        result
    }

    /// Narration, images, frames and captions, all inside `workspace`.
    pub async fn prepare(
        &self,
        job_id: &JobId,
        question: &str,
        script: &str,
        workspace: &JobWorkspace,
        logger: &JobLogger,
    ) -> WorkerResult<PreparedJob> {
        let palette = AccentPalette::for_script(script);

        let narration = self.narrator.synthesize(script, &workspace.file("narration.mp3")).await;
        if narration.audio.is_none() {
            logger.log_warning("no narration audio, video will be silent");
        }
        logger.log_progress(&format!(
            "narration ready: source={} duration={:.2}s",
            narration.source, narration.duration
        ));

        let segments = segment_script(script);
        let slides = segments.len() + 1;
        let durations = slide_durations(narration.duration, slides);

        let settings = *self.compositor.settings();
        let request = ImageRequest::new(extract_topic(question), segments.clone(), settings.width, settings.height);
        let images = self.sourcer.acquire(&request).await;
        let image_origins: Vec<ImageOrigin> = images.iter().map(|i| i.origin).collect();
        logger.log_progress(&format!("images ready: {:?}", image_origins));

        let frames = self
            .render_frames(images, question.to_string(), segments, palette, workspace.path().to_path_buf())
            .await?;
        info!(job_id = %job_id, frames = frames.len(), "Frames rendered");

        let cues = build_cues(script, narration.duration);
        let subtitles = if cues.is_empty() {
            None
        } else {
            let path = workspace.file("subtitles.srt");
            tokio::fs::write(&path, to_srt(&cues)).await?;
            Some(path)
        };

        Ok(PreparedJob {
            frames,
            durations,
            narration,
            cues,
            subtitles,
            image_origins,
        })
    }

    async fn render_frames(
        &self,
        images: Vec<SlotImage>,
        question: String,
        segments: Vec<String>,
        palette: AccentPalette,
        dir: PathBuf,
    ) -> WorkerResult<Vec<PathBuf>> {
        let compositor = Arc::clone(&self.compositor);

        tokio::task::spawn_blocking(move || -> WorkerResult<Vec<PathBuf>> {
            let total = segments.len();
            let texts = std::iter::once((SlideRole::Title, question.as_str()))
                .chain(
                    segments
                        .iter()
                        .enumerate()
                        .map(|(i, text)| (SlideRole::Content { index: i + 1 }, text.as_str())),
                );

            let mut frames = Vec::with_capacity(total + 1);
            for (role, text) in texts {
                let slide = role.slot();
                let background = image_for_slide(&images, slide)
                    .ok_or_else(|| WorkerError::rendering_failed("no background images"))?;
                let frame = compositor.render(&background.image, text, role, total, &palette);

                let path = dir.join(format!("frame_{:03}.png", slide));
                frame
                    .save_with_format(&path, image::ImageFormat::Png)
                    .map_err(|e| WorkerError::rendering_failed(format!("failed to save frame {slide}: {e}")))?;
                frames.push(path);
            }
            Ok(frames)
        })
        .await
        .map_err(|e| WorkerError::rendering_failed(format!("frame render task failed: {e}")))?
    }

    /// Assemble into the output directory and write the thumbnail.
    async fn publish(
        &self,
        job_id: &JobId,
        prepared: PreparedJob,
        workspace: &JobWorkspace,
        logger: &JobLogger,
    ) -> WorkerResult<VideoArtifact> {
        let title_frame = prepared
            .frames
            .first()
            .ok_or_else(|| WorkerError::rendering_failed("no title frame"))?;
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let video_file = video_file_name(job_id, Utc::now().timestamp());
        let thumbnail_file = thumbnail_file_name(job_id);
        let video_path = self.output_dir.join(&video_file);
        let thumbnail_path = self.output_dir.join(&thumbnail_file);

        let request = AssemblyRequest {
            frames: &prepared.frames,
            durations: &prepared.durations,
            audio: prepared.narration.audio.as_deref(),
            subtitles: prepared.subtitles.as_deref(),
            work_dir: workspace.path(),
            output: &video_path,
        };
        let report = match self.assembler.assemble(request).await {
            Ok(report) => report,
            Err(e) => {
                let _ = remove_if_exists(&video_path).await;
                return Err(WorkerError::assembly_failed(e.to_string()));
            }
        };
        logger.log_progress(&format!(
            "assembled via {} (captions {:?})",
            report.path.as_str(),
            report.captions
        ));

        if let Err(e) = generate_thumbnail(title_frame, &thumbnail_path).await {
            let _ = remove_if_exists(&video_path).await;
            let _ = remove_if_exists(&thumbnail_path).await;
            return Err(e.into());
        }

        Ok(VideoArtifact {
            video_file,
            thumbnail_file,
            duration_secs: prepared.narration.duration as u32,
            subtitles: prepared.cues,
        })
    }
}
