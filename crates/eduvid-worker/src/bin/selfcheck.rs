//! Startup check for a worker host: configuration, FFmpeg, fonts.

use std::path::Path;

use eduvid_worker::{init_tracing, VideoPipeline, WorkerConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = WorkerConfig::from_env();
    info!(
        temp_dir = %config.temp_dir.display(),
        output_dir = %config.output_dir.display(),
        "eduvid-selfcheck starting"
    );

    ensure_dir(&config.temp_dir).await?;
    ensure_dir(&config.output_dir).await?;

    let toolchain = config.toolchain();
    let ffmpeg = toolchain.resolve_ffmpeg()?;
    let ffprobe = toolchain.resolve_ffprobe()?;
    info!(ffmpeg = %ffmpeg.display(), ffprobe = %ffprobe.display(), "FFmpeg found");

    // Validates the config and loads fonts the same way jobs will
    let pipeline = VideoPipeline::from_config(&config)?;
    let settings = pipeline.render_settings();
    info!(
        fonts = %pipeline.font_source(),
        size = %settings.size_arg(),
        fps = settings.fps,
        caption_font = %config.caption_font,
        "Pipeline ready"
    );

    println!("eduvid-selfcheck: ok");
    Ok(())
}

async fn ensure_dir(path: &Path) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {}", path.display(), e))
}
