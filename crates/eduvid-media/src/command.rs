//! FFmpeg command builder and process runners.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};
use crate::progress::FfmpegProgress;
use eduvid_models::EncodingConfig;

/// Lines of FFmpeg stderr kept for error reports.
const STDERR_TAIL_LINES: usize = 12;

/// Locations of the external media binaries.
///
/// Both entries may be bare program names (resolved through `PATH`) or
/// absolute paths.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

impl Toolchain {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Resolve the FFmpeg binary.
    pub fn resolve_ffmpeg(&self) -> MediaResult<PathBuf> {
        which::which(&self.ffmpeg)
            .map_err(|_| MediaError::FfmpegNotFound(self.ffmpeg.display().to_string()))
    }

    /// Resolve the FFprobe binary.
    pub fn resolve_ffprobe(&self) -> MediaResult<PathBuf> {
        which::which(&self.ffprobe)
            .map_err(|_| MediaError::FfprobeNotFound(self.ffprobe.display().to_string()))
    }

    /// Runner bound to this toolchain's FFmpeg.
    pub fn runner(&self) -> FfmpegRunner {
        FfmpegRunner::new().with_program(&self.ffmpeg)
    }
}

/// One `-i` input together with the options that precede it.
#[derive(Debug, Clone)]
struct FfmpegInput {
    args: Vec<String>,
    path: PathBuf,
}

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Inputs in `-i` order
    inputs: Vec<FfmpegInput>,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after the last -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command with a single input.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            inputs: vec![FfmpegInput {
                args: Vec::new(),
                path: input.as_ref().to_path_buf(),
            }],
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Create a command whose input is a lavfi source graph (e.g. `anullsrc`).
    pub fn lavfi(source: impl Into<String>, output: impl AsRef<Path>) -> Self {
        Self::new(source.into(), output).input_args(["-f", "lavfi"])
    }

    /// Append another input. Subsequent `input_arg` calls apply to it.
    pub fn add_input(mut self, input: impl AsRef<Path>) -> Self {
        self.inputs.push(FfmpegInput {
            args: Vec::new(),
            path: input.as_ref().to_path_buf(),
        });
        self
    }

    /// Add an argument before the most recent `-i`.
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        if let Some(input) = self.inputs.last_mut() {
            input.args.push(arg.into());
        }
        self
    }

    /// Add multiple arguments before the most recent `-i`.
    pub fn input_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(input) = self.inputs.last_mut() {
            input.args.extend(args.into_iter().map(Into::into));
        }
        self
    }

    /// Add output arguments (after the last -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Loop the most recent (still image) input forever.
    pub fn loop_input(self) -> Self {
        self.input_arg("-loop").input_arg("1")
    }

    /// Read the most recent input as an FFmpeg concat list.
    pub fn concat_list_input(self) -> Self {
        self.input_args(["-f", "concat", "-safe", "0"])
    }

    /// Limit output duration.
    pub fn duration(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format!("{:.3}", seconds))
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Set filter complex.
    pub fn filter_complex(self, filter: impl Into<String>) -> Self {
        self.output_arg("-filter_complex").output_arg(filter)
    }

    /// Map a stream or filter label into the output.
    pub fn map(self, spec: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(spec)
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Copy the video stream without re-encoding.
    pub fn copy_video(self) -> Self {
        self.video_codec("copy")
    }

    /// Encode video with the shared profile.
    pub fn encode_video(self, encoding: &EncodingConfig) -> Self {
        self.output_args(encoding.video_args())
    }

    /// Encode audio with the shared profile.
    pub fn encode_audio(self, encoding: &EncodingConfig) -> Self {
        self.output_args(encoding.audio_args())
    }

    /// Apply container flags from the shared profile.
    pub fn container(self, encoding: &EncodingConfig) -> Self {
        self.output_args(encoding.container_args())
    }

    /// Drop audio streams.
    pub fn no_audio(self) -> Self {
        self.output_arg("-an")
    }

    /// Stop at the end of the shortest input stream.
    pub fn shortest(self) -> Self {
        self.output_arg("-shortest")
    }

    /// Force output frame rate.
    pub fn frame_rate(self, fps: u32) -> Self {
        self.output_arg("-r").output_arg(fps.to_string())
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Output path of this command.
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        // Progress output to stderr
        args.push("-progress".to_string());
        args.push("pipe:2".to_string());
        args.push("-nostats".to_string());

        for input in &self.inputs {
            args.extend(input.args.iter().cloned());
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().to_string());
        }

        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runner for FFmpeg commands with progress tracking and a wall-clock timeout.
pub struct FfmpegRunner {
    /// FFmpeg program (name or path)
    program: PathBuf,
    /// Timeout in seconds
    timeout_secs: Option<u64>,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegRunner {
    /// Create a new runner using `ffmpeg` from `PATH`.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            timeout_secs: None,
        }
    }

    /// Use a specific FFmpeg binary.
    pub fn with_program(mut self, program: impl AsRef<Path>) -> Self {
        self.program = program.as_ref().to_path_buf();
        self
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Run an FFmpeg command.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        self.run_with_progress(cmd, |_| {}).await
    }

    /// Run an FFmpeg command with progress callback.
    pub async fn run_with_progress<F>(&self, cmd: &FfmpegCommand, progress_callback: F) -> MediaResult<()>
    where
        F: Fn(FfmpegProgress) + Send + 'static,
    {
        let program = which::which(&self.program)
            .map_err(|_| MediaError::FfmpegNotFound(self.program.display().to_string()))?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let mut child = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::internal("FFmpeg stderr not captured"))?;
        let mut reader = BufReader::new(stderr).lines();

        // Progress lines feed the callback; everything else is kept as the error tail
        let progress_handle = tokio::spawn(async move {
            let mut current_progress = FfmpegProgress::default();
            let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);

            while let Ok(Some(line)) = reader.next_line().await {
                if is_progress_line(&line) {
                    if let Some(progress) = parse_progress_line(&line, &mut current_progress) {
                        progress_callback(progress);
                    }
                } else if !line.trim().is_empty() {
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
            }

            tail.into_iter().collect::<Vec<_>>().join("\n")
        });

        let result = self.wait_for_completion(&mut child).await;

        let stderr_tail = progress_handle.await.unwrap_or_default();

        match result {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => Err(MediaError::ffmpeg_failed(
                format!(
                    "FFmpeg exited with non-zero status writing {}",
                    cmd.output_path().display()
                ),
                (!stderr_tail.is_empty()).then_some(stderr_tail),
                status.code(),
            )),
            Err(e) => Err(e),
        }
    }

    /// Wait for child process with optional timeout.
    async fn wait_for_completion(&self, child: &mut Child) -> MediaResult<std::process::ExitStatus> {
        match self.timeout_secs {
            Some(timeout_secs) => {
                match tokio::time::timeout(Duration::from_secs(timeout_secs), child.wait()).await {
                    Ok(result) => Ok(result?),
                    Err(_) => {
                        warn!("FFmpeg timed out after {} seconds, killing process", timeout_secs);
                        let _ = child.kill().await;
                        Err(MediaError::Timeout(timeout_secs))
                    }
                }
            }
            None => Ok(child.wait().await?),
        }
    }
}

/// Run an arbitrary program to completion under a wall-clock timeout.
///
/// `stdin_data`, when given, is written to the child's stdin which is then
/// closed; a child that exits without reading it is not an error. The write
/// counts against the timeout. On timeout the child is killed (it is spawned with
/// `kill_on_drop`), so no process outlives the call.
pub async fn run_with_timeout(
    program: impl AsRef<Path>,
    args: &[String],
    stdin_data: Option<&str>,
    timeout: Duration,
) -> MediaResult<Output> {
    let program = program.as_ref();
    debug!("Running {} {}", program.display(), args.join(" "));

    let mut child = Command::new(program)
        .args(args)
        .stdin(if stdin_data.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let stdin = child.stdin.take();
    let feed = async move {
        if let (Some(data), Some(mut stdin)) = (stdin_data, stdin) {
            stdin.write_all(data.as_bytes()).await?;
            stdin.shutdown().await?;
        }
        Ok::<(), std::io::Error>(())
    };

    // Feeding stdin and draining stdout/stderr share one deadline
    let run = async {
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        match fed {
            Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => Err(e),
            _ => output,
        }
    };

    match tokio::time::timeout(timeout, run).await {
        Ok(output) => Ok(output?),
        Err(_) => {
            warn!(
                "{} timed out after {} seconds, process killed",
                program.display(),
                timeout.as_secs()
            );
            Err(MediaError::Timeout(timeout.as_secs()))
        }
    }
}

/// Keys FFmpeg emits on `-progress pipe:2`.
fn is_progress_line(line: &str) -> bool {
    const KEYS: &[&str] = &[
        "frame", "fps", "stream_0_0_q", "bitrate", "total_size", "out_time_us", "out_time_ms",
        "out_time", "dup_frames", "drop_frames", "speed", "progress",
    ];
    line.split_once('=')
        .map(|(key, _)| KEYS.contains(&key.trim()))
        .unwrap_or(false)
}

/// Parse a progress line from FFmpeg's -progress output.
fn parse_progress_line(line: &str, current: &mut FfmpegProgress) -> Option<FfmpegProgress> {
    let line = line.trim();

    if let Some((key, value)) = line.split_once('=') {
        match key {
            "out_time_ms" | "out_time_us" => {
                // Both keys carry microseconds in practice; normalise to milliseconds
                if let Ok(us) = value.parse::<i64>() {
                    current.out_time_ms = us / 1000;
                }
            }
            "out_time" => {
                current.out_time = value.to_string();
            }
            "frame" => {
                if let Ok(frame) = value.parse() {
                    current.frame = frame;
                }
            }
            "fps" => {
                if let Ok(fps) = value.parse() {
                    current.fps = fps;
                }
            }
            "speed" => {
                if let Some(speed) = value.strip_suffix('x').and_then(|s| s.trim().parse().ok()) {
                    current.speed = speed;
                }
            }
            "progress" => {
                if value == "end" {
                    current.is_complete = true;
                }
                return Some(current.clone());
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder_multiple_inputs() {
        let cmd = FfmpegCommand::new("clip_000.mp4", "xfade_001.mp4")
            .add_input("clip_001.mp4")
            .filter_complex("[0:v][1:v]xfade=transition=fade:duration=0.60:offset=7.50[v]")
            .map("[v]")
            .no_audio();

        let args = cmd.build_args();
        let first = args.iter().position(|a| a == "clip_000.mp4").unwrap();
        let second = args.iter().position(|a| a == "clip_001.mp4").unwrap();
        assert!(first < second);
        assert_eq!(args[first - 1], "-i");
        assert_eq!(args[second - 1], "-i");
        assert_eq!(args.last().unwrap(), "xfade_001.mp4");
    }

    #[test]
    fn test_input_args_attach_to_latest_input() {
        let cmd = FfmpegCommand::new("frame.png", "clip.mp4")
            .loop_input()
            .add_input("narration.mp3")
            .duration(8.1);

        let args = cmd.build_args();
        let loop_pos = args.iter().position(|a| a == "-loop").unwrap();
        let frame_pos = args.iter().position(|a| a == "frame.png").unwrap();
        let audio_pos = args.iter().position(|a| a == "narration.mp3").unwrap();
        assert!(loop_pos < frame_pos);
        assert!(frame_pos < audio_pos);
        assert!(args.contains(&"8.100".to_string()));
    }

    #[test]
    fn test_lavfi_source() {
        let cmd = FfmpegCommand::lavfi("anullsrc=r=44100:cl=mono", "silence.mp3");
        let args = cmd.build_args();
        let f_pos = args.iter().position(|a| a == "-f").unwrap();
        assert_eq!(args[f_pos + 1], "lavfi");
        assert!(args.contains(&"anullsrc=r=44100:cl=mono".to_string()));
    }

    #[test]
    fn test_encoding_profile_applied() {
        let encoding = EncodingConfig::default();
        let args = FfmpegCommand::new("in.mp4", "out.mp4")
            .encode_video(&encoding)
            .container(&encoding)
            .build_args();
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"+faststart".to_string()));
    }

    #[test]
    fn test_progress_parsing() {
        let mut progress = FfmpegProgress::default();

        parse_progress_line("out_time_us=5000000", &mut progress);
        assert_eq!(progress.out_time_ms, 5000);

        parse_progress_line("speed=1.5x", &mut progress);
        assert!((progress.speed - 1.5).abs() < 0.01);

        parse_progress_line("speed=N/A", &mut progress);
        assert!((progress.speed - 1.5).abs() < 0.01);

        let result = parse_progress_line("progress=end", &mut progress);
        assert!(result.is_some());
        assert!(progress.is_complete);
    }

    #[test]
    fn test_progress_lines_are_not_error_text() {
        assert!(is_progress_line("frame=120"));
        assert!(is_progress_line("progress=continue"));
        assert!(!is_progress_line("[Parsed_xfade_0 @ 0x1] First input link main timebase"));
        assert!(!is_progress_line("Error opening input file clip.mp4."));
    }

    #[tokio::test]
    async fn test_missing_program_reported() {
        let runner = FfmpegRunner::new().with_program("/nonexistent/eduvid-ffmpeg");
        let cmd = FfmpegCommand::new("in.png", "out.mp4");
        let err = runner.run(&cmd).await.unwrap_err();
        assert!(matches!(err, MediaError::FfmpegNotFound(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_with_timeout_kills_slow_process() {
        let err = run_with_timeout("sleep", &["5".to_string()], None, Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_covers_unread_stdin() {
        // Larger than a pipe buffer, and `sleep` never reads it
        let text = "narration ".repeat(52_429);
        let started = std::time::Instant::now();
        let result = tokio::time::timeout(
            Duration::from_secs(10),
            run_with_timeout("sleep", &["30".to_string()], Some(&text), Duration::from_secs(1)),
        )
        .await
        .expect("inner timeout was not honoured");

        assert!(matches!(result, Err(MediaError::Timeout(1))));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_with_timeout_pipes_stdin() {
        let output = run_with_timeout("cat", &[], Some("hello"), Duration::from_secs(5))
            .await
            .unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "hello");
    }
}
