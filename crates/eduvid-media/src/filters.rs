//! FFmpeg filter definitions for slide animation and transitions.

use eduvid_models::encoding::MIN_TRANSITION_OFFSET_SECS;
use eduvid_models::RenderSettings;

/// Camera motion applied to a still frame with the `zoompan` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMotion {
    /// Slow centred zoom in
    ZoomIn,
    /// Slow centred zoom out
    ZoomOut,
    /// Gentle zoom while panning to the right
    PanRight,
    /// Gentle zoom while panning to the left
    PanLeft,
    /// Zoom towards the upper-right area
    CornerTopRight,
    /// Zoom towards the lower-left area
    CornerBottomLeft,
    /// Fixed zoom drifting upwards
    FloatUp,
    /// Fixed zoom drifting downwards
    FloatDown,
}

impl CameraMotion {
    /// Presets in cycling order.
    pub const ALL: [CameraMotion; 8] = [
        CameraMotion::ZoomIn,
        CameraMotion::ZoomOut,
        CameraMotion::PanRight,
        CameraMotion::PanLeft,
        CameraMotion::CornerTopRight,
        CameraMotion::CornerBottomLeft,
        CameraMotion::FloatUp,
        CameraMotion::FloatDown,
    ];

    /// Preset for the frame at `index`, cycling through [`CameraMotion::ALL`].
    pub fn for_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CameraMotion::ZoomIn => "zoom_in",
            CameraMotion::ZoomOut => "zoom_out",
            CameraMotion::PanRight => "pan_right",
            CameraMotion::PanLeft => "pan_left",
            CameraMotion::CornerTopRight => "corner_top_right",
            CameraMotion::CornerBottomLeft => "corner_bottom_left",
            CameraMotion::FloatUp => "float_up",
            CameraMotion::FloatDown => "float_down",
        }
    }

    /// zoompan `z`/`x`/`y` expressions for a clip of `total_frames` frames.
    pub fn expression(&self, total_frames: u64) -> String {
        // Linear pans run from output frame 0 to the last frame
        let span = total_frames.saturating_sub(1).max(1);
        match self {
            CameraMotion::ZoomIn => {
                "z='min(zoom+0.0012,1.15)':x='iw/2-(iw/zoom/2)':y='ih/2-(ih/zoom/2)'".to_string()
            }
            CameraMotion::ZoomOut => {
                "z='if(lte(zoom,1.0),1.15,max(1.001,zoom-0.0012))':x='iw/2-(iw/zoom/2)':y='ih/2-(ih/zoom/2)'"
                    .to_string()
            }
            CameraMotion::PanRight => format!(
                "z='min(zoom+0.0008,1.12)':x='(iw-iw/zoom)*on/{span}':y='ih/2-(ih/zoom/2)'"
            ),
            CameraMotion::PanLeft => format!(
                "z='min(zoom+0.0008,1.12)':x='(iw-iw/zoom)*(1-on/{span})':y='ih/2-(ih/zoom/2)'"
            ),
            CameraMotion::CornerTopRight => {
                "z='min(zoom+0.0010,1.18)':x='(iw-iw/zoom)*0.7':y='(ih-ih/zoom)*0.25'".to_string()
            }
            CameraMotion::CornerBottomLeft => {
                "z='min(zoom+0.0010,1.18)':x='(iw-iw/zoom)*0.3':y='(ih-ih/zoom)*0.7'".to_string()
            }
            CameraMotion::FloatUp => {
                format!("z='1.12':x='iw/2-(iw/zoom/2)':y='(ih-ih/zoom)*(1-on/{span})'")
            }
            CameraMotion::FloatDown => {
                format!("z='1.12':x='iw/2-(iw/zoom/2)':y='(ih-ih/zoom)*on/{span}'")
            }
        }
    }
}

/// Build the zoompan filter for one still frame.
pub fn zoompan_filter(motion: CameraMotion, total_frames: u64, settings: &RenderSettings) -> String {
    format!(
        "zoompan={}:d={}:s={}:fps={}",
        motion.expression(total_frames),
        total_frames,
        settings.size_arg(),
        settings.fps
    )
}

/// Number of output frames for a clip, never less than one second's worth.
pub fn clip_frame_count(clip_secs: f64, fps: u32) -> u64 {
    let frames = (clip_secs.max(0.0) * fps as f64) as u64;
    frames.max(fps as u64)
}

/// xfade transition styles, cycled per merge for variety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Fade,
    FadeBlack,
    SlideLeft,
    SlideUp,
    SmoothLeft,
    SmoothUp,
}

impl Transition {
    pub const ALL: [Transition; 6] = [
        Transition::Fade,
        Transition::FadeBlack,
        Transition::SlideLeft,
        Transition::SlideUp,
        Transition::SmoothLeft,
        Transition::SmoothUp,
    ];

    /// Transition for the merge that brings in clip `clip_index` (1-based merges).
    pub fn for_merge(clip_index: usize) -> Self {
        Self::ALL[clip_index % Self::ALL.len()]
    }

    /// Name understood by the xfade filter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Fade => "fade",
            Transition::FadeBlack => "fadeblack",
            Transition::SlideLeft => "slideleft",
            Transition::SlideUp => "slideup",
            Transition::SmoothLeft => "smoothleft",
            Transition::SmoothUp => "smoothup",
        }
    }
}

/// Offset at which a crossfade starts within the upstream clip.
///
/// Clamped to a small positive floor so a clip shorter than the crossfade never
/// produces a zero or negative offset.
pub fn transition_offset(upstream_secs: f64, crossfade_secs: f64) -> f64 {
    let offset = upstream_secs - crossfade_secs;
    if offset.is_finite() && offset > MIN_TRANSITION_OFFSET_SECS {
        offset
    } else {
        MIN_TRANSITION_OFFSET_SECS
    }
}

/// Filter graph merging input 0 into input 1 with a crossfade.
pub fn xfade_filter(transition: Transition, crossfade_secs: f64, offset_secs: f64, pixel_format: &str) -> String {
    format!(
        "[0:v][1:v]xfade=transition={}:duration={:.2}:offset={:.2},format={}[v]",
        transition.as_str(),
        crossfade_secs,
        offset_secs,
        pixel_format
    )
}

/// Escape a path for use inside a filter argument.
pub fn escape_filter_path(path: &str) -> String {
    path.replace('\\', "/").replace('\'', "\\'").replace(':', "\\:")
}
