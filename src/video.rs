use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::probe::{MediaProbe, VideoInfo};

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi"];

/// A background clip that has been probed and is known to open.
#[derive(Debug, Clone)]
pub struct BackgroundVideo {
    pub path: PathBuf,
    pub info: VideoInfo,
}

fn has_video_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
}

/// Probe an explicitly chosen clip.
pub fn open_background(
    probe: &dyn MediaProbe,
    path: &Path,
) -> Result<BackgroundVideo, PipelineError> {
    let info = probe
        .video_info(path)
        .map_err(|e| PipelineError::NoBackgroundVideo(format!("{}: {e}", path.display())))?;
    Ok(BackgroundVideo {
        path: path.to_path_buf(),
        info,
    })
}

/// Pick a random clip from `dir`, trying candidates in shuffled order until
/// one opens. Exhausting every candidate is fatal for the run.
pub fn pick_background(
    probe: &dyn MediaProbe,
    dir: &Path,
) -> Result<BackgroundVideo, PipelineError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| PipelineError::NoBackgroundVideo(format!("{}: {e}", dir.display())))?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_video_extension(path))
        .collect();

    if candidates.is_empty() {
        return Err(PipelineError::NoBackgroundVideo(dir.display().to_string()));
    }

    candidates.shuffle(&mut rand::thread_rng());

    for candidate in &candidates {
        match probe.video_info(candidate) {
            Ok(info) => {
                info!(
                    "Selected background video: {} ({}x{}, {:.1}s)",
                    candidate.display(),
                    info.width,
                    info.height,
                    info.duration
                );
                return Ok(BackgroundVideo {
                    path: candidate.clone(),
                    info,
                });
            }
            Err(e) => warn!("Skipping unreadable candidate {}: {e}", candidate.display()),
        }
    }

    Err(PipelineError::NoBackgroundVideo(dir.display().to_string()))
}

/// Center crop to the target aspect ratio, then scale, as an ffmpeg filter.
/// Sources wider than the target lose width; taller sources lose height.
pub fn crop_scale_filter(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> String {
    let src_ratio = src_w as f64 / src_h as f64;
    let dst_ratio = dst_w as f64 / dst_h as f64;

    let (crop_w, crop_h) = if src_ratio > dst_ratio {
        let new_w = ((src_h as f64 * dst_ratio).round() as u32).min(src_w);
        (new_w, src_h)
    } else {
        let new_h = ((src_w as f64 / dst_ratio).round() as u32).min(src_h);
        (src_w, new_h)
    };
    let x = (src_w - crop_w) / 2;
    let y = (src_h - crop_h) / 2;

    format!("crop={crop_w}:{crop_h}:{x}:{y},scale={dst_w}:{dst_h}")
}
