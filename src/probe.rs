use std::path::Path;
use std::process::Command;

use serde::Deserialize;
use tracing::debug;

use crate::audio::wav_duration_seconds;

/// What a background candidate looks like once it has been opened.
#[derive(Debug, Clone)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub duration: f64,
}

/// Seam over media inspection so the orchestrator and the video picker can
/// run against fixed metadata in tests.
pub trait MediaProbe: Send + Sync {
    /// Open a video and read its dimensions and duration. An error means the
    /// candidate is unusable.
    fn video_info(&self, path: &Path) -> anyhow::Result<VideoInfo>;

    /// Duration of an audio file in seconds.
    fn audio_duration(&self, path: &Path) -> anyhow::Result<f64>;
}

/// ffprobe-backed probe. WAV durations come straight from the header via
/// hound; everything else shells out to ffprobe with JSON output.
pub struct FfprobeProbe;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
    streams: Option<Vec<ProbeStream>>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

fn run_ffprobe(path: &Path) -> anyhow::Result<ProbeOutput> {
    debug!("Probing {}", path.display());
    let output = Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_format", "-show_streams"])
        .arg(path)
        .output()?;
    if !output.status.success() {
        anyhow::bail!(
            "ffprobe failed for {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(serde_json::from_slice(&output.stdout)?)
}

impl MediaProbe for FfprobeProbe {
    fn video_info(&self, path: &Path) -> anyhow::Result<VideoInfo> {
        let probed = run_ffprobe(path)?;
        let duration = probed
            .format
            .as_ref()
            .and_then(|f| f.duration.as_deref())
            .and_then(|d| d.parse::<f64>().ok())
            .ok_or_else(|| anyhow::anyhow!("no duration in probe of {}", path.display()))?;
        let stream = probed
            .streams
            .unwrap_or_default()
            .into_iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| anyhow::anyhow!("no video stream in {}", path.display()))?;
        match (stream.width, stream.height) {
            (Some(width), Some(height)) if width > 0 && height > 0 => Ok(VideoInfo {
                width,
                height,
                duration,
            }),
            _ => anyhow::bail!("missing dimensions in probe of {}", path.display()),
        }
    }

    fn audio_duration(&self, path: &Path) -> anyhow::Result<f64> {
        if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("wav"))
        {
            return wav_duration_seconds(path);
        }
        let probed = run_ffprobe(path)?;
        probed
            .format
            .and_then(|f| f.duration)
            .and_then(|d| d.parse::<f64>().ok())
            .ok_or_else(|| anyhow::anyhow!("no duration in probe of {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::test_support::write_test_wav;

    #[test]
    fn probe_json_parses_streams_and_format() {
        let raw = r#"{
            "format": {"duration": "12.5"},
            "streams": [
                {"codec_type": "audio"},
                {"codec_type": "video", "width": 1920, "height": 1080}
            ]
        }"#;
        let parsed: ProbeOutput = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.format.unwrap().duration.as_deref(), Some("12.5"));
        let streams = parsed.streams.unwrap();
        assert_eq!(streams[1].width, Some(1920));
    }

    #[test]
    fn wav_fast_path_skips_ffprobe() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("speech.wav");
        write_test_wav(&path, 1.5);
        let duration = FfprobeProbe.audio_duration(&path).unwrap();
        assert!((duration - 1.5).abs() < 1e-3);
    }
}
