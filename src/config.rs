use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::segment::SegmenterParams;
use crate::timing::EstimatorParams;

/// Retry policy for the two external-call stages (synthesis, timings).
/// Pure stages are never retried.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Delay before the given retry (attempt is 1-based; attempt 1 ran with no delay).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.powi(attempt.saturating_sub(1) as i32);
        self.base_delay.mul_f64(factor)
    }
}

/// Subtitle style passed through to the composition stage.
#[derive(Debug, Clone)]
pub struct SubtitleStyle {
    pub font: String,
    pub font_size: u32,
    /// Vertical margin from the bottom edge, in output pixels.
    pub margin_v: u32,
    /// Highlight colour for the active word, ASS &HBBGGRR& order.
    pub highlight_colour: String,
    pub outline: u32,
}

impl Default for SubtitleStyle {
    fn default() -> Self {
        Self {
            font: "Arial".to_string(),
            font_size: 40,
            margin_v: 384,
            highlight_colour: "&H00FFFF&".to_string(),
            outline: 1,
        }
    }
}

/// Process configuration, resolved once at startup. Environment overrides the
/// defaults, CLI flags override the environment (applied in main).
#[derive(Debug, Clone)]
pub struct Config {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub video_codec: String,
    pub audio_codec: String,
    pub video_bitrate: Option<String>,
    pub preset: String,
    pub threads: u32,
    pub output_path: PathBuf,
    pub videos_dir: PathBuf,
    /// Duration of the degraded silent video when synthesis fully fails.
    pub default_duration: f64,
    pub openai_api_key: Option<String>,
    pub elevenlabs_api_key: Option<String>,
    pub stability: f64,
    pub similarity_boost: f64,
    pub subtitle: SubtitleStyle,
    pub estimator: EstimatorParams,
    pub segmenter: SegmenterParams,
    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            fps: 30,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            video_bitrate: None,
            preset: "medium".to_string(),
            threads: 4,
            output_path: PathBuf::from("output/final_output.mp4"),
            videos_dir: PathBuf::from("videos"),
            default_duration: 60.0,
            openai_api_key: None,
            elevenlabs_api_key: None,
            stability: 0.5,
            similarity_boost: 0.75,
            subtitle: SubtitleStyle::default(),
            estimator: EstimatorParams::default(),
            segmenter: SegmenterParams::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Config {
            width: env_or("STORYVID_WIDTH", defaults.width),
            height: env_or("STORYVID_HEIGHT", defaults.height),
            fps: env_or("STORYVID_FPS", defaults.fps),
            video_codec: env_or("STORYVID_VIDEO_CODEC", defaults.video_codec),
            audio_codec: env_or("STORYVID_AUDIO_CODEC", defaults.audio_codec),
            video_bitrate: env::var("STORYVID_VIDEO_BITRATE").ok(),
            preset: env_or("STORYVID_PRESET", defaults.preset),
            threads: env_or("STORYVID_THREADS", defaults.threads),
            output_path: PathBuf::from(env_or(
                "STORYVID_OUT",
                defaults.output_path.display().to_string(),
            )),
            videos_dir: PathBuf::from(env_or(
                "STORYVID_VIDEOS_DIR",
                defaults.videos_dir.display().to_string(),
            )),
            default_duration: env_or("STORYVID_DEFAULT_DURATION", defaults.default_duration),
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            elevenlabs_api_key: env::var("ELEVENLABS_API_KEY").ok().filter(|k| !k.is_empty()),
            stability: env_or("STORYVID_STABILITY", defaults.stability),
            similarity_boost: env_or("STORYVID_SIMILARITY", defaults.similarity_boost),
            subtitle: SubtitleStyle {
                font: env_or("STORYVID_FONT", defaults.subtitle.font),
                font_size: env_or("STORYVID_FONT_SIZE", defaults.subtitle.font_size),
                ..defaults.subtitle
            },
            estimator: defaults.estimator,
            segmenter: defaults.segmenter,
            retry: defaults.retry,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or(default),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_vertical_1080x1920_at_30fps() {
        let config = Config::default();
        assert_eq!(config.width, 1080);
        assert_eq!(config.height, 1920);
        assert_eq!(config.fps, 30);
        assert_eq!(config.video_codec, "libx264");
        assert_eq!(config.audio_codec, "aac");
    }

    #[test]
    fn retry_delay_grows_by_multiplier() {
        let policy = RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
            multiplier: 2.0,
        };
        assert_eq!(policy.delay(1), Duration::from_millis(100));
        assert_eq!(policy.delay(2), Duration::from_millis(200));
        assert_eq!(policy.delay(3), Duration::from_millis(400));
    }
}
