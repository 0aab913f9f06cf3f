use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use regex::Regex;
use tracing::{debug, error, info};

use crate::config::{Config, SubtitleStyle};
use crate::error::PipelineError;
use crate::highlight::LineEvents;
use crate::video::{crop_scale_filter, BackgroundVideo};

/// Everything the composition stage needs for one run. Events are consumed in
/// order: each line's base caption first, then its word highlights.
pub struct RenderJob {
    pub background: BackgroundVideo,
    pub audio: Option<PathBuf>,
    pub duration: f64,
    pub events: Vec<LineEvents>,
    pub scratch_dir: PathBuf,
    pub output_path: PathBuf,
}

/// Seam over the composition backend so tests can capture jobs instead of
/// encoding video.
pub trait Composer: Send + Sync {
    fn compose(&self, job: &RenderJob) -> Result<PathBuf, PipelineError>;
}

/// ffmpeg-backed composition: crops/scales/loops the background, burns the
/// subtitle events in, muxes the narration, and promotes the output by rename
/// only after ffmpeg succeeds.
pub struct FfmpegComposer {
    config: Config,
}

impl FfmpegComposer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

fn ass_time(seconds: f64) -> String {
    let total_cs = (seconds.max(0.0) * 100.0).round() as u64;
    let cs = total_cs % 100;
    let total_sec = total_cs / 100;
    let s = total_sec % 60;
    let total_min = total_sec / 60;
    let m = total_min % 60;
    let h = total_min / 60;
    format!("{h}:{m:02}:{s:02}.{cs:02}")
}

fn ass_escape(text: &str) -> String {
    // Braces start override blocks in ASS; neutralize any from the story.
    text.replace('{', "(").replace('}', ")").replace('\n', " ")
}

/// Translate the `[word]` marker into an ASS colour override on that word.
fn ass_highlight(text: &str, highlight_colour: &str) -> String {
    let marker = Regex::new(r"\[([^\[\]]*)\]").unwrap();
    marker
        .replace(text, |caps: &regex::Captures| {
            format!(r"{{\1c{highlight_colour}}}{}{{\1c&HFFFFFF&}}", &caps[1])
        })
        .into_owned()
}

/// Write all line events as an ASS subtitle file. Base captions sit on layer
/// 0; highlight renderings sit on layer 1 so they draw over their base.
pub fn write_ass(
    path: &Path,
    events: &[LineEvents],
    style: &SubtitleStyle,
    width: u32,
    height: u32,
) -> anyhow::Result<()> {
    let mut f = File::create(path)?;
    writeln!(f, "[Script Info]")?;
    writeln!(f, "ScriptType: v4.00+")?;
    writeln!(f, "PlayResX: {width}")?;
    writeln!(f, "PlayResY: {height}")?;
    writeln!(f)?;
    writeln!(f, "[V4+ Styles]")?;
    writeln!(
        f,
        "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding"
    )?;
    writeln!(
        f,
        "Style: Default,{font},{size},&H00FFFFFF,&H000000FF,&H00000000,&H80000000,-1,0,0,0,100,100,0,0,1,{outline},0,2,40,40,{margin},1",
        font = style.font,
        size = style.font_size,
        outline = style.outline,
        margin = style.margin_v,
    )?;
    writeln!(f)?;
    writeln!(f, "[Events]")?;
    writeln!(
        f,
        "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text"
    )?;

    for line in events {
        writeln!(
            f,
            "Dialogue: 0,{},{},Default,,0,0,0,,{}",
            ass_time(line.base.start),
            ass_time(line.base.end),
            ass_escape(&line.base.text),
        )?;
        for word in &line.words {
            writeln!(
                f,
                "Dialogue: 1,{},{},Default,,0,0,0,,{}",
                ass_time(word.start),
                ass_time(word.end),
                ass_highlight(&ass_escape(&word.text), &style.highlight_colour),
            )?;
        }
    }

    Ok(())
}

impl Composer for FfmpegComposer {
    fn compose(&self, job: &RenderJob) -> Result<PathBuf, PipelineError> {
        let config = &self.config;
        info!("Creating final video {}", job.output_path.display());

        if let Some(parent) = job.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| PipelineError::Render(format!("creating output dir: {e}")))?;
            }
        }

        let mut filter = crop_scale_filter(
            job.background.info.width,
            job.background.info.height,
            config.width,
            config.height,
        );

        if !job.events.is_empty() {
            let ass_path = job.scratch_dir.join("subs.ass");
            write_ass(&ass_path, &job.events, &config.subtitle, config.width, config.height)
                .map_err(|e| PipelineError::Render(format!("writing subtitles: {e}")))?;
            debug!("Subtitles written to {}", ass_path.display());
            filter.push_str(&format!(",ass={}", ass_path.display()));
        }

        // Encode next to the final path, promote only on success.
        let mut part_name = job
            .output_path
            .file_name()
            .map(|n| n.to_os_string())
            .ok_or_else(|| PipelineError::Render("output path has no file name".into()))?;
        part_name.push(".part.mp4");
        let part_path = job.output_path.with_file_name(part_name);

        let duration = format!("{:.3}", job.duration);
        let fps = config.fps.to_string();
        let threads = config.threads.to_string();

        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-y", "-stream_loop", "-1", "-i"])
            .arg(&job.background.path);
        if let Some(audio) = &job.audio {
            cmd.arg("-i").arg(audio);
        }
        cmd.args(["-vf", &filter, "-map", "0:v:0"]);
        if job.audio.is_some() {
            cmd.args(["-map", "1:a:0", "-c:a", &config.audio_codec]);
        } else {
            cmd.arg("-an");
        }
        cmd.args(["-c:v", &config.video_codec, "-preset", &config.preset]);
        if let Some(bitrate) = &config.video_bitrate {
            cmd.args(["-b:v", bitrate]);
        }
        cmd.args(["-r", &fps, "-threads", &threads, "-t", &duration, "-f", "mp4"]);
        cmd.arg(&part_path);

        debug!("Running ffmpeg: {:?}", cmd);
        let status = cmd
            .status()
            .map_err(|e| PipelineError::Render(format!("spawning ffmpeg: {e}")))?;
        if !status.success() {
            let _ = fs::remove_file(&part_path);
            error!("ffmpeg failed to produce final video");
            return Err(PipelineError::Render(format!(
                "ffmpeg exited with {status}"
            )));
        }

        fs::rename(&part_path, &job.output_path)
            .map_err(|e| PipelineError::Render(format!("promoting output: {e}")))?;
        info!("Video ready: {}", job.output_path.display());
        Ok(job.output_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::HighlightEvent;

    #[test]
    fn ass_time_formats_centiseconds() {
        assert_eq!(ass_time(0.0), "0:00:00.00");
        assert_eq!(ass_time(1.5), "0:00:01.50");
        assert_eq!(ass_time(61.25), "0:01:01.25");
        assert_eq!(ass_time(3600.0), "1:00:00.00");
    }

    #[test]
    fn marker_becomes_colour_override() {
        let out = ass_highlight("I [cried.] I jumped.", "&H00FFFF&");
        assert_eq!(out, r"I {\1c&H00FFFF&}cried.{\1c&HFFFFFF&} I jumped.");
    }

    #[test]
    fn braces_are_neutralized() {
        assert_eq!(ass_escape("a {b} c"), "a (b) c");
    }

    #[test]
    fn ass_file_lists_base_then_word_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subs.ass");
        let events = vec![LineEvents {
            base: HighlightEvent {
                text: "hello world".into(),
                start: 0.0,
                end: 1.0,
            },
            words: vec![HighlightEvent {
                text: "[hello] world".into(),
                start: 0.0,
                end: 0.5,
            }],
        }];
        write_ass(&path, &events, &SubtitleStyle::default(), 1080, 1920).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        let base_at = contents.find("Dialogue: 0,").unwrap();
        let word_at = contents.find("Dialogue: 1,").unwrap();
        assert!(base_at < word_at);
        assert!(contents.contains("PlayResX: 1080"));
        assert!(contents.contains(r"{\1c&H00FFFF&}hello{\1c&HFFFFFF&} world"));
    }
}
