use std::path::{Path, PathBuf};

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::compose::{Composer, RenderJob};
use crate::config::Config;
use crate::error::{PipelineError, SynthesisError};
use crate::highlight::{self, LineEvents};
use crate::probe::MediaProbe;
use crate::segment;
use crate::session::RunSession;
use crate::story::{self, StorySource};
use crate::theme::{self, Theme, VoiceIdentity, DEFAULT_VOICE};
use crate::timing::{self, TokenTiming};
use crate::tts::SpeechSynthesizer;
use crate::video::{self, BackgroundVideo};

/// One requested run: where the story comes from, plus optional overrides for
/// the background clip and the narrator voice.
pub struct RunRequest {
    pub source: StorySource,
    pub video: Option<PathBuf>,
    pub voice: Option<VoiceIdentity>,
}

// Per-stage state, threaded through the run. Each stage consumes the previous
// stage's value and returns the next; nothing is mutated in place.

struct StoryReady {
    story: String,
}

struct ThemeClassified {
    story: String,
    #[allow(dead_code)]
    theme: Theme,
    voice: VoiceIdentity,
}

struct SpeechAttempted {
    story: String,
    voice: VoiceIdentity,
    audio: Option<PathBuf>,
}

struct TimingReady {
    audio: Option<PathBuf>,
    duration: f64,
    events: Vec<LineEvents>,
}

/// Sequences classification, synthesis, timing, segmentation, highlighting and
/// composition for one run, owning the retry/fallback policy throughout.
pub struct Orchestrator {
    config: Config,
    synthesizer: Box<dyn SpeechSynthesizer>,
    composer: Box<dyn Composer>,
    probe: Box<dyn MediaProbe>,
    http: reqwest::Client,
}

impl Orchestrator {
    pub fn new(
        config: Config,
        synthesizer: Box<dyn SpeechSynthesizer>,
        composer: Box<dyn Composer>,
        probe: Box<dyn MediaProbe>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            config,
            synthesizer,
            composer,
            probe,
            http,
        }
    }

    pub async fn run(&self, request: RunRequest) -> anyhow::Result<PathBuf> {
        let session = RunSession::new()?;
        info!("Run {} started", session.id());

        let ready = self.obtain_story(&request).await?;
        let classified = self.classify(ready, request.voice);
        let attempted = self.attempt_speech(&session, classified).await;
        let timed = self.derive_timings(attempted).await;
        let background = self.select_background(request.video.as_deref())?;
        let output = self.render(&session, timed, background)?;

        info!("Run {} done", session.id());
        Ok(output)
    }

    async fn obtain_story(&self, request: &RunRequest) -> Result<StoryReady, PipelineError> {
        let story = story::resolve(
            &request.source,
            &self.http,
            self.config.openai_api_key.as_deref(),
        )
        .await
        .map_err(|e| PipelineError::Input(e.to_string()))?;

        if story.trim().is_empty() {
            return Err(PipelineError::Input("story text is empty".into()));
        }
        info!("Using story (preview): {:.200}", story.replace('\n', " "));
        Ok(StoryReady { story })
    }

    fn classify(&self, ready: StoryReady, voice_override: Option<VoiceIdentity>) -> ThemeClassified {
        let (theme, voice) = theme::classify(&ready.story);
        let voice = match voice_override {
            Some(chosen) => {
                info!("Voice overridden to \"{}\"", chosen.name);
                chosen
            }
            None => voice,
        };
        ThemeClassified {
            story: ready.story,
            theme,
            voice,
        }
    }

    /// Synthesis with bounded backoff on transient failures and a one-shot
    /// substitution of the default voice when the chosen voice is rejected.
    /// Total failure degrades to a silent run instead of halting.
    async fn attempt_speech(&self, session: &RunSession, classified: ThemeClassified) -> SpeechAttempted {
        if self.config.elevenlabs_api_key.is_none() {
            warn!("No ELEVENLABS_API_KEY set; final video will have no audio");
            return SpeechAttempted {
                story: classified.story,
                voice: classified.voice,
                audio: None,
            };
        }

        let out_path = session.scratch_path("speech.mp3");
        let mut voice = classified.voice;
        let mut fell_back = voice == DEFAULT_VOICE;
        let mut attempt = 0u32;

        let audio = loop {
            attempt += 1;
            match self
                .synthesizer
                .synthesize(&classified.story, &voice, &out_path)
                .await
            {
                Ok(()) => break Some(out_path),
                Err(e) if e.is_transient() && attempt < self.config.retry.max_attempts => {
                    let delay = self.config.retry.delay(attempt);
                    warn!("Synthesis attempt {attempt} failed ({e}); retrying in {delay:?}");
                    sleep(delay).await;
                }
                Err(SynthesisError::VoiceRejected { voice: rejected, message }) if !fell_back => {
                    warn!(
                        "Voice \"{rejected}\" rejected ({message}); retrying with \"{}\"",
                        DEFAULT_VOICE.name
                    );
                    voice = DEFAULT_VOICE;
                    fell_back = true;
                    attempt = 0;
                }
                Err(e) => {
                    let err = PipelineError::Synthesis(e.to_string());
                    error!("{err}; proceeding without audio");
                    break None;
                }
            }
        };

        SpeechAttempted {
            story: classified.story,
            voice,
            audio,
        }
    }

    /// Turn the narration into timed overlay events. Provider timings are
    /// preferred; otherwise the total duration is distributed across tokens.
    /// With no audio at all, subtitles are skipped and the run is video-only.
    async fn derive_timings(&self, attempted: SpeechAttempted) -> TimingReady {
        let Some(audio) = attempted.audio else {
            return TimingReady {
                audio: None,
                duration: self.config.default_duration,
                events: Vec::new(),
            };
        };

        let duration = match self.probe.audio_duration(&audio) {
            Ok(d) if d > 0.0 => d,
            Ok(_) | Err(_) => {
                warn!("Could not measure narration duration; proceeding without audio");
                return TimingReady {
                    audio: None,
                    duration: self.config.default_duration,
                    events: Vec::new(),
                };
            }
        };
        info!("Narration duration: {duration:.2}s");

        let timings = match self
            .fetch_word_timings(&attempted.story, &attempted.voice)
            .await
        {
            Ok(Some(timings)) => timings,
            Ok(None) | Err(_) => {
                info!("Estimating word timings from narration duration");
                let tokens = timing::tokenize(&attempted.story);
                match timing::estimate_with(self.config.estimator, duration, &tokens) {
                    Ok(timings) => timings,
                    Err(e) => {
                        warn!("Timing estimation failed ({e}); skipping subtitles");
                        return TimingReady {
                            audio: Some(audio),
                            duration,
                            events: Vec::new(),
                        };
                    }
                }
            }
        };

        let lines = segment::segment_with(&self.config.segmenter, timings);
        info!("Segmented narration into {} subtitle lines", lines.len());
        let events = lines.iter().map(highlight::render).collect();
        TimingReady {
            audio: Some(audio),
            duration,
            events,
        }
    }

    async fn fetch_word_timings(
        &self,
        story: &str,
        voice: &VoiceIdentity,
    ) -> Result<Option<Vec<TokenTiming>>, PipelineError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.synthesizer.word_timings(story, voice).await {
                Ok(timings) => return Ok(timings),
                Err(e) if e.is_transient() && attempt < self.config.retry.max_attempts => {
                    let delay = self.config.retry.delay(attempt);
                    warn!("Timing request attempt {attempt} failed ({e}); retrying in {delay:?}");
                    sleep(delay).await;
                }
                Err(e) => {
                    warn!("Word timings unavailable: {e}");
                    return Err(PipelineError::TimingUnavailable(e.to_string()));
                }
            }
        }
    }

    fn select_background(&self, explicit: Option<&Path>) -> Result<BackgroundVideo, PipelineError> {
        match explicit {
            Some(path) => video::open_background(self.probe.as_ref(), path),
            None => video::pick_background(self.probe.as_ref(), &self.config.videos_dir),
        }
    }

    fn render(
        &self,
        session: &RunSession,
        timed: TimingReady,
        background: BackgroundVideo,
    ) -> Result<PathBuf, PipelineError> {
        let job = RenderJob {
            background,
            audio: timed.audio,
            duration: timed.duration,
            events: timed.events,
            scratch_dir: session.scratch_dir().to_path_buf(),
            output_path: self.config.output_path.clone(),
        };
        self.composer.compose(&job)
    }
}
