use thiserror::Error;

/// Errors a run can end with. Pure stages only ever raise `EmptyInput`
/// (a contract violation, never retried); the I/O stages raise the rest.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No usable story text after every fallback path.
    #[error("no usable story text: {0}")]
    Input(String),

    /// Speech synthesis failed past all retries and the voice fallback.
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    /// Word timings could not be obtained; the caller falls back to estimation.
    #[error("word timings unavailable: {0}")]
    TimingUnavailable(String),

    /// No candidate clip exists, or every candidate failed to open.
    #[error("no usable background video in {0}")]
    NoBackgroundVideo(String),

    /// The composition stage failed to produce output.
    #[error("render failed: {0}")]
    Render(String),

    /// Estimator precondition violated: non-positive duration or empty tokens.
    #[error("estimator requires a positive duration and at least one token")]
    EmptyInput,
}

/// How a single synthesis attempt failed, which decides the recovery path:
/// transient failures are retried with backoff, a rejected voice is swapped
/// for the default voice once, fatal failures degrade the run to silent video.
#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("voice {voice} rejected by synthesis API: {message}")]
    VoiceRejected { voice: String, message: String },

    #[error("transient synthesis failure: {0}")]
    Transient(String),

    #[error("synthesis failure: {0}")]
    Fatal(String),
}

impl SynthesisError {
    pub fn is_transient(&self) -> bool {
        matches!(self, SynthesisError::Transient(_))
    }
}
