use std::fs;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::SynthesisError;
use crate::theme::VoiceIdentity;
use crate::timing::TokenTiming;

/// Narrow seam over the speech-synthesis provider so the orchestrator can be
/// driven by a deterministic fake in tests.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize narration for `text` with `voice`, persisting the audio
    /// bytes to `out_path`.
    async fn synthesize(
        &self,
        text: &str,
        voice: &VoiceIdentity,
        out_path: &Path,
    ) -> Result<(), SynthesisError>;

    /// Request word-level timings for the same text/voice. `Ok(None)` means
    /// the provider has no timings; the caller falls back to estimation.
    async fn word_timings(
        &self,
        text: &str,
        voice: &VoiceIdentity,
    ) -> Result<Option<Vec<TokenTiming>>, SynthesisError>;
}

const API_BASE: &str = "https://api.elevenlabs.io/v1/text-to-speech";
const MODEL_ID: &str = "eleven_monolingual_v1";

/// ElevenLabs text-to-speech client.
pub struct ElevenLabsClient {
    client: reqwest::Client,
    api_key: String,
    stability: f64,
    similarity_boost: f64,
}

impl ElevenLabsClient {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        stability: f64,
        similarity_boost: f64,
    ) -> Self {
        Self {
            client,
            api_key,
            stability,
            similarity_boost,
        }
    }

    fn body<'a>(&self, text: &'a str, output_format: Option<&'a str>) -> SynthesisRequest<'a> {
        SynthesisRequest {
            text,
            model_id: MODEL_ID,
            voice_settings: VoiceSettings {
                stability: self.stability,
                similarity_boost: self.similarity_boost,
            },
            output_format,
        }
    }
}

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_format: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f64,
    similarity_boost: f64,
}

#[derive(Debug, Deserialize)]
struct TimingResponse {
    word_timings: Option<Vec<RawWordTiming>>,
}

#[derive(Debug, Deserialize)]
struct RawWordTiming {
    word: String,
    start: f64,
    end: f64,
}

fn classify_status(
    voice: &VoiceIdentity,
    status: reqwest::StatusCode,
    body: String,
) -> SynthesisError {
    if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::BAD_REQUEST {
        SynthesisError::VoiceRejected {
            voice: voice.name.to_string(),
            message: format!("{status} - {body}"),
        }
    } else if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        SynthesisError::Transient(format!("{status} - {body}"))
    } else {
        SynthesisError::Fatal(format!("{status} - {body}"))
    }
}

fn request_error(e: reqwest::Error) -> SynthesisError {
    // Connection-level failures are worth another attempt.
    if e.is_connect() || e.is_timeout() {
        SynthesisError::Transient(e.to_string())
    } else {
        SynthesisError::Fatal(e.to_string())
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    async fn synthesize(
        &self,
        text: &str,
        voice: &VoiceIdentity,
        out_path: &Path,
    ) -> Result<(), SynthesisError> {
        info!("Generating speech with voice \"{}\"", voice.name);
        let url = format!("{API_BASE}/{}/stream", voice.id);
        let response = self
            .client
            .post(&url)
            .header("Accept", "audio/mpeg")
            .header("xi-api-key", &self.api_key)
            .json(&self.body(text, None))
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(voice, status, body));
        }

        let bytes = response.bytes().await.map_err(request_error)?;
        fs::write(out_path, &bytes)
            .map_err(|e| SynthesisError::Fatal(format!("writing {}: {e}", out_path.display())))?;
        info!("Speech written to {} ({} bytes)", out_path.display(), bytes.len());
        Ok(())
    }

    async fn word_timings(
        &self,
        text: &str,
        voice: &VoiceIdentity,
    ) -> Result<Option<Vec<TokenTiming>>, SynthesisError> {
        debug!("Requesting word timings for voice \"{}\"", voice.name);
        let url = format!("{API_BASE}/{}", voice.id);
        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .header("xi-api-key", &self.api_key)
            .json(&self.body(text, Some("json_format")))
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(voice, status, body));
        }

        let parsed: TimingResponse = response.json().await.map_err(request_error)?;
        match parsed.word_timings {
            Some(raw) if !raw.is_empty() => {
                info!("Provider returned timings for {} words", raw.len());
                Ok(Some(
                    raw.into_iter()
                        .map(|w| TokenTiming {
                            text: w.word,
                            start: w.start,
                            end: w.end,
                        })
                        .collect(),
                ))
            }
            _ => {
                warn!("Provider response carried no word timings");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::DEFAULT_VOICE;

    #[test]
    fn not_found_is_a_voice_rejection() {
        let err = classify_status(&DEFAULT_VOICE, reqwest::StatusCode::NOT_FOUND, String::new());
        assert!(matches!(err, SynthesisError::VoiceRejected { .. }));
    }

    #[test]
    fn server_errors_are_transient() {
        let err = classify_status(
            &DEFAULT_VOICE,
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            String::new(),
        );
        assert!(err.is_transient());
        let err = classify_status(
            &DEFAULT_VOICE,
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            String::new(),
        );
        assert!(err.is_transient());
    }

    #[test]
    fn auth_failure_is_fatal() {
        let err = classify_status(&DEFAULT_VOICE, reqwest::StatusCode::UNAUTHORIZED, String::new());
        assert!(matches!(err, SynthesisError::Fatal(_)));
    }

    #[test]
    fn timing_response_parses_word_array() {
        let raw = r#"{"word_timings":[{"word":"hello","start":0.0,"end":0.4}]}"#;
        let parsed: TimingResponse = serde_json::from_str(raw).unwrap();
        let timings = parsed.word_timings.unwrap();
        assert_eq!(timings[0].word, "hello");
        assert_eq!(timings[0].end, 0.4);
    }

    #[test]
    fn timing_response_tolerates_missing_array() {
        let parsed: TimingResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.word_timings.is_none());
    }
}
