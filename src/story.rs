use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Shipped story used whenever no other source produces text. Keeps the
/// pipeline runnable with no API key configured.
pub const FALLBACK_STORY: &str = "In the shadow of towering skyscrapers, a homeless man named Marcus carefully unfolds a tattered photograph. It shows a smiling family, his family, from a time before addiction took everything. Each morning, he places a small origami crane beside the photo, a promise he made to his daughter. \"One thousand cranes, and I'll come home clean,\" he whispers. Today marks crane number 973. A businessman who passes Marcus daily notices the growing collection. Without a word, he sits down and begins folding paper. Sometimes healing begins with the smallest acts of kindness from unexpected places.";

const SYSTEM_PROMPT: &str = "You are a creative storyteller.";
const USER_PROMPT: &str = "Write a dramatic, emotional story for a 60-second video narration. Keep it concise (150-200 words) and engaging.";
const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Where the story text comes from. Resolution order for `Generate`:
/// generation endpoint, then the built-in fallback.
#[derive(Debug, Clone)]
pub enum StorySource {
    Direct(String),
    File(std::path::PathBuf),
    Generate,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Turn a story source into story text. Every path that can fail degrades to
/// the fallback story; only an unreadable `--input-file` is surfaced, since
/// the user named it explicitly.
pub async fn resolve(
    source: &StorySource,
    client: &reqwest::Client,
    api_key: Option<&str>,
) -> anyhow::Result<String> {
    match source {
        StorySource::Direct(text) => Ok(text.clone()),
        StorySource::File(path) => read_story_file(path),
        StorySource::Generate => match api_key {
            Some(key) => match generate(client, key).await {
                Ok(story) if !story.trim().is_empty() => Ok(story),
                Ok(_) => {
                    warn!("Generation returned an empty story; using fallback story");
                    Ok(FALLBACK_STORY.to_string())
                }
                Err(e) => {
                    warn!("Story generation failed ({e}); using fallback story");
                    Ok(FALLBACK_STORY.to_string())
                }
            },
            None => {
                warn!("No OPENAI_API_KEY set; using fallback story");
                Ok(FALLBACK_STORY.to_string())
            }
        },
    }
}

fn read_story_file(path: &Path) -> anyhow::Result<String> {
    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        anyhow::bail!("story file {} is empty", path.display());
    }
    Ok(text)
}

async fn generate(client: &reqwest::Client, api_key: &str) -> anyhow::Result<String> {
    info!("Generating story");
    let request = ChatRequest {
        model: "gpt-3.5-turbo",
        messages: vec![
            ChatMessage { role: "system", content: SYSTEM_PROMPT },
            ChatMessage { role: "user", content: USER_PROMPT },
        ],
    };

    let response: ChatResponse = client
        .post(COMPLETIONS_URL)
        .bearer_auth(api_key)
        .json(&request)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let story = response
        .choices
        .first()
        .map(|c| c.message.content.trim().to_string())
        .unwrap_or_default();
    Ok(story)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn direct_source_passes_through() {
        let client = reqwest::Client::new();
        let story = resolve(&StorySource::Direct("My story.".into()), &client, None)
            .await
            .unwrap();
        assert_eq!(story, "My story.");
    }

    #[tokio::test]
    async fn generate_without_key_uses_fallback() {
        let client = reqwest::Client::new();
        let story = resolve(&StorySource::Generate, &client, None).await.unwrap();
        assert_eq!(story, FALLBACK_STORY);
    }

    #[tokio::test]
    async fn file_source_reads_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "A story from a file.").unwrap();
        let client = reqwest::Client::new();
        let story = resolve(
            &StorySource::File(file.path().to_path_buf()),
            &client,
            None,
        )
        .await
        .unwrap();
        assert_eq!(story.trim(), "A story from a file.");
    }

    #[tokio::test]
    async fn empty_file_is_an_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let client = reqwest::Client::new();
        let result = resolve(
            &StorySource::File(file.path().to_path_buf()),
            &client,
            None,
        )
        .await;
        assert!(result.is_err());
    }
}
