use regex::Regex;
use tracing::{debug, info};

use crate::sentiment;

/// Coarse emotional classification of a story, driving voice selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Theme {
    Emotional,
    Dramatic,
    Comedic,
    Neutral,
    Mysterious,
    Energetic,
}

impl Theme {
    pub fn name(&self) -> &'static str {
        match self {
            Theme::Emotional => "emotional",
            Theme::Dramatic => "dramatic",
            Theme::Comedic => "comedic",
            Theme::Neutral => "neutral",
            Theme::Mysterious => "mysterious",
            Theme::Energetic => "energetic",
        }
    }
}

/// A narrator voice: display name plus the synthesis provider's voice id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceIdentity {
    pub name: &'static str,
    pub id: &'static str,
}

pub const DEFAULT_VOICE: VoiceIdentity = VoiceIdentity {
    name: "Adam",
    id: "pNInz6obpgDQGcFmaJgB",
};

const VOICES: &[(Theme, VoiceIdentity)] = &[
    (Theme::Emotional, VoiceIdentity { name: "Rachel", id: "21m00Tcm4TlvDq8ikWAM" }),
    (Theme::Dramatic, VoiceIdentity { name: "Bella", id: "EXAVITQu4vr4xnSDxMaL" }),
    (Theme::Comedic, VoiceIdentity { name: "Elli", id: "MF3mGyEYCl7XYWbV9V6O" }),
    (Theme::Neutral, DEFAULT_VOICE),
    (Theme::Mysterious, VoiceIdentity { name: "Antoni", id: "ErXwobaYiN019PkySvjV" }),
    (Theme::Energetic, VoiceIdentity { name: "Josh", id: "TxGEqnHWrfWFTfGW9XjX" }),
];

// Scoring order doubles as the tie-break priority: on equal non-zero scores
// the earlier theme wins.
const KEYWORDS: &[(Theme, &[&str])] = &[
    (Theme::Emotional, &[
        "love", "heart", "tears", "cry", "emotion", "feel", "loss", "grief", "sad", "sorrow",
    ]),
    (Theme::Dramatic, &[
        "death", "betrayal", "revenge", "fight", "battle", "war", "conflict", "tension", "dramatic",
    ]),
    (Theme::Comedic, &[
        "funny", "laugh", "joke", "humor", "silly", "ridiculous", "comedy", "amusing", "hilarious",
    ]),
    (Theme::Mysterious, &[
        "mystery", "secret", "unknown", "shadow", "dark", "hidden", "reveal", "discover",
    ]),
    (Theme::Energetic, &[
        "run", "jump", "race", "fast", "quick", "speed", "action", "energy", "exciting",
    ]),
];

/// Look up the narrator voice for a theme; themes without a mapping fall back
/// to the default voice.
pub fn voice_for(theme: Theme) -> VoiceIdentity {
    VOICES
        .iter()
        .find(|(t, _)| *t == theme)
        .map(|(_, v)| *v)
        .unwrap_or(DEFAULT_VOICE)
}

/// Look up a voice by its display name (CLI override). Unknown names fall
/// back to the default voice.
pub fn voice_by_name(name: &str) -> VoiceIdentity {
    VOICES
        .iter()
        .map(|(_, v)| *v)
        .find(|v| v.name.eq_ignore_ascii_case(name))
        .unwrap_or(DEFAULT_VOICE)
}

/// Score the story against the keyword table plus a sentiment adjustment and
/// pick the dominant theme. A zero maximum yields `Neutral`.
pub fn classify(story: &str) -> (Theme, VoiceIdentity) {
    let lowered = story.to_lowercase();

    let mut scores: Vec<(Theme, i32)> = KEYWORDS
        .iter()
        .map(|(theme, words)| {
            let hits = words
                .iter()
                .filter(|word| {
                    // Whole-word only: "scar" must not count inside "scared".
                    let re = Regex::new(&format!(r"\b{}\b", word)).unwrap();
                    re.is_match(&lowered)
                })
                .count() as i32;
            (*theme, hits)
        })
        .collect();

    let sentiment = sentiment::analyze(story);
    debug!(
        polarity = sentiment.polarity,
        subjectivity = sentiment.subjectivity,
        "sentiment for story"
    );

    for (theme, score) in &mut scores {
        if sentiment.polarity < -0.3 {
            match theme {
                Theme::Emotional => *score += 2,
                Theme::Dramatic => *score += 1,
                _ => {}
            }
        } else if sentiment.polarity > 0.3 {
            match theme {
                Theme::Comedic | Theme::Energetic => *score += 1,
                _ => {}
            }
        }
        if sentiment.subjectivity > 0.6 && *theme == Theme::Emotional {
            *score += 1;
        }
    }

    let mut best = (Theme::Neutral, 0);
    for (theme, score) in scores {
        debug!("theme {} scored {}", theme.name(), score);
        if score > best.1 {
            best = (theme, score);
        }
    }

    let theme = best.0;
    let voice = voice_for(theme);
    info!("Theme detected: {}", theme.name());
    info!("Voice selected: \"{}\"", voice.name);
    (theme, voice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emotional_story_picks_rachel() {
        let (theme, voice) =
            classify("I felt tears in my eyes as I remembered the loss of my loved one.");
        assert_eq!(theme, Theme::Emotional);
        assert_eq!(voice.name, "Rachel");
    }

    #[test]
    fn dramatic_story_picks_bella() {
        let (theme, voice) =
            classify("The battle raged on as the conflict between the two armies intensified.");
        assert_eq!(theme, Theme::Dramatic);
        assert_eq!(voice.name, "Bella");
    }

    #[test]
    fn comedic_story_picks_elli() {
        let (theme, voice) =
            classify("It was a hilarious and funny situation that made everyone laugh.");
        assert_eq!(theme, Theme::Comedic);
        assert_eq!(voice.name, "Elli");
    }

    #[test]
    fn empty_story_defaults_to_neutral() {
        let (theme, voice) = classify("");
        assert_eq!(theme, Theme::Neutral);
        assert_eq!(voice, DEFAULT_VOICE);
    }

    #[test]
    fn keywordless_story_defaults_to_neutral() {
        let (theme, _) = classify("The committee reviewed the quarterly figures.");
        assert_eq!(theme, Theme::Neutral);
    }

    #[test]
    fn keywords_match_whole_words_only() {
        // "running" must not match the "run" keyword.
        let (theme, _) = classify("The running total was recalculated.");
        assert_eq!(theme, Theme::Neutral);
    }

    #[test]
    fn classification_is_deterministic() {
        let story = "A secret hidden in the shadow of a dark mystery.";
        let first = classify(story);
        for _ in 0..5 {
            assert_eq!(classify(story), first);
        }
    }

    #[test]
    fn mysterious_keywords_pick_antoni() {
        let (theme, voice) = classify("A secret hidden in the shadow of a dark mystery.");
        assert_eq!(theme, Theme::Mysterious);
        assert_eq!(voice.name, "Antoni");
    }

    #[test]
    fn unknown_voice_name_falls_back_to_default() {
        assert_eq!(voice_by_name("NoSuchVoice"), DEFAULT_VOICE);
        assert_eq!(voice_by_name("rachel").name, "Rachel");
    }
}
