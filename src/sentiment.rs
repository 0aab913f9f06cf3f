use regex::Regex;

/// Lexicon-based sentiment of a piece of text. Polarity in [-1, 1],
/// subjectivity in [0, 1]; both 0 when nothing in the text is scored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sentiment {
    pub polarity: f64,
    pub subjectivity: f64,
}

impl Sentiment {
    pub const NEUTRAL: Sentiment = Sentiment {
        polarity: 0.0,
        subjectivity: 0.0,
    };
}

// (word, polarity, subjectivity)
const LEXICON: &[(&str, f64, f64)] = &[
    // negative
    ("tears", -0.5, 0.8),
    ("cry", -0.6, 0.8),
    ("cried", -0.6, 0.8),
    ("crying", -0.6, 0.8),
    ("sad", -0.7, 0.9),
    ("grief", -0.8, 0.9),
    ("loss", -0.6, 0.7),
    ("lost", -0.4, 0.6),
    ("sorrow", -0.8, 0.9),
    ("death", -0.7, 0.6),
    ("died", -0.7, 0.6),
    ("betrayal", -0.8, 0.8),
    ("terrible", -0.9, 0.9),
    ("horrible", -0.9, 0.9),
    ("awful", -0.8, 0.9),
    ("worst", -1.0, 1.0),
    ("alone", -0.4, 0.6),
    ("broken", -0.5, 0.7),
    ("dark", -0.3, 0.5),
    ("fear", -0.6, 0.7),
    ("afraid", -0.6, 0.8),
    ("scared", -0.6, 0.8),
    ("angry", -0.6, 0.8),
    ("hate", -0.8, 0.9),
    ("pain", -0.6, 0.7),
    ("hurt", -0.6, 0.7),
    ("war", -0.6, 0.5),
    ("battle", -0.4, 0.5),
    ("conflict", -0.4, 0.5),
    ("tattered", -0.4, 0.6),
    ("homeless", -0.5, 0.5),
    // positive
    ("love", 0.5, 0.6),
    ("loved", 0.7, 0.8),
    ("happy", 0.8, 1.0),
    ("joy", 0.8, 0.9),
    ("funny", 0.5, 0.9),
    ("hilarious", 0.8, 1.0),
    ("laugh", 0.6, 0.8),
    ("laughed", 0.6, 0.8),
    ("amazing", 0.6, 0.9),
    ("wonderful", 1.0, 1.0),
    ("great", 0.8, 0.75),
    ("good", 0.7, 0.6),
    ("best", 1.0, 0.3),
    ("beautiful", 0.85, 1.0),
    ("exciting", 0.5, 0.8),
    ("fun", 0.4, 0.7),
    ("silly", 0.3, 0.9),
    ("amusing", 0.5, 0.8),
    ("kind", 0.6, 0.9),
    ("kindness", 0.6, 0.9),
    ("smile", 0.5, 0.7),
    ("smiling", 0.5, 0.7),
    ("hope", 0.4, 0.6),
    ("healing", 0.5, 0.6),
    ("win", 0.6, 0.6),
    ("victory", 0.7, 0.6),
    ("perfect", 1.0, 1.0),
];

const NEGATORS: &[&str] = &["not", "never", "no", "cannot", "can't", "don't", "didn't"];

/// Score `text` against the lexicon. Polarity and subjectivity are the means
/// over matched words; a negator immediately before a matched word dampens
/// and flips its polarity.
pub fn analyze(text: &str) -> Sentiment {
    let word_re = Regex::new(r"[a-z']+").unwrap();
    let lowered = text.to_lowercase();
    let words: Vec<&str> = word_re.find_iter(&lowered).map(|m| m.as_str()).collect();

    let mut polarity_sum = 0.0;
    let mut subjectivity_sum = 0.0;
    let mut matched = 0usize;

    for (i, word) in words.iter().enumerate() {
        if let Some(&(_, polarity, subjectivity)) =
            LEXICON.iter().find(|(entry, _, _)| entry == word)
        {
            let negated = i > 0 && NEGATORS.contains(&words[i - 1]);
            polarity_sum += if negated { -polarity * 0.5 } else { polarity };
            subjectivity_sum += subjectivity;
            matched += 1;
        }
    }

    if matched == 0 {
        return Sentiment::NEUTRAL;
    }

    Sentiment {
        polarity: (polarity_sum / matched as f64).clamp(-1.0, 1.0),
        subjectivity: (subjectivity_sum / matched as f64).clamp(0.0, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unscored_text_is_neutral() {
        assert_eq!(analyze("the quick brown fox"), Sentiment::NEUTRAL);
        assert_eq!(analyze(""), Sentiment::NEUTRAL);
    }

    #[test]
    fn grief_scores_negative_and_subjective() {
        let sentiment = analyze("Tears of grief and sorrow.");
        assert!(sentiment.polarity < -0.3);
        assert!(sentiment.subjectivity > 0.6);
    }

    #[test]
    fn comedy_scores_positive() {
        let sentiment = analyze("It was hilarious and funny, everyone would laugh.");
        assert!(sentiment.polarity > 0.3);
    }

    #[test]
    fn negation_flips_polarity() {
        let plain = analyze("happy");
        let negated = analyze("not happy");
        assert!(plain.polarity > 0.0);
        assert!(negated.polarity < 0.0);
    }

    #[test]
    fn deterministic_for_identical_input() {
        let story = "I cried when I lost the battle.";
        assert_eq!(analyze(story), analyze(story));
    }
}
