use tracing::debug;

use crate::segment::SubtitleLine;

/// Marker wrapped around the active word in a highlight event. The composition
/// stage translates the markers into its own styling.
pub const MARK_OPEN: char = '[';
pub const MARK_CLOSE: char = ']';

/// A timed overlay instruction: the full line text, with at most one word
/// marked, shown for `[start, end)`.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightEvent {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// All overlay instructions for one line: the persistent unmarked caption,
/// then one marked rendering per word, in token order.
#[derive(Debug, Clone)]
pub struct LineEvents {
    pub base: HighlightEvent,
    pub words: Vec<HighlightEvent>,
}

/// Compute the overlay instructions for a line. Repeated words are matched
/// left to right: each token searches from the position consumed by the
/// tokens before it, so the second "I" marks the second occurrence.
pub fn render(line: &SubtitleLine) -> LineEvents {
    let line_text = line.text();
    let base = HighlightEvent {
        text: line_text.clone(),
        start: line.start(),
        end: line.end(),
    };

    let mut words = Vec::with_capacity(line.tokens.len());
    let mut consumed = 0;

    for token in &line.tokens {
        match line_text[consumed..].find(&token.text) {
            Some(offset) => {
                let at = consumed + offset;
                let after = at + token.text.len();
                let mut marked =
                    String::with_capacity(line_text.len() + 2 * MARK_OPEN.len_utf8());
                marked.push_str(&line_text[..at]);
                marked.push(MARK_OPEN);
                marked.push_str(&token.text);
                marked.push(MARK_CLOSE);
                marked.push_str(&line_text[after..]);
                words.push(HighlightEvent {
                    text: marked,
                    start: token.start,
                    end: token.end,
                });
                consumed = after;
            }
            None => {
                // Keep the base caption; one unmatched token never fails the line.
                debug!("token {:?} not found in line {:?}, skipping highlight", token.text, line_text);
            }
        }
    }

    LineEvents { base, words }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::TokenTiming;

    fn line(words: &[&str]) -> SubtitleLine {
        SubtitleLine {
            tokens: words
                .iter()
                .enumerate()
                .map(|(i, w)| TokenTiming {
                    text: w.to_string(),
                    start: i as f64 * 0.5,
                    end: (i + 1) as f64 * 0.5,
                })
                .collect(),
        }
    }

    #[test]
    fn base_event_spans_the_whole_line() {
        let events = render(&line(&["hello", "world"]));
        assert_eq!(events.base.text, "hello world");
        assert_eq!(events.base.start, 0.0);
        assert_eq!(events.base.end, 1.0);
    }

    #[test]
    fn each_word_gets_one_marked_event() {
        let events = render(&line(&["good", "morning"]));
        assert_eq!(events.words.len(), 2);
        assert_eq!(events.words[0].text, "[good] morning");
        assert_eq!(events.words[1].text, "good [morning]");
    }

    #[test]
    fn repeated_words_mark_successive_occurrences() {
        let events = render(&line(&["I", "cried.", "I", "jumped."]));
        assert_eq!(events.words[0].text, "[I] cried. I jumped.");
        assert_eq!(events.words[2].text, "I cried. [I] jumped.");
    }

    #[test]
    fn word_intervals_do_not_overlap_and_stay_in_line() {
        let events = render(&line(&["one", "two", "three", "four"]));
        for pair in events.words.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
        for word in &events.words {
            assert!(word.start >= events.base.start);
            assert!(word.end <= events.base.end);
        }
    }

    #[test]
    fn word_events_follow_token_order() {
        let events = render(&line(&["a", "b", "c"]));
        let starts: Vec<f64> = events.words.iter().map(|w| w.start).collect();
        assert_eq!(starts, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn substring_words_mark_the_right_spot() {
        // "in" is a substring of "singing"; the cursor keeps it honest.
        let events = render(&line(&["singing", "in", "rain"]));
        assert_eq!(events.words[1].text, "singing [in] rain");
    }
}
