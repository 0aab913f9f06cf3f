use crate::timing::TokenTiming;

/// Line-packing thresholds. Empirical; a line flushes at `max_tokens`, or at
/// `punct_break_min_tokens` once a bare punctuation token lands on it.
#[derive(Debug, Clone)]
pub struct SegmenterParams {
    pub max_tokens: usize,
    pub punct_break_min_tokens: usize,
    pub break_punctuation: Vec<String>,
}

impl Default for SegmenterParams {
    fn default() -> Self {
        Self {
            max_tokens: 7,
            punct_break_min_tokens: 5,
            break_punctuation: [".", ",", "!", "?", ";", ":"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

/// A display-grouped run of consecutive tokens sharing one on-screen lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleLine {
    pub tokens: Vec<TokenTiming>,
}

impl SubtitleLine {
    pub fn start(&self) -> f64 {
        self.tokens.first().map(|t| t.start).unwrap_or(0.0)
    }

    pub fn end(&self) -> f64 {
        self.tokens.last().map(|t| t.end).unwrap_or(0.0)
    }

    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Greedy single pass grouping tokens into display lines. Every input token
/// lands in exactly one line, in order.
pub fn segment(tokens: Vec<TokenTiming>) -> Vec<SubtitleLine> {
    segment_with(&SegmenterParams::default(), tokens)
}

pub fn segment_with(params: &SegmenterParams, tokens: Vec<TokenTiming>) -> Vec<SubtitleLine> {
    let mut lines = Vec::new();
    let mut pending: Vec<TokenTiming> = Vec::new();

    for token in tokens {
        let is_break_punct = params
            .break_punctuation
            .iter()
            .any(|p| p == token.text.trim());
        pending.push(token);

        if pending.len() >= params.max_tokens
            || (pending.len() >= params.punct_break_min_tokens && is_break_punct)
        {
            lines.push(SubtitleLine {
                tokens: std::mem::take(&mut pending),
            });
        }
    }

    if !pending.is_empty() {
        lines.push(SubtitleLine { tokens: pending });
    }

    lines
}
