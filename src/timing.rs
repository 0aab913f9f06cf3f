use crate::error::PipelineError;

/// One word (or punctuation run) with its start/end time in the narration.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenTiming {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// Weighting constants for the estimator. Empirical values carried over from
/// the tuned defaults; kept configurable rather than hard-coded.
#[derive(Debug, Clone, Copy)]
pub struct EstimatorParams {
    /// Divisor applied to `len(token) * avg` when weighting by word length.
    pub length_divisor: f64,
    /// Floor so no token gets a zero-length, invisible interval.
    pub min_token_seconds: f64,
}

impl Default for EstimatorParams {
    fn default() -> Self {
        Self {
            length_divisor: 5.0,
            min_token_seconds: 0.1,
        }
    }
}

/// Split a story into the token sequence the estimator and segmenter consume.
/// Whitespace-delimited; punctuation stays attached to its word.
pub fn tokenize(story: &str) -> Vec<String> {
    story.split_whitespace().map(str::to_string).collect()
}

/// Distribute `total_duration` across `tokens`, weighted by token length,
/// then rescale so the last token ends exactly at `total_duration`.
pub fn estimate(total_duration: f64, tokens: &[String]) -> Result<Vec<TokenTiming>, PipelineError> {
    estimate_with(EstimatorParams::default(), total_duration, tokens)
}

pub fn estimate_with(
    params: EstimatorParams,
    total_duration: f64,
    tokens: &[String],
) -> Result<Vec<TokenTiming>, PipelineError> {
    if tokens.is_empty() || total_duration <= 0.0 {
        return Err(PipelineError::EmptyInput);
    }

    let avg = total_duration / tokens.len() as f64;
    let mut timings = Vec::with_capacity(tokens.len());
    let mut cursor = 0.0_f64;

    for token in tokens {
        let weight = (token.chars().count() as f64 * avg / params.length_divisor)
            .max(params.min_token_seconds);
        timings.push(TokenTiming {
            text: token.clone(),
            start: cursor,
            end: cursor + weight,
        });
        cursor += weight;
    }

    // The floor guarantees cursor > 0, so the scale is always finite.
    if cursor != total_duration {
        let scale = total_duration / cursor;
        for timing in &mut timings {
            timing.start *= scale;
            timing.end *= scale;
        }
    }

    Ok(timings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn covers_full_duration() {
        let timings = estimate(7.5, &tokens(&["one", "two", "three", "four"])).unwrap();
        assert_eq!(timings.len(), 4);
        assert!(timings[0].start.abs() < TOL);
        assert!((timings.last().unwrap().end - 7.5).abs() < TOL);
    }

    #[test]
    fn contiguous_and_monotonic() {
        let timings = estimate(3.0, &tokens(&["a", "longer", "word", "sequence", "here"])).unwrap();
        for pair in timings.windows(2) {
            assert!((pair[0].end - pair[1].start).abs() < TOL);
            assert!(pair[0].start <= pair[1].start);
        }
        for timing in &timings {
            assert!(timing.end > timing.start);
        }
    }

    #[test]
    fn longer_token_gets_more_time() {
        let timings = estimate(4.0, &tokens(&["hi", "elaborate"])).unwrap();
        let short = timings[0].end - timings[0].start;
        let long = timings[1].end - timings[1].start;
        assert!(long > short);
    }

    #[test]
    fn single_short_token_still_positive() {
        // Floor keeps the pre-rescale cursor above zero for degenerate inputs.
        let timings = estimate(0.01, &tokens(&["a"])).unwrap();
        assert!((timings[0].end - 0.01).abs() < TOL);
        assert!(timings[0].end > timings[0].start);
    }

    #[test]
    fn rejects_empty_tokens() {
        assert!(matches!(
            estimate(1.0, &[]),
            Err(PipelineError::EmptyInput)
        ));
    }

    #[test]
    fn rejects_non_positive_duration() {
        assert!(matches!(
            estimate(0.0, &tokens(&["word"])),
            Err(PipelineError::EmptyInput)
        ));
    }

    #[test]
    fn tokenize_keeps_punctuation_attached() {
        assert_eq!(
            tokenize("I cried. I jumped."),
            vec!["I", "cried.", "I", "jumped."]
        );
    }
}
