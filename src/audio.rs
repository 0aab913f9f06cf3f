use std::path::Path;

use hound::WavReader;

/// Duration of a WAV file, computed from the header without decoding.
pub fn wav_duration_seconds(path: &Path) -> anyhow::Result<f64> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let samples = reader.len();
    let frames = samples as f64 / spec.channels as f64;
    let duration = frames / spec.sample_rate as f64;
    Ok(duration)
}


#[cfg(test)]
mod tests {
    use super::test_support::write_test_wav;
    use super::*;

    #[test]
    fn duration_matches_written_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_test_wav(&path, 2.0);
        let duration = wav_duration_seconds(&path).unwrap();
        assert!((duration - 2.0).abs() < 1e-3);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(wav_duration_seconds(Path::new("does/not/exist.wav")).is_err());
    }
}
