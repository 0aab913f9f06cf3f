use std::path::PathBuf;

use clap::Parser;

/// Create short vertical narrated videos with word-highlighted subtitles.
#[derive(Parser, Debug)]
pub struct Args {
    /// Story text to narrate. Omit to read --input-file or auto-generate.
    #[clap(long)]
    pub story: Option<String>,

    /// Read the story from a text file.
    #[clap(long)]
    pub input_file: Option<PathBuf>,

    /// Background clip to use instead of picking one at random.
    #[clap(long)]
    pub video: Option<PathBuf>,

    /// Directory of candidate background clips.
    #[clap(long)]
    pub videos_dir: Option<PathBuf>,

    /// Narrator voice by display name (e.g. Rachel, Adam); overrides the
    /// theme-selected voice.
    #[clap(long)]
    pub voice: Option<String>,

    /// Output video path.
    #[clap(long)]
    pub out: Option<PathBuf>,

    #[clap(long)]
    pub width: Option<u32>,

    #[clap(long)]
    pub height: Option<u32>,

    #[clap(long)]
    pub fps: Option<u32>,

    /// Enable debug logging.
    #[clap(long)]
    pub debug: bool,
}
