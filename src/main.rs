use clap::Parser;
use tracing::{error, info};

mod args;
mod audio;
mod compose;
mod config;
mod error;
mod highlight;
mod orchestrator;
mod probe;
mod segment;
mod sentiment;
mod session;
mod story;
mod theme;
mod timing;
mod tts;
mod video;

use args::Args;
use compose::FfmpegComposer;
use config::Config;
use orchestrator::{Orchestrator, RunRequest};
use probe::FfprobeProbe;
use story::StorySource;
use tts::ElevenLabsClient;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(if args.debug { "debug" } else { "info" })
        .init();

    info!("Starting narrated video assembly pipeline");

    let mut config = Config::from_env();
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(fps) = args.fps {
        config.fps = fps;
    }
    if let Some(out) = &args.out {
        config.output_path = out.clone();
    }
    if let Some(videos_dir) = &args.videos_dir {
        config.videos_dir = videos_dir.clone();
    }

    let source = if let Some(text) = &args.story {
        StorySource::Direct(text.clone())
    } else if let Some(path) = &args.input_file {
        StorySource::File(path.clone())
    } else {
        StorySource::Generate
    };

    let request = RunRequest {
        source,
        video: args.video.clone(),
        voice: args.voice.as_deref().map(theme::voice_by_name),
    };

    let http = reqwest::Client::new();
    let synthesizer = ElevenLabsClient::new(
        http.clone(),
        config.elevenlabs_api_key.clone().unwrap_or_default(),
        config.stability,
        config.similarity_boost,
    );
    let composer = FfmpegComposer::new(config.clone());
    let orchestrator = Orchestrator::new(
        config,
        Box::new(synthesizer),
        Box::new(composer),
        Box::new(FfprobeProbe),
        http,
    );

    // Ctrl-C cancels the run future; dropping it drops the session scratch
    // dir before the process exits.
    let outcome = tokio::select! {
        result = orchestrator.run(request) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    match outcome {
        Some(Ok(output)) => {
            info!("Video ready: {}", output.display());
        }
        Some(Err(e)) => {
            error!("Run failed: {e:?}");
            std::process::exit(1);
        }
        None => {
            error!("Interrupted; scratch resources cleaned up");
            std::process::exit(1);
        }
    }
}
