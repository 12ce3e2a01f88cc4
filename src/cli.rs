use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "ytcap",
    about = "Fetch YouTube captions and video metadata",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// YouTube video URL (youtube.com/watch?v=ID or youtu.be/ID)
    pub url: String,

    /// Caption language code [default: en]
    #[arg(short, long)]
    pub language: Option<String>,

    /// Output format: text (default), json
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fetch metadata only, skip the transcript
    #[arg(long, conflicts_with = "transcript_only")]
    pub metadata_only: bool,

    /// Skip metadata and print only the timestamped transcript
    #[arg(long)]
    pub transcript_only: bool,

    /// With --transcript-only, save to a timestamped file in the temp directory
    #[arg(long, requires = "transcript_only", conflicts_with = "output")]
    pub save_temp: bool,

    /// Directory used by --save-temp (defaults to config, then TMPDIR)
    #[arg(long)]
    pub temp_dir: Option<PathBuf>,

    /// Show config and fetch details on stderr
    #[arg(short, long)]
    pub verbose: bool,
}
