use std::path::PathBuf;
use std::process::Command;

use eyre::{Result, WrapErr};
use log::{debug, info, warn};

use ytcap::combine::combine;
use ytcap::config::Config;
use ytcap::metadata::YtDlp;
use ytcap::output;
use ytcap::youtube::{self, YouTubeCaptions};
use ytcap::{CaptionSource, MetadataSource};

mod cli;

use cli::{Cli, OutputFormat};

const DEFAULT_LANG: &str = "en";

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytcap.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytcap")
        .join("logs")
}

fn tool_version(name: &str) -> Option<String> {
    Command::new(name)
        .arg("--version")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| {
            String::from_utf8_lossy(&o.stdout)
                .trim()
                .lines()
                .next()
                .unwrap_or("")
                .to_string()
        })
}

fn build_after_help() -> String {
    let yt_dlp_line = match tool_version("yt-dlp") {
        Some(v) => format!("  \x1b[32m✅\x1b[0m yt-dlp     {v}"),
        None => "  \x1b[31m❌\x1b[0m yt-dlp     (not found, needed for video metadata)".to_string(),
    };

    format!(
        "\nREQUIRED TOOLS:\n{yt_dlp_line}\n\nConfig is read from: {}\nLogs are written to: {}",
        ytcap::config::config_path().display(),
        log_dir().join("ytcap.log").display()
    )
}

fn resolve_format(flag: Option<OutputFormat>, config: &Config) -> OutputFormat {
    flag.or_else(|| {
        config
            .default_format
            .as_deref()
            .and_then(|s| <OutputFormat as clap::ValueEnum>::from_str(s, true).ok())
    })
    .unwrap_or(OutputFormat::Text)
}

/// Print to stdout, or write to `path` and report where it went
fn emit(rendered: &str, path: Option<&PathBuf>) -> Result<()> {
    match path {
        Some(path) => {
            output::write_output(path, rendered)?;
            println!("Saved to {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

async fn run_transcript_only(
    cli: &Cli,
    config: &Config,
    captions: &impl CaptionSource,
    url: &str,
    lang: &str,
) -> Result<()> {
    let fragments = youtube::fetch_transcript(captions, url, lang)
        .await
        .wrap_err("could not retrieve transcript")?;

    if cli.verbose {
        eprintln!("Language: {lang}\nFragments: {}", fragments.len());
    }

    let rendered = match resolve_format(cli.format, config) {
        OutputFormat::Text => output::render_transcript(&fragments),
        OutputFormat::Json => serde_json::to_string_pretty(&fragments)?,
    };

    if cli.save_temp {
        let dir = config.resolve_temp_dir(cli.temp_dir.clone(), std::env::temp_dir());
        // fetch_transcript already validated the URL
        let video_id = ytcap::extract_video_id(url).unwrap_or_default();
        let now = chrono::Local::now().naive_local();
        let path = output::save_temp(&dir, &video_id, &rendered, now)?;
        println!("{}", path.display());
        return Ok(());
    }

    emit(&rendered, cli.output.as_ref())
}

/// Fetch, render and emit one video. An `Err` here means exit status 1.
async fn run(
    cli: &Cli,
    config: &Config,
    metadata: &impl MetadataSource,
    captions: &impl CaptionSource,
) -> Result<()> {
    let lang = config.resolve_lang(cli.language.as_deref(), DEFAULT_LANG);
    let url = cli.url.trim();
    debug!("url={url} lang={lang}");

    if cli.transcript_only {
        return run_transcript_only(cli, config, captions, url, &lang).await;
    }

    let combined = combine(metadata, captions, url, &lang, cli.metadata_only)
        .await
        .wrap_err("could not retrieve video metadata")?;

    if let Some(ref e) = combined.transcript_error {
        eprintln!("Transcript unavailable: {e}");
    }

    if cli.verbose {
        let fragments = combined
            .result
            .transcript
            .as_ref()
            .and_then(|t| t.transcript.as_ref())
            .map_or(0, |t| t.len());
        eprintln!(
            "Video: {}\nLanguage: {lang}\nFragments: {fragments}",
            combined.result.metadata.title.as_deref().unwrap_or("unknown"),
        );
    }

    let rendered = match resolve_format(cli.format, config) {
        OutputFormat::Text => output::render_text(&combined.result),
        OutputFormat::Json => output::render_json(&combined.result)?,
    };

    emit(&rendered, cli.output.as_ref())
}

/// Only probe yt-dlp when the help text will actually be shown
fn wants_help<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    args.into_iter()
        .skip(1)
        .any(|a| matches!(a.as_ref().to_str(), Some("-h" | "--help")))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    setup_logging()?;

    let mut cmd = <Cli as clap::CommandFactory>::command();
    if wants_help(std::env::args_os()) {
        cmd = cmd.after_help(build_after_help());
    }
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Ignoring config file: {e}");
        Config::default()
    });

    if cli.verbose {
        let config_path = ytcap::config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
    }

    let captions = YouTubeCaptions::new(reqwest::Client::new());
    run(&cli, &config, &YtDlp::default(), &captions).await
}
