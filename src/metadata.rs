use log::debug;
use serde::Deserialize;
use tokio::process::Command;

use crate::error::{Error, Unavailable};
use crate::{MetadataSource, VideoMetadata};

/// Subset of `yt-dlp --dump-json` we care about
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct YtDlpInfo {
    title: Option<String>,
    channel: Option<String>,
    uploader: Option<String>,
    upload_date: Option<String>,
    duration: Option<f64>,
    view_count: Option<u64>,
    description: Option<String>,
    thumbnail: Option<String>,
}

impl From<YtDlpInfo> for VideoMetadata {
    fn from(info: YtDlpInfo) -> Self {
        VideoMetadata {
            title: info.title,
            channel: info.channel.or(info.uploader),
            upload_date: info.upload_date,
            duration: info.duration.filter(|d| *d >= 0.0).map(|d| d.round() as u64),
            view_count: info.view_count,
            description: info.description,
            thumbnail: info.thumbnail,
        }
    }
}

/// Metadata probe backed by the yt-dlp executable
pub struct YtDlp {
    program: String,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

impl YtDlp {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }
}

impl MetadataSource for YtDlp {
    async fn metadata(&self, url: &str) -> Result<VideoMetadata, Error> {
        debug!("Probing metadata via {}: {url}", self.program);

        let output = Command::new(&self.program)
            .args([
                "--dump-json",
                "--skip-download",
                "--no-playlist",
                "--no-warnings",
                "--quiet",
                url,
            ])
            .output()
            .await;

        let output = match output {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::metadata(
                    Unavailable::ToolMissing,
                    format!(
                        "{} not found. Install it to fetch metadata:\n  pip install yt-dlp\n  or: brew install yt-dlp",
                        self.program
                    ),
                ));
            }
            Err(e) => {
                return Err(Error::metadata(
                    Unavailable::Other,
                    format!("failed to run {}: {e}", self.program),
                ));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("{} exited with status {}", self.program, output.status)
            } else {
                stderr
            };
            return Err(Error::metadata(Unavailable::classify(&message), message));
        }

        parse_metadata_json(&String::from_utf8_lossy(&output.stdout))
    }
}

fn parse_metadata_json(json: &str) -> Result<VideoMetadata, Error> {
    let info: YtDlpInfo = serde_json::from_str(json.trim())
        .map_err(|e| Error::metadata(Unavailable::Other, format!("could not parse yt-dlp output: {e}")))?;
    Ok(info.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_metadata_json() {
        let json = r#"{
            "id": "dQw4w9WgXcQ",
            "title": "Never Gonna Give You Up",
            "channel": "Rick Astley",
            "uploader": "RickAstleyVEVO",
            "upload_date": "20091025",
            "duration": 212,
            "view_count": 1500000000,
            "description": "The official video",
            "thumbnail": "https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg",
            "formats": []
        }"#;

        let meta = parse_metadata_json(json).unwrap();
        assert_eq!(meta.title.as_deref(), Some("Never Gonna Give You Up"));
        assert_eq!(meta.channel.as_deref(), Some("Rick Astley"));
        assert_eq!(meta.upload_date.as_deref(), Some("20091025"));
        assert_eq!(meta.duration, Some(212));
        assert_eq!(meta.view_count, Some(1_500_000_000));
        assert_eq!(meta.description.as_deref(), Some("The official video"));
        assert!(meta.thumbnail.unwrap().ends_with("maxresdefault.jpg"));
    }

    #[test]
    fn test_parse_metadata_channel_falls_back_to_uploader() {
        let meta = parse_metadata_json(r#"{"uploader": "someone", "duration": 59.6}"#).unwrap();
        assert_eq!(meta.channel.as_deref(), Some("someone"));
        assert_eq!(meta.duration, Some(60));
        assert!(meta.title.is_none());
    }

    #[test]
    fn test_parse_metadata_invalid_json() {
        assert!(matches!(
            parse_metadata_json("ERROR: not json"),
            Err(Error::MetadataUnavailable { reason: Unavailable::Other, .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let probe = YtDlp::new("ytcap-test-no-such-program");
        let err = probe.metadata("https://youtu.be/abc").await.unwrap_err();
        assert!(matches!(
            err,
            Error::MetadataUnavailable { reason: Unavailable::ToolMissing, .. }
        ));
    }
}
