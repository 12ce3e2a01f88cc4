pub mod combine;
pub mod config;
pub mod error;
pub mod metadata;
pub mod output;
pub mod youtube;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use error::{Error, Unavailable};

/// A single timed caption snippet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionFragment {
    pub start: f64,
    pub duration: f64,
    pub text: String,
}

/// Video details; any field may be missing upstream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoMetadata {
    pub title: Option<String>,
    pub channel: Option<String>,
    pub upload_date: Option<String>,
    pub duration: Option<u64>,
    pub view_count: Option<u64>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
}

/// Transcript half of a combined result. `transcript` is `None` when fetching failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptPart {
    pub transcript: Option<Vec<CaptionFragment>>,
    pub transcript_language: String,
}

/// Metadata plus, unless metadata-only was requested, the transcript outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedResult {
    #[serde(flatten)]
    pub metadata: VideoMetadata,
    #[serde(flatten)]
    pub transcript: Option<TranscriptPart>,
}

/// Something that can hand back the caption track of a video
#[allow(async_fn_in_trait)]
pub trait CaptionSource {
    async fn captions(&self, video_id: &str, lang: &str) -> Result<Vec<CaptionFragment>, Error>;
}

/// Something that can describe a video given its URL
#[allow(async_fn_in_trait)]
pub trait MetadataSource {
    async fn metadata(&self, url: &str) -> Result<VideoMetadata, Error>;
}

static WATCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?://)?(?:www\.)?youtube\.com/watch\?v=([^&\s]+)").expect("watch pattern compiles")
});

static SHORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?://)?(?:www\.)?youtu\.be/([^?&\s]+)").expect("short pattern compiles")
});

/// Extract video ID from a watch or youtu.be URL
pub fn extract_video_id(url: &str) -> Option<String> {
    [&*WATCH_RE, &*SHORT_RE]
        .iter()
        .find_map(|re| re.captures(url))
        .map(|caps| caps[1].to_string())
}
