use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Why an upstream service could not deliver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailable {
    NoCaptions,
    LanguageNotAvailable,
    PrivateVideo,
    RateLimited,
    Network,
    ToolMissing,
    Other,
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Unavailable::NoCaptions => "no captions",
            Unavailable::LanguageNotAvailable => "language not available",
            Unavailable::PrivateVideo => "private or restricted video",
            Unavailable::RateLimited => "rate limited",
            Unavailable::Network => "network error",
            Unavailable::ToolMissing => "tool missing",
            Unavailable::Other => "other",
        };
        write!(f, "{s}")
    }
}

impl Unavailable {
    /// Guess the cause from a free-form diagnostic such as yt-dlp's stderr
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("429") || lower.contains("too many requests") || lower.contains("rate-limit") {
            Unavailable::RateLimited
        } else if lower.contains("private video")
            || lower.contains("sign in")
            || lower.contains("members-only")
            || lower.contains("age-restricted")
            || lower.contains("not available in your country")
            || lower.contains("video unavailable")
            || lower.contains("has been removed")
        {
            Unavailable::PrivateVideo
        } else if lower.contains("timed out")
            || lower.contains("timeout")
            || lower.contains("connection")
            || lower.contains("dns")
            || lower.contains("network")
        {
            Unavailable::Network
        } else {
            Unavailable::Other
        }
    }

    /// Map a failed HTTP exchange to a cause
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        match err.status().map(|s| s.as_u16()) {
            Some(429) => Unavailable::RateLimited,
            Some(401) | Some(403) => Unavailable::PrivateVideo,
            Some(_) => Unavailable::Other,
            None if err.is_timeout() || err.is_connect() || err.is_request() => Unavailable::Network,
            None => Unavailable::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("not a recognized YouTube URL: {0}")]
    InvalidUrl(String),

    #[error("transcript unavailable ({reason}): {message}")]
    TranscriptUnavailable { reason: Unavailable, message: String },

    #[error("metadata unavailable ({reason}): {message}")]
    MetadataUnavailable { reason: Unavailable, message: String },

    #[error("could not write {}: {message}", .path.display())]
    OutputWrite { path: PathBuf, message: String },
}

impl Error {
    pub(crate) fn transcript(reason: Unavailable, message: impl Into<String>) -> Self {
        Error::TranscriptUnavailable {
            reason,
            message: message.into(),
        }
    }

    pub(crate) fn metadata(reason: Unavailable, message: impl Into<String>) -> Self {
        Error::MetadataUnavailable {
            reason,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_rate_limit() {
        assert_eq!(
            Unavailable::classify("ERROR: HTTP Error 429: Too Many Requests"),
            Unavailable::RateLimited
        );
    }

    #[test]
    fn test_classify_private() {
        assert_eq!(
            Unavailable::classify("ERROR: [youtube] abc: Private video. Sign in if you've been granted access"),
            Unavailable::PrivateVideo
        );
        assert_eq!(
            Unavailable::classify("ERROR: [youtube] abc: Video unavailable"),
            Unavailable::PrivateVideo
        );
    }

    #[test]
    fn test_classify_network() {
        assert_eq!(
            Unavailable::classify("Unable to download webpage: <urlopen error timed out>"),
            Unavailable::Network
        );
    }

    #[test]
    fn test_classify_other() {
        assert_eq!(Unavailable::classify("something odd happened"), Unavailable::Other);
    }

    #[test]
    fn test_error_display() {
        let err = Error::transcript(Unavailable::LanguageNotAvailable, "no 'ko' track");
        assert_eq!(err.to_string(), "transcript unavailable (language not available): no 'ko' track");

        let err = Error::OutputWrite {
            path: PathBuf::from("/nope/out.txt"),
            message: "denied".to_string(),
        };
        assert_eq!(err.to_string(), "could not write /nope/out.txt: denied");
    }
}
