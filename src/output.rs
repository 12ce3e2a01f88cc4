use std::fmt::Display;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use log::debug;

use crate::error::Error;
use crate::{CaptionFragment, CombinedResult};

const TRANSCRIPT_MARKER: &str = "--- transcript ---";
const TRANSCRIPT_UNAVAILABLE: &str = "(transcript unavailable)";

/// Render as pretty JSON; non-ASCII text is written as-is
pub fn render_json(result: &CombinedResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}

/// Render metadata lines followed by the timestamped transcript
pub fn render_text(result: &CombinedResult) -> String {
    let meta = &result.metadata;
    let mut lines = vec![
        format!("Title: {}", or_unknown(meta.title.as_ref())),
        format!("Channel: {}", or_unknown(meta.channel.as_ref())),
        format!("Upload date: {}", or_unknown(meta.upload_date.as_ref())),
        format!("Duration: {}", or_unknown(meta.duration.map(|d| format!("{d}s")).as_ref())),
        format!("Views: {}", or_unknown(meta.view_count.as_ref())),
    ];

    if let Some(part) = &result.transcript {
        lines.push(TRANSCRIPT_MARKER.to_string());
        match &part.transcript {
            Some(fragments) => lines.extend(fragments.iter().map(render_fragment)),
            None => lines.push(TRANSCRIPT_UNAVAILABLE.to_string()),
        }
    }

    lines.join("\n")
}

/// Render just the `[MM:SS] text` listing
pub fn render_transcript(fragments: &[CaptionFragment]) -> String {
    fragments.iter().map(render_fragment).collect::<Vec<_>>().join("\n")
}

fn render_fragment(fragment: &CaptionFragment) -> String {
    format!("{} {}", format_timestamp(fragment.start), collapse_newlines(&fragment.text))
}

/// `[MM:SS]` from a truncated offset. Minutes do not roll over into hours.
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds as u64;
    format!("[{:02}:{:02}]", total / 60, total % 60)
}

/// Each `\n` or `\r\n` becomes one space; other whitespace is left alone
fn collapse_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', " ")
}

fn or_unknown<T: Display>(value: Option<&T>) -> String {
    value.map_or_else(|| "unknown".to_string(), |v| v.to_string())
}

/// Write rendered output to `path`
pub fn write_output(path: &Path, content: &str) -> Result<(), Error> {
    std::fs::write(path, content).map_err(|e| Error::OutputWrite {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

pub fn temp_file_name(video_id: &str, now: NaiveDateTime) -> String {
    format!("subtitle_{video_id}_{}.txt", now.format("%Y%m%d_%H%M%S"))
}

/// Save a transcript listing under `dir` with a timestamped name, returning the absolute path
pub fn save_temp(dir: &Path, video_id: &str, content: &str, now: NaiveDateTime) -> Result<PathBuf, Error> {
    let path = dir.join(temp_file_name(video_id, now));
    write_output(&path, content)?;
    Ok(std::path::absolute(&path).unwrap_or(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TranscriptPart, VideoMetadata};
    use chrono::NaiveDate;

    fn fragment(start: f64, text: &str) -> CaptionFragment {
        CaptionFragment {
            start,
            duration: 2.0,
            text: text.to_string(),
        }
    }

    fn sample_result(transcript: Option<TranscriptPart>) -> CombinedResult {
        CombinedResult {
            metadata: VideoMetadata {
                title: Some("Test Video".to_string()),
                channel: Some("Test Channel".to_string()),
                upload_date: Some("20240102".to_string()),
                duration: Some(212),
                view_count: None,
                description: Some("설명 – ünïcödé".to_string()),
                thumbnail: None,
            },
            transcript,
        }
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "[00:00]");
        assert_eq!(format_timestamp(125.0), "[02:05]");
        assert_eq!(format_timestamp(59.99), "[00:59]");
    }

    #[test]
    fn test_format_timestamp_no_hour_rollover() {
        assert_eq!(format_timestamp(3700.0), "[61:40]");
    }

    #[test]
    fn test_render_fragment_collapses_newlines() {
        assert_eq!(render_fragment(&fragment(61.0, "first\nsecond")), "[01:01] first second");
    }

    #[test]
    fn test_collapse_newlines_only_touches_newlines() {
        assert_eq!(collapse_newlines("trailing "), "trailing ");
        assert_eq!(collapse_newlines("  lead\nx"), "  lead x");
        assert_eq!(collapse_newlines("a\r\nb\nc"), "a b c");
    }

    #[test]
    fn test_render_text_with_transcript() {
        let result = sample_result(Some(TranscriptPart {
            transcript: Some(vec![fragment(0.5, "Hello world"), fragment(125.0, "Later")]),
            transcript_language: "en".to_string(),
        }));
        let expected = "Title: Test Video\n\
                        Channel: Test Channel\n\
                        Upload date: 20240102\n\
                        Duration: 212s\n\
                        Views: unknown\n\
                        --- transcript ---\n\
                        [00:00] Hello world\n\
                        [02:05] Later";
        assert_eq!(render_text(&result), expected);
    }

    #[test]
    fn test_render_text_transcript_unavailable() {
        let result = sample_result(Some(TranscriptPart {
            transcript: None,
            transcript_language: "ko".to_string(),
        }));
        let output = render_text(&result);
        assert!(output.ends_with("--- transcript ---\n(transcript unavailable)"));
    }

    #[test]
    fn test_render_text_metadata_only() {
        let output = render_text(&sample_result(None));
        assert!(output.ends_with("Views: unknown"));
        assert!(!output.contains(TRANSCRIPT_MARKER));
    }

    #[test]
    fn test_render_transcript() {
        let output = render_transcript(&[fragment(5.0, "a"), fragment(65.9, "b\nc")]);
        assert_eq!(output, "[00:05] a\n[01:05] b c");
    }

    #[test]
    fn test_render_json_roundtrip_unicode() {
        let result = sample_result(Some(TranscriptPart {
            transcript: Some(vec![fragment(1.25, "안녕하세요\n世界 🌍")]),
            transcript_language: "ko".to_string(),
        }));
        let json = render_json(&result).unwrap();

        assert!(json.contains("안녕하세요"));
        assert!(json.contains("ünïcödé"));
        assert!(!json.contains("\\u"));

        let parsed: CombinedResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }

    #[test]
    fn test_render_json_field_order() {
        let json = render_json(&sample_result(None)).unwrap();
        let title = json.find("\"title\"").unwrap();
        let channel = json.find("\"channel\"").unwrap();
        let thumbnail = json.find("\"thumbnail\"").unwrap();
        assert!(title < channel && channel < thumbnail);
        assert!(!json.contains("transcript"));
    }

    #[test]
    fn test_write_output_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.txt");
        assert!(matches!(
            write_output(&path, "x"),
            Err(Error::OutputWrite { .. })
        ));
    }

    #[test]
    fn test_save_temp() {
        let dir = tempfile::tempdir().unwrap();
        let now = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 7)
            .unwrap();
        let path = save_temp(dir.path(), "abc123", "[00:00] hi", now).unwrap();

        assert!(path.is_absolute());
        assert!(path.ends_with("subtitle_abc123_20240309_140507.txt"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[00:00] hi");
    }
}
