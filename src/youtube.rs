use log::{debug, info};
use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Unavailable};
use crate::{CaptionFragment, CaptionSource, extract_video_id};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

#[derive(Debug, Deserialize)]
struct InnerTubePlayerResponse {
    captions: Option<CaptionsData>,
    #[serde(rename = "playabilityStatus")]
    playability_status: Option<PlayabilityStatus>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<CaptionTrack>>,
}

#[derive(Debug, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
}

/// Caption tracks served by YouTube's InnerTube API
pub struct YouTubeCaptions {
    client: reqwest::Client,
}

impl YouTubeCaptions {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn get_text(&self, url: &str) -> Result<String, Error> {
        self.client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http_error)?
            .text()
            .await
            .map_err(http_error)
    }
}

impl CaptionSource for YouTubeCaptions {
    async fn captions(&self, video_id: &str, lang: &str) -> Result<Vec<CaptionFragment>, Error> {
        // Step 1: Fetch the watch page to get the InnerTube API key
        let watch_url = format!("https://www.youtube.com/watch?v={video_id}");
        debug!("Fetching watch page: {watch_url}");
        let page_html = self.get_text(&watch_url).await?;

        let api_key = extract_api_key(&page_html)?;
        debug!("Extracted InnerTube API key: {api_key}");

        // Step 2: Call InnerTube player endpoint
        let player_url = format!("https://www.youtube.com/youtubei/v1/player?key={api_key}&prettyPrint=false");

        let body = serde_json::json!({
            "context": {
                "client": {
                    "hl": lang,
                    "gl": "US",
                    "clientName": "WEB",
                    "clientVersion": "2.20241126.01.00"
                }
            },
            "videoId": video_id
        });

        let resp: InnerTubePlayerResponse = self
            .client
            .post(&player_url)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http_error)?
            .json()
            .await
            .map_err(http_error)?;

        let base_url = select_track(resp, video_id, lang)?;
        debug!("Using caption track: lang={lang}");

        // Step 3: Fetch the caption XML
        let caption_xml = self.get_text(&base_url).await?;
        let fragments = parse_caption_xml(&caption_xml)?;
        info!("Fetched {} caption fragments for {video_id} ({lang})", fragments.len());
        Ok(fragments)
    }
}

/// Resolve the URL to an ID, then ask `source` for the track in exactly `lang`
pub async fn fetch_transcript(
    source: &impl CaptionSource,
    url: &str,
    lang: &str,
) -> Result<Vec<CaptionFragment>, Error> {
    let video_id = extract_video_id(url).ok_or_else(|| Error::InvalidUrl(url.to_string()))?;
    source.captions(&video_id, lang).await
}

fn http_error(err: reqwest::Error) -> Error {
    Error::transcript(Unavailable::from_reqwest(&err), err.to_string())
}

fn select_track(resp: InnerTubePlayerResponse, video_id: &str, lang: &str) -> Result<String, Error> {
    if let Some(ps) = &resp.playability_status {
        let status = ps.status.as_deref().unwrap_or("OK");
        if status != "OK" {
            let reason = ps.reason.clone().unwrap_or_else(|| status.to_string());
            return Err(Error::transcript(
                Unavailable::PrivateVideo,
                format!("video {video_id} is not playable: {reason}"),
            ));
        }
    }

    let tracks = resp
        .captions
        .and_then(|c| c.player_captions_tracklist_renderer)
        .and_then(|r| r.caption_tracks)
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err(Error::transcript(
            Unavailable::NoCaptions,
            format!("no captions available for video {video_id}"),
        ));
    }

    match tracks.iter().find(|t| t.language_code == lang) {
        Some(track) => Ok(track.base_url.clone()),
        None => {
            let available = tracks
                .iter()
                .map(|t| t.language_code.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            Err(Error::transcript(
                Unavailable::LanguageNotAvailable,
                format!("no '{lang}' captions for video {video_id} (available: {available})"),
            ))
        }
    }
}

fn extract_api_key(html: &str) -> Result<String, Error> {
    let patterns = [
        r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#,
        r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#,
    ];
    for pattern in patterns {
        let re = Regex::new(pattern).map_err(|e| Error::transcript(Unavailable::Other, e.to_string()))?;
        if let Some(caps) = re.captures(html) {
            return Ok(caps[1].to_string());
        }
    }

    Err(Error::transcript(
        Unavailable::Other,
        "could not extract InnerTube API key from watch page",
    ))
}

fn parse_caption_xml(xml: &str) -> Result<Vec<CaptionFragment>, Error> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut fragments = Vec::new();
    let mut current_start: Option<f64> = None;
    let mut current_dur: Option<f64> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                let mut start = None;
                let mut dur = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"start" => {
                            start = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        b"dur" => {
                            dur = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        _ => {}
                    }
                }
                current_start = start;
                // Some tracks omit dur on the final cue
                current_dur = dur.or(Some(0.0));
            }
            Ok(Event::Text(ref e)) => {
                if let (Some(start), Some(duration)) = (current_start.take(), current_dur.take()) {
                    let raw_text = e.unescape().unwrap_or_default().to_string();
                    let text = html_escape::decode_html_entities(&raw_text).to_string();
                    if !text.trim().is_empty() {
                        fragments.push(CaptionFragment {
                            start: start.max(0.0),
                            duration: duration.max(0.0),
                            text,
                        });
                    }
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"text" => {
                // An empty cue must not claim the whitespace that follows it
                current_start = None;
                current_dur = None;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::transcript(
                    Unavailable::Other,
                    format!("error parsing caption XML: {e}"),
                ));
            }
            _ => {}
        }
    }

    Ok(fragments)
}
