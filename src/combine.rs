use log::{info, warn};

use crate::error::Error;
use crate::youtube::fetch_transcript;
use crate::{CaptionSource, CombinedResult, MetadataSource, TranscriptPart};

/// Outcome of [`combine`]: the result plus the transcript failure it absorbed, if any
#[derive(Debug)]
pub struct Combined {
    pub result: CombinedResult,
    pub transcript_error: Option<Error>,
}

/// Fetch metadata, then (unless `metadata_only`) the transcript in `lang`.
///
/// A metadata failure is returned as the error and no transcript request is made.
/// A transcript failure is absorbed: the result carries `transcript: None` with
/// `lang` preserved, and the error is handed back for diagnostics.
pub async fn combine(
    metadata: &impl MetadataSource,
    captions: &impl CaptionSource,
    url: &str,
    lang: &str,
    metadata_only: bool,
) -> Result<Combined, Error> {
    let meta = metadata.metadata(url).await?;
    info!("Metadata fetched for {url}");

    if metadata_only {
        return Ok(Combined {
            result: CombinedResult {
                metadata: meta,
                transcript: None,
            },
            transcript_error: None,
        });
    }

    let (transcript, transcript_error) = match fetch_transcript(captions, url, lang).await {
        Ok(fragments) => (Some(fragments), None),
        Err(e) => {
            warn!("Transcript fetch failed for {url}: {e}");
            (None, Some(e))
        }
    };

    Ok(Combined {
        result: CombinedResult {
            metadata: meta,
            transcript: Some(TranscriptPart {
                transcript,
                transcript_language: lang.to_string(),
            }),
        },
        transcript_error,
    })
}
