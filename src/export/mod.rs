//! Session export pipeline
//!
//! One logical document — transcript, report, critique, assistant chat,
//! plus a metadata header — rendered into three targets:
//! - plain text ([`text`])
//! - a structured heading/paragraph document ([`document`])
//! - a paginated fixed-width layout ([`paged`])
//!
//! All three share the same contract: the metadata header comes first,
//! sections always appear in the order transcript → report → critique →
//! chat, absent or empty sections leave no header behind, and the
//! model's uncertainty markers are stripped from transcript text.

pub mod document;
pub mod paged;
pub mod text;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::model::{ChatMessage, TranscriptSegment};

/// Marker the transcription model inserts for inaudible words.
pub const UNCLEAR_MARKER: &str = "[?]";

/// Application name printed in export headers.
pub const APP_NAME: &str = "PSİKOLOJİ AĞI";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Txt,
    Docx,
    Pdf,
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "txt" => Ok(ExportFormat::Txt),
            "docx" => Ok(ExportFormat::Docx),
            "pdf" => Ok(ExportFormat::Pdf),
            other => bail!("Unknown export format: {}", other),
        }
    }
}

/// Header metadata shown at the top of every export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub client_alias: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_number: Option<String>,
}

/// Everything exportable about one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<Vec<TranscriptSegment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critique: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat: Option<Vec<ChatMessage>>,
    pub metadata: ExportMetadata,
}

impl ExportContent {
    /// Transcript segments, or None when the transcript is absent or
    /// empty — an empty list must not produce a section header.
    pub(crate) fn transcript_segments(&self) -> Option<&[TranscriptSegment]> {
        self.transcript.as_deref().filter(|segs| !segs.is_empty())
    }

    pub(crate) fn chat_messages(&self) -> Option<&[ChatMessage]> {
        self.chat.as_deref().filter(|msgs| !msgs.is_empty())
    }
}

/// Remove uncertainty markers before a segment's text leaves the app.
pub fn strip_unclear_markers(text: &str) -> String {
    text.replace(UNCLEAR_MARKER, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_unclear_markers() {
        assert_eq!(
            strip_unclear_markers("dün gece [?] uyuyamadım [?]"),
            "dün gece  uyuyamadım "
        );
        assert_eq!(strip_unclear_markers("temiz metin"), "temiz metin");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Txt);
        assert_eq!("pdf".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert!("html".parse::<ExportFormat>().is_err());
    }
}
