use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Who is talking in a transcript segment.
///
/// The transcription model labels speakers with a single-letter code on
/// the wire: "P" for the psychologist, "D" for the client (danışan).
/// Anything else maps to `Unknown` rather than failing the parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Speaker {
    Psychologist,
    Client,
    Unknown,
}

impl Speaker {
    /// Single-letter wire code used by the transcription model.
    pub fn code(&self) -> &'static str {
        match self {
            Speaker::Psychologist => "P",
            Speaker::Client => "D",
            Speaker::Unknown => "?",
        }
    }

    /// Display label used in exports and the UI.
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::Psychologist => "Psikolog",
            Speaker::Client => "Danışan",
            Speaker::Unknown => "?",
        }
    }
}

impl From<String> for Speaker {
    fn from(code: String) -> Self {
        match code.as_str() {
            "P" => Speaker::Psychologist,
            "D" => Speaker::Client,
            _ => Speaker::Unknown,
        }
    }
}

impl From<Speaker> for String {
    fn from(speaker: Speaker) -> Self {
        speaker.code().to_string()
    }
}

/// One attributed utterance in a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSegment {
    pub id: u32,

    pub speaker: Speaker,

    pub text: String,

    /// "MM:SS" as produced by the model; parse with [`crate::timefmt`].
    pub timestamp: String,

    /// Set when the model could not hear the utterance clearly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_unclear: Option<bool>,
}

/// A session transcript, either speaker-separated or a legacy flat string.
///
/// Early builds stored transcripts as plain text. New transcriptions are
/// always `Structured`; `Raw` survives only in old snapshots and is
/// normalized via [`Transcript::to_segments`] before formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Transcript {
    Structured(Vec<TranscriptSegment>),
    Raw(String),
}

impl Transcript {
    /// Flatten to plain text for prompting the analysis model.
    pub fn plain_text(&self) -> String {
        match self {
            Transcript::Raw(text) => text.clone(),
            Transcript::Structured(segments) => segments
                .iter()
                .map(|seg| format!("{}: {}", seg.speaker.code(), seg.text))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Text-only view, one line per utterance, without speaker codes.
    pub fn text_only(&self) -> String {
        match self {
            Transcript::Raw(text) => text.clone(),
            Transcript::Structured(segments) => segments
                .iter()
                .map(|seg| seg.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Normalize to a segment list. A legacy raw transcript becomes a
    /// single unattributed segment at 00:00.
    pub fn to_segments(&self) -> Vec<TranscriptSegment> {
        match self {
            Transcript::Structured(segments) => segments.clone(),
            Transcript::Raw(text) => vec![TranscriptSegment {
                id: 1,
                speaker: Speaker::Unknown,
                text: text.clone(),
                timestamp: "00:00".to_string(),
                is_unclear: None,
            }],
        }
    }
}

/// A recorded therapy session and everything derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,

    pub date: NaiveDate,

    pub title: String,

    /// Client pseudonym ("Danışan Rumuzu"); never a real name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_alias: Option<String>,

    /// Ordinal within the therapy ("4" for the fourth session).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_number: Option<String>,

    /// Estimated audio duration in seconds, as debited from credits.
    pub duration: u64,

    pub transcript: Transcript,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub critique: Option<String>,

    /// Therapy school the critique was requested under (e.g. "BDT").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critique_approach: Option<String>,

    /// Set when this session was covered by a bulk supervision run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bulk_analysis_id: Option<String>,
}

/// A psychometric scale administration for one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleRecord {
    pub id: String,

    pub client_alias: String,

    pub date: NaiveDate,

    /// Scale name, e.g. "Beck Depresyon Envanteri".
    pub name: String,

    pub score: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,

    /// Clinical interpretation, filled in by the analysis call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<String>,

    /// Suggested date for the next administration, as free text from the
    /// model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_scheduled_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One turn of the session assistant chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// An authenticated account. Login is mocked; users are created at login
/// time and only persisted in the local session snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub plan: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joined_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaker_wire_codes() {
        assert_eq!(Speaker::from("P".to_string()), Speaker::Psychologist);
        assert_eq!(Speaker::from("D".to_string()), Speaker::Client);
        assert_eq!(Speaker::from("X".to_string()), Speaker::Unknown);
    }

    #[test]
    fn test_segment_deserializes_model_output() {
        let json = r#"{"id":1,"speaker":"P","text":"Merhaba, hoş geldiniz.","timestamp":"00:00"}"#;
        let seg: TranscriptSegment = serde_json::from_str(json).unwrap();
        assert_eq!(seg.speaker, Speaker::Psychologist);
        assert_eq!(seg.timestamp, "00:00");
        assert!(seg.is_unclear.is_none());
    }

    #[test]
    fn test_transcript_accepts_legacy_raw_string() {
        let transcript: Transcript = serde_json::from_str(r#""eski düz metin""#).unwrap();
        assert_eq!(transcript, Transcript::Raw("eski düz metin".to_string()));

        let segments = transcript.to_segments();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].speaker, Speaker::Unknown);
    }

    #[test]
    fn test_transcript_plain_text_uses_codes() {
        let transcript = Transcript::Structured(vec![
            TranscriptSegment {
                id: 1,
                speaker: Speaker::Psychologist,
                text: "Nasılsınız?".to_string(),
                timestamp: "00:00".to_string(),
                is_unclear: None,
            },
            TranscriptSegment {
                id: 2,
                speaker: Speaker::Client,
                text: "İyiyim.".to_string(),
                timestamp: "00:05".to_string(),
                is_unclear: None,
            },
        ]);
        assert_eq!(transcript.plain_text(), "P: Nasılsınız?\nD: İyiyim.");
    }
}
