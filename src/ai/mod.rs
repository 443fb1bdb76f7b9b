//! Generative-AI service port
//!
//! Every piece of "intelligence" in the product — transcription with
//! speaker separation, clinical reports, supervision critique, the
//! session assistant chat, and scale interpretation — is delegated to an
//! external generative model behind the [`AiService`] trait. The only
//! logic on this side of the boundary is prompt assembly and cleanup of
//! the model's loosely formatted JSON output.

mod gemini;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::model::{ChatMessage, TranscriptSegment};
use crate::store::ScorePoint;

pub use gemini::GeminiClient;

/// Date and transcript text of one session inside a bulk supervision
/// request.
#[derive(Debug, Clone)]
pub struct SessionDigest {
    pub date: NaiveDate,
    pub transcript: String,
}

/// Strict-JSON result of a scale interpretation call.
///
/// The model has been observed to name the follow-up date field either
/// `recommendationDate` or `nextDate`; both are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct ScaleInterpretation {
    pub interpretation: String,
    #[serde(alias = "recommendationDate", alias = "nextDate", default)]
    pub next_scheduled_date: Option<String>,
}

#[async_trait]
pub trait AiService: Send + Sync {
    /// Transcribe opaque audio bytes into speaker-separated segments.
    /// An empty or non-JSON response is a hard failure.
    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<Vec<TranscriptSegment>>;

    /// Generate a formal clinical report under the given therapy school.
    async fn generate_report(&self, transcript_text: &str, approach: &str) -> Result<String>;

    /// Critique the session as a supervisor would.
    async fn generate_critique(&self, transcript_text: &str, approach: &str) -> Result<String>;

    /// Answer one assistant-chat turn grounded in the transcript.
    async fn chat(
        &self,
        transcript_text: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String>;

    /// Suggest follow-up questions the therapist could explore.
    async fn suggest_chat_questions(&self, transcript_text: &str) -> Result<Vec<String>>;

    /// Longitudinal analysis across several sessions of one client.
    async fn bulk_supervision(&self, sessions: &[SessionDigest], approach: &str) -> Result<String>;

    /// Interpret a psychometric score against the client's history.
    async fn interpret_scale(
        &self,
        name: &str,
        score: f64,
        history: &[ScorePoint],
    ) -> Result<ScaleInterpretation>;
}

/// Strip markdown code fences from a model response.
fn strip_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Cut a response down to the outermost JSON array.
///
/// This is a naive first-`[` / last-`]` scan, so a stray bracket in
/// transcript text before the array would confuse it. Kept as-is because
/// the fenced-output cleanup above handles every failure seen so far.
pub fn clean_json_array(text: &str) -> String {
    slice_between(&strip_fences(text), '[', ']')
}

/// Cut a response down to the outermost JSON object.
pub fn clean_json_object(text: &str) -> String {
    slice_between(&strip_fences(text), '{', '}')
}

fn slice_between(cleaned: &str, open: char, close: char) -> String {
    match (cleaned.find(open), cleaned.rfind(close)) {
        (Some(first), Some(last)) if last >= first => cleaned[first..=last].to_string(),
        _ => cleaned.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_strips_fences() {
        let raw = "```json\n[{\"id\":1}]\n```";
        assert_eq!(clean_json_array(raw), "[{\"id\":1}]");
    }

    #[test]
    fn test_clean_cuts_surrounding_prose() {
        let raw = "İşte transkript:\n[{\"id\":1}]\nBaşka bir şey lazım mı?";
        assert_eq!(clean_json_array(raw), "[{\"id\":1}]");
    }

    #[test]
    fn test_clean_object_variant() {
        let raw = "Sonuç: {\"interpretation\":\"orta düzey\"} ✓";
        assert_eq!(clean_json_object(raw), "{\"interpretation\":\"orta düzey\"}");
    }

    #[test]
    fn test_clean_passes_through_without_brackets() {
        assert_eq!(clean_json_array("no json here"), "no json here");
    }

    #[test]
    fn test_interpretation_accepts_alternate_date_field() {
        let a: ScaleInterpretation =
            serde_json::from_str(r#"{"interpretation":"x","recommendationDate":"2026-03-01"}"#)
                .unwrap();
        assert_eq!(a.next_scheduled_date.as_deref(), Some("2026-03-01"));

        let b: ScaleInterpretation =
            serde_json::from_str(r#"{"interpretation":"x","nextDate":"2026-03-01"}"#).unwrap();
        assert_eq!(b.next_scheduled_date.as_deref(), Some("2026-03-01"));

        let c: ScaleInterpretation = serde_json::from_str(r#"{"interpretation":"x"}"#).unwrap();
        assert!(c.next_scheduled_date.is_none());
    }
}
