use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{clean_json_array, clean_json_object, AiService, ScaleInterpretation, SessionDigest};
use crate::config::AiConfig;
use crate::model::{ChatMessage, ChatRole, TranscriptSegment};
use crate::store::ScorePoint;

/// System instruction shared by every analysis call.
const PSYCHOLOGY_EXPERT_INSTRUCTION: &str = "\
ROL: 20 yıllık deneyime sahip Kıdemli Klinik Psikolog ve Süpervizörsün.
GÖREV: Psikologlara seans analizlerinde ve vaka formülasyonlarında rehberlik etmek.
ALAN: SADECE psikoloji ve sunulan seansın analizi hakkında konuş.
ETİK: Tanı koyma, ilaç önerme. Seans metnine sadık kal.";

const TRANSCRIBE_PROMPT: &str = "\
GÖREV: Bu ses kaydını dinle ve konuşmacıları (Psikolog ve Danışan) KESİN olarak ayırarak transkript et.

KONUŞMACI AYRIMI (DIARIZATION) KURALLARI:
- \"P\": Psikolog (Terapist). Profesyonel, soru soran, yansıtan kişi.
- \"D\": Danışan. Duygularını ve olayları anlatan kişi.
- Konuşmacı değiştiği an yeni bir JSON objesi oluştur.
- \"Hıhı\", \"Evet\", \"Anlıyorum\" gibi kısa onaylamaları bile AYRI birer satır (P veya D olarak) yaz, önceki konuşma ile birleştirme.

FORMAT: Sadece saf JSON array döndür.
[
  {
    \"id\": 1,
    \"speaker\": \"P\",
    \"text\": \"Merhaba, hoş geldiniz.\",
    \"timestamp\": \"00:00\"
  }
]

Timestamp formatı: MM:SS";

// ---------------------------------------------------------------------------
// Wire types (generateContent REST API)
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct WireContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<WirePart>,
}

#[derive(Serialize)]
enum WirePart {
    #[serde(rename = "text")]
    Text(String),
    #[serde(rename = "inlineData", rename_all = "camelCase")]
    InlineData { mime_type: String, data: String },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Gemini-backed implementation of [`AiService`].
///
/// Transcription and quick lookups go to the flash model; reports,
/// critique, chat, and bulk supervision go to the heavier analysis
/// model.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    transcribe_model: String,
    analysis_model: String,
}

impl GeminiClient {
    pub fn new(config: &AiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            transcribe_model: config.transcribe_model.clone(),
            analysis_model: config.analysis_model.clone(),
        }
    }

    fn ensure_key(&self) -> Result<()> {
        if self.api_key.is_empty() {
            bail!("API Key is missing");
        }
        Ok(())
    }

    async fn generate(&self, model: &str, request: &GenerateRequest) -> Result<String> {
        self.ensure_key()?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );
        debug!("Calling model {}", model);

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .context("Model request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Model returned {}: {}", status, body);
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .context("Failed to decode model response")?;

        let text: String = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            bail!("No candidate text in model response");
        }

        Ok(text)
    }

    fn text_request(prompt: String, temperature: f32, json_output: bool) -> GenerateRequest {
        GenerateRequest {
            contents: vec![WireContent {
                role: None,
                parts: vec![WirePart::Text(prompt)],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(temperature),
                response_mime_type: json_output.then_some("application/json"),
            }),
        }
    }
}

#[async_trait]
impl AiService for GeminiClient {
    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<Vec<TranscriptSegment>> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(audio);

        let request = GenerateRequest {
            contents: vec![WireContent {
                role: None,
                parts: vec![
                    WirePart::InlineData {
                        mime_type: mime_type.to_string(),
                        data: encoded,
                    },
                    WirePart::Text(TRANSCRIBE_PROMPT.to_string()),
                ],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(0.1),
                response_mime_type: Some("application/json"),
            }),
        };

        let text = self.generate(&self.transcribe_model, &request).await?;
        let segments: Vec<TranscriptSegment> = serde_json::from_str(&clean_json_array(&text))
            .context("Failed to parse transcript JSON")?;

        if segments.is_empty() {
            bail!("Transcription failed: empty segment list");
        }

        info!("Transcribed {} segments", segments.len());
        Ok(segments)
    }

    async fn generate_report(&self, transcript_text: &str, approach: &str) -> Result<String> {
        let prompt = format!(
            "{PSYCHOLOGY_EXPERT_INSTRUCTION}\n\n\
             GÖREV: Aşağıdaki seans transkriptini **{approach}** ekolü çerçevesinde analiz ederek resmi bir klinik rapor oluştur.\n\n\
             BAŞLIKLAR:\n\
             # Seans Analiz Raporu ({approach})\n\
             ## 1. Klinik Özet\n\
             ## 2. Duygu Durum ve Bilişsel Analiz\n\
             ## 3. Öne Çıkan Klinik Temalar\n\
             ## 4. Terapist İçin Öneriler\n\n\
             Transkript:\n{transcript_text}"
        );

        self.generate(&self.analysis_model, &Self::text_request(prompt, 0.3, false))
            .await
    }

    async fn generate_critique(&self, transcript_text: &str, approach: &str) -> Result<String> {
        let prompt = format!(
            "{PSYCHOLOGY_EXPERT_INSTRUCTION}\n\
             GÖREV: Seansı **{approach}** ekolüyle bir süpervizör olarak eleştir. Terapiste teknik geri bildirim ver.\n\
             Metin: {transcript_text}"
        );

        self.generate(&self.analysis_model, &Self::text_request(prompt, 0.4, false))
            .await
    }

    async fn chat(
        &self,
        transcript_text: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String> {
        let mut contents = vec![
            WireContent {
                role: Some("user".to_string()),
                parts: vec![WirePart::Text(format!(
                    "{PSYCHOLOGY_EXPERT_INSTRUCTION}\nTranskript:\n{transcript_text}"
                ))],
            },
            WireContent {
                role: Some("model".to_string()),
                parts: vec![WirePart::Text(
                    "Anlaşıldı. Bu seansla ilgili klinik sorularınızı yanıtlamaya hazırım."
                        .to_string(),
                )],
            },
        ];

        for turn in history {
            contents.push(WireContent {
                role: Some(
                    match turn.role {
                        ChatRole::User => "user",
                        ChatRole::Model => "model",
                    }
                    .to_string(),
                ),
                parts: vec![WirePart::Text(turn.content.clone())],
            });
        }

        contents.push(WireContent {
            role: Some("user".to_string()),
            parts: vec![WirePart::Text(message.to_string())],
        });

        let request = GenerateRequest {
            contents,
            generation_config: None,
        };

        self.generate(&self.analysis_model, &request).await
    }

    async fn suggest_chat_questions(&self, transcript_text: &str) -> Result<Vec<String>> {
        // Long transcripts are truncated; three questions do not need the
        // full session.
        let excerpt: String = transcript_text.chars().take(5000).collect();
        let prompt = format!(
            "Bu seans metni üzerinden terapistin sorması gereken 3 derin klinik soruyu madde madde yaz: {excerpt}"
        );

        let text = self
            .generate(&self.transcribe_model, &Self::text_request(prompt, 0.4, false))
            .await?;

        Ok(text
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| line.len() > 5)
            .collect())
    }

    async fn bulk_supervision(&self, sessions: &[SessionDigest], approach: &str) -> Result<String> {
        let context = sessions
            .iter()
            .map(|s| format!("{}: {}", s.date, s.transcript))
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = format!(
            "Bu seanslar üzerinden {approach} ekolüyle uzunlamasına analiz yap:\n{context}"
        );

        self.generate(&self.analysis_model, &Self::text_request(prompt, 0.4, false))
            .await
    }

    async fn interpret_scale(
        &self,
        name: &str,
        score: f64,
        history: &[ScorePoint],
    ) -> Result<ScaleInterpretation> {
        let history_json = serde_json::to_string(history)?;
        let prompt = format!(
            "Ölçek: {name}, Puan: {score}, Geçmiş: {history_json}. \
             Klinik yorum yap ve JSON (interpretation, recommendationDate) döndür."
        );

        let text = self
            .generate(&self.transcribe_model, &Self::text_request(prompt, 0.3, true))
            .await?;

        serde_json::from_str(&clean_json_object(&text))
            .context("Failed to parse scale interpretation JSON")
    }
}
