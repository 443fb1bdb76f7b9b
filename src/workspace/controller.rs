use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::ai::{AiService, SessionDigest};
use crate::credits::{estimate_usage, UserCredits};
use crate::error::OperationError;
use crate::export::{self, ExportContent, ExportFormat, ExportMetadata};
use crate::model::{
    ChatMessage, ChatRole, ScaleRecord, SessionRecord, Transcript, User,
};
use crate::payment::CompletionToken;
use crate::store::{filter_groups, group_by_client, history_for, ClientGroup, DataStore};

/// Which screen the workspace is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Home,
    Dashboard,
    Pricing,
    BulkResult,
}

/// A plan the user picked but has not paid for yet.
#[derive(Debug, Clone, Serialize)]
pub struct PendingPlan {
    pub plan: String,
    pub price: String,
    pub minutes: u64,
}

/// Metadata entered alongside an uploaded recording.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSessionInput {
    pub client_alias: String,
    #[serde(default)]
    pub session_number: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub title: Option<String>,
    /// Audio duration in seconds, if the uploader could determine it.
    #[serde(default)]
    pub duration_secs: Option<f64>,
}

/// A rendered export in one of the three target representations.
pub enum ExportPayload {
    Text(String),
    Document(export::document::StructuredDoc),
    Paged(export::paged::PagedLayout),
}

/// Per-user session state and operation dispatch.
pub struct Workspace {
    user: User,
    store: DataStore,
    ai: Arc<dyn AiService>,

    view: View,
    selected_session_id: Option<String>,
    pending_plan: Option<PendingPlan>,
    bulk_result: Option<String>,
    /// Assistant chat for the currently selected session; reset on
    /// selection change.
    chat_log: Vec<ChatMessage>,
    last_error: Option<String>,

    credits: UserCredits,
    sessions: Vec<SessionRecord>,
    scales: Vec<ScaleRecord>,
}

impl Workspace {
    /// Open the workspace for a user, loading their snapshots and
    /// seeding free-tier credits on first login.
    pub fn open(user: User, store: DataStore, ai: Arc<dyn AiService>) -> Result<Self> {
        let credits = store.load_credits(&user.id)?;
        let sessions = store.load_sessions(&user.id)?;
        let scales = store.load_scales(&user.id)?;

        info!(
            "Opened workspace for {} ({} sessions, {} scales, {}s remaining)",
            user.id,
            sessions.len(),
            scales.len(),
            credits.remaining_seconds
        );

        Ok(Self {
            user,
            store,
            ai,
            view: View::Home,
            selected_session_id: None,
            pending_plan: None,
            bulk_result: None,
            chat_log: Vec::new(),
            last_error: None,
            credits,
            sessions,
            scales,
        })
    }

    // -- state accessors ---------------------------------------------------

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn credits(&self) -> &UserCredits {
        &self.credits
    }

    pub fn sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }

    pub fn scales(&self) -> &[ScaleRecord] {
        &self.scales
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn bulk_result(&self) -> Option<&str> {
        self.bulk_result.as_deref()
    }

    pub fn chat_log(&self) -> &[ChatMessage] {
        &self.chat_log
    }

    pub fn pending_plan(&self) -> Option<&PendingPlan> {
        self.pending_plan.as_ref()
    }

    pub fn selected_session(&self) -> Option<&SessionRecord> {
        let id = self.selected_session_id.as_deref()?;
        self.sessions.iter().find(|s| s.id == id)
    }

    // -- navigation --------------------------------------------------------

    pub fn navigate(&mut self, view: View) {
        self.view = view;
    }

    pub fn select_session(&mut self, session_id: &str) -> Result<(), OperationError> {
        if !self.sessions.iter().any(|s| s.id == session_id) {
            return Err(OperationError::Validation("Seans bulunamadı.".to_string()));
        }
        // The chat log is reset on selection *change* only; re-selecting
        // the current session keeps the conversation and the view.
        if self.selected_session_id.as_deref() == Some(session_id) {
            return Ok(());
        }
        self.selected_session_id = Some(session_id.to_string());
        self.chat_log.clear();
        self.view = View::Home;
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected_session_id = None;
        self.chat_log.clear();
        self.last_error = None;
    }

    /// Dashboard view of the session archive: grouped by client, then
    /// filtered by the search term.
    pub fn grouped_sessions(&self, query: &str) -> Vec<ClientGroup> {
        filter_groups(group_by_client(&self.sessions), query)
    }

    // -- persistence helpers (full snapshot replace, per the storage
    // -- contract) ---------------------------------------------------------

    fn persist_credits(&self) -> Result<()> {
        self.store.save_credits(&self.user.id, &self.credits)
    }

    fn persist_sessions(&self) -> Result<()> {
        self.store.save_sessions(&self.user.id, &self.sessions)
    }

    fn persist_scales(&self) -> Result<()> {
        self.store.save_scales(&self.user.id, &self.scales)
    }

    fn fail(&mut self, err: OperationError) -> OperationError {
        warn!("Operation failed: {}", err);
        self.last_error = Some(err.user_message());
        err
    }

    // -- transcription -----------------------------------------------------

    /// Transcribe uploaded audio and save the resulting session.
    ///
    /// Blocks before the model call when the ledger cannot cover the
    /// estimate; on success the estimate is debited and the new session
    /// is prepended to the archive and selected.
    pub async fn transcribe(
        &mut self,
        audio: &[u8],
        mime_type: &str,
        input: NewSessionInput,
    ) -> Result<SessionRecord, OperationError> {
        self.last_error = None;

        if input.client_alias.trim().is_empty() {
            return Err(self.fail(OperationError::Validation(
                "Lütfen bir danışan rumuzu girin.".to_string(),
            )));
        }

        let estimate = estimate_usage(input.duration_secs);
        if let Err(err) = self.credits.ensure_affordable(estimate) {
            return Err(self.fail(err));
        }

        let segments = match self.ai.transcribe(audio, mime_type).await {
            Ok(segments) => segments,
            Err(err) => return Err(self.fail(err.into())),
        };

        self.credits = self.credits.debit(estimate);
        self.persist_credits().map_err(|e| self.fail(e.into()))?;

        let session = SessionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            date: input.date,
            title: input.title.unwrap_or_else(|| "Seans Kaydı".to_string()),
            client_alias: Some(input.client_alias.trim().to_string()),
            session_number: input.session_number,
            duration: estimate,
            transcript: Transcript::Structured(segments),
            report: None,
            critique: None,
            critique_approach: None,
            bulk_analysis_id: None,
        };

        self.sessions.insert(0, session.clone());
        self.persist_sessions().map_err(|e| self.fail(e.into()))?;

        self.selected_session_id = Some(session.id.clone());
        self.chat_log.clear();

        info!(
            "Transcribed session {} for {} ({}s debited, {}s left)",
            session.id, self.user.id, estimate, self.credits.remaining_seconds
        );

        Ok(session)
    }

    // -- analysis ----------------------------------------------------------

    fn selected_transcript_text(&self) -> Result<(String, String), OperationError> {
        let session = self.selected_session().ok_or_else(|| {
            OperationError::Validation("Önce bir seans seçin.".to_string())
        })?;
        Ok((session.id.clone(), session.transcript.plain_text()))
    }

    fn update_session<F>(&mut self, session_id: &str, apply: F) -> Result<(), OperationError>
    where
        F: FnOnce(&mut SessionRecord),
    {
        if let Some(session) = self.sessions.iter_mut().find(|s| s.id == session_id) {
            apply(session);
        }
        self.persist_sessions().map_err(|e| self.fail(e.into()))
    }

    pub async fn generate_report(&mut self, approach: &str) -> Result<String, OperationError> {
        self.last_error = None;
        let (session_id, text) = self.selected_transcript_text()?;

        let report = match self.ai.generate_report(&text, approach).await {
            Ok(report) => report,
            Err(err) => return Err(self.fail(err.into())),
        };

        self.update_session(&session_id, |s| s.report = Some(report.clone()))?;
        Ok(report)
    }

    pub async fn generate_critique(&mut self, approach: &str) -> Result<String, OperationError> {
        self.last_error = None;
        let (session_id, text) = self.selected_transcript_text()?;

        let critique = match self.ai.generate_critique(&text, approach).await {
            Ok(critique) => critique,
            Err(err) => return Err(self.fail(err.into())),
        };

        let approach = approach.to_string();
        self.update_session(&session_id, |s| {
            s.critique = Some(critique.clone());
            s.critique_approach = Some(approach);
        })?;
        Ok(critique)
    }

    /// Replace the selected session's transcript after a manual edit.
    pub fn update_transcript(&mut self, transcript: Transcript) -> Result<(), OperationError> {
        let session_id = self
            .selected_session_id
            .clone()
            .ok_or_else(|| OperationError::Validation("Önce bir seans seçin.".to_string()))?;
        self.update_session(&session_id, |s| s.transcript = transcript)
    }

    /// One assistant-chat turn grounded in the selected transcript.
    pub async fn chat(&mut self, message: &str) -> Result<String, OperationError> {
        self.last_error = None;
        let (_, text) = self.selected_transcript_text()?;

        let answer = match self.ai.chat(&text, &self.chat_log, message).await {
            Ok(answer) => answer,
            Err(err) => return Err(self.fail(err.into())),
        };

        let now = chrono::Utc::now().timestamp_millis();
        self.chat_log.push(ChatMessage {
            id: uuid::Uuid::new_v4().to_string(),
            role: ChatRole::User,
            content: message.to_string(),
            timestamp: Some(now),
        });
        self.chat_log.push(ChatMessage {
            id: uuid::Uuid::new_v4().to_string(),
            role: ChatRole::Model,
            content: answer.clone(),
            timestamp: Some(now),
        });

        Ok(answer)
    }

    pub async fn suggest_questions(&mut self) -> Result<Vec<String>, OperationError> {
        let (_, text) = self.selected_transcript_text()?;
        match self.ai.suggest_chat_questions(&text).await {
            Ok(questions) => Ok(questions),
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Longitudinal supervision across several sessions of one client.
    pub async fn bulk_supervision(
        &mut self,
        session_ids: &[String],
        approach: &str,
    ) -> Result<String, OperationError> {
        self.last_error = None;
        self.view = View::BulkResult;

        let digests: Vec<SessionDigest> = self
            .sessions
            .iter()
            .filter(|s| session_ids.contains(&s.id))
            .map(|s| SessionDigest {
                date: s.date,
                transcript: s.transcript.text_only(),
            })
            .collect();

        if digests.is_empty() {
            return Err(self.fail(OperationError::Validation(
                "Analiz için seans seçilmedi.".to_string(),
            )));
        }

        match self.ai.bulk_supervision(&digests, approach).await {
            Ok(result) => {
                let analysis_id = uuid::Uuid::new_v4().to_string();
                for session in self
                    .sessions
                    .iter_mut()
                    .filter(|s| session_ids.contains(&s.id))
                {
                    session.bulk_analysis_id = Some(analysis_id.clone());
                }
                self.persist_sessions().map_err(|e| self.fail(e.into()))?;

                self.bulk_result = Some(result.clone());
                Ok(result)
            }
            Err(err) => {
                self.bulk_result = Some("Toplu analiz başarısız oldu.".to_string());
                Err(self.fail(err.into()))
            }
        }
    }

    // -- psychometric scales -----------------------------------------------

    pub fn add_scale(&mut self, scale: ScaleRecord) -> Result<(), OperationError> {
        self.scales.push(scale);
        self.persist_scales().map_err(|e| self.fail(e.into()))
    }

    /// Interpret a scale score against the client's history. The history
    /// passed to the model never includes the record being interpreted.
    pub async fn analyze_scale(&mut self, scale_id: &str) -> Result<ScaleRecord, OperationError> {
        self.last_error = None;

        let target = self
            .scales
            .iter()
            .find(|s| s.id == scale_id)
            .cloned()
            .ok_or_else(|| OperationError::Validation("Ölçek kaydı bulunamadı.".to_string()))?;

        let history = history_for(&self.scales, &target.client_alias, &target.name, scale_id);

        let result = match self
            .ai
            .interpret_scale(&target.name, target.score, &history)
            .await
        {
            Ok(result) => result,
            Err(err) => return Err(self.fail(err.into())),
        };

        let idx = self
            .scales
            .iter()
            .position(|s| s.id == scale_id)
            .ok_or_else(|| OperationError::Validation("Ölçek kaydı bulunamadı.".to_string()))?;
        let updated = &mut self.scales[idx];
        updated.interpretation = Some(result.interpretation);
        updated.next_scheduled_date = result.next_scheduled_date;
        let updated = updated.clone();

        self.persist_scales().map_err(|e| self.fail(e.into()))?;
        Ok(updated)
    }

    // -- plans and payment -------------------------------------------------

    /// Remember which plan the user is about to pay for.
    pub fn select_plan(&mut self, plan_type: &str) -> Result<PendingPlan, OperationError> {
        let plans = self
            .store
            .load_plans()
            .map_err(|e| self.fail(e.into()))?;

        let plan = plans
            .iter()
            .find(|p| p.plan_type == plan_type)
            .ok_or_else(|| OperationError::Validation("Paket bulunamadı.".to_string()))?;

        let pending = PendingPlan {
            plan: plan.plan_type.clone(),
            price: plan.price.clone(),
            minutes: plan.minutes,
        };
        self.pending_plan = Some(pending.clone());
        Ok(pending)
    }

    /// Apply the checkout page's completion token. Success credits the
    /// pending plan's minutes on top of whatever is left.
    pub fn complete_payment(
        &mut self,
        token: CompletionToken,
    ) -> Result<UserCredits, OperationError> {
        let pending = self
            .pending_plan
            .take()
            .ok_or_else(|| OperationError::Validation("Bekleyen ödeme yok.".to_string()))?;

        match token {
            CompletionToken::Success => {
                self.credits = self.credits.credit(pending.minutes, &pending.plan);
                self.persist_credits().map_err(|e| self.fail(e.into()))?;

                self.last_error = None;
                self.view = View::Home;

                info!(
                    "Payment applied for {}: plan={}, remaining={}s",
                    self.user.id, pending.plan, self.credits.remaining_seconds
                );
                Ok(self.credits.clone())
            }
            CompletionToken::Failed => {
                // Keep nothing: the user retries from plan selection.
                Err(self.fail(OperationError::Payment("checkout declined".to_string())))
            }
        }
    }

    // -- export ------------------------------------------------------------

    /// Render a session in the requested representation.
    pub fn export_session(
        &self,
        session_id: &str,
        format: ExportFormat,
    ) -> Result<ExportPayload, OperationError> {
        let session = self
            .sessions
            .iter()
            .find(|s| s.id == session_id)
            .ok_or_else(|| OperationError::Validation("Seans bulunamadı.".to_string()))?;

        let chat = if self.selected_session_id.as_deref() == Some(session_id)
            && !self.chat_log.is_empty()
        {
            Some(self.chat_log.clone())
        } else {
            None
        };

        let content = ExportContent {
            transcript: Some(session.transcript.to_segments()),
            report: session.report.clone(),
            critique: session.critique.clone(),
            chat,
            metadata: ExportMetadata {
                client_alias: session.client_alias.clone().unwrap_or_default(),
                date: session.date.to_string(),
                session_number: session.session_number.clone(),
            },
        };

        Ok(match format {
            ExportFormat::Txt => ExportPayload::Text(export::text::render(&content)),
            ExportFormat::Docx => ExportPayload::Document(export::document::render(&content)),
            ExportFormat::Pdf => ExportPayload::Paged(export::paged::render(&content)),
        })
    }
}
