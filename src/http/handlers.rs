use super::state::AppState;
use crate::credits::UserCredits;
use crate::error::OperationError;
use crate::export::ExportFormat;
use crate::model::{PlanConfig, Role, ScaleRecord, Transcript, User};
use crate::payment::CompletionToken;
use crate::workspace::{NewSessionInput, View, Workspace};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use base64::Engine;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscribeRequest {
    /// Base64-encoded audio bytes, exactly as uploaded.
    pub audio_base64: String,

    /// MIME type of the upload (default: audio/webm).
    pub mime_type: Option<String>,

    pub client_alias: String,
    pub session_number: Option<String>,
    pub date: NaiveDate,
    pub title: Option<String>,
    pub duration_secs: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ApproachRequest {
    pub approach: String,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptUpdateRequest {
    pub transcript: Transcript,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSupervisionRequest {
    pub session_ids: Vec<String>,
    pub approach: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScaleRequest {
    pub client_alias: String,
    pub date: NaiveDate,
    pub name: String,
    pub score: f64,
    pub max_score: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectPlanRequest {
    pub plan_type: String,
}

#[derive(Debug, Deserialize)]
pub struct CompletePaymentRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct GroupedQuery {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub view: View,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceStateResponse {
    pub view: View,
    pub selected_session_id: Option<String>,
    pub credits: UserCredits,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bulk_result: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,

    /// Seconds still missing, for insufficient-balance failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortfall_secs: Option<u64>,

    /// Whether the UI should offer the plan-upgrade call to action.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub can_upgrade: bool,
}

impl ErrorResponse {
    fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            shortfall_secs: None,
            can_upgrade: false,
        }
    }
}

fn operation_error(err: &OperationError) -> Response {
    let status = match err {
        OperationError::Validation(_) => StatusCode::BAD_REQUEST,
        OperationError::InsufficientBalance { .. } => StatusCode::PAYMENT_REQUIRED,
        OperationError::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
        OperationError::Upstream(_) | OperationError::Payment(_) => StatusCode::BAD_GATEWAY,
    };

    (
        status,
        Json(ErrorResponse {
            error: err.user_message(),
            shortfall_secs: err.shortfall_secs(),
            can_upgrade: err.is_insufficient_balance(),
        }),
    )
        .into_response()
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::message("Oturum açılmamış.")),
    )
        .into_response()
}

fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(ErrorResponse::message("Bu işlem için yetkiniz yok.")),
    )
        .into_response()
}

fn internal(err: anyhow::Error) -> Response {
    error!("Internal error: {:#}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::message("Sunucu hatası.")),
    )
        .into_response()
}

/// Whether the active login has the admin role.
async fn is_admin(state: &AppState) -> bool {
    matches!(
        state.store.load_active_user(),
        Ok(Some(User {
            role: Role::Admin,
            ..
        }))
    )
}

// ============================================================================
// Authentication (mocked)
// ============================================================================

/// POST /auth/login
///
/// Mock authentication: the fixed admin demo account, or any non-empty
/// email/password pair as a regular user. The user id is derived from
/// the email so repeated logins reach the same storage namespace.
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    let user = if req.email == "admin@demo.com" && req.password == "admin" {
        User {
            id: "admin-1".to_string(),
            name: "Admin User".to_string(),
            email: req.email,
            role: Role::Admin,
            plan: "Gelişmiş".to_string(),
            joined_date: None,
        }
    } else if !req.email.is_empty() && !req.password.is_empty() {
        let slug: String = req
            .email
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect();
        User {
            id: format!("user-{}", slug),
            name: "Demo Kullanıcı".to_string(),
            email: req.email,
            role: Role::User,
            plan: "Free".to_string(),
            joined_date: None,
        }
    } else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::message("Geçersiz e-posta veya şifre.")),
        )
            .into_response();
    };

    if let Err(e) = state.store.save_active_user(&user) {
        return internal(e);
    }

    match Workspace::open(user.clone(), state.store.clone(), state.ai.clone()) {
        Ok(ws) => {
            *state.workspace.write().await = Some(ws);
            info!("Logged in: {} ({:?})", user.email, user.role);
            (StatusCode::OK, Json(user)).into_response()
        }
        Err(e) => internal(e),
    }
}

/// POST /auth/logout
pub async fn logout(State(state): State<AppState>) -> Response {
    *state.workspace.write().await = None;
    if let Err(e) = state.store.clear_active_user() {
        return internal(e);
    }
    StatusCode::NO_CONTENT.into_response()
}

// ============================================================================
// Workspace state
// ============================================================================

/// GET /workspace
pub async fn workspace_state(State(state): State<AppState>) -> Response {
    let guard = state.workspace.read().await;
    let Some(ws) = guard.as_ref() else {
        return unauthorized();
    };

    Json(WorkspaceStateResponse {
        view: ws.view(),
        selected_session_id: ws.selected_session().map(|s| s.id.clone()),
        credits: ws.credits().clone(),
        last_error: ws.last_error().map(str::to_string),
        bulk_result: ws.bulk_result().map(str::to_string),
    })
    .into_response()
}

/// POST /workspace/view
pub async fn navigate(
    State(state): State<AppState>,
    Json(req): Json<NavigateRequest>,
) -> Response {
    let mut guard = state.workspace.write().await;
    let Some(ws) = guard.as_mut() else {
        return unauthorized();
    };
    ws.navigate(req.view);
    StatusCode::NO_CONTENT.into_response()
}

// ============================================================================
// Sessions
// ============================================================================

/// POST /sessions/transcribe
pub async fn transcribe(
    State(state): State<AppState>,
    Json(req): Json<TranscribeRequest>,
) -> Response {
    let audio = match base64::engine::general_purpose::STANDARD.decode(&req.audio_base64) {
        Ok(bytes) => bytes,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::message("Ses verisi çözümlenemedi.")),
            )
                .into_response();
        }
    };

    let mime_type = req.mime_type.unwrap_or_else(|| "audio/webm".to_string());
    let input = NewSessionInput {
        client_alias: req.client_alias,
        session_number: req.session_number,
        date: req.date,
        title: req.title,
        duration_secs: req.duration_secs,
    };

    let mut guard = state.workspace.write().await;
    let Some(ws) = guard.as_mut() else {
        return unauthorized();
    };

    match ws.transcribe(&audio, &mime_type, input).await {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(err) => operation_error(&err),
    }
}

/// GET /sessions
pub async fn list_sessions(State(state): State<AppState>) -> Response {
    let guard = state.workspace.read().await;
    let Some(ws) = guard.as_ref() else {
        return unauthorized();
    };
    Json(ws.sessions().to_vec()).into_response()
}

/// GET /sessions/grouped?query=...
pub async fn grouped_sessions(
    State(state): State<AppState>,
    Query(params): Query<GroupedQuery>,
) -> Response {
    let guard = state.workspace.read().await;
    let Some(ws) = guard.as_ref() else {
        return unauthorized();
    };
    Json(ws.grouped_sessions(&params.query)).into_response()
}

/// POST /sessions/:session_id/select
pub async fn select_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let mut guard = state.workspace.write().await;
    let Some(ws) = guard.as_mut() else {
        return unauthorized();
    };

    match ws.select_session(&session_id) {
        Ok(()) => Json(ws.selected_session().cloned()).into_response(),
        Err(err) => operation_error(&err),
    }
}

/// POST /sessions/:session_id/report
pub async fn generate_report(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<ApproachRequest>,
) -> Response {
    let mut guard = state.workspace.write().await;
    let Some(ws) = guard.as_mut() else {
        return unauthorized();
    };

    if let Err(err) = ws.select_session(&session_id) {
        return operation_error(&err);
    }

    match ws.generate_report(&req.approach).await {
        Ok(report) => Json(serde_json::json!({ "report": report })).into_response(),
        Err(err) => operation_error(&err),
    }
}

/// POST /sessions/:session_id/critique
pub async fn generate_critique(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<ApproachRequest>,
) -> Response {
    let mut guard = state.workspace.write().await;
    let Some(ws) = guard.as_mut() else {
        return unauthorized();
    };

    if let Err(err) = ws.select_session(&session_id) {
        return operation_error(&err);
    }

    match ws.generate_critique(&req.approach).await {
        Ok(critique) => Json(serde_json::json!({ "critique": critique })).into_response(),
        Err(err) => operation_error(&err),
    }
}

/// PUT /sessions/:session_id/transcript
pub async fn update_transcript(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<TranscriptUpdateRequest>,
) -> Response {
    let mut guard = state.workspace.write().await;
    let Some(ws) = guard.as_mut() else {
        return unauthorized();
    };

    if let Err(err) = ws.select_session(&session_id) {
        return operation_error(&err);
    }

    match ws.update_transcript(req.transcript) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => operation_error(&err),
    }
}

/// POST /sessions/bulk-supervision
pub async fn bulk_supervision(
    State(state): State<AppState>,
    Json(req): Json<BulkSupervisionRequest>,
) -> Response {
    let mut guard = state.workspace.write().await;
    let Some(ws) = guard.as_mut() else {
        return unauthorized();
    };

    match ws.bulk_supervision(&req.session_ids, &req.approach).await {
        Ok(result) => Json(serde_json::json!({ "result": result })).into_response(),
        Err(err) => operation_error(&err),
    }
}

/// GET /sessions/:session_id/export?format=txt|docx|pdf
pub async fn export_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(params): Query<ExportQuery>,
) -> Response {
    let format = match params.format.as_deref().unwrap_or("txt").parse::<ExportFormat>() {
        Ok(format) => format,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::message(e.to_string())),
            )
                .into_response();
        }
    };

    let guard = state.workspace.read().await;
    let Some(ws) = guard.as_ref() else {
        return unauthorized();
    };

    use crate::workspace::ExportPayload;
    match ws.export_session(&session_id, format) {
        Ok(ExportPayload::Text(text)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            text,
        )
            .into_response(),
        Ok(ExportPayload::Document(doc)) => Json(doc).into_response(),
        Ok(ExportPayload::Paged(layout)) => Json(layout).into_response(),
        Err(err) => operation_error(&err),
    }
}

// ============================================================================
// Session assistant chat
// ============================================================================

/// POST /chat
pub async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Response {
    let mut guard = state.workspace.write().await;
    let Some(ws) = guard.as_mut() else {
        return unauthorized();
    };

    match ws.chat(&req.message).await {
        Ok(answer) => Json(serde_json::json!({ "answer": answer })).into_response(),
        Err(err) => operation_error(&err),
    }
}

/// GET /chat/suggestions
pub async fn chat_suggestions(State(state): State<AppState>) -> Response {
    let mut guard = state.workspace.write().await;
    let Some(ws) = guard.as_mut() else {
        return unauthorized();
    };

    match ws.suggest_questions().await {
        Ok(questions) => Json(questions).into_response(),
        Err(err) => operation_error(&err),
    }
}

// ============================================================================
// Psychometric scales
// ============================================================================

/// GET /scales
pub async fn list_scales(State(state): State<AppState>) -> Response {
    let guard = state.workspace.read().await;
    let Some(ws) = guard.as_ref() else {
        return unauthorized();
    };
    Json(ws.scales().to_vec()).into_response()
}

/// POST /scales
pub async fn add_scale(
    State(state): State<AppState>,
    Json(req): Json<NewScaleRequest>,
) -> Response {
    let mut guard = state.workspace.write().await;
    let Some(ws) = guard.as_mut() else {
        return unauthorized();
    };

    let scale = ScaleRecord {
        id: uuid::Uuid::new_v4().to_string(),
        client_alias: req.client_alias,
        date: req.date,
        name: req.name,
        score: req.score,
        max_score: req.max_score,
        interpretation: None,
        next_scheduled_date: None,
    };

    match ws.add_scale(scale.clone()) {
        Ok(()) => (StatusCode::OK, Json(scale)).into_response(),
        Err(err) => operation_error(&err),
    }
}

/// POST /scales/:scale_id/analyze
pub async fn analyze_scale(
    State(state): State<AppState>,
    Path(scale_id): Path<String>,
) -> Response {
    let mut guard = state.workspace.write().await;
    let Some(ws) = guard.as_mut() else {
        return unauthorized();
    };

    match ws.analyze_scale(&scale_id).await {
        Ok(scale) => Json(scale).into_response(),
        Err(err) => operation_error(&err),
    }
}

// ============================================================================
// Credits, plans, payment
// ============================================================================

/// GET /credits
pub async fn get_credits(State(state): State<AppState>) -> Response {
    let guard = state.workspace.read().await;
    let Some(ws) = guard.as_ref() else {
        return unauthorized();
    };
    Json(ws.credits().clone()).into_response()
}

/// GET /plans
pub async fn list_plans(State(state): State<AppState>) -> Response {
    match state.store.load_plans() {
        Ok(plans) => Json(plans).into_response(),
        Err(e) => internal(e),
    }
}

/// PUT /plans (admin)
///
/// Replaces the process-wide plan configuration; every user sees the
/// edit on next load.
pub async fn update_plans(
    State(state): State<AppState>,
    Json(plans): Json<Vec<PlanConfig>>,
) -> Response {
    if !is_admin(&state).await {
        return forbidden();
    }

    match state.store.save_plans(&plans) {
        Ok(()) => {
            info!("Plan configuration updated ({} plans)", plans.len());
            Json(plans).into_response()
        }
        Err(e) => internal(e),
    }
}

/// POST /plans/select
pub async fn select_plan(
    State(state): State<AppState>,
    Json(req): Json<SelectPlanRequest>,
) -> Response {
    let mut guard = state.workspace.write().await;
    let Some(ws) = guard.as_mut() else {
        return unauthorized();
    };

    match ws.select_plan(&req.plan_type) {
        Ok(pending) => Json(pending).into_response(),
        Err(err) => operation_error(&err),
    }
}

/// GET /users (admin)
pub async fn list_users(State(state): State<AppState>) -> Response {
    if !is_admin(&state).await {
        return forbidden();
    }
    Json(state.roster.read().await.clone()).into_response()
}

/// POST /payment/initiate
///
/// Starts a checkout for the pending plan. The response carries either
/// embedded checkout HTML or a redirect URL from the gateway.
pub async fn initiate_payment(State(state): State<AppState>) -> Response {
    let (plan, price, email) = {
        let guard = state.workspace.read().await;
        let Some(ws) = guard.as_ref() else {
            return unauthorized();
        };
        let Some(pending) = ws.pending_plan() else {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::message("Önce bir paket seçin.")),
            )
                .into_response();
        };
        (
            pending.plan.clone(),
            pending.price.clone(),
            ws.user().email.clone(),
        )
    };

    match state.payment.initiate(&plan, &price, &email).await {
        Ok(initiation) => Json(initiation).into_response(),
        Err(e) => {
            error!("Payment initiation failed: {:#}", e);
            operation_error(&OperationError::Payment(format!("{:#}", e)))
        }
    }
}

/// POST /payment/complete
///
/// Applies the completion token posted back by the checkout page.
pub async fn complete_payment(
    State(state): State<AppState>,
    Json(req): Json<CompletePaymentRequest>,
) -> Response {
    let Some(token) = CompletionToken::parse(&req.token) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::message("Bilinmeyen ödeme durumu.")),
        )
            .into_response();
    };

    let mut guard = state.workspace.write().await;
    let Some(ws) = guard.as_mut() else {
        return unauthorized();
    };

    match ws.complete_payment(token) {
        Ok(credits) => Json(credits).into_response(),
        Err(err) => operation_error(&err),
    }
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
