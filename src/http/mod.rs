//! HTTP API for the browser front end
//!
//! The service exposes the workspace operations over REST:
//! - POST /auth/login, /auth/logout - mocked authentication
//! - POST /sessions/transcribe - upload audio, get a saved session
//! - POST /sessions/:id/report, /sessions/:id/critique - AI analysis
//! - GET  /sessions/:id/export - TXT / structured / paginated rendering
//! - POST /sessions/bulk-supervision - longitudinal analysis
//! - /scales, /credits, /plans, /payment - bookkeeping and checkout
//! - GET  /health - health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
