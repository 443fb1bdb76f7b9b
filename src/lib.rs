pub mod ai;
pub mod config;
pub mod credits;
pub mod error;
pub mod export;
pub mod http;
pub mod model;
pub mod payment;
pub mod store;
pub mod timefmt;
pub mod workspace;

pub use ai::{AiService, GeminiClient, ScaleInterpretation, SessionDigest};
pub use config::Config;
pub use credits::{estimate_usage, UserCredits};
pub use error::OperationError;
pub use http::{create_router, AppState};
pub use model::{
    ChatMessage, ChatRole, PlanConfig, Role, ScaleRecord, SessionRecord, Speaker, Transcript,
    TranscriptSegment, User,
};
pub use payment::{CompletionToken, MockGateway, PaymentGateway};
pub use store::{DataStore, FileStore, MemoryStore, SnapshotStore};
pub use workspace::Workspace;
