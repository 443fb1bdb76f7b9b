//! Domain records shared across the service
//!
//! This module defines the persisted record types:
//! - Transcript segments with tagged speaker roles
//! - Session and psychometric scale records
//! - Users and pricing plans
//!
//! All types serialize with camelCase field names so that snapshots
//! written by earlier builds of the product remain readable.

mod plans;
mod records;

pub use plans::{default_plans, Campaign, PlanConfig, PlanIcon};
pub use records::{
    ChatMessage, ChatRole, Role, ScaleRecord, SessionRecord, Speaker, Transcript,
    TranscriptSegment, User,
};
