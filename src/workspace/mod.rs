//! Workspace controller
//!
//! One [`Workspace`] per logged-in user: it owns the in-memory copies of
//! the user's credits, sessions, and scales, routes every user action to
//! the AI port and the snapshot store, and tracks which screen is
//! visible. All state is explicit and injected — no globals.
//!
//! Error policy (one rule, applied at every operation): failures are
//! caught here, recorded as a single user-facing message, and never
//! retried automatically. In-flight model calls are not cancellable;
//! navigating away simply ignores the eventual result.

mod controller;

pub use controller::{ExportPayload, NewSessionInput, PendingPlan, View, Workspace};
