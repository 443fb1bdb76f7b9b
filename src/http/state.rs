use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ai::AiService;
use crate::model::{Role, User};
use crate::payment::PaymentGateway;
use crate::store::DataStore;
use crate::workspace::Workspace;

/// Shared application state for HTTP handlers.
///
/// Mirrors the single-login browser model: at most one workspace is
/// open at a time, guarded by one lock — every mutation goes through
/// the single writer, the same discipline the UI event loop gave the
/// original.
#[derive(Clone)]
pub struct AppState {
    pub store: DataStore,
    pub ai: Arc<dyn AiService>,
    pub payment: Arc<dyn PaymentGateway>,

    /// The active user's workspace, if anyone is logged in.
    pub workspace: Arc<RwLock<Option<Workspace>>>,

    /// Mock account roster shown in the admin panel.
    pub roster: Arc<RwLock<Vec<User>>>,
}

impl AppState {
    pub fn new(
        store: DataStore,
        ai: Arc<dyn AiService>,
        payment: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            store,
            ai,
            payment,
            workspace: Arc::new(RwLock::new(None)),
            roster: Arc::new(RwLock::new(seed_roster())),
        }
    }
}

/// Demo accounts listed in the admin panel until real account storage
/// exists.
fn seed_roster() -> Vec<User> {
    let entry = |id: &str, name: &str, email: &str, role: Role, plan: &str, joined: &str| User {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        role,
        plan: plan.to_string(),
        joined_date: joined.parse().ok(),
    };

    vec![
        entry("1", "Dr. Ayşe Yılmaz", "ayse@klinik.com", Role::User, "Standart", "2023-01-15"),
        entry("2", "Psk. Mehmet Demir", "mehmet@terapi.net", Role::User, "Gelişmiş", "2023-02-20"),
        entry("3", "Klinik Psk. Zeynep Kaya", "zeynep@mail.com", Role::User, "Free", "2023-03-10"),
        entry("4", "Dr. Caner Erkin", "caner@psiko.com", Role::User, "Giriş", "2023-05-05"),
        entry("5", "Admin User", "admin@psikolojiagi.com", Role::Admin, "Gelişmiş", "2022-01-01"),
    ]
}
