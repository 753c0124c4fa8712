//! Shared handler state.

use std::sync::Arc;

use harvester_core::{AuthService, NotificationDispatcher};
use harvester_infra::{AutomationScheduler, DbManager};
use tokio::sync::Mutex;

/// State shared by every route handler.
///
/// The scheduler sits behind a mutex because its lifecycle methods take
/// exclusive access; handlers only hold the lock for the duration of a
/// trigger call.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub scheduler: Arc<Mutex<AutomationScheduler>>,
    pub db: Arc<DbManager>,
}

impl AppState {
    /// Bundle the wired services for the router.
    pub fn new(
        auth: Arc<AuthService>,
        dispatcher: Arc<NotificationDispatcher>,
        scheduler: Arc<Mutex<AutomationScheduler>>,
        db: Arc<DbManager>,
    ) -> Self {
        Self { auth, dispatcher, scheduler, db }
    }
}
