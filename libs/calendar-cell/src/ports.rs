//! Collaborator contracts the engine depends on. Implementations live with
//! the persistence layer and the UI shell.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use shared_models::AppError;

use crate::models::{Appointment, AppointmentPatch, AppointmentRecord, UserFilter};

/// Query used to load the appointments backing a calendar view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentFilter {
    pub user: UserFilter,
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn update(&self, id: &str, patch: AppointmentPatch) -> Result<AppointmentRecord, AppError>;

    async fn list(&self, filter: &AppointmentFilter) -> Result<Vec<AppointmentRecord>, AppError>;

    /// Reloads the canonical list for the last requested filter.
    async fn refetch(&self) -> Result<Vec<AppointmentRecord>, AppError>;
}

/// Fire-and-forget user notifications (toasts).
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Create/edit dialogs owned by the UI shell.
pub trait AppointmentDialogs: Send + Sync {
    fn open_create(&self, at: NaiveDateTime);
    fn open_edit(&self, appointment: &Appointment);
}
