// libs/calendar-cell/src/services/context.rs
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use shared_config::CalendarConfig;
use shared_models::User;

use crate::error::CalendarError;
use crate::models::{
    Appointment, AppointmentRecord, BadgeVariant, CalendarView, EffectiveVisibleHours,
    HourRange, IngestRejection, NavigationDirection, UserFilter, VisibleHours, WorkingHours,
};
use crate::ports::{AppointmentDialogs, AppointmentFilter, AppointmentStore};
use crate::services::ingest::ingest;
use crate::services::interval::{self, view_range};

/// Context shared between the view controller and the reschedule coordinator.
pub type SharedContext = Arc<RwLock<SchedulingContext>>;

/// Calendar UI state for one mounted view. Owned by the view controller and
/// handed to consumers by reference; every concern has its own setter.
pub struct SchedulingContext {
    selected_date: NaiveDate,
    view: CalendarView,
    selected_user: UserFilter,
    badge_variant: BadgeVariant,
    users: Vec<User>,
    working_hours: WorkingHours,
    visible_hours: VisibleHours,
    appointments: Vec<Appointment>,
    dialogs: Option<Arc<dyn AppointmentDialogs>>,
}

impl SchedulingContext {
    pub fn new(config: &CalendarConfig, selected_date: NaiveDate) -> Self {
        Self {
            selected_date,
            view: CalendarView::default(),
            selected_user: UserFilter::All,
            badge_variant: BadgeVariant::default(),
            users: Vec::new(),
            working_hours: WorkingHours::default(),
            visible_hours: HourRange::new(config.visible_hours_from, config.visible_hours_to),
            appointments: Vec::new(),
            dialogs: None,
        }
    }

    pub fn with_dialogs(mut self, dialogs: Arc<dyn AppointmentDialogs>) -> Self {
        self.dialogs = Some(dialogs);
        self
    }

    pub fn into_shared(self) -> SharedContext {
        Arc::new(RwLock::new(self))
    }

    // ==============================================================================
    // ACCESSORS
    // ==============================================================================

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    pub fn view(&self) -> CalendarView {
        self.view
    }

    pub fn selected_user(&self) -> &UserFilter {
        &self.selected_user
    }

    pub fn badge_variant(&self) -> BadgeVariant {
        self.badge_variant
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn working_hours(&self) -> &WorkingHours {
        &self.working_hours
    }

    pub fn visible_hours(&self) -> VisibleHours {
        self.visible_hours
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn appointment(&self, id: &str) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == id)
    }

    // ==============================================================================
    // STATE TRANSITIONS
    // ==============================================================================

    pub fn set_selected_date(&mut self, date: Option<NaiveDate>) {
        if let Some(date) = date {
            self.selected_date = date;
        }
    }

    pub fn navigate(&mut self, direction: NavigationDirection) {
        self.selected_date = interval::navigate(self.selected_date, self.view, direction);
    }

    /// Switching view never touches the appointment list.
    pub fn set_view(&mut self, view: CalendarView) {
        debug!("Calendar view changed from {} to {}", self.view, view);
        self.view = view;
    }

    pub fn set_selected_user(&mut self, filter: UserFilter) {
        self.selected_user = filter;
    }

    pub fn set_badge_variant(&mut self, variant: BadgeVariant) {
        self.badge_variant = variant;
    }

    pub fn set_users(&mut self, users: Vec<User>) {
        self.users = users;
    }

    pub fn set_working_hours(&mut self, working_hours: WorkingHours) {
        self.working_hours = working_hours;
    }

    pub fn set_visible_hours(&mut self, visible_hours: VisibleHours) {
        self.visible_hours = visible_hours;
    }

    pub fn create_appointment(&self, at: NaiveDateTime) {
        match &self.dialogs {
            Some(dialogs) => dialogs.open_create(at),
            None => warn!("No appointment dialogs registered, ignoring create at {}", at),
        }
    }

    pub fn edit_appointment(&self, appointment: &Appointment) {
        match &self.dialogs {
            Some(dialogs) => dialogs.open_edit(appointment),
            None => warn!(
                "No appointment dialogs registered, ignoring edit of {}",
                appointment.id
            ),
        }
    }

    // ==============================================================================
    // LOCAL APPOINTMENT MIRROR
    // ==============================================================================

    /// Replaces the mirror with the upstream list. Optimistic edits that the
    /// upstream list does not reflect yet are discarded.
    pub fn sync_upstream<I>(&mut self, records: I) -> Vec<IngestRejection>
    where
        I: IntoIterator<Item = AppointmentRecord>,
    {
        let report = ingest(records);
        info!(
            "Synchronized {} appointments from upstream ({} rejected)",
            report.accepted.len(),
            report.rejected.len()
        );
        self.appointments = report.accepted;
        report.rejected
    }

    pub fn set_local_appointments(&mut self, appointments: Vec<Appointment>) {
        self.appointments = appointments;
    }

    /// Writes `appointment` over the mirror entry with the same id. The mirror
    /// only follows upstream membership, so an unknown id is left out.
    pub fn apply_local(&mut self, appointment: Appointment) -> Result<(), CalendarError> {
        let entry = self.entry_mut(&appointment.id)?;
        *entry = appointment;
        Ok(())
    }

    /// Puts a pre-mutation snapshot back. Fails when the entry has left the
    /// mirror in the meantime.
    pub fn restore_local(&mut self, snapshot: Appointment) -> Result<(), CalendarError> {
        let entry = self.entry_mut(&snapshot.id)?;
        *entry = snapshot;
        Ok(())
    }

    fn entry_mut(&mut self, id: &str) -> Result<&mut Appointment, CalendarError> {
        self.appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| CalendarError::NotFound(id.to_string()))
    }

    // ==============================================================================
    // DERIVED VIEW DATA
    // ==============================================================================

    /// Mirror entries intersecting the active view window and matching the
    /// professional filter.
    pub fn filtered_appointments(&self) -> Vec<Appointment> {
        let window = view_range(self.view, self.selected_date);
        let from = window.start_datetime();
        let to = window.end_datetime();

        self.appointments
            .iter()
            .filter(|a| a.intersects(from, to))
            .filter(|a| self.selected_user.matches(&a.user_id))
            .cloned()
            .collect()
    }

    pub fn effective_visible_hours(&self) -> EffectiveVisibleHours {
        interval::effective_visible_hours(self.visible_hours, &self.filtered_appointments())
    }

    pub fn is_working_hour(&self, date: NaiveDate, hour: u32) -> bool {
        interval::is_working_hour(date, hour, &self.working_hours)
    }

    /// Query matching what the active view displays.
    pub fn appointment_filter(&self) -> AppointmentFilter {
        let window = view_range(self.view, self.selected_date);
        AppointmentFilter {
            user: self.selected_user.clone(),
            from: window.start.and_time(NaiveTime::MIN),
            to: window.end_datetime(),
        }
    }
}

/// Loads the appointments for the context's current view and resynchronizes
/// the mirror. The lock is not held while the store is queried.
pub async fn refresh_context(
    context: &SharedContext,
    store: &dyn AppointmentStore,
) -> Result<Vec<IngestRejection>, CalendarError> {
    let filter = context.read().await.appointment_filter();
    debug!("Loading appointments between {} and {}", filter.from, filter.to);

    let records = store.list(&filter).await?;
    Ok(context.write().await.sync_upstream(records))
}
