// libs/calendar-cell/tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use mockall::mock;

use calendar_cell::{
    Appointment, AppointmentColor, AppointmentDialogs, AppointmentFilter, AppointmentPatch,
    AppointmentRecord, AppointmentStore, Notifier,
};
use shared_models::AppError;

// ==============================================================================
// COLLABORATOR MOCKS
// ==============================================================================

mock! {
    pub Store {}

    #[async_trait]
    impl AppointmentStore for Store {
        async fn update(&self, id: &str, patch: AppointmentPatch) -> Result<AppointmentRecord, AppError>;
        async fn list(&self, filter: &AppointmentFilter) -> Result<Vec<AppointmentRecord>, AppError>;
        async fn refetch(&self) -> Result<Vec<AppointmentRecord>, AppError>;
    }
}

mock! {
    pub Toasts {}

    impl Notifier for Toasts {
        fn success(&self, message: &str);
        fn error(&self, message: &str);
    }
}

mock! {
    pub Dialogs {}

    impl AppointmentDialogs for Dialogs {
        fn open_create(&self, at: NaiveDateTime);
        fn open_edit(&self, appointment: &Appointment);
    }
}

// ==============================================================================
// FIXTURES
// ==============================================================================

pub fn dt(value: &str) -> NaiveDateTime {
    calendar_cell::parse_timestamp(value).expect("valid test timestamp")
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

pub fn appointment(id: &str, start: &str, end: &str) -> Appointment {
    appointment_for(id, start, end, "dr-ana")
}

pub fn appointment_for(id: &str, start: &str, end: &str, user_id: &str) -> Appointment {
    Appointment {
        id: id.to_string(),
        title: format!("Consultation {}", id),
        description: None,
        start_date: dt(start),
        end_date: dt(end),
        user_id: user_id.to_string(),
        color: AppointmentColor::Blue,
    }
}

pub fn record(id: &str, start: &str, end: &str) -> AppointmentRecord {
    AppointmentRecord {
        id: id.to_string(),
        title: format!("Consultation {}", id),
        description: None,
        start_date: start.to_string(),
        end_date: end.to_string(),
        user_id: "dr-ana".to_string(),
        color: AppointmentColor::Green,
    }
}

pub fn record_of(appointment: &Appointment) -> AppointmentRecord {
    AppointmentRecord::from(appointment)
}
