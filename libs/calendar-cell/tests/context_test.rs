// libs/calendar-cell/tests/context_test.rs
mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use mockall::predicate::eq;

use calendar_cell::{
    refresh_context, BadgeVariant, CalendarError, CalendarView, HourRange, NavigationDirection,
    SchedulingContext, UserFilter,
};
use shared_config::CalendarConfig;
use shared_models::{AppError, User};

use common::{appointment, appointment_for, date, dt, record, MockDialogs, MockStore};

// ==============================================================================
// TEST FIXTURES AND UTILITIES
// ==============================================================================

fn context() -> SchedulingContext {
    SchedulingContext::new(&CalendarConfig::default(), date(2024, 1, 15))
}

fn seeded_context() -> SchedulingContext {
    let mut context = context();
    context.set_local_appointments(vec![
        appointment_for("ana-monday", "2024-01-15T09:00", "2024-01-15T10:00", "dr-ana"),
        appointment_for("bo-tuesday", "2024-01-16T14:00", "2024-01-16T15:00", "dr-bo"),
        appointment_for("ana-february", "2024-02-02T09:00", "2024-02-02T10:00", "dr-ana"),
    ]);
    context
}

fn ids(appointments: &[calendar_cell::Appointment]) -> Vec<&str> {
    appointments.iter().map(|a| a.id.as_str()).collect()
}

// ==============================================================================
// STATE TRANSITIONS
// ==============================================================================

#[test]
fn test_new_context_defaults() {
    let context = context();

    assert_eq!(context.selected_date(), date(2024, 1, 15));
    assert_eq!(context.view(), CalendarView::Month);
    assert_eq!(context.selected_user(), &UserFilter::All);
    assert_eq!(context.badge_variant(), BadgeVariant::Mixed);
    assert_eq!(context.visible_hours(), HourRange::new(7, 18));
    assert!(context.appointments().is_empty());
    assert!(context.users().is_empty());
}

#[test]
fn test_set_selected_date_ignores_absent_value() {
    let mut context = context();

    context.set_selected_date(None);
    assert_eq!(context.selected_date(), date(2024, 1, 15));

    context.set_selected_date(Some(date(2024, 3, 1)));
    assert_eq!(context.selected_date(), date(2024, 3, 1));
}

#[test]
fn test_navigate_follows_active_view() {
    let mut context = context();
    context.set_view(CalendarView::Week);

    context.navigate(NavigationDirection::Next);
    assert_eq!(context.selected_date(), date(2024, 1, 22));

    context.navigate(NavigationDirection::Previous);
    assert_eq!(context.selected_date(), date(2024, 1, 15));
}

#[test]
fn test_switching_view_keeps_appointments() {
    let mut context = seeded_context();
    let before = context.appointments().to_vec();

    context.set_view(CalendarView::Day);
    context.set_view(CalendarView::Agenda);

    assert_eq!(context.appointments(), before.as_slice());
}

#[test]
fn test_simple_setters() {
    let mut context = context();

    context.set_badge_variant(BadgeVariant::Dot);
    context.set_users(vec![User::new("dr-ana", "Ana Reyes")]);
    context.set_visible_hours(HourRange::new(6, 20));

    let mut working_hours = calendar_cell::WorkingHours::default();
    working_hours.set(chrono::Weekday::Sun, HourRange::new(10, 14));
    context.set_working_hours(working_hours);

    assert_eq!(context.badge_variant(), BadgeVariant::Dot);
    assert_eq!(context.users().len(), 1);
    assert_eq!(context.visible_hours(), HourRange::new(6, 20));
    assert!(context.is_working_hour(date(2024, 1, 14), 11));
    assert!(!context.is_working_hour(date(2024, 1, 14), 15));
}

// ==============================================================================
// DERIVED VIEW DATA
// ==============================================================================

#[test]
fn test_filtered_appointments_follow_view_and_user() {
    let mut context = seeded_context();
    assert_eq!(ids(&context.filtered_appointments()), vec!["ana-monday", "bo-tuesday"]);

    context.set_selected_user(UserFilter::from("dr-bo"));
    assert_eq!(ids(&context.filtered_appointments()), vec!["bo-tuesday"]);

    context.set_selected_user(UserFilter::from("all"));
    context.set_view(CalendarView::Day);
    assert_eq!(ids(&context.filtered_appointments()), vec!["ana-monday"]);

    context.set_view(CalendarView::Year);
    assert_eq!(context.filtered_appointments().len(), 3);
}

#[test]
fn test_effective_visible_hours_use_filtered_appointments() {
    let mut context = seeded_context();
    let mut appointments = context.appointments().to_vec();
    appointments.push(appointment("dawn", "2024-01-15T05:00", "2024-01-15T06:00"));
    appointments.push(appointment("next-month", "2024-02-10T20:00", "2024-02-10T22:30"));
    context.set_local_appointments(appointments);

    let visible = context.effective_visible_hours();
    assert_eq!(visible.from, 5);
    assert_eq!(visible.to, 18);
}

#[test]
fn test_appointment_filter_matches_view_window() {
    let mut context = context();
    context.set_selected_user(UserFilter::User("dr-ana".to_string()));

    let filter = context.appointment_filter();
    assert_eq!(filter.user, UserFilter::User("dr-ana".to_string()));
    assert_eq!(filter.from, dt("2024-01-01T00:00"));
    assert_eq!(filter.to.date(), date(2024, 1, 31));
    assert!(filter.to > dt("2024-01-31T23:59"));
}

// ==============================================================================
// LOCAL APPOINTMENT MIRROR
// ==============================================================================

#[test]
fn test_sync_upstream_rejects_malformed_records() {
    let mut context = context();

    let rejected = context.sync_upstream(vec![
        record("valid", "2024-01-15T09:00:00", "2024-01-15T10:00:00"),
        record("offset", "2024-01-15T11:00:00+02:00", "2024-01-15T12:00:00+02:00"),
        record("garbled", "not-a-date", "2024-01-15T10:00:00"),
        record("inverted", "2024-01-15T10:00:00", "2024-01-15T09:00:00"),
    ]);

    assert_eq!(ids(context.appointments()), vec!["valid", "offset"]);
    assert_eq!(
        context.appointment("offset").map(|a| a.start_date),
        Some(dt("2024-01-15T11:00"))
    );

    assert_eq!(rejected.len(), 2);
    assert_matches!(
        &rejected[0].error,
        CalendarError::InvalidTimestamp { id, value } if id == "garbled" && value == "not-a-date"
    );
    assert_matches!(&rejected[1].error, CalendarError::InvertedInterval { id } if id == "inverted");
}

#[test]
fn test_sync_upstream_replaces_optimistic_edits() {
    let mut context = seeded_context();
    context
        .apply_local(appointment("ana-monday", "2024-01-17T09:00", "2024-01-17T10:00"))
        .expect("seeded entry");

    context.sync_upstream(vec![record("ana-monday", "2024-01-15T09:00", "2024-01-15T10:00")]);

    assert_eq!(context.appointments().len(), 1);
    assert_eq!(
        context.appointment("ana-monday").map(|a| a.start_date),
        Some(dt("2024-01-15T09:00"))
    );
}

#[test]
fn test_apply_local_only_replaces_known_entries() {
    let mut context = seeded_context();

    let moved = appointment("ana-monday", "2024-01-18T09:00", "2024-01-18T10:00");
    context.apply_local(moved.clone()).expect("seeded entry");
    assert_eq!(context.appointment("ana-monday"), Some(&moved));
    assert_eq!(context.appointments().len(), 3);

    let before = context.appointments().to_vec();
    let walk_in = context.apply_local(appointment("walk-in", "2024-01-19T09:00", "2024-01-19T10:00"));
    assert_matches!(walk_in, Err(CalendarError::NotFound(id)) if id == "walk-in");
    assert_eq!(context.appointments(), before.as_slice());
}

#[test]
fn test_restore_local_requires_existing_entry() {
    let mut context = seeded_context();
    let original = context.appointment("ana-monday").cloned().expect("seeded");

    context
        .apply_local(appointment("ana-monday", "2024-01-18T09:00", "2024-01-18T10:00"))
        .expect("seeded entry");
    context.restore_local(original.clone()).expect("entry still mirrored");
    assert_eq!(context.appointment("ana-monday"), Some(&original));

    let stranger = appointment("gone", "2024-01-15T09:00", "2024-01-15T10:00");
    assert_matches!(context.restore_local(stranger), Err(CalendarError::NotFound(id)) if id == "gone");
    assert!(context.appointment("gone").is_none());
}

// ==============================================================================
// DIALOGS
// ==============================================================================

#[test]
fn test_create_and_edit_open_dialogs() {
    let mut dialogs = MockDialogs::new();
    dialogs
        .expect_open_create()
        .with(eq(dt("2024-01-15T13:00")))
        .times(1)
        .return_const(());
    dialogs
        .expect_open_edit()
        .withf(|a| a.id == "ana-monday")
        .times(1)
        .return_const(());

    let mut context = context().with_dialogs(Arc::new(dialogs));
    context.set_local_appointments(vec![appointment(
        "ana-monday",
        "2024-01-15T09:00",
        "2024-01-15T10:00",
    )]);

    context.create_appointment(dt("2024-01-15T13:00"));
    let existing = context.appointment("ana-monday").cloned().expect("seeded");
    context.edit_appointment(&existing);
}

#[test]
fn test_dialog_requests_without_dialogs_are_ignored() {
    let context = seeded_context();
    context.create_appointment(dt("2024-01-15T13:00"));
    context.edit_appointment(&appointment("x", "2024-01-15T09:00", "2024-01-15T10:00"));
    assert_eq!(context.appointments().len(), 3);
}

// ==============================================================================
// REFRESH
// ==============================================================================

#[tokio::test]
async fn test_refresh_context_loads_current_window() {
    let mut store = MockStore::new();
    store
        .expect_list()
        .withf(|filter| filter.from == dt("2024-01-01T00:00") && filter.user == UserFilter::All)
        .times(1)
        .returning(|_| {
            Ok(vec![
                record("loaded", "2024-01-20T09:00", "2024-01-20T10:00"),
                record("broken", "2024-01-20T09:00", "yesterday"),
            ])
        });

    let shared = context().into_shared();
    let rejected = refresh_context(&shared, &store).await.expect("refresh succeeds");

    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].id, "broken");
    assert_eq!(ids(shared.read().await.appointments()), vec!["loaded"]);
}

#[tokio::test]
async fn test_refresh_context_keeps_mirror_on_failure() {
    let mut store = MockStore::new();
    store
        .expect_list()
        .times(1)
        .returning(|_| Err(AppError::Database("connection reset".to_string())));

    let shared = seeded_context().into_shared();
    let result = refresh_context(&shared, &store).await;

    assert_matches!(result, Err(CalendarError::Persistence(AppError::Database(_))));
    assert_eq!(shared.read().await.appointments().len(), 3);
}
