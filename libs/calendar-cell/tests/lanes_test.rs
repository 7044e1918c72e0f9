// libs/calendar-cell/tests/lanes_test.rs
mod common;

use std::collections::HashSet;

use calendar_cell::lanes::month_cell_appointments;
use calendar_cell::{
    month_layout, month_positions, overflow_count, week_multi_day_rows, MonthCellLayout,
    MonthLayout,
};
use chrono::NaiveDate;
use common::{appointment, date, dt};

fn cell(layout: &MonthLayout, day: NaiveDate) -> &MonthCellLayout {
    layout
        .cells
        .iter()
        .find(|c| c.cell.date == day)
        .expect("cell for day")
}

// ==============================================================================
// MONTH LANES
// ==============================================================================

#[test]
fn test_five_appointments_on_one_day_overflow_by_two() {
    let appointments: Vec<_> = (0..5)
        .map(|i| {
            appointment(
                &format!("visit-{}", i),
                &format!("2024-01-15T{:02}:00", 9 + i),
                &format!("2024-01-15T{:02}:30", 9 + i),
            )
        })
        .collect();

    let layout = month_layout(date(2024, 1, 15), &appointments);

    let lanes: HashSet<u8> = layout.positions.values().copied().collect();
    assert_eq!(layout.positions.len(), 3);
    assert_eq!(lanes, HashSet::from([0, 1, 2]));

    let fifteenth = cell(&layout, date(2024, 1, 15));
    assert_eq!(fifteenth.overflow_count, 2);
    assert_eq!(fifteenth.overflow_label().as_deref(), Some("+2"));
    assert_eq!(fifteenth.appointments.len(), 5);
}

#[test]
fn test_quiet_day_has_no_overflow_badge() {
    let appointments = vec![
        appointment("a", "2024-01-15T09:00", "2024-01-15T10:00"),
        appointment("b", "2024-01-15T11:00", "2024-01-15T12:00"),
    ];

    let layout = month_layout(date(2024, 1, 15), &appointments);
    let fifteenth = cell(&layout, date(2024, 1, 15));
    assert_eq!(fifteenth.overflow_count, 0);
    assert_eq!(fifteenth.overflow_label(), None);
    assert_eq!(overflow_count(date(2024, 1, 16), &appointments), 0);
}

#[test]
fn test_multi_day_appointments_claim_lanes_first() {
    let trip = appointment("trip", "2024-01-14T08:00", "2024-01-16T18:00");
    let singles = vec![
        appointment("s1", "2024-01-15T09:00", "2024-01-15T10:00"),
        appointment("s2", "2024-01-15T10:00", "2024-01-15T11:00"),
        appointment("s3", "2024-01-15T11:00", "2024-01-15T12:00"),
    ];

    let positions = month_positions(&[trip], &singles, date(2024, 1, 15));

    assert_eq!(positions.get("trip"), Some(&0));
    assert_eq!(positions.get("s1"), Some(&1));
    assert_eq!(positions.get("s2"), Some(&2));
    assert_eq!(positions.get("s3"), None);
}

#[test]
fn test_longer_multi_day_appointments_go_first() {
    let short = appointment("short", "2024-01-15T08:00", "2024-01-16T18:00");
    let long = appointment("long", "2024-01-10T08:00", "2024-01-16T18:00");

    let positions = month_positions(&[short, long], &[], date(2024, 1, 1));

    assert_eq!(positions.get("long"), Some(&0));
    assert_eq!(positions.get("short"), Some(&1));
}

#[test]
fn test_multi_day_lane_is_stable_across_days() {
    let appointments = vec![
        appointment("trip", "2024-01-14T08:00", "2024-01-16T18:00"),
        appointment("single", "2024-01-15T09:00", "2024-01-15T10:00"),
    ];

    let layout = month_layout(date(2024, 1, 15), &appointments);

    for day in 14..=16 {
        let entries = &cell(&layout, date(2024, 1, day)).appointments;
        assert_eq!(entries[0].appointment.id, "trip");
        assert!(entries[0].is_multi_day);
        assert_eq!(entries[0].position, Some(0));
    }
    let fifteenth = &cell(&layout, date(2024, 1, 15)).appointments;
    assert_eq!(fifteenth[1].appointment.id, "single");
    assert_eq!(fifteenth[1].position, Some(1));
}

#[test]
fn test_ranges_are_clipped_to_the_month() {
    let appointments = vec![
        appointment("new-year", "2023-12-30T10:00", "2024-01-02T10:00"),
        appointment("february", "2024-02-05T10:00", "2024-02-05T11:00"),
    ];
    let (single, multi): (Vec<_>, Vec<_>) =
        appointments.iter().cloned().partition(|a| a.is_single_day());

    let positions = month_positions(&multi, &single, date(2024, 1, 20));

    assert_eq!(positions.get("new-year"), Some(&0));
    assert_eq!(positions.get("february"), None);
}

#[test]
fn test_cell_lists_multi_day_before_single_day() {
    let appointments = vec![
        appointment("single", "2024-01-15T07:00", "2024-01-15T08:00"),
        appointment("trip", "2024-01-14T08:00", "2024-01-16T18:00"),
    ];
    let layout = month_layout(date(2024, 1, 15), &appointments);

    let entries = month_cell_appointments(date(2024, 1, 15), &appointments, &layout.positions);
    let ids: Vec<_> = entries.iter().map(|e| e.appointment.id.as_str()).collect();
    assert_eq!(ids, vec!["trip", "single"]);
}

// ==============================================================================
// WEEK MULTI-DAY ROWS
// ==============================================================================

#[test]
fn test_week_rows_pack_without_collisions() {
    let appointments = vec![
        appointment("a", "2024-01-14T09:00", "2024-01-16T10:00"),
        appointment("b", "2024-01-16T09:00", "2024-01-18T10:00"),
        appointment("c", "2024-01-17T09:00", "2024-01-19T10:00"),
        appointment("clipped", "2024-01-10T09:00", "2024-01-14T12:00"),
        appointment("single", "2024-01-15T09:00", "2024-01-15T10:00"),
        appointment("next-week", "2024-01-22T09:00", "2024-01-24T10:00"),
    ];

    let rows = week_multi_day_rows(date(2024, 1, 15), &appointments);

    let row_ids: Vec<Vec<&str>> = rows
        .iter()
        .map(|row| row.iter().map(|s| s.appointment.id.as_str()).collect())
        .collect();
    assert_eq!(row_ids, vec![vec!["clipped", "b"], vec!["a", "c"]]);

    let clipped = &rows[0][0];
    assert_eq!(clipped.adjusted_start, dt("2024-01-14T00:00"));
    assert_eq!(clipped.adjusted_end, dt("2024-01-14T12:00"));
    assert_eq!((clipped.start_index, clipped.end_index), (0, 0));

    for row in &rows {
        for (i, first) in row.iter().enumerate() {
            for second in &row[i + 1..] {
                assert!(!first.collides_with(second));
            }
        }
    }
}

#[test]
fn test_week_rows_are_unbounded() {
    let appointments: Vec<_> = (0..5)
        .map(|i| appointment(&format!("conf-{}", i), "2024-01-15T09:00", "2024-01-17T17:00"))
        .collect();

    let rows = week_multi_day_rows(date(2024, 1, 15), &appointments);
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().all(|row| row.len() == 1));
}
