// libs/calendar-cell/src/services/grouping.rs
use chrono::{Days, NaiveDate, NaiveTime};
use tracing::debug;

use crate::models::{Appointment, ColumnPlacement, HourRange};
use crate::services::interval::single_day_appointments_on;

const MINUTES_PER_DAY: f64 = 1440.0;

/// Partitions a day's appointments into chains that can share one column.
///
/// Appointments are sorted by start (stable, so ties keep their input order)
/// and each one joins the first group, in creation order, whose last member
/// ends at or before it starts. Otherwise it opens a new group. This is a
/// first-fit pass and does not always produce the minimum number of groups.
pub fn group_appointments(day_appointments: &[Appointment]) -> Vec<Vec<Appointment>> {
    let mut sorted = day_appointments.to_vec();
    sorted.sort_by_key(|a| a.start_date);

    let mut groups: Vec<Vec<Appointment>> = Vec::new();
    for appointment in sorted {
        let target = groups.iter_mut().find(|group| {
            group
                .last()
                .is_some_and(|last| last.end_date <= appointment.start_date)
        });

        match target {
            Some(group) => group.push(appointment),
            None => groups.push(vec![appointment]),
        }
    }

    groups
}

/// Geometry of every grouped appointment inside the column of `day`.
///
/// Columns are `100 / group_count` wide. An appointment that overlaps nothing
/// in any other group takes the full width.
pub fn column_placements(
    day: NaiveDate,
    groups: &[Vec<Appointment>],
    visible_hours: HourRange,
) -> Vec<ColumnPlacement> {
    let group_count = groups.len();
    let mut placements = Vec::with_capacity(groups.iter().map(Vec::len).sum());

    for (group_index, group) in groups.iter().enumerate() {
        for appointment in group {
            let (top_percent, height_percent) = vertical_extent(day, appointment, visible_hours);

            let has_overlap = groups
                .iter()
                .enumerate()
                .filter(|(other_index, _)| *other_index != group_index)
                .any(|(_, other)| other.iter().any(|o| appointment.overlaps(o)));

            let (left_percent, width_percent) = if has_overlap {
                let width = 100.0 / group_count as f64;
                (group_index as f64 * width, width)
            } else {
                (0.0, 100.0)
            };

            placements.push(ColumnPlacement {
                appointment_id: appointment.id.clone(),
                group_index,
                group_count,
                top_percent,
                height_percent,
                left_percent,
                width_percent,
            });
        }
    }

    placements
}

/// Groups and places the single-day appointments drawn on `day`.
pub fn day_column_layout(
    day: NaiveDate,
    appointments: &[Appointment],
    visible_hours: HourRange,
) -> Vec<ColumnPlacement> {
    let day_appointments = single_day_appointments_on(appointments, day);
    let groups = group_appointments(&day_appointments);
    debug!(
        "Laid out {} appointments on {} in {} groups",
        day_appointments.len(),
        day,
        groups.len()
    );
    column_placements(day, &groups, visible_hours)
}

/// Top offset and height in percent of the visible range. Falls back to the
/// whole day when the range is empty.
fn vertical_extent(day: NaiveDate, appointment: &Appointment, visible_hours: HourRange) -> (f64, f64) {
    let day_start = day.and_time(NaiveTime::MIN);
    let next_day_start = day
        .checked_add_days(Days::new(1))
        .map(|next| next.and_time(NaiveTime::MIN))
        .unwrap_or(appointment.end_date);

    let start = appointment.start_date.max(day_start);
    let end = appointment.end_date.min(next_day_start).max(start);

    let start_minutes = (start - day_start).num_minutes() as f64;
    let end_minutes = (end - day_start).num_minutes() as f64;

    let (range_start, range_minutes) = if visible_hours.to > visible_hours.from {
        (
            f64::from(visible_hours.from) * 60.0,
            f64::from(visible_hours.to - visible_hours.from) * 60.0,
        )
    } else {
        (0.0, MINUTES_PER_DAY)
    };

    let top = (start_minutes - range_start) / range_minutes * 100.0;
    let height = (end_minutes - start_minutes) / range_minutes * 100.0;
    (top, height)
}
