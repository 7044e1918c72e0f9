// libs/calendar-cell/src/services/interval.rs
use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, Timelike};
use std::collections::BTreeMap;

use crate::models::{
    AgendaDay, Appointment, CalendarCell, CalendarView, DateRange, EffectiveVisibleHours,
    HourRange, NavigationDirection, VisibleHours, WorkingHours,
};

const LABEL_FORMAT: &str = "%b %-d, %Y";

// ==============================================================================
// RANGE COMPUTATION
// ==============================================================================

/// Weeks start on Sunday.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_sunday() as u64;
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

pub fn week_end(date: NaiveDate) -> NaiveDate {
    let start = week_start(date);
    start.checked_add_days(Days::new(6)).unwrap_or(start)
}

pub fn week_days(date: NaiveDate) -> Vec<NaiveDate> {
    week_start(date).iter_days().take(7).collect()
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn month_end(date: NaiveDate) -> NaiveDate {
    let start = month_start(date);
    start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    month_end(date).day()
}

pub fn year_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

pub fn year_end(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date)
}

/// Days covered by `view` around `date`. Agenda lists a whole month.
pub fn view_range(view: CalendarView, date: NaiveDate) -> DateRange {
    match view {
        CalendarView::Day => DateRange { start: date, end: date },
        CalendarView::Week => DateRange {
            start: week_start(date),
            end: week_end(date),
        },
        CalendarView::Month | CalendarView::Agenda => DateRange {
            start: month_start(date),
            end: month_end(date),
        },
        CalendarView::Year => DateRange {
            start: year_start(date),
            end: year_end(date),
        },
    }
}

pub fn range_label(view: CalendarView, date: NaiveDate) -> String {
    match view {
        CalendarView::Day => date.format(LABEL_FORMAT).to_string(),
        _ => {
            let range = view_range(view, date);
            format!(
                "{} - {}",
                range.start.format(LABEL_FORMAT),
                range.end.format(LABEL_FORMAT)
            )
        }
    }
}

/// Moves one unit of the view's granularity. Month steps clamp to the end of
/// the target month, so Jan 31 -> Feb 29 -> Jan 29.
pub fn navigate(date: NaiveDate, view: CalendarView, direction: NavigationDirection) -> NaiveDate {
    let moved = match (view, direction) {
        (CalendarView::Day, NavigationDirection::Next) => date.checked_add_days(Days::new(1)),
        (CalendarView::Day, NavigationDirection::Previous) => date.checked_sub_days(Days::new(1)),
        (CalendarView::Week, NavigationDirection::Next) => date.checked_add_days(Days::new(7)),
        (CalendarView::Week, NavigationDirection::Previous) => date.checked_sub_days(Days::new(7)),
        (CalendarView::Month | CalendarView::Agenda, NavigationDirection::Next) => {
            date.checked_add_months(Months::new(1))
        }
        (CalendarView::Month | CalendarView::Agenda, NavigationDirection::Previous) => {
            date.checked_sub_months(Months::new(1))
        }
        (CalendarView::Year, NavigationDirection::Next) => date.checked_add_months(Months::new(12)),
        (CalendarView::Year, NavigationDirection::Previous) => {
            date.checked_sub_months(Months::new(12))
        }
    };
    moved.unwrap_or(date)
}

// ==============================================================================
// DAY PREDICATES AND FILTERS
// ==============================================================================

pub fn is_same_day(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a.date() == b.date()
}

/// Splits appointments into (single-day, multi-day), preserving order.
pub fn split_by_span(appointments: &[Appointment]) -> (Vec<Appointment>, Vec<Appointment>) {
    appointments
        .iter()
        .cloned()
        .partition(Appointment::is_single_day)
}

/// Single-day appointments drawn in the column of `day`.
pub fn single_day_appointments_on(appointments: &[Appointment], day: NaiveDate) -> Vec<Appointment> {
    appointments
        .iter()
        .filter(|a| a.is_single_day())
        .filter(|a| a.start_date.date() == day || a.end_date.date() == day)
        .cloned()
        .collect()
}

/// Multi-day appointments covering `day`, shown above the day grid.
pub fn multi_day_appointments_on(appointments: &[Appointment], day: NaiveDate) -> Vec<Appointment> {
    appointments
        .iter()
        .filter(|a| a.is_multi_day() && a.touches_day(day))
        .cloned()
        .collect()
}

/// Appointments in progress at `now`.
pub fn current_appointments(appointments: &[Appointment], now: NaiveDateTime) -> Vec<Appointment> {
    appointments
        .iter()
        .filter(|a| a.start_date <= now && now <= a.end_date)
        .cloned()
        .collect()
}

/// Number of appointments starting in the same day/week/month/year as `date`.
pub fn appointment_count(appointments: &[Appointment], date: NaiveDate, view: CalendarView) -> usize {
    appointments
        .iter()
        .filter(|a| {
            let start = a.start_date.date();
            match view {
                CalendarView::Day => start == date,
                CalendarView::Week => week_start(start) == week_start(date),
                CalendarView::Month | CalendarView::Agenda => {
                    start.year() == date.year() && start.month() == date.month()
                }
                CalendarView::Year => start.year() == date.year(),
            }
        })
        .count()
}

/// Appointments of the month of `date`, grouped by start day in date order.
pub fn agenda_days(appointments: &[Appointment], date: NaiveDate) -> Vec<AgendaDay> {
    let month = view_range(CalendarView::Agenda, date);
    let mut by_day: BTreeMap<NaiveDate, Vec<Appointment>> = BTreeMap::new();

    for appointment in appointments
        .iter()
        .filter(|a| a.intersects(month.start_datetime(), month.end_datetime()))
    {
        by_day
            .entry(appointment.start_date.date())
            .or_default()
            .push(appointment.clone());
    }

    by_day
        .into_iter()
        .map(|(date, mut appointments)| {
            appointments.sort_by_key(|a| a.start_date);
            AgendaDay { date, appointments }
        })
        .collect()
}

// ==============================================================================
// MONTH GRID
// ==============================================================================

/// Cells of the month grid: trailing days of the previous month up to the
/// first weekday, the month itself, then leading days of the next month to
/// complete the last week.
pub fn calendar_cells(selected_date: NaiveDate) -> Vec<CalendarCell> {
    let first = month_start(selected_date);
    let leading = first.weekday().num_days_from_sunday() as u64;
    let in_month = days_in_month(selected_date) as u64;
    let trailing = (7 - (leading + in_month) % 7) % 7;

    let grid_start = first.checked_sub_days(Days::new(leading)).unwrap_or(first);

    grid_start
        .iter_days()
        .take((leading + in_month + trailing) as usize)
        .map(|date| CalendarCell {
            day: date.day(),
            date,
            is_current_month: date.month() == first.month() && date.year() == first.year(),
        })
        .collect()
}

// ==============================================================================
// HOURS
// ==============================================================================

/// Widens `baseline` so every single-day appointment fits. End hours round up
/// when the appointment ends past the full hour.
pub fn effective_visible_hours(
    baseline: VisibleHours,
    appointments: &[Appointment],
) -> EffectiveVisibleHours {
    let mut from = baseline.from;
    let mut to = baseline.to;

    for appointment in appointments.iter().filter(|a| a.is_single_day()) {
        let start_hour = appointment.start_date.hour();
        let end = appointment.end_date;
        let end_hour = end.hour() + u32::from(end.minute() > 0);

        from = from.min(start_hour);
        to = to.max(end_hour);
    }

    let to = to.min(24);

    EffectiveVisibleHours {
        hours: (from..to).collect(),
        from,
        to,
    }
}

pub fn is_working_hour(date: NaiveDate, hour: u32, working_hours: &WorkingHours) -> bool {
    let hours: HourRange = working_hours.for_weekday(date.weekday());
    hours.contains(hour)
}
