// libs/calendar-cell/src/services/lanes.rs
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

use crate::models::{
    Appointment, DateRange, MonthCellLayout, MonthLayout, PositionedAppointment, WeekSpan,
    MONTH_LANE_COUNT,
};
use crate::services::interval::{
    calendar_cells, month_end, month_start, split_by_span, week_end, week_start,
};

// ==============================================================================
// MONTH VIEW
// ==============================================================================

/// Assigns month-cell lanes.
///
/// Multi-day appointments go first (longest first, then earliest start),
/// followed by single-day appointments by start. Each takes the lowest lane
/// that is free on every day of its range clipped to the month. When all
/// lanes are taken on some day the appointment gets no entry and is only
/// reflected by the overflow count.
pub fn month_positions(
    multi_day: &[Appointment],
    single_day: &[Appointment],
    selected_date: NaiveDate,
) -> HashMap<String, u8> {
    let first_day = month_start(selected_date);
    let last_day = month_end(selected_date);
    let day_count = ((last_day - first_day).num_days() + 1) as usize;

    let mut occupied = vec![[false; MONTH_LANE_COUNT]; day_count];
    let mut positions = HashMap::new();

    let mut multi_day = multi_day.to_vec();
    multi_day.sort_by(|a, b| {
        b.duration()
            .num_days()
            .cmp(&a.duration().num_days())
            .then(a.start_date.cmp(&b.start_date))
    });
    let mut single_day = single_day.to_vec();
    single_day.sort_by_key(|a| a.start_date);

    for appointment in multi_day.iter().chain(single_day.iter()) {
        let clipped_start = appointment.start_date.date().max(first_day);
        let clipped_end = appointment.end_date.date().min(last_day);
        if clipped_start > clipped_end {
            continue;
        }

        let days = (clipped_start - first_day).num_days() as usize
            ..=(clipped_end - first_day).num_days() as usize;

        let lane = (0..MONTH_LANE_COUNT)
            .find(|&lane| occupied[days.clone()].iter().all(|day| !day[lane]));

        match lane {
            Some(lane) => {
                for day in &mut occupied[days] {
                    day[lane] = true;
                }
                positions.insert(appointment.id.clone(), lane as u8);
            }
            None => debug!("No free lane for appointment {}", appointment.id),
        }
    }

    positions
}

/// Appointments shown in the cell of `date`, multi-day first then by lane.
/// Unpositioned appointments sort ahead of lane 0 within their kind.
pub fn month_cell_appointments(
    date: NaiveDate,
    appointments: &[Appointment],
    positions: &HashMap<String, u8>,
) -> Vec<PositionedAppointment> {
    let mut cell: Vec<PositionedAppointment> = appointments
        .iter()
        .filter(|a| a.touches_day(date))
        .map(|a| PositionedAppointment {
            appointment: a.clone(),
            position: positions.get(&a.id).copied(),
            is_multi_day: a.is_multi_day(),
        })
        .collect();

    cell.sort_by_key(|p| (!p.is_multi_day, p.position.map_or(-1, i32::from)));
    cell
}

/// Appointments on `date` beyond the visible lanes. Counted from the full set,
/// independently of the lane assignment.
pub fn overflow_count(date: NaiveDate, appointments: &[Appointment]) -> usize {
    let total = appointments.iter().filter(|a| a.touches_day(date)).count();
    total - total.min(MONTH_LANE_COUNT)
}

pub fn month_layout(selected_date: NaiveDate, appointments: &[Appointment]) -> MonthLayout {
    let (single_day, multi_day) = split_by_span(appointments);
    let positions = month_positions(&multi_day, &single_day, selected_date);

    let cells = calendar_cells(selected_date)
        .into_iter()
        .map(|cell| MonthCellLayout {
            appointments: month_cell_appointments(cell.date, appointments, &positions),
            overflow_count: overflow_count(cell.date, appointments),
            cell,
        })
        .collect();

    MonthLayout { positions, cells }
}

// ==============================================================================
// WEEK MULTI-DAY ROWS
// ==============================================================================

/// Packs the multi-day appointments intersecting the week of `selected_date`
/// into rows. Spans are clipped to the week and ordered by clipped start,
/// longer spans first on ties. Each span joins the first row it does not
/// collide with; rows are unbounded.
pub fn week_multi_day_rows(selected_date: NaiveDate, appointments: &[Appointment]) -> Vec<Vec<WeekSpan>> {
    let week = DateRange {
        start: week_start(selected_date),
        end: week_end(selected_date),
    };
    let week_begin = week.start_datetime();
    let week_finish = week.end_datetime();

    let mut spans: Vec<WeekSpan> = appointments
        .iter()
        .filter(|a| a.is_multi_day() && a.intersects(week_begin, week_finish))
        .map(|a| {
            let adjusted_start = a.start_date.max(week_begin);
            let adjusted_end = a.end_date.min(week_finish);
            WeekSpan {
                appointment: a.clone(),
                adjusted_start,
                adjusted_end,
                start_index: (adjusted_start.date() - week.start).num_days() as usize,
                end_index: (adjusted_end.date() - week.start).num_days() as usize,
            }
        })
        .collect();

    spans.sort_by(|a, b| {
        a.adjusted_start
            .cmp(&b.adjusted_start)
            .then(b.span().cmp(&a.span()))
    });

    let mut rows: Vec<Vec<WeekSpan>> = Vec::new();
    for span in spans {
        let free_row = rows
            .iter()
            .position(|row| row.iter().all(|placed| !placed.collides_with(&span)));
        match free_row {
            Some(index) => rows[index].push(span),
            None => rows.push(vec![span]),
        }
    }

    debug!(
        "Packed multi-day appointments for week of {} into {} rows",
        week.start,
        rows.len()
    );

    rows
}
