// libs/calendar-cell/src/models.rs
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::TryFrom;
use std::fmt;

use crate::error::CalendarError;

/// Lanes available to appointments inside a month cell.
pub const MONTH_LANE_COUNT: usize = 3;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const ACCEPTED_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentColor {
    #[default]
    Blue,
    Green,
    Red,
    Yellow,
    Purple,
    Orange,
    Gray,
}

impl fmt::Display for AppointmentColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentColor::Blue => write!(f, "blue"),
            AppointmentColor::Green => write!(f, "green"),
            AppointmentColor::Red => write!(f, "red"),
            AppointmentColor::Yellow => write!(f, "yellow"),
            AppointmentColor::Purple => write!(f, "purple"),
            AppointmentColor::Orange => write!(f, "orange"),
            AppointmentColor::Gray => write!(f, "gray"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub user_id: String,
    pub color: AppointmentColor,
}

impl Appointment {
    pub fn is_single_day(&self) -> bool {
        self.start_date.date() == self.end_date.date()
    }

    pub fn is_multi_day(&self) -> bool {
        !self.is_single_day()
    }

    pub fn duration(&self) -> Duration {
        self.end_date - self.start_date
    }

    /// Intervals that only touch (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &Appointment) -> bool {
        self.start_date < other.end_date && other.start_date < self.end_date
    }

    /// True if any part of the appointment falls on `day`.
    pub fn touches_day(&self, day: NaiveDate) -> bool {
        self.start_date.date() <= day && day <= self.end_date.date()
    }

    /// Inclusive intersection with `[from, to]`.
    pub fn intersects(&self, from: NaiveDateTime, to: NaiveDateTime) -> bool {
        self.start_date <= to && self.end_date >= from
    }

    /// Copy of this appointment moved to `new_start`, lasting `duration`.
    /// `None` when the end falls outside the representable range.
    pub fn rescheduled(&self, new_start: NaiveDateTime, duration: Duration) -> Option<Appointment> {
        let end_date = new_start.checked_add_signed(duration)?;
        Some(Appointment {
            start_date: new_start,
            end_date,
            ..self.clone()
        })
    }
}

/// Appointment as exchanged with the persistence collaborator. Timestamps are
/// kept as strings until ingestion validates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub user_id: String,
    #[serde(default)]
    pub color: AppointmentColor,
}

impl TryFrom<AppointmentRecord> for Appointment {
    type Error = CalendarError;

    fn try_from(record: AppointmentRecord) -> Result<Self, Self::Error> {
        let start_date = parse_timestamp(&record.start_date).ok_or_else(|| {
            CalendarError::InvalidTimestamp {
                id: record.id.clone(),
                value: record.start_date.clone(),
            }
        })?;
        let end_date = parse_timestamp(&record.end_date).ok_or_else(|| {
            CalendarError::InvalidTimestamp {
                id: record.id.clone(),
                value: record.end_date.clone(),
            }
        })?;

        if end_date < start_date {
            return Err(CalendarError::InvertedInterval { id: record.id });
        }

        Ok(Appointment {
            id: record.id,
            title: record.title,
            description: record.description,
            start_date,
            end_date,
            user_id: record.user_id,
            color: record.color,
        })
    }
}

impl From<&Appointment> for AppointmentRecord {
    fn from(appointment: &Appointment) -> Self {
        AppointmentRecord {
            id: appointment.id.clone(),
            title: appointment.title.clone(),
            description: appointment.description.clone(),
            start_date: appointment.start_date.format(TIMESTAMP_FORMAT).to_string(),
            end_date: appointment.end_date.format(TIMESTAMP_FORMAT).to_string(),
            user_id: appointment.user_id.clone(),
            color: appointment.color,
        }
    }
}

/// Parses an ingested timestamp. RFC 3339 values keep their wall-clock time
/// and drop the offset.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(with_offset) = chrono::DateTime::parse_from_rfc3339(value) {
        return Some(with_offset.naive_local());
    }
    ACCEPTED_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Partial update sent when an appointment is rescheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPatch {
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
}

impl From<&Appointment> for AppointmentPatch {
    fn from(appointment: &Appointment) -> Self {
        Self {
            start_date: appointment.start_date,
            end_date: appointment.end_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestRejection {
    pub id: String,
    pub error: CalendarError,
}

#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub accepted: Vec<Appointment>,
    pub rejected: Vec<IngestRejection>,
}

// ==============================================================================
// VIEW STATE MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarView {
    Day,
    Week,
    #[default]
    Month,
    Year,
    Agenda,
}

impl fmt::Display for CalendarView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarView::Day => write!(f, "day"),
            CalendarView::Week => write!(f, "week"),
            CalendarView::Month => write!(f, "month"),
            CalendarView::Year => write!(f, "year"),
            CalendarView::Agenda => write!(f, "agenda"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationDirection {
    Previous,
    Next,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeVariant {
    Dot,
    Colored,
    #[default]
    Mixed,
}

/// Professional filter. `All` is a selection, never stored on appointments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserFilter {
    #[default]
    All,
    User(String),
}

impl UserFilter {
    pub fn matches(&self, user_id: &str) -> bool {
        match self {
            UserFilter::All => true,
            UserFilter::User(id) => id == user_id,
        }
    }
}

impl From<&str> for UserFilter {
    fn from(selection: &str) -> Self {
        if selection == "all" {
            UserFilter::All
        } else {
            UserFilter::User(selection.to_string())
        }
    }
}

/// Half-open `[from, to)` window of hours of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourRange {
    pub from: u32,
    pub to: u32,
}

impl HourRange {
    pub const CLOSED: HourRange = HourRange { from: 0, to: 0 };

    pub const fn new(from: u32, to: u32) -> Self {
        Self { from, to }
    }

    pub fn is_closed(&self) -> bool {
        self.from == 0 && self.to == 0
    }

    pub fn contains(&self, hour: u32) -> bool {
        hour >= self.from && hour < self.to
    }
}

pub type VisibleHours = HourRange;

/// Opening hours per weekday, indexed from Sunday (0) to Saturday (6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours(HashMap<u8, HourRange>);

impl Default for WorkingHours {
    fn default() -> Self {
        let mut days = HashMap::with_capacity(7);
        days.insert(0, HourRange::CLOSED);
        for weekday in 1..=5 {
            days.insert(weekday, HourRange::new(8, 16));
        }
        days.insert(6, HourRange::new(8, 12));
        Self(days)
    }
}

impl WorkingHours {
    pub fn new(days: HashMap<u8, HourRange>) -> Self {
        Self(days)
    }

    /// Missing weekdays count as closed.
    pub fn for_weekday(&self, weekday: Weekday) -> HourRange {
        self.0
            .get(&(weekday.num_days_from_sunday() as u8))
            .copied()
            .unwrap_or(HourRange::CLOSED)
    }

    pub fn set(&mut self, weekday: Weekday, hours: HourRange) {
        self.0.insert(weekday.num_days_from_sunday() as u8, hours);
    }
}

/// Baseline visible hours widened to fit the appointments being displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveVisibleHours {
    pub hours: Vec<u32>,
    pub from: u32,
    pub to: u32,
}

impl EffectiveVisibleHours {
    pub fn range(&self) -> HourRange {
        HourRange::new(self.from, self.to)
    }
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn start_datetime(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// Last representable instant of the final day.
    pub fn end_datetime(&self) -> NaiveDateTime {
        self.end.and_time(end_of_day_time())
    }
}

pub(crate) fn end_of_day_time() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

// ==============================================================================
// LAYOUT MODELS
// ==============================================================================

/// Placement of a single-day appointment inside a day column, in percent of
/// the column box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnPlacement {
    pub appointment_id: String,
    pub group_index: usize,
    pub group_count: usize,
    pub top_percent: f64,
    pub height_percent: f64,
    pub left_percent: f64,
    pub width_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarCell {
    pub day: u32,
    pub date: NaiveDate,
    pub is_current_month: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedAppointment {
    pub appointment: Appointment,
    /// Lane in the month cell, `None` when folded into the overflow badge.
    pub position: Option<u8>,
    pub is_multi_day: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthCellLayout {
    pub cell: CalendarCell,
    pub appointments: Vec<PositionedAppointment>,
    pub overflow_count: usize,
}

impl MonthCellLayout {
    pub fn overflow_label(&self) -> Option<String> {
        (self.overflow_count > 0).then(|| format!("+{}", self.overflow_count))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthLayout {
    pub positions: HashMap<String, u8>,
    pub cells: Vec<MonthCellLayout>,
}

/// A multi-day appointment clipped to one week row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSpan {
    pub appointment: Appointment,
    pub adjusted_start: NaiveDateTime,
    pub adjusted_end: NaiveDateTime,
    pub start_index: usize,
    pub end_index: usize,
}

impl WeekSpan {
    pub fn span(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn collides_with(&self, other: &WeekSpan) -> bool {
        !(other.end_index < self.start_index || other.start_index > self.end_index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgendaDay {
    pub date: NaiveDate,
    pub appointments: Vec<Appointment>,
}

// ==============================================================================
// DRAG AND DROP MODELS
// ==============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DragActive {
    pub appointment: Option<Appointment>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropTarget {
    pub date: Option<NaiveDateTime>,
}

/// Shape delivered by the drag sensor when a pointer is released.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DragEndEvent {
    pub active: DragActive,
    pub over: Option<DropTarget>,
}

impl DragEndEvent {
    pub fn new(appointment: Appointment, target: NaiveDateTime) -> Self {
        Self {
            active: DragActive {
                appointment: Some(appointment),
            },
            over: Some(DropTarget { date: Some(target) }),
        }
    }

    pub fn payload(&self) -> Option<(&Appointment, NaiveDateTime)> {
        let appointment = self.active.appointment.as_ref()?;
        let date = self.over.as_ref()?.date?;
        Some((appointment, date))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Dragging { appointment_id: String },
    Dropped { appointment_id: String },
    Reconciling { appointment_id: String, generation: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    Pending,
    Committed,
    RolledBack,
}
