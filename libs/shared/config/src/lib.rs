use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_APPOINTMENT_DURATION_MINUTES: i64 = 60;
/// Longest accepted default duration: one leap year.
pub const MAX_APPOINTMENT_DURATION_MINUTES: i64 = 24 * 60 * 366;
pub const DEFAULT_VISIBLE_HOURS_FROM: u32 = 7;
pub const DEFAULT_VISIBLE_HOURS_TO: u32 = 18;
pub const DEFAULT_RESCHEDULE_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CLICK_SUPPRESSION_MS: u64 = 150;

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarConfig {
    /// Length given to an appointment dropped on a new slot.
    pub default_appointment_duration_minutes: i64,
    pub visible_hours_from: u32,
    pub visible_hours_to: u32,
    pub reschedule_timeout_secs: u64,
    pub click_suppression_ms: u64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            default_appointment_duration_minutes: DEFAULT_APPOINTMENT_DURATION_MINUTES,
            visible_hours_from: DEFAULT_VISIBLE_HOURS_FROM,
            visible_hours_to: DEFAULT_VISIBLE_HOURS_TO,
            reschedule_timeout_secs: DEFAULT_RESCHEDULE_TIMEOUT_SECS,
            click_suppression_ms: DEFAULT_CLICK_SUPPRESSION_MS,
        }
    }
}

impl CalendarConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Missing or
    /// unparseable values fall back to their defaults, as does a default
    /// duration outside `1..=MAX_APPOINTMENT_DURATION_MINUTES`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            default_appointment_duration_minutes: read_duration_minutes(&lookup),
            visible_hours_from: read_or_default(
                &lookup,
                "CALENDAR_VISIBLE_HOURS_FROM",
                DEFAULT_VISIBLE_HOURS_FROM,
            ),
            visible_hours_to: read_or_default(
                &lookup,
                "CALENDAR_VISIBLE_HOURS_TO",
                DEFAULT_VISIBLE_HOURS_TO,
            ),
            reschedule_timeout_secs: read_or_default(
                &lookup,
                "CALENDAR_RESCHEDULE_TIMEOUT_SECS",
                DEFAULT_RESCHEDULE_TIMEOUT_SECS,
            ),
            click_suppression_ms: read_or_default(
                &lookup,
                "CALENDAR_CLICK_SUPPRESSION_MS",
                DEFAULT_CLICK_SUPPRESSION_MS,
            ),
        };

        if !config.is_valid() {
            warn!("Calendar configuration is inconsistent: {:?}", config);
        }

        config
    }

    pub fn is_valid(&self) -> bool {
        (1..=MAX_APPOINTMENT_DURATION_MINUTES).contains(&self.default_appointment_duration_minutes)
            && self.visible_hours_from < self.visible_hours_to
            && self.visible_hours_to <= 24
            && self.reschedule_timeout_secs > 0
    }

    pub fn reschedule_timeout(&self) -> Duration {
        Duration::from_secs(self.reschedule_timeout_secs)
    }

    pub fn click_suppression_window(&self) -> Duration {
        Duration::from_millis(self.click_suppression_ms)
    }
}

fn read_duration_minutes<F>(lookup: &F) -> i64
where
    F: Fn(&str) -> Option<String>,
{
    let key = "CALENDAR_DEFAULT_APPOINTMENT_DURATION_MINUTES";
    let minutes = read_or_default(lookup, key, DEFAULT_APPOINTMENT_DURATION_MINUTES);
    if (1..=MAX_APPOINTMENT_DURATION_MINUTES).contains(&minutes) {
        minutes
    } else {
        warn!(
            "{} must be between 1 and {}, got {}; using default {}",
            key, MAX_APPOINTMENT_DURATION_MINUTES, minutes, DEFAULT_APPOINTMENT_DURATION_MINUTES
        );
        DEFAULT_APPOINTMENT_DURATION_MINUTES
    }
}

fn read_or_default<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Display + Copy,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value {:?}, using default {}", key, raw, default);
            default
        }),
        None => {
            warn!("{} not set, using default {}", key, default);
            default
        }
    }
}
