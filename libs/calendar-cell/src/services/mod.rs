pub mod context;
pub mod grouping;
pub mod ingest;
pub mod interval;
pub mod lanes;
pub mod reschedule;

pub use context::{refresh_context, SchedulingContext, SharedContext};
pub use grouping::{column_placements, day_column_layout, group_appointments};
pub use ingest::ingest;
pub use lanes::{month_layout, month_positions, overflow_count, week_multi_day_rows};
pub use reschedule::{RescheduleCoordinator, RescheduleOutcome};
