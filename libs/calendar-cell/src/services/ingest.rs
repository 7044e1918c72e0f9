use std::convert::TryFrom;
use tracing::warn;

use crate::models::{Appointment, AppointmentRecord, IngestRejection, IngestReport};

/// Validates upstream records. Malformed records are excluded and reported,
/// never propagated into layout math.
pub fn ingest<I>(records: I) -> IngestReport
where
    I: IntoIterator<Item = AppointmentRecord>,
{
    let mut report = IngestReport::default();

    for record in records {
        let id = record.id.clone();
        match Appointment::try_from(record) {
            Ok(appointment) => report.accepted.push(appointment),
            Err(error) => {
                warn!("Rejected appointment {} at ingestion: {}", id, error);
                report.rejected.push(IngestRejection { id, error });
            }
        }
    }

    report
}
