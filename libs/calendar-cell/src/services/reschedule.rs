// libs/calendar-cell/src/services/reschedule.rs
use std::collections::HashMap;
use std::convert::TryFrom;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use shared_config::{CalendarConfig, DEFAULT_APPOINTMENT_DURATION_MINUTES};

use crate::error::CalendarError;
use crate::models::{
    Appointment, AppointmentPatch, AppointmentRecord, DragEndEvent, DragPhase, MutationState,
};
use crate::ports::{AppointmentStore, Notifier};
use crate::services::context::SharedContext;

pub const RESCHEDULE_SUCCESS_MESSAGE: &str = "Appointment rescheduled successfully";
pub const RESCHEDULE_ERROR_MESSAGE: &str = "Failed to reschedule appointment";

#[derive(Debug, Clone, PartialEq)]
pub enum RescheduleOutcome {
    /// The drop carried no appointment or no target date.
    Ignored,
    Committed(Appointment),
    RolledBack {
        snapshot: Appointment,
        error: CalendarError,
    },
}

#[derive(Debug, Clone, Copy)]
struct MutationEntry {
    generation: u64,
    state: MutationState,
}

/// Turns drops into reschedules: optimistic mirror update, persistence call,
/// then commit (refetch) or rollback (restore the pre-drag snapshot).
///
/// Each drop gets a generation number. The ledger keeps the newest generation
/// per appointment, so when two drags of the same appointment interleave the
/// newest one owns the mirror entry and an older failure does not revert it.
/// Settled entries are kept until the next drop.
pub struct RescheduleCoordinator {
    context: SharedContext,
    store: Arc<dyn AppointmentStore>,
    notifier: Arc<dyn Notifier>,
    default_duration: chrono::Duration,
    persistence_timeout: Duration,
    click_suppression: Duration,
    phase: Mutex<DragPhase>,
    ledger: Mutex<HashMap<String, MutationEntry>>,
    generations: AtomicU64,
    last_drag_end: Mutex<Option<Instant>>,
}

impl RescheduleCoordinator {
    pub fn new(
        config: &CalendarConfig,
        context: SharedContext,
        store: Arc<dyn AppointmentStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::with_timeout(config, context, store, notifier, config.reschedule_timeout())
    }

    pub fn with_timeout(
        config: &CalendarConfig,
        context: SharedContext,
        store: Arc<dyn AppointmentStore>,
        notifier: Arc<dyn Notifier>,
        persistence_timeout: Duration,
    ) -> Self {
        Self {
            context,
            store,
            notifier,
            default_duration: chrono::Duration::try_minutes(config.default_appointment_duration_minutes)
                .unwrap_or_else(|| chrono::Duration::minutes(DEFAULT_APPOINTMENT_DURATION_MINUTES)),
            persistence_timeout,
            click_suppression: config.click_suppression_window(),
            phase: Mutex::new(DragPhase::Idle),
            ledger: Mutex::new(HashMap::new()),
            generations: AtomicU64::new(0),
            last_drag_end: Mutex::new(None),
        }
    }

    pub async fn phase(&self) -> DragPhase {
        self.phase.lock().await.clone()
    }

    pub async fn mutation_state(&self, appointment_id: &str) -> Option<MutationState> {
        self.ledger
            .lock()
            .await
            .get(appointment_id)
            .map(|entry| entry.state)
    }

    pub async fn on_drag_start(&self, appointment: &Appointment) {
        debug!("Drag started for appointment {}", appointment.id);
        *self.phase.lock().await = DragPhase::Dragging {
            appointment_id: appointment.id.clone(),
        };
    }

    pub async fn on_drag_cancel(&self) {
        *self.phase.lock().await = DragPhase::Idle;
    }

    /// Whether a click arriving at `now` is the tail of a finished drag.
    pub async fn is_click_suppressed_at(&self, now: Instant) -> bool {
        match *self.last_drag_end.lock().await {
            Some(ended) => now.saturating_duration_since(ended) < self.click_suppression,
            None => false,
        }
    }

    pub async fn is_click_suppressed(&self) -> bool {
        self.is_click_suppressed_at(Instant::now()).await
    }

    #[instrument(skip(self, event))]
    pub async fn on_drag_end(&self, event: DragEndEvent) -> RescheduleOutcome {
        let Some((dragged, target)) = event.payload() else {
            debug!("Drop without appointment or target date ignored");
            *self.phase.lock().await = DragPhase::Idle;
            return RescheduleOutcome::Ignored;
        };

        let appointment_id = dragged.id.clone();
        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;

        *self.phase.lock().await = DragPhase::Dropped {
            appointment_id: appointment_id.clone(),
        };
        *self.last_drag_end.lock().await = Some(Instant::now());

        // Settled entries of earlier drops are dropped; in-flight ones stay.
        self.ledger
            .lock()
            .await
            .retain(|_, entry| entry.state == MutationState::Pending);

        // Optimistic mutation lands before the persistence call is issued.
        let moved = {
            let mut context = self.context.write().await;
            let snapshot = context
                .appointment(&appointment_id)
                .cloned()
                .unwrap_or_else(|| dragged.clone());
            match snapshot.rescheduled(target, self.default_duration) {
                Some(optimistic) => {
                    if let Err(error) = context.apply_local(optimistic.clone()) {
                        debug!("No optimistic copy for {}: {}", appointment_id, error);
                    }
                    Ok((snapshot, optimistic))
                }
                None => Err(snapshot),
            }
        };

        let (snapshot, optimistic) = match moved {
            Ok(moved) => moved,
            Err(snapshot) => {
                let error = CalendarError::OutOfRange {
                    id: appointment_id.clone(),
                    target,
                };
                self.track(&appointment_id, generation, MutationState::Pending)
                    .await;
                let outcome = self.roll_back(generation, snapshot, error).await;
                *self.phase.lock().await = DragPhase::Idle;
                return outcome;
            }
        };

        self.track(&appointment_id, generation, MutationState::Pending)
            .await;
        *self.phase.lock().await = DragPhase::Reconciling {
            appointment_id: appointment_id.clone(),
            generation,
        };

        debug!(
            "Rescheduling appointment {} to {} (generation {})",
            appointment_id, optimistic.start_date, generation
        );

        let outcome = match self.persist(&appointment_id, AppointmentPatch::from(&optimistic)).await {
            Ok(record) => self.commit(generation, optimistic, record).await,
            Err(error) => self.roll_back(generation, snapshot, error).await,
        };

        self.finish(generation).await;
        outcome
    }

    async fn persist(
        &self,
        appointment_id: &str,
        patch: AppointmentPatch,
    ) -> Result<AppointmentRecord, CalendarError> {
        match timeout(self.persistence_timeout, self.store.update(appointment_id, patch)).await {
            Ok(result) => result.map_err(CalendarError::from),
            Err(_) => Err(CalendarError::Timeout {
                timeout_ms: self.persistence_timeout.as_millis() as u64,
            }),
        }
    }

    async fn commit(
        &self,
        generation: u64,
        optimistic: Appointment,
        record: AppointmentRecord,
    ) -> RescheduleOutcome {
        let appointment_id = optimistic.id.clone();
        self.settle(&appointment_id, generation, MutationState::Committed)
            .await;

        let confirmed = Appointment::try_from(record).unwrap_or_else(|error| {
            warn!(
                "Persistence returned an unreadable record for {}: {}",
                appointment_id, error
            );
            optimistic
        });

        match self.store.refetch().await {
            Ok(records) => {
                let rejected = self.context.write().await.sync_upstream(records);
                if !rejected.is_empty() {
                    warn!("{} records rejected while refetching", rejected.len());
                }
            }
            Err(error) => warn!(
                "Refetch after rescheduling {} failed, keeping local mirror: {}",
                appointment_id, error
            ),
        }

        self.notifier.success(RESCHEDULE_SUCCESS_MESSAGE);
        info!(
            "Appointment {} rescheduled to {} - {}",
            appointment_id, confirmed.start_date, confirmed.end_date
        );

        RescheduleOutcome::Committed(confirmed)
    }

    async fn roll_back(
        &self,
        generation: u64,
        snapshot: Appointment,
        error: CalendarError,
    ) -> RescheduleOutcome {
        warn!(
            "Rescheduling appointment {} failed (retryable: {}): {}",
            snapshot.id,
            error.is_retryable(),
            error
        );

        let owns_entry = self
            .settle(&snapshot.id, generation, MutationState::RolledBack)
            .await;

        if owns_entry {
            if let Err(error) = self.context.write().await.restore_local(snapshot.clone()) {
                debug!("Nothing to roll back for {}: {}", snapshot.id, error);
            }
        } else {
            debug!(
                "Skipping rollback of {}: a newer drag owns the entry",
                snapshot.id
            );
        }

        self.notifier.error(RESCHEDULE_ERROR_MESSAGE);
        RescheduleOutcome::RolledBack { snapshot, error }
    }

    async fn track(&self, appointment_id: &str, generation: u64, state: MutationState) {
        self.ledger
            .lock()
            .await
            .insert(appointment_id.to_string(), MutationEntry { generation, state });
    }

    /// Records the final state if `generation` is still the newest mutation
    /// of the appointment.
    async fn settle(&self, appointment_id: &str, generation: u64, state: MutationState) -> bool {
        let mut ledger = self.ledger.lock().await;
        match ledger.get_mut(appointment_id) {
            Some(entry) if entry.generation == generation => {
                entry.state = state;
                true
            }
            _ => false,
        }
    }

    async fn finish(&self, generation: u64) {
        let mut phase = self.phase.lock().await;
        if matches!(&*phase, DragPhase::Reconciling { generation: current, .. } if *current == generation)
        {
            *phase = DragPhase::Idle;
        }
    }
}
