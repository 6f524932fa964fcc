use std::sync::Arc;
use std::time::Instant;

use intake::{IntakeConfig, SubmissionForm, TicketRecord};
use store::{StoreConfig, StoreError, TicketStore};
use tokio::sync::Mutex;
use tracing::{Instrument, Level, info, warn};

use crate::error::SubmitError;
use crate::guard::DuplicateGuard;
use crate::metrics::MetricsSpan;

/// Intake → duplicate guard → store write, one submission at a time.
///
/// A second `submit` while one is still awaiting the store fails fast with
/// [`SubmitError::InFlight`] instead of queueing behind it.
pub struct Submitter {
    store: Arc<dyn TicketStore>,
    guard: DuplicateGuard,
    intake: IntakeConfig,
    store_cfg: StoreConfig,
    in_flight: Mutex<()>,
}

impl Submitter {
    pub fn new(store: Arc<dyn TicketStore>, intake: IntakeConfig, store_cfg: StoreConfig) -> Self {
        let guard = DuplicateGuard::new(Arc::clone(&store), store_cfg.query_timeout());
        Self {
            store,
            guard,
            intake,
            store_cfg,
            in_flight: Mutex::new(()),
        }
    }

    pub fn guard(&self) -> &DuplicateGuard {
        &self.guard
    }

    /// True while a submission is being processed.
    pub fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// Validate, parse, de-duplicate and persist one form.
    ///
    /// Nothing is written unless every earlier step succeeded. Store errors
    /// from either the duplicate query or the write are returned as-is.
    pub async fn submit(&self, form: SubmissionForm) -> Result<TicketRecord, SubmitError> {
        let span = tracing::span!(Level::INFO, "ticketdesk.submit", submitted_by = %form.submitted_by);
        self.submit_traced(form).instrument(span).await
    }

    async fn submit_traced(&self, form: SubmissionForm) -> Result<TicketRecord, SubmitError> {
        let metrics = MetricsSpan::start();
        let start = Instant::now();

        let result = match self.in_flight.try_lock() {
            Ok(_permit) => self.submit_inner(form).await,
            Err(_) => Err(SubmitError::InFlight),
        };

        match &result {
            Ok(record) => info!(
                id = %record.id,
                reference_code = record.reference_code().unwrap_or(""),
                teller = record.teller().unwrap_or(""),
                elapsed_micros = start.elapsed().as_micros(),
                "submit_success"
            ),
            Err(err) => warn!(
                error = %err,
                kind = err.kind(),
                elapsed_micros = start.elapsed().as_micros(),
                "submit_failure"
            ),
        }

        if let Some(span) = metrics {
            span.record_submission(result.as_ref().map(|_| ()).map_err(Clone::clone));
        }
        result
    }

    async fn submit_inner(&self, form: SubmissionForm) -> Result<TicketRecord, SubmitError> {
        let ticket = intake::intake(form, &self.intake)?;

        if self.guard.check_record(&ticket.parsed_data).await? {
            return Err(SubmitError::Duplicate {
                reference_code: ticket.parsed_data.reference_code().unwrap_or_default().to_string(),
                teller: ticket.parsed_data.teller().unwrap_or_default().to_string(),
            });
        }

        let timeout = self.store_cfg.query_timeout();
        let record = tokio::time::timeout(timeout, self.store.insert(ticket))
            .await
            .map_err(|_| StoreError::Timeout(timeout))??;
        Ok(record)
    }
}

impl std::fmt::Debug for Submitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submitter")
            .field("collection", &self.store.collection())
            .field("intake", &self.intake)
            .field("store_cfg", &self.store_cfg)
            .finish()
    }
}
