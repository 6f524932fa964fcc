use std::sync::Arc;
use std::time::Duration;

use intake::ParsedRecord;
use store::{StoreError, TicketStore};
use tracing::{debug, warn};

use crate::metrics::MetricsSpan;

/// Rejects a submission whose `(reference_code, teller)` pair already exists.
///
/// The check is only as strong as the store's query: two submissions racing
/// through the guard can both see "no duplicate". A backend unique constraint
/// is the real fix for that window.
#[derive(Clone)]
pub struct DuplicateGuard {
    store: Arc<dyn TicketStore>,
    timeout: Duration,
}

impl DuplicateGuard {
    pub fn new(store: Arc<dyn TicketStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `Ok(true)` when at least one stored ticket matches both fields.
    ///
    /// A missing half of the key short-circuits to `Ok(false)` without a
    /// query. Store failures and timeouts are returned as errors and never
    /// read as "no duplicate".
    pub async fn check_duplicate(
        &self,
        reference_code: Option<&str>,
        teller: Option<&str>,
    ) -> Result<bool, StoreError> {
        let (Some(reference_code), Some(teller)) = (reference_code, teller) else {
            debug!(
                has_reference_code = reference_code.is_some(),
                has_teller = teller.is_some(),
                "duplicate_check_skipped"
            );
            return Ok(false);
        };

        let metrics = MetricsSpan::start();
        let result = match tokio::time::timeout(
            self.timeout,
            self.store.find_by_reference(reference_code, teller),
        )
        .await
        {
            Ok(Ok(matches)) => Ok(!matches.is_empty()),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(StoreError::Timeout(self.timeout)),
        };

        match &result {
            Ok(found) => debug!(
                collection = self.store.collection(),
                reference_code,
                teller,
                found = *found,
                "duplicate_check"
            ),
            Err(err) => warn!(
                collection = self.store.collection(),
                reference_code,
                teller,
                error = %err,
                "duplicate_check_failed"
            ),
        }

        if let Some(span) = metrics {
            span.record_duplicate_check(result.clone());
        }
        result
    }

    /// [`check_duplicate`](Self::check_duplicate) on a parsed record's key fields.
    pub async fn check_record(&self, record: &ParsedRecord) -> Result<bool, StoreError> {
        self.check_duplicate(record.reference_code(), record.teller())
            .await
    }
}

impl std::fmt::Debug for DuplicateGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateGuard")
            .field("collection", &self.store.collection())
            .field("timeout", &self.timeout)
            .finish()
    }
}
