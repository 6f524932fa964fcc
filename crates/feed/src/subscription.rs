use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use store::{FeedQuery, StoreError, TicketStore};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::FeedConfig;
use crate::reconciler::Reconciler;
use crate::view::ViewState;

/// Handle to a running live view.
///
/// Dropping the handle cancels delivery the same way [`Subscription::unsubscribe`] does.
#[derive(Debug)]
pub struct Subscription {
    cancelled: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Stop delivery. No `on_change` call starts after this returns.
    pub fn unsubscribe(mut self) {
        self.cancel();
    }

    /// True while the feed task is still running and has not been cancelled.
    pub fn is_active(&self) -> bool {
        !self.cancelled.load(Ordering::Acquire)
            && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn cancel(&mut self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        info!("feed_unsubscribed");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Open a live view over the newest `config.capacity` tickets.
///
/// `on_change` receives the reconciled view after the initial snapshot and
/// after every batch that changed it. The store subscription is opened before
/// this returns, so a failure there surfaces as an error rather than a silent
/// empty view.
///
/// Must be called from within a tokio runtime.
pub async fn subscribe<S, F>(
    store: &S,
    config: FeedConfig,
    mut on_change: F,
) -> Result<Subscription, StoreError>
where
    S: TicketStore + ?Sized,
    F: FnMut(&ViewState) + Send + 'static,
{
    let mut feed = store.subscribe(FeedQuery::new(config.capacity)).await?;
    let collection = store.collection().to_string();
    info!(collection = %collection, capacity = config.capacity, "feed_subscribed");

    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancelled);

    let handle = tokio::spawn(async move {
        let mut reconciler = Reconciler::new(config);
        reconciler.start();

        while let Some(batch) = feed.recv().await {
            if flag.load(Ordering::Acquire) {
                break;
            }
            let Some(view) = reconciler.apply(batch) else {
                continue;
            };
            if flag.load(Ordering::Acquire) {
                break;
            }
            on_change(view);
        }

        reconciler.stop();
        debug!(collection = %collection, "feed_task_finished");
    });

    Ok(Subscription {
        cancelled,
        handle: Some(handle),
    })
}
