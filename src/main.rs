//! Demo driver: reads ticket blobs from stdin (separated by `---` lines),
//! submits each one against an in-memory store, and prints the reconciled
//! leaderboard as JSON.
//!
//! ```text
//! ticketdesk [config.yaml] < tickets.txt
//! ```
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ticketdesk::{
    RankingEntry, SubmissionForm, Submitter, TicketDeskConfig, ViewState, subscribe,
};
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let log_level = std::env::var("TICKETDESK_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(log_level.as_str())
        .with_target(false)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => TicketDeskConfig::from_file(path)?,
        None => TicketDeskConfig::default(),
    };

    let store = config.store.build_in_memory();
    let submitter = Submitter::new(Arc::clone(&store), config.intake.clone(), config.store.clone());

    let latest: Arc<Mutex<Vec<RankingEntry>>> = Arc::default();
    let (applied_tx, mut applied_rx) = mpsc::unbounded_channel::<usize>();
    let sink = Arc::clone(&latest);
    let subscription = subscribe(&*store, config.feed.clone(), move |view: &ViewState| {
        if let Ok(mut guard) = sink.lock() {
            *guard = view.rankings().to_vec();
        }
        let _ = applied_tx.send(view.len());
    })
    .await?;

    let mut input = String::new();
    tokio::io::stdin().read_to_string(&mut input).await?;

    let submitted_by = std::env::var("USER").unwrap_or_else(|_| "demo".to_string());
    let mut stored = 0usize;
    for (n, blob) in input.split("\n---\n").enumerate() {
        let form = SubmissionForm {
            employee_name: submitted_by.clone(),
            department: "Operations".to_string(),
            ticket_type: "Reversal".to_string(),
            description: String::new(),
            raw_input: blob.to_string(),
            submitted_by: submitted_by.clone(),
        };
        match submitter.submit(form).await {
            Ok(record) => {
                stored += 1;
                println!("#{n}: stored {}", record.id);
            }
            Err(err) => println!("#{n}: rejected ({err})"),
        }
    }

    // Drain view updates until the feed has caught up with every write.
    while let Ok(Some(len)) =
        tokio::time::timeout(Duration::from_millis(250), applied_rx.recv()).await
    {
        if len >= stored.min(config.feed.capacity) {
            break;
        }
    }
    subscription.unsubscribe();

    let rankings = latest
        .lock()
        .map(|guard| guard.clone())
        .unwrap_or_else(|poisoned| poisoned.into_inner().clone());
    println!("{}", serde_json::to_string_pretty(&rankings)?);
    Ok(())
}
