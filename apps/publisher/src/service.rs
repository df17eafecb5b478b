//! The publishing queue and the per-batch processing loop.
//!
//! Jobs are only markers ("http call", "scheduler"); every job drains the
//! full set of unprocessed resources. A single worker consumes the queue,
//! so two triggers can never process the same resource concurrently.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use besluitpub_extraction::run_pipeline;
use besluitpub_shared::{AppConfig, PublicationStatus, Result};
use besluitpub_store::SparqlStore;

/// Handle used by triggers to enqueue a publishing job.
pub type JobSender = mpsc::UnboundedSender<&'static str>;

/// Spawn the single queue worker. Jobs sent on the returned sender are
/// processed strictly one at a time.
pub fn spawn_queue(store: Arc<SparqlStore>, config: Arc<AppConfig>) -> (JobSender, JoinHandle<()>) {
    let (jobs, mut queue) = mpsc::unbounded_channel::<&'static str>();

    let worker = tokio::spawn(async move {
        while let Some(origin) = queue.recv().await {
            if let Err(e) = publish_batch(&store, &config, origin).await {
                error!(error = %e, "publishing batch failed");
            }
        }
    });

    (jobs, worker)
}

/// Enqueue a publishing job on an interval.
pub fn spawn_scheduler(jobs: JobSender, poll_interval_secs: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(poll_interval_secs.max(1)));
        loop {
            interval.tick().await;
            if jobs.send("scheduler").is_err() {
                break;
            }
        }
    })
}

/// Process every unprocessed published resource once.
///
/// Resources are locked to `pending` (bumping their retry count) before any
/// work starts, then marked `success` or `failed` individually; one failing
/// resource never blocks the rest of the batch.
pub async fn publish_batch(store: &SparqlStore, config: &AppConfig, origin: &str) -> Result<()> {
    info!(origin, "publishing triggered");

    let mut resources = store
        .unprocessed_resources(
            config.publisher.pending_timeout_hours,
            config.publisher.max_attempts,
        )
        .await?;
    info!(count = resources.len(), "found resources to process");

    for resource in &mut resources {
        info!(resource = %resource.resource, "locking resource");
        store
            .update_status(resource, PublicationStatus::Pending, resource.number_of_retries)
            .await?;
        resource.number_of_retries += 1;
    }

    for resource in &resources {
        info!(resource = %resource.resource, "start processing");
        match run_pipeline(resource, store).await {
            Ok(()) => {
                store
                    .update_status(
                        resource,
                        PublicationStatus::Success,
                        resource.number_of_retries,
                    )
                    .await?;
            }
            Err(e) => {
                warn!(
                    resource = %resource.resource,
                    error = %e,
                    retryable = e.is_retryable(),
                    "error processing resource"
                );
                store
                    .update_status(
                        resource,
                        PublicationStatus::Failed,
                        resource.number_of_retries,
                    )
                    .await?;
            }
        }
    }

    Ok(())
}
