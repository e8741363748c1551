//! In-process scan queue and background worker pool

use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, warn};

use crate::application::execution::ExecuteScanUseCase;
use crate::domain::{Credential, ScanJob};

/// Message delivered to the worker pool when a scan is admitted.
///
/// The credential travels with the job in memory only; it is never persisted.
#[derive(Debug)]
pub struct QueuedScan {
    pub job: ScanJob,
    pub credential: Credential,
}

/// Errors that can occur when enqueuing a scan.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Scan queue is full")]
    Full,
    #[error("Scan queue is closed")]
    Closed,
}

/// Handle that allows admission to push scans to the worker pool.
#[derive(Clone)]
pub struct ScanQueueHandle {
    sender: mpsc::Sender<QueuedScan>,
}

/// Receiving side consumed by [`spawn_scan_worker_pool`].
pub struct ScanQueueReceiver {
    receiver: mpsc::Receiver<QueuedScan>,
}

/// Create a bounded scan queue.
pub fn scan_queue(capacity: usize) -> (ScanQueueHandle, ScanQueueReceiver) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (ScanQueueHandle { sender }, ScanQueueReceiver { receiver })
}

/// A reserved place in the scan queue. Dropping it unused gives the place back.
pub struct QueueSlot<'a> {
    permit: mpsc::Permit<'a, QueuedScan>,
}

impl ScanQueueHandle {
    /// Reserve room for one scan without waiting.
    pub fn try_reserve(&self) -> Result<QueueSlot<'_>, QueueError> {
        match self.sender.try_reserve() {
            Ok(permit) => Ok(QueueSlot { permit }),
            Err(TrySendError::Full(())) => {
                warn!(
                    capacity = self.sender.max_capacity(),
                    "Failed to reserve queue slot: queue full"
                );
                Err(QueueError::Full)
            }
            Err(TrySendError::Closed(())) => {
                error!("Failed to reserve queue slot: queue closed");
                Err(QueueError::Closed)
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl QueueSlot<'_> {
    /// Hand the scan to the worker pool. Never waits.
    pub fn send(self, scan: QueuedScan) {
        self.permit.send(scan);
    }
}

impl ScanQueueReceiver {
    pub async fn recv(&mut self) -> Option<QueuedScan> {
        self.receiver.recv().await
    }
}

/// Shared dependencies required by the scan workers.
#[derive(Clone)]
pub struct ScanWorkerContext {
    pub execute_scan_use_case: Arc<ExecuteScanUseCase>,
}

/// Spawn a worker pool that consumes queued scans and runs each in its own task,
/// at most `max_concurrent_scans` at a time.
///
/// Cancelling `shutdown` stops the pool from taking new scans. The returned
/// handle completes once the scans already running have finished.
pub fn spawn_scan_worker_pool(
    context: ScanWorkerContext,
    mut receiver: ScanQueueReceiver,
    max_concurrent_scans: usize,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    let concurrency = max_concurrent_scans.max(1);
    let semaphore = Arc::new(Semaphore::new(concurrency));

    tokio::spawn(async move {
        info!("Scan worker pool started with concurrency: {}", concurrency);

        loop {
            // Wait for a permit before taking a scan off the queue
            let permit = tokio::select! {
                _ = shutdown.cancelled() => break,
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(err) => {
                        error!(error = %err, "Failed to acquire concurrency permit for scan processing");
                        break;
                    }
                },
            };

            let queued = tokio::select! {
                _ = shutdown.cancelled() => break,
                queued = receiver.recv() => match queued {
                    Some(queued) => queued,
                    None => {
                        info!("Scan queue closed");
                        break;
                    }
                },
            };

            let ctx = context.clone();
            let span = info_span!("scan", scan_id = %queued.job.id, repo = %queued.job.repo_name);
            tokio::spawn(
                async move {
                    process_scan(ctx, queued).await;
                    drop(permit);
                }
                .instrument(span),
            );
        }

        let running = concurrency - semaphore.available_permits();
        if running > 0 {
            info!(running, "Waiting for running scans to finish");
        }
        // Every running scan holds a permit until it is done
        let all_permits = u32::try_from(concurrency).unwrap_or(u32::MAX);
        if let Err(err) = semaphore.acquire_many(all_permits).await {
            error!(error = %err, "Failed to wait for running scans");
        }

        warn!("Scan worker pool exiting");
    })
}

async fn process_scan(ctx: ScanWorkerContext, queued: QueuedScan) {
    let QueuedScan { job, credential } = queued;
    let scan_id = job.id.clone();

    info!(scan_id = %scan_id, "Processing scan job");

    match ctx.execute_scan_use_case.execute(job, &credential).await {
        Ok(job) => info!(scan_id = %scan_id, status = %job.status, "Scan job finished"),
        // The job may be left non-terminal here; it expires with its TTL.
        Err(err) => error!(scan_id = %scan_id, error = %err, "Background scan processing failed"),
    }
}
