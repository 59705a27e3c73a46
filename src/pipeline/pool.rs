use std::sync::Arc;

use futures::future::join_all;
use indicatif::ProgressBar;
use log::{debug, error, info};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::store::ArtifactStore;
use crate::upstream::{ApiClient, Dashboard};

use super::aggregator::aggregate_queries;
use super::outcome::{Outcome, RunSummary};

type Queue = Arc<Mutex<mpsc::Receiver<Dashboard>>>;
type OutcomeSender = mpsc::UnboundedSender<Outcome>;

/// Fixed-size pool of workers draining a shared dashboard queue.
///
/// The queue is filled and closed before any worker starts, so each worker
/// simply pops until the queue reports closed. Dashboards start in list order;
/// they complete in whatever order their requests finish.
pub struct DashboardPool {
    worker: Arc<Worker>,
    workers: usize,
}

struct Worker {
    client: ApiClient,
    store: ArtifactStore,
    progress: ProgressBar,
}

impl DashboardPool {
    pub fn new(
        client: ApiClient,
        store: ArtifactStore,
        workers: usize,
        progress: ProgressBar,
    ) -> Self {
        Self {
            worker: Arc::new(Worker {
                client,
                store,
                progress,
            }),
            workers: workers.max(1),
        }
    }

    /// Process every dashboard and wait for all workers to exit.
    ///
    /// `listed` is the size of the upstream list before any limit was
    /// applied; it is only carried into the summary.
    pub async fn run(self, listed: usize, dashboards: Vec<Dashboard>) -> RunSummary {
        let mut summary = RunSummary::new(listed, dashboards.len());

        let (tx, rx) = mpsc::channel(dashboards.len().max(1));
        for dashboard in dashboards {
            if tx.send(dashboard).await.is_err() {
                break;
            }
        }
        drop(tx);

        let queue: Queue = Arc::new(Mutex::new(rx));
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        info!(
            "Processing {} dashboards with {} workers",
            summary.selected, self.workers
        );

        let handles: Vec<_> = (0..self.workers)
            .map(|worker_id| {
                let worker = Arc::clone(&self.worker);
                let queue = Arc::clone(&queue);
                let outcomes = outcome_tx.clone();
                tokio::spawn(async move { worker.drain(worker_id, queue, outcomes).await })
            })
            .collect();

        gather(handles, outcome_tx, outcome_rx, &mut summary).await;

        summary
    }
}

/// Wait for every worker, then record all outcomes they reported.
///
/// Outcomes are sent as each dashboard finishes, so a worker that panics
/// still has its earlier dashboards counted.
async fn gather(
    handles: Vec<JoinHandle<()>>,
    outcome_tx: OutcomeSender,
    mut outcome_rx: mpsc::UnboundedReceiver<Outcome>,
    summary: &mut RunSummary,
) {
    drop(outcome_tx);

    for result in join_all(handles).await {
        if let Err(e) = result {
            error!("Dashboard worker stopped unexpectedly: {e}");
        }
    }

    while let Some(outcome) = outcome_rx.recv().await {
        summary.record(&outcome);
    }
}

impl Worker {
    async fn drain(&self, worker_id: usize, queue: Queue, outcomes: OutcomeSender) {
        let mut processed = 0usize;

        loop {
            let next = queue.lock().await.recv().await;
            let Some(dashboard) = next else {
                break;
            };

            let outcome = self.process(dashboard).await;
            debug!("Worker {worker_id}: dashboard {:?} done", outcome.id());
            processed += 1;
            self.progress.inc(1);
            if outcomes.send(outcome).is_err() {
                break;
            }
        }

        debug!("Worker {worker_id} exiting after {processed} dashboards");
    }

    async fn process(&self, mut dashboard: Dashboard) -> Outcome {
        if let Err(e) = ArtifactStore::check_id(&dashboard.id) {
            error!("Not exporting dashboard {:?}: {e}", dashboard.name);
            return Outcome::Failed {
                id: dashboard.id,
                failed_cells: 0,
            };
        }

        if self.store.exists(&dashboard.id).await {
            debug!("Skipping dashboard {:?}: artifact exists", dashboard.id);
            return Outcome::Skipped { id: dashboard.id };
        }

        let collected = aggregate_queries(&self.client, &dashboard).await;
        let queries = collected.queries.len();
        dashboard.resolve_queries(collected.queries);

        match self.store.write(&dashboard).await {
            Ok(path) => {
                info!(
                    "Wrote {} queries for dashboard {:?} to {}",
                    queries,
                    dashboard.name,
                    path.display()
                );
                Outcome::Written {
                    id: dashboard.id,
                    queries,
                    failed_cells: collected.failed_cells,
                }
            }
            Err(e) => {
                error!("Failed to write dashboard {:?} to file: {e}", dashboard.id);
                Outcome::Failed {
                    id: dashboard.id,
                    failed_cells: collected.failed_cells,
                }
            }
        }
    }
}
