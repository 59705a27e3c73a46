mod aggregator;
mod outcome;
mod pool;

pub use outcome::RunSummary;

use log::{info, warn};

use crate::config::Config;
use crate::error::{DashqError, Result};
use crate::output::PhaseProgress;
use crate::store::ArtifactStore;
use crate::upstream::ApiClient;

use pool::DashboardPool;

/// Export the queries of every dashboard visible to the configured session.
///
/// Lists dashboards, applies the limit, creates the destination directory and
/// hands the queue to a [`DashboardPool`]. Per-cell and per-dashboard failures
/// are logged and counted in the returned summary.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built, the dashboard list
/// cannot be fetched, the list is empty, or the destination directory cannot
/// be created.
pub async fn export_dashboards(config: &Config, progress: PhaseProgress) -> Result<RunSummary> {
    let client = ApiClient::new(config)?;
    let store = ArtifactStore::new(&config.dest_dir, config.pretty);

    info!("Listing dashboards from {}", client.base_url());

    let mut dashboards = match client.list_dashboards().await {
        Ok(dashboards) => dashboards,
        Err(e) => {
            progress.fail("Failed to get dashboards");
            return Err(e);
        }
    };

    if dashboards.is_empty() {
        progress.fail("No dashboards returned");
        return Err(DashqError::NoDashboards);
    }

    let listed = dashboards.len();
    if let Some(limit) = config.limit {
        if limit < listed {
            warn!("Limiting export to the first {limit} of {listed} dashboards");
        }
        dashboards.truncate(limit);
    }

    if let Err(e) = store.ensure_dir().await {
        progress.fail("Failed to create destination directory");
        return Err(e);
    }

    let progress = progress.finish_phase_1_start_phase_2(dashboards.len());

    let summary = DashboardPool::new(client, store, config.workers, progress.tracker())
        .run(listed, dashboards)
        .await;

    progress.finish_phase_2();

    info!(
        "Export finished: {} written, {} skipped, {} failed",
        summary.written, summary.skipped, summary.failed
    );

    Ok(summary)
}
