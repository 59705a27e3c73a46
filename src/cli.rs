use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use crate::config::{Config, Settings};
use crate::output::{self, PhaseProgress};
use crate::pipeline;

#[derive(Parser)]
#[command(name = "dashq")]
#[command(author, version, about = "Dashboard Query Exporter", long_about = None)]
pub struct Cli {
    /// Upstream host to query
    #[arg(short = 'u', long, env = "DASHQ_UPSTREAM")]
    upstream: Option<String>,

    /// Cookie for requests
    #[arg(short = 'c', long, env = "DASHQ_COOKIE", hide_env_values = true)]
    cookie: Option<String>,

    /// Limit to number of dashboards (0 or negative for no limit)
    #[arg(short = 'l', long, allow_negative_numbers = true)]
    limit: Option<i64>,

    /// Number of concurrent dashboard workers (max 50)
    #[arg(short = 'w', long)]
    workers: Option<usize>,

    /// Destination directory for dashboard files
    #[arg(short = 'd', long)]
    dest: Option<PathBuf>,

    /// Maximum number of upstream requests in flight
    #[arg(long)]
    max_requests: Option<usize>,

    /// Pretty-print dashboard files
    #[arg(short, long, default_value_t = false)]
    pretty: bool,

    /// Configuration file (defaults to ./dashq.{toml,json,yaml,yml})
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            upstream: self.upstream.clone(),
            cookie: self.cookie.clone(),
            limit: self.limit.map(|limit| usize::try_from(limit).unwrap_or(0)),
            workers: self.workers,
            dest: self.dest.clone(),
            max_requests: self.max_requests,
            pretty: self.pretty.then_some(true),
        }
    }

    pub async fn execute(&self) -> Result<()> {
        let settings = Settings::load(self.config.as_deref())?.merge(self.settings());
        let config = Config::resolve(settings)?;

        info!(
            "Exporting dashboards from {} to {} ({} workers)",
            config.upstream,
            config.dest_dir.display(),
            config.workers
        );

        let summary = pipeline::export_dashboards(&config, PhaseProgress::start_phase_1())
            .await
            .context("Dashboard export failed")?;

        output::print_summary(&summary, &config.dest_dir);

        Ok(())
    }
}
