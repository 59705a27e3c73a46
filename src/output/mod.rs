mod progress;
mod styling;
mod summary;
mod tables;

pub use progress::PhaseProgress;
pub use summary::print_summary;

use styling::{dim, magenta_bold};

/// Prints the `dashq` banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("📊 dashq"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Dashboard Query Exporter")
    );
}
