use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{bright, bright_green, bright_red, bright_yellow};

/// Progress tracking for the two phases of an export run
pub struct PhaseProgress {
    pb: ProgressBar,
}

impl PhaseProgress {
    pub fn start_phase_1() -> Self {
        eprintln!("{}  {}", bright("⚙️"), bright("Phases").underlined());
        let pb = create_spinner(bright_yellow("Phase 1/2: Listing dashboards").to_string());
        Self { pb }
    }

    /// Progress that never draws, for runs without a terminal.
    pub fn hidden() -> Self {
        Self {
            pb: ProgressBar::hidden(),
        }
    }

    pub fn finish_phase_1_start_phase_2(self, dashboards: usize) -> Self {
        self.pb.finish_with_message(
            bright_green(format!("Phase 1/2: Listed {dashboards} dashboards ✓")).to_string(),
        );

        if self.pb.is_hidden() {
            return Self::hidden();
        }

        let pb = create_bar(
            dashboards as u64,
            bright_yellow("Phase 2/2: Fetching cell queries").to_string(),
        );
        Self { pb }
    }

    /// Handle for workers to advance the current phase.
    pub fn tracker(&self) -> ProgressBar {
        self.pb.clone()
    }

    pub fn finish_phase_2(self) {
        self.pb.finish_with_message(
            bright_green("Phase 2/2: Dashboards exported ✓").to_string(),
        );
        if !self.pb.is_hidden() {
            eprintln!();
        }
    }

    pub fn fail(self, reason: &str) {
        self.pb
            .abandon_with_message(bright_red(format!("✗ {reason}")).to_string());
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {msg} {spinner}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn create_bar(len: u64, message: String) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {msg} [{bar:30.cyan/blue}] {pos}/{len} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
