//! Progress reporting for workflow execution

use colored::Colorize;
use factlink_application::ports::progress::WorkflowProgressNotifier;
use factlink_domain::WorkflowPhase;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Reports progress with a spinner per phase, drawn on stderr
pub struct ProgressReporter {
    phase_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            phase_bar: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn phase_label(phase: WorkflowPhase, tool: Option<&str>) -> String {
        match tool {
            Some(tool) => format!("calling {}", tool),
            None => format!("{}...", phase.as_str()),
        }
    }

    fn finish_current(&self, message: String) {
        if let Ok(mut bar) = self.phase_bar.lock()
            && let Some(pb) = bar.take()
        {
            pb.finish_with_message(message);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowProgressNotifier for ProgressReporter {
    fn on_phase_start(&self, phase: WorkflowPhase, tool: Option<&str>) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix(phase.display_name().to_string());
        pb.set_message(Self::phase_label(phase, tool));
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut bar) = self.phase_bar.lock()
            && let Some(previous) = bar.replace(pb)
        {
            previous.finish_and_clear();
        }
    }

    fn on_phase_complete(&self, _phase: WorkflowPhase, success: bool) {
        let message = if success {
            format!("{}", "done".green())
        } else {
            format!("{}", "failed".red())
        };
        self.finish_current(message);
    }

    fn on_step_skipped(&self, phase: WorkflowPhase, reason: &str) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix(phase.display_name().to_string());
        pb.finish_with_message(format!("{} ({})", "skipped".yellow(), reason));
    }

    fn on_fallback(&self, reason: &str) {
        self.finish_current(format!("{} {}", "falling back:".yellow(), reason));
    }
}

/// Plain stderr lines, one per event (no fancy UI)
pub struct SimpleProgress;

impl WorkflowProgressNotifier for SimpleProgress {
    fn on_phase_start(&self, phase: WorkflowPhase, tool: Option<&str>) {
        match tool {
            Some(tool) => eprintln!("{} {} ({})", "->".cyan(), phase.display_name().bold(), tool),
            None => eprintln!("{} {}", "->".cyan(), phase.display_name().bold()),
        }
    }

    fn on_phase_complete(&self, phase: WorkflowPhase, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), phase.as_str());
        } else {
            eprintln!("  {} {} (failed)", "x".red(), phase.as_str());
        }
    }

    fn on_step_skipped(&self, phase: WorkflowPhase, reason: &str) {
        eprintln!("  {} {} skipped: {}", "-".yellow(), phase.as_str(), reason);
    }

    fn on_fallback(&self, reason: &str) {
        eprintln!("{} local fallback ({})", "!".yellow(), reason);
    }
}
