//! Progress bar for pipeline passes.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use tabletop_pipeline::PipelineProgress;

/// One bar reused across the phases of a command.
pub(crate) struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    /// When `quiet` is true the bar is hidden.
    pub(crate) fn new(quiet: bool) -> Self {
        let bar = ProgressBar::new(0);
        if quiet {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        if let Ok(style) =
            ProgressStyle::with_template("  {bar:30.cyan/blue} {pos:>4}/{len:4} {wide_msg}")
        {
            bar.set_style(style.progress_chars("=> "));
        }
        Self { bar }
    }
}

impl PipelineProgress for BarProgress {
    fn on_item(&self, current: usize, total: usize, label: &str) {
        self.bar.set_length(total as u64);
        self.bar.set_position(current as u64);
        self.bar.set_message(label.to_string());
    }

    fn on_phase(&self, message: &str) {
        self.bar.reset();
        self.bar.suspend(|| {
            log::info!("{}", message.if_supports_color(Stdout, |t| t.bold()));
        });
    }

    fn on_complete(&self, message: &str) {
        self.bar.finish_and_clear();
        log::info!(
            "  {} {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            message
        );
    }
}

impl Drop for BarProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}
