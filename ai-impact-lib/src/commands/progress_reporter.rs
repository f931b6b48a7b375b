use crate::facts::Progress;
use core::fmt::{Debug, Formatter};
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use core::time::Duration;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::task::JoinHandle;

/// Refresh rate for progress updates (10 Hz).
const REFRESH_INTERVAL_MS: u64 = 100;

const DETERMINATE_TEMPLATE: &str = "{prefix:>12.bold.cyan} [{bar:25}] {pos}/{len} {msg}";
const DETERMINATE_TEMPLATE_NO_COLOR: &str = "{prefix:>12} [{bar:25}] {pos}/{len} {msg}";
const INDETERMINATE_TEMPLATE: &str = "{prefix:>12.bold.cyan} {spinner} {msg}";
const INDETERMINATE_TEMPLATE_NO_COLOR: &str = "{prefix:>12} {spinner} {msg}";

#[derive(Debug)]
struct DelayedProgressState {
    visible_after: Instant,
    visible: AtomicBool,
    total: AtomicU64,
    position: AtomicU64,
    message: Mutex<String>,
}

/// A progress bar that stays hidden until work has been running for a while.
///
/// Counters are updated from the collectors and copied into the bar by a background task,
/// so quick runs never draw anything.
#[derive(Clone)]
pub struct ProgressReporter {
    bar: ProgressBar,
    state: Arc<DelayedProgressState>,
    refresh_task: Arc<JoinHandle<()>>,
    use_colors: bool,
}

impl ProgressReporter {
    /// Create a new progress reporter.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn new(delay: Duration, use_colors: bool) -> Self {
        let bar = ProgressBar::hidden();

        let state = Arc::new(DelayedProgressState {
            visible_after: Instant::now() + delay,
            visible: AtomicBool::new(false),
            total: AtomicU64::new(0),
            position: AtomicU64::new(0),
            message: Mutex::new(String::new()),
        });

        let reporter = Self {
            refresh_task: Arc::new(tokio::spawn(refresh_task(bar.clone(), Arc::clone(&state)))),
            bar,
            state,
            use_colors,
        };

        reporter.apply_style(false);
        reporter
    }

    fn apply_style(&self, determinate: bool) {
        let template = match (determinate, self.use_colors) {
            (true, true) => DETERMINATE_TEMPLATE,
            (true, false) => DETERMINATE_TEMPLATE_NO_COLOR,
            (false, true) => INDETERMINATE_TEMPLATE,
            (false, false) => INDETERMINATE_TEMPLATE_NO_COLOR,
        };

        let style = if determinate {
            ProgressStyle::default_bar()
                .template(template)
                .expect("could not create progress bar style")
                .progress_chars("=> ")
        } else {
            ProgressStyle::default_spinner()
                .template(template)
                .expect("could not create progress bar style")
        };

        self.bar.set_style(style);
    }

    fn set_message(&self, message: &str) {
        let mut guard = self.state.message.lock().unwrap_or_else(PoisonError::into_inner);
        guard.clear();
        guard.push_str(message);
    }
}

impl Progress for ProgressReporter {
    fn set_phase(&self, phase: &str) {
        self.bar.set_prefix(phase.to_string());
        self.state.total.store(0, Ordering::Relaxed);
        self.state.position.store(0, Ordering::Relaxed);
        self.set_message("");
        self.apply_style(false);
    }

    fn set_total(&self, total: u64) {
        self.state.total.store(total, Ordering::Relaxed);
        self.state.position.store(0, Ordering::Relaxed);
        self.apply_style(true);
    }

    fn advance(&self, message: &str) {
        let _ = self.state.position.fetch_add(1, Ordering::Relaxed);
        self.set_message(message);
    }

    fn println(&self, message: &str) {
        self.bar.suspend(|| eprintln!("{message}"));
    }

    fn done(&self) {
        self.refresh_task.abort();
        if self.state.visible.load(Ordering::Relaxed) {
            self.bar.finish_and_clear();
        }
    }
}

impl Debug for ProgressReporter {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("bar", &self.bar)
            .field("state", &self.state)
            .field("refresh_task", &"<task>")
            .field("use_colors", &self.use_colors)
            .finish()
    }
}

/// Background refresh task that copies the counters into the progress bar.
async fn refresh_task(bar: ProgressBar, state: Arc<DelayedProgressState>) {
    let mut interval = tokio::time::interval(Duration::from_millis(REFRESH_INTERVAL_MS));
    #[expect(clippy::infinite_loop, reason = "task runs until aborted")]
    loop {
        let _ = interval.tick().await;

        if !state.visible.load(Ordering::Relaxed) && Instant::now() >= state.visible_after {
            state.visible.store(true, Ordering::Relaxed);
            bar.set_draw_target(ProgressDrawTarget::stderr_with_hz(10));
        }

        if state.visible.load(Ordering::Relaxed) {
            let total = state.total.load(Ordering::Relaxed);
            if total > 0 {
                bar.set_length(total);
                bar.set_position(state.position.load(Ordering::Relaxed));
            } else {
                bar.tick();
            }

            let message = state.message.lock().unwrap_or_else(PoisonError::into_inner).clone();
            bar.set_message(message);
        }
    }
}
