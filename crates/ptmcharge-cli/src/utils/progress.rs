use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use ptmcharge::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

struct BarState {
    pb: ProgressBar,
    phase: &'static str,
}

/// Renders engine progress events on stderr.
///
/// Compare runs two engines at once, so events from different phases may interleave;
/// the bar simply follows whichever phase reported last.
#[derive(Clone)]
pub struct CliProgressHandler {
    state: Arc<Mutex<BarState>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// A handler that tracks state without drawing anything.
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::new(0).with_style(Self::spinner_style());
        pb.set_draw_target(target);
        pb.finish_and_clear();

        Self {
            state: Arc::new(Mutex::new(BarState { pb, phase: "" })),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let state = self.state.clone();

        Box::new(move |progress: Progress| {
            let Ok(mut guard) = state.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };
            let pb = guard.pb.clone();

            match progress {
                Progress::PhaseStart { name } => {
                    guard.phase = name;
                    pb.reset();
                    pb.set_length(0);
                    pb.set_style(Self::spinner_style());
                    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb.set_message(name);
                }
                Progress::PhaseFinish => {
                    pb.disable_steady_tick();
                    pb.finish_with_message(format!("✓ {}", guard.phase));
                }
                Progress::TaskStart { total_steps } => {
                    pb.disable_steady_tick();
                    pb.reset();
                    pb.set_length(total_steps);
                    pb.set_position(0);
                    pb.set_style(Self::bar_style());
                    pb.set_message(guard.phase);
                }
                Progress::TaskIncrement => {
                    pb.inc(1);
                }
                Progress::TaskFinish => {
                    let length = pb.length().unwrap_or(0);
                    if pb.position() < length {
                        pb.set_position(length);
                    }
                }
                Progress::Message(msg) => {
                    if pb.is_finished() {
                        pb.set_message(msg);
                    } else {
                        pb.println(format!("  {}", msg));
                    }
                }
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<24} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .with_key(
                "eta",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
                },
            )
            .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn bar(handler: &CliProgressHandler) -> ProgressBar {
        handler.state.lock().unwrap().pb.clone()
    }

    #[test]
    fn handler_initializes_in_a_clean_state() {
        let handler = CliProgressHandler::hidden();
        let pb = bar(&handler);
        assert_eq!(pb.length(), Some(0));
        assert!(pb.is_finished());
    }

    #[test]
    fn callback_tracks_a_full_phase() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart {
            name: "Exact convolution",
        });
        assert_eq!(bar(&handler).message(), "Exact convolution");
        assert!(!bar(&handler).is_finished());

        callback(Progress::TaskStart { total_steps: 6 });
        assert_eq!(bar(&handler).length(), Some(6));
        assert_eq!(bar(&handler).position(), 0);

        callback(Progress::TaskIncrement);
        assert_eq!(bar(&handler).position(), 1);

        callback(Progress::TaskFinish);
        assert_eq!(bar(&handler).position(), 6);

        callback(Progress::PhaseFinish);
        assert!(bar(&handler).is_finished());
        assert_eq!(bar(&handler).message(), "✓ Exact convolution");
    }

    #[test]
    fn callback_is_thread_safe() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::PhaseStart {
                name: "Gaussian approximation",
            });
            callback(Progress::PhaseFinish);
        })
        .join()
        .unwrap();

        assert!(bar(&handler).is_finished());
        assert_eq!(bar(&handler).message(), "✓ Gaussian approximation");
    }
}
