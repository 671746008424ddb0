//! The alert coordinator: one visible message at a time.
//!
//! Every layer that has something to tell the user funnels it here. The
//! notifier keeps at most one alert visible, auto-clears it after a
//! fixed delay, and lets a newer alert displace an older one without
//! the older alert's timer wiping the newer one out.
//!
//! # The generation counter
//!
//! Each `show` bumps a generation number and spawns a clear task bound
//! to that number. When the task wakes it only clears if the generation
//! still matches; a stale timer whose alert was already displaced does
//! nothing. Last write wins, and every shown alert gets its full time
//! on screen.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use parkline_api::Severity;
use parkline_reservations::AlertSink;

/// How long an alert stays visible before it clears itself.
const AUTO_CLEAR: Duration = Duration::from_secs(5);

/// One user-facing message.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub message: String,
    pub severity: Severity,
}

type Subscriber = Box<dyn Fn(Option<&Alert>) + Send + Sync>;

struct Inner {
    alert: Option<Alert>,
    /// Bumped on every show and manual clear. Stale auto-clear tasks
    /// compare against it and stand down.
    generation: u64,
}

struct NotifierState {
    inner: Mutex<Inner>,
    subscribers: Mutex<Vec<Subscriber>>,
    delay: Duration,
}

/// The shared alert slot. Cheap to clone; all clones observe the same
/// alert.
#[derive(Clone)]
pub struct Notifier {
    state: Arc<NotifierState>,
}

impl Notifier {
    /// A notifier with the standard auto-clear delay.
    pub fn new() -> Self {
        Self::with_delay(AUTO_CLEAR)
    }

    /// A notifier with a custom delay. Tests use short or paused-clock
    /// delays.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            state: Arc::new(NotifierState {
                inner: Mutex::new(Inner {
                    alert: None,
                    generation: 0,
                }),
                subscribers: Mutex::new(Vec::new()),
                delay,
            }),
        }
    }

    /// Shows an alert, displacing any visible one, and schedules its
    /// auto-clear.
    ///
    /// The auto-clear needs a tokio runtime to run its timer on.
    /// Called outside one (a synchronous shutdown path, say), the
    /// alert simply stays until displaced or cleared.
    pub fn show(&self, message: impl Into<String>, severity: Severity) {
        let alert = Alert {
            message: message.into(),
            severity,
        };
        tracing::debug!(message = %alert.message, ?severity, "alert shown");

        let generation = {
            let mut inner = self.state.inner.lock();
            inner.generation += 1;
            inner.alert = Some(alert.clone());
            inner.generation
        };
        self.notify(Some(&alert));

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("no async runtime, alert stays until dismissed");
            return;
        };
        let state = Arc::clone(&self.state);
        let notifier = self.clone();
        handle.spawn(async move {
            tokio::time::sleep(state.delay).await;

            let cleared = {
                let mut inner = state.inner.lock();
                if inner.generation == generation {
                    inner.alert = None;
                    true
                } else {
                    false // a newer alert owns the slot now
                }
            };
            if cleared {
                notifier.notify(None);
            }
        });
    }

    /// Clears the visible alert immediately (user dismissed it). Any
    /// pending auto-clear becomes stale.
    pub fn clear(&self) {
        let had_alert = {
            let mut inner = self.state.inner.lock();
            inner.generation += 1;
            inner.alert.take().is_some()
        };
        if had_alert {
            self.notify(None);
        }
    }

    /// The currently visible alert, if any.
    pub fn current(&self) -> Option<Alert> {
        self.state.inner.lock().alert.clone()
    }

    /// Registers a listener called with the new slot content on every
    /// change: `Some` when an alert appears, `None` when it clears.
    pub fn subscribe(&self, listener: impl Fn(Option<&Alert>) + Send + Sync + 'static) {
        self.state.subscribers.lock().push(Box::new(listener));
    }

    fn notify(&self, alert: Option<&Alert>) {
        for listener in self.state.subscribers.lock().iter() {
            listener(alert);
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

/// The business layers raise alerts through this seam.
impl AlertSink for Notifier {
    fn alert(&self, message: &str, severity: Severity) {
        self.show(message, severity);
    }
}

// =========================================================================
// Tests
// =========================================================================
