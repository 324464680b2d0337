use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::{Desktop, DesktopSnapshot, FocusOutcome, OpenOutcome, WindowControl};

/// Shared desktop driven by one recurring tick task.
///
/// Every gesture locks the desktop, applies itself and publishes a fresh
/// snapshot. Dropping the handle stops the tick task and discards pending
/// reveal stages so nothing updates after the view is gone.
pub struct DesktopHandle {
    desktop: Arc<Mutex<Desktop>>,
    publisher: Arc<watch::Sender<DesktopSnapshot>>,
    ticker: JoinHandle<()>,
}

impl DesktopHandle {
    /// Must be called from within a tokio runtime.
    pub fn spawn(desktop: Desktop, tick_interval: Duration) -> Self {
        let (publisher, _) = watch::channel(desktop.snapshot());
        let publisher = Arc::new(publisher);
        let desktop = Arc::new(Mutex::new(desktop));
        let ticker = spawn_ticker(desktop.clone(), publisher.clone(), tick_interval);
        Self {
            desktop,
            publisher,
            ticker,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DesktopSnapshot> {
        self.publisher.subscribe()
    }

    pub async fn snapshot(&self) -> DesktopSnapshot {
        self.desktop.lock().await.snapshot()
    }

    pub async fn double_click(&self, id: &str) -> OpenOutcome {
        let mut desktop = self.desktop.lock().await;
        let outcome = desktop.double_click(id, Instant::now());
        self.publisher.send_replace(desktop.snapshot());
        outcome
    }

    pub async fn touch_end(&self, id: &str) -> Option<OpenOutcome> {
        let mut desktop = self.desktop.lock().await;
        let outcome = desktop.touch_end(id, Instant::now());
        if outcome.is_some() {
            self.publisher.send_replace(desktop.snapshot());
        }
        outcome
    }

    pub async fn focus(&self, id: &str) -> FocusOutcome {
        let mut desktop = self.desktop.lock().await;
        let outcome = desktop.focus(id);
        if matches!(outcome, FocusOutcome::Raised { .. }) {
            self.publisher.send_replace(desktop.snapshot());
        }
        outcome
    }

    pub async fn window_control(&self, id: &str, control: WindowControl) {
        self.desktop.lock().await.window_control(id, control);
    }

    pub async fn minimize(&self, id: &str) {
        self.window_control(id, WindowControl::Minimize).await;
    }

    pub async fn maximize(&self, id: &str) {
        self.window_control(id, WindowControl::Maximize).await;
    }

    pub async fn close(&self, id: &str) {
        self.window_control(id, WindowControl::Close).await;
    }

    /// Stops ticking and clears every pending stage. Idempotent.
    pub async fn shutdown(&self) {
        self.ticker.abort();
        self.desktop.lock().await.teardown();
    }
}

impl Drop for DesktopHandle {
    fn drop(&mut self) {
        self.ticker.abort();
        if let Ok(mut desktop) = self.desktop.try_lock() {
            desktop.teardown();
        }
    }
}

fn spawn_ticker(
    desktop: Arc<Mutex<Desktop>>,
    publisher: Arc<watch::Sender<DesktopSnapshot>>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let mut desktop = desktop.lock().await;
            if desktop.tick(Instant::now()) {
                publisher.send_replace(desktop.snapshot());
            }
        }
    })
}
