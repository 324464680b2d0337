//! Simulated desktop: one window per catalog project.
//!
//! [`Desktop`] is a plain state machine driven by explicit instants so it can
//! be stepped deterministically; [`DesktopHandle`] shares it behind a lock and
//! drives it from a single recurring tick task.

pub mod catalog;
pub mod gesture;
pub mod handle;
pub mod window;

pub use catalog::{Catalog, CatalogError, Project};
pub use gesture::{DoubleTapDetector, TapOutcome};
pub use handle::DesktopHandle;
pub use window::{LoadStage, ProjectWindow, RevealSchedule, Section, WindowSnapshot};

use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::time::Instant;

use crate::config::DesktopConfig;
use crate::logger::Logger;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened { z_order: u64 },
    AlreadyOpen,
    UnknownProject,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusOutcome {
    Raised { z_order: u64 },
    AlreadyFront,
    NotOpen,
}

/// Title-bar buttons. They are decorative: handling one only logs it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowControl {
    Minimize,
    Maximize,
    Close,
}

impl WindowControl {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowControl::Minimize => "minimize",
            WindowControl::Maximize => "maximize",
            WindowControl::Close => "close",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DesktopSnapshot {
    pub windows: BTreeMap<String, WindowSnapshot>,
}

impl DesktopSnapshot {
    pub fn window(&self, id: &str) -> Option<&WindowSnapshot> {
        self.windows.get(id)
    }

    /// Open windows from back to front.
    pub fn stacking_order(&self) -> Vec<&str> {
        let mut open: Vec<&WindowSnapshot> =
            self.windows.values().filter(|window| window.is_open).collect();
        open.sort_by_key(|window| window.z_order);
        open.iter().map(|window| window.project_id.as_str()).collect()
    }
}

pub struct Desktop {
    catalog: Arc<Catalog>,
    windows: HashMap<String, ProjectWindow>,
    /// Last z-order handed out. Only ever incremented.
    z_counter: u64,
    schedule: RevealSchedule,
    taps: DoubleTapDetector,
    logger: Logger,
}

impl Desktop {
    pub fn new(catalog: Arc<Catalog>, config: &DesktopConfig, logger: Logger) -> Self {
        let windows = catalog
            .ids()
            .map(|id| (id.to_string(), ProjectWindow::new(id)))
            .collect();
        Self {
            catalog,
            windows,
            z_counter: 0,
            schedule: RevealSchedule {
                load_delay: config.load_delay,
                reveal_interval: config.reveal_interval,
            },
            taps: DoubleTapDetector::new(config.double_tap_window),
            logger,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn window(&self, id: &str) -> Option<&ProjectWindow> {
        self.windows.get(id)
    }

    /// Mouse double-click on a desktop icon.
    pub fn double_click(&mut self, id: &str, now: Instant) -> OpenOutcome {
        self.open(id, now)
    }

    /// Touch release on a desktop icon; the second of two quick taps opens.
    pub fn touch_end(&mut self, id: &str, now: Instant) -> Option<OpenOutcome> {
        if !self.windows.contains_key(id) {
            return Some(self.unknown(id, "touch_end"));
        }
        match self.taps.touch_end(id, now) {
            TapOutcome::Armed => None,
            TapOutcome::DoubleTap => Some(self.open(id, now)),
        }
    }

    pub fn open(&mut self, id: &str, now: Instant) -> OpenOutcome {
        let Some(window) = self.windows.get_mut(id) else {
            return self.unknown(id, "open");
        };
        if window.load_stage() != LoadStage::Closed {
            return OpenOutcome::AlreadyOpen;
        }
        self.z_counter += 1;
        let z_order = self.z_counter;
        window.open(z_order, now, self.schedule);
        self.logger.info(
            "desktop.window_opened",
            json!({ "projectId": id, "zOrder": z_order }),
        );
        OpenOutcome::Opened { z_order }
    }

    /// Click anywhere on an open window.
    pub fn focus(&mut self, id: &str) -> FocusOutcome {
        let Some(window) = self.windows.get_mut(id) else {
            return FocusOutcome::NotOpen;
        };
        if !window.is_open() {
            return FocusOutcome::NotOpen;
        }
        if window.z_order() == self.z_counter {
            return FocusOutcome::AlreadyFront;
        }
        self.z_counter += 1;
        window.raise(self.z_counter);
        self.logger.debug(
            "desktop.window_raised",
            json!({ "projectId": id, "zOrder": self.z_counter }),
        );
        FocusOutcome::Raised {
            z_order: self.z_counter,
        }
    }

    pub fn minimize(&self, id: &str) {
        self.window_control(id, WindowControl::Minimize);
    }

    pub fn maximize(&self, id: &str) {
        self.window_control(id, WindowControl::Maximize);
    }

    pub fn close(&self, id: &str) {
        self.window_control(id, WindowControl::Close);
    }

    /// Logs the click and leaves every window untouched. The simulated OS
    /// chrome is not meant to close or resize anything.
    pub fn window_control(&self, id: &str, control: WindowControl) {
        self.logger.info(
            "desktop.window_control",
            json!({ "projectId": id, "control": control.as_str() }),
        );
    }

    /// Applies every reveal stage due by `now`. Returns whether anything
    /// changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        for window in self.windows.values_mut() {
            let revealed = window.advance(now);
            if revealed.is_empty() {
                continue;
            }
            changed = true;
            for section in revealed {
                self.logger.debug(
                    "desktop.section_revealed",
                    json!({
                        "projectId": window.project_id(),
                        "section": section.as_str(),
                        "stage": window.load_stage(),
                    }),
                );
            }
        }
        changed
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.windows
            .values()
            .filter_map(ProjectWindow::next_due)
            .min()
    }

    pub fn has_pending(&self) -> bool {
        self.windows.values().any(ProjectWindow::has_pending)
    }

    /// Clears every queued reveal stage and tap in one step.
    pub fn teardown(&mut self) {
        let dropped: usize = self
            .windows
            .values_mut()
            .map(ProjectWindow::cancel_pending)
            .sum();
        self.taps.clear();
        self.logger
            .debug("desktop.teardown", json!({ "droppedStages": dropped }));
    }

    pub fn snapshot(&self) -> DesktopSnapshot {
        DesktopSnapshot {
            windows: self
                .windows
                .iter()
                .map(|(id, window)| (id.clone(), window.snapshot()))
                .collect(),
        }
    }

    fn unknown(&self, id: &str, action: &str) -> OpenOutcome {
        self.logger.warn(
            "desktop.unknown_project",
            json!({ "projectId": id, "action": action }),
        );
        OpenOutcome::UnknownProject
    }
}
