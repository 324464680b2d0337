use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStage {
    Closed,
    Loading,
    Revealing,
    Ready,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Title,
    Subtitle,
    Description,
    Tags,
    Buttons,
    Image,
}

impl Section {
    /// Reveal order inside a window.
    pub const ORDER: [Section; 6] = [
        Section::Title,
        Section::Subtitle,
        Section::Description,
        Section::Tags,
        Section::Buttons,
        Section::Image,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Title => "title",
            Section::Subtitle => "subtitle",
            Section::Description => "description",
            Section::Tags => "tags",
            Section::Buttons => "buttons",
            Section::Image => "image",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingReveal {
    due: Instant,
    section: Section,
}

/// Timing of the staged reveal that follows an open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevealSchedule {
    pub load_delay: Duration,
    pub reveal_interval: Duration,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSnapshot {
    pub project_id: String,
    pub is_open: bool,
    pub z_order: u64,
    pub load_stage: LoadStage,
    pub revealed_sections: Vec<Section>,
}

#[derive(Clone, Debug)]
pub struct ProjectWindow {
    project_id: String,
    is_open: bool,
    z_order: u64,
    load_stage: LoadStage,
    revealed: Vec<Section>,
    pending: VecDeque<PendingReveal>,
}

impl ProjectWindow {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            is_open: false,
            z_order: 0,
            load_stage: LoadStage::Closed,
            revealed: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn z_order(&self) -> u64 {
        self.z_order
    }

    pub fn load_stage(&self) -> LoadStage {
        self.load_stage
    }

    pub fn revealed_sections(&self) -> &[Section] {
        &self.revealed
    }

    /// `closed -> loading`. Queues every reveal stage up front, each due a
    /// fixed offset after `now`, so a late tick never reorders or drifts
    /// them. Returns `false` when the window is not closed.
    pub(crate) fn open(&mut self, z_order: u64, now: Instant, schedule: RevealSchedule) -> bool {
        if self.load_stage != LoadStage::Closed {
            return false;
        }
        self.is_open = true;
        self.z_order = z_order;
        self.load_stage = LoadStage::Loading;
        self.pending = Section::ORDER
            .iter()
            .enumerate()
            .map(|(index, section)| PendingReveal {
                due: now + schedule.load_delay + schedule.reveal_interval * index as u32,
                section: *section,
            })
            .collect();
        true
    }

    pub(crate) fn raise(&mut self, z_order: u64) {
        self.z_order = z_order;
    }

    /// Applies every stage due at or before `now`, oldest first.
    pub(crate) fn advance(&mut self, now: Instant) -> Vec<Section> {
        let mut revealed = Vec::new();
        while let Some(next) = self.pending.front() {
            if next.due > now {
                break;
            }
            let section = next.section;
            self.pending.pop_front();
            self.revealed.push(section);
            self.load_stage = if self.revealed.len() == Section::ORDER.len() {
                LoadStage::Ready
            } else {
                LoadStage::Revealing
            };
            revealed.push(section);
        }
        revealed
    }

    pub(crate) fn next_due(&self) -> Option<Instant> {
        self.pending.front().map(|pending| pending.due)
    }

    pub(crate) fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drops every queued stage at once; already revealed sections stay.
    pub(crate) fn cancel_pending(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            project_id: self.project_id.clone(),
            is_open: self.is_open,
            z_order: self.z_order,
            load_stage: self.load_stage,
            revealed_sections: self.revealed.clone(),
        }
    }
}
