use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapOutcome {
    /// First tap of a potential pair.
    Armed,
    DoubleTap,
}

/// Pairs `touchend` events per icon. Two taps on the same icon closer than
/// `window` count as one double tap; a longer gap starts a new pair.
#[derive(Debug)]
pub struct DoubleTapDetector {
    window: Duration,
    last_tap: HashMap<String, Instant>,
}

impl DoubleTapDetector {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_tap: HashMap::new(),
        }
    }

    pub fn touch_end(&mut self, icon: &str, now: Instant) -> TapOutcome {
        if let Some(previous) = self.last_tap.remove(icon)
            && now.saturating_duration_since(previous) < self.window
        {
            return TapOutcome::DoubleTap;
        }
        self.last_tap.insert(icon.to_string(), now);
        TapOutcome::Armed
    }

    pub fn clear(&mut self) {
        self.last_tap.clear();
    }
}
