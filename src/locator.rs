use crate::error::{ReadalongError, Result};
use crate::transcript::Transcript;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Window parameters for the active-segment search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Assumed average segment length, used to estimate an index from a time.
    pub avg_segment_secs: f64,
    /// Segments scanned before the estimated index.
    pub lookback: usize,
    /// Total segments scanned.
    pub window: usize,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            avg_segment_secs: 3.0,
            lookback: 5,
            window: 10,
        }
    }
}

impl LocatorConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.avg_segment_secs.is_finite() && self.avg_segment_secs > 0.0) {
            return Err(ReadalongError::Config(
                "locator.avg_segment_secs must be a positive number".to_string(),
            ));
        }
        if self.window == 0 {
            return Err(ReadalongError::Config(
                "locator.window must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Indices of active segments, in scan order.
pub type ActiveSegments = Vec<usize>;

/// Finds the segments active at a playback time by scanning a small window
/// around an index estimated from the time.
///
/// Segments outside the window are reported inactive without being looked at.
/// When real segment lengths drift far from `avg_segment_secs` the window can
/// miss the true segment; the result is then empty rather than wrong.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentLocator {
    config: LocatorConfig,
}

impl SegmentLocator {
    pub fn new(config: LocatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Index range scanned for `time`.
    pub fn window(&self, len: usize, time: f64) -> std::ops::Range<usize> {
        let estimate = (time / self.config.avg_segment_secs).floor();
        // `as` saturates, so very large times land past the end and produce an empty range.
        let first = (estimate as usize)
            .saturating_sub(self.config.lookback)
            .min(len);
        let last = first.saturating_add(self.config.window).min(len);
        first..last
    }

    pub fn locate(&self, transcript: &Transcript, time: f64) -> ActiveSegments {
        if !time.is_finite() || time < 0.0 {
            return Vec::new();
        }

        self.window(transcript.len(), time)
            .filter(|&i| transcript[i].contains(time))
            .collect()
    }
}

/// Highlight changes produced by one time update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightUpdate {
    pub active: ActiveSegments,
    /// Newly active since the previous update, in scan order.
    pub activated: Vec<usize>,
    /// Active before, inactive now (ascending).
    pub deactivated: Vec<usize>,
    /// First newly active segment; the one to bring into view.
    pub scroll_to: Option<usize>,
}

impl HighlightUpdate {
    pub fn is_unchanged(&self) -> bool {
        self.activated.is_empty() && self.deactivated.is_empty()
    }
}

/// Tracks the active set across time updates so callers only act on changes.
#[derive(Debug, Clone, Default)]
pub struct HighlightTracker {
    locator: SegmentLocator,
    previous: BTreeSet<usize>,
}

impl HighlightTracker {
    pub fn new(locator: SegmentLocator) -> Self {
        Self {
            locator,
            previous: BTreeSet::new(),
        }
    }

    pub fn update(&mut self, transcript: &Transcript, time: f64) -> HighlightUpdate {
        let active = self.locator.locate(transcript, time);
        let current: BTreeSet<usize> = active.iter().copied().collect();

        let activated: Vec<usize> = active
            .iter()
            .copied()
            .filter(|i| !self.previous.contains(i))
            .collect();
        let deactivated: Vec<usize> = self.previous.difference(&current).copied().collect();
        let scroll_to = activated.first().copied();

        self.previous = current;

        HighlightUpdate {
            active,
            activated,
            deactivated,
            scroll_to,
        }
    }

    /// Forget the previous result, e.g. after a new transcript is loaded.
    pub fn reset(&mut self) {
        self.previous.clear();
    }

    pub fn active(&self) -> impl Iterator<Item = usize> + '_ {
        self.previous.iter().copied()
    }
}
