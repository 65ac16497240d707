use crate::cache::TranscriptCache;
use crate::catalog::{Audiobook, Catalog};
use crate::locator::{HighlightTracker, HighlightUpdate, SegmentLocator};
use crate::transcript::Transcript;
use std::sync::Arc;
use tracing::{debug, info};

/// Seconds moved by the rewind and forward controls.
pub const SKIP_SECS: f64 = 10.0;

/// Handle for one book selection. Results carrying an outdated ticket are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    index: usize,
}

impl LoadTicket {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Playback state for the selected audiobook and its transcript highlighting.
pub struct Player {
    catalog: Catalog,
    current: usize,
    playing: bool,
    position: f64,
    duration: Option<f64>,
    generation: u64,
    transcript: Arc<Transcript>,
    tracker: HighlightTracker,
}

impl Player {
    pub fn new(catalog: Catalog, locator: SegmentLocator) -> Self {
        Self {
            catalog,
            current: 0,
            playing: false,
            position: 0.0,
            duration: None,
            generation: 0,
            transcript: Arc::new(Transcript::empty()),
            tracker: HighlightTracker::new(locator),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_book(&self) -> Option<&Audiobook> {
        self.catalog.get(self.current)
    }

    pub fn transcript(&self) -> &Arc<Transcript> {
        &self.transcript
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Select a book. The transcript is cleared until a result for the returned
    /// ticket is applied. Play/pause state carries over.
    pub fn select(&mut self, index: usize) -> Option<LoadTicket> {
        let book = self.catalog.get(index)?;
        debug!("Selecting book {} ({})", book.id, book.title);

        self.generation += 1;
        self.current = index;
        self.position = 0.0;
        self.duration = None;
        self.transcript = Arc::new(Transcript::empty());
        self.tracker.reset();

        Some(LoadTicket {
            generation: self.generation,
            index,
        })
    }

    pub fn next_book(&mut self) -> Option<LoadTicket> {
        let len = self.catalog.len();
        if len == 0 {
            return None;
        }
        self.select((self.current + 1) % len)
    }

    pub fn previous_book(&mut self) -> Option<LoadTicket> {
        let len = self.catalog.len();
        if len == 0 {
            return None;
        }
        self.select((self.current + len - 1) % len)
    }

    pub fn book_for(&self, ticket: LoadTicket) -> Option<&Audiobook> {
        self.catalog.get(ticket.index)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Install a loaded transcript. Returns false, leaving state untouched, when
    /// another selection happened after the ticket was issued.
    pub fn apply_transcript(&mut self, ticket: LoadTicket, transcript: Arc<Transcript>) -> bool {
        if !self.is_current(ticket) {
            debug!(
                "Discarding stale transcript for selection {} (current {})",
                ticket.generation, self.generation
            );
            return false;
        }

        self.transcript = transcript;
        self.tracker.reset();
        if self.duration.is_none() {
            self.duration = self.transcript.duration();
        }
        true
    }

    /// Select a book and load its transcript through the cache.
    pub async fn select_and_load(&mut self, index: usize, cache: &TranscriptCache) -> bool {
        let Some(ticket) = self.select(index) else {
            return false;
        };
        let Some(book) = self.book_for(ticket).cloned() else {
            return false;
        };

        let transcript = cache.get_book_transcript(&book).await;
        info!(
            "Now playing {} by {} ({} transcript segments)",
            book.title,
            book.author,
            transcript.len()
        );
        self.apply_transcript(ticket, transcript)
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn toggle_play(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    /// Media length as reported by the playback facility.
    pub fn set_duration(&mut self, duration: Option<f64>) {
        self.duration = duration.filter(|d| d.is_finite() && *d >= 0.0);
    }

    /// Move to `time`, clamped to `[0, duration]`.
    pub fn seek(&mut self, time: f64) -> f64 {
        if !time.is_finite() {
            return self.position;
        }
        let upper = self.duration.unwrap_or(f64::MAX);
        self.position = time.clamp(0.0, upper);
        self.position
    }

    /// Seek to a fraction of the duration, as from a click on a progress bar.
    pub fn seek_fraction(&mut self, fraction: f64) -> Option<f64> {
        let duration = self.duration?;
        Some(self.seek(duration * fraction.clamp(0.0, 1.0)))
    }

    pub fn rewind(&mut self) -> f64 {
        self.seek(self.position - SKIP_SECS)
    }

    pub fn forward(&mut self) -> f64 {
        self.seek(self.position + SKIP_SECS)
    }

    /// Fraction of the duration played, for progress display.
    pub fn progress(&self) -> f64 {
        match self.duration {
            Some(d) if d > 0.0 => (self.position / d).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    /// Handle a playback time update and report highlight changes.
    pub fn on_time_update(&mut self, time: f64) -> HighlightUpdate {
        if time.is_finite() && time >= 0.0 {
            self.position = time;
        }
        self.tracker.update(&self.transcript, time)
    }
}

/// Format seconds as `M:SS`; invalid or negative input shows `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
