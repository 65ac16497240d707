pub mod delimited;
pub mod format;
pub mod json;
pub mod normalize;
pub mod timestamped;

pub use format::{detect_format, Detection, DetectionSignal, TranscriptFormat};
pub use normalize::{CorrectionTable, Identity, TextNormalizer};

use crate::config::SourceFormat;
use serde::Serialize;
use std::ops::Index;
use std::time::Duration;
use tracing::debug;

/// One timed unit of transcript text. Times are seconds from the start of the audiobook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Segment {
    /// Build a segment, rejecting non-finite or negative times, empty ranges and blank text.
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Option<Self> {
        if !start.is_finite() || !end.is_finite() || start < 0.0 || end <= start {
            return None;
        }

        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        Some(Self {
            start,
            end,
            text: if trimmed.len() == text.len() {
                text
            } else {
                trimmed.to_string()
            },
        })
    }

    /// Whether `time` falls inside `[start, end)`.
    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time < self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Saturates at `Duration::MAX` for times too large to represent.
    pub fn start_duration(&self) -> Duration {
        to_duration(self.start)
    }

    pub fn end_duration(&self) -> Duration {
        to_duration(self.end)
    }
}

fn to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Ordered segments for one audiobook. Gaps and overlaps are allowed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    segments: Vec<Segment>,
}

impl Transcript {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a transcript, ordering segments by start time. The sort is stable,
    /// so segments sharing a start keep their source order.
    pub fn from_segments(mut segments: Vec<Segment>) -> Self {
        segments.sort_by(|a, b| a.start.total_cmp(&b.start));
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    /// End of the last-ending segment, if any.
    pub fn duration(&self) -> Option<f64> {
        self.segments.iter().map(|s| s.end).reduce(f64::max)
    }
}

impl Index<usize> for Transcript {
    type Output = Segment;

    fn index(&self, index: usize) -> &Self::Output {
        &self.segments[index]
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

/// Tunables for the parsers.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Seconds of speech per character, used to close the final timestamped segment.
    pub seconds_per_char: f64,
    /// Header tokens that mark delimited-row content.
    pub header_tokens: Vec<String>,
    /// Literal marker word that marks delimited-row content.
    pub marker_word: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            seconds_per_char: 0.08,
            header_tokens: vec!["Waktu Mulai (detik)".to_string()],
            marker_word: "start".to_string(),
        }
    }
}

/// Parse raw transcript text, detecting the format from its content.
pub fn parse_transcript(raw: &str) -> Transcript {
    parse_transcript_with(raw, &Identity, &ParseOptions::default())
}

/// Parse raw transcript text with a normalization hook applied to every segment's text.
pub fn parse_transcript_with(
    raw: &str,
    normalizer: &dyn TextNormalizer,
    options: &ParseOptions,
) -> Transcript {
    let detection = format::detect_format_with(raw, options);
    debug!(
        "Detected {} transcript ({})",
        detection.format, detection.signal
    );

    match detection.format {
        TranscriptFormat::Delimited => delimited::parse(raw, normalizer),
        TranscriptFormat::Timestamped => timestamped::parse(raw, normalizer, options),
    }
}

/// Parse text fetched from a location whose format is already known.
pub fn parse_source(
    raw: &str,
    format: SourceFormat,
    normalizer: &dyn TextNormalizer,
    options: &ParseOptions,
) -> Transcript {
    match format {
        SourceFormat::Delimited => delimited::parse(raw, normalizer),
        SourceFormat::Json => json::parse(raw, normalizer),
        SourceFormat::Auto => parse_transcript_with(raw, normalizer, options),
    }
}
