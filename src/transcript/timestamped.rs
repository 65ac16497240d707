// Paired-line transcripts: a `M:SS` line followed by the text spoken from that point.
use super::normalize::TextNormalizer;
use super::{ParseOptions, Segment, Transcript};
use regex::Regex;
use std::sync::OnceLock;
use tracing::trace;

fn timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+):(\d{1,2})$").expect("Invalid regex"))
}

/// Convert a `minutes:seconds` line to seconds.
pub fn parse_timestamp(line: &str) -> Option<f64> {
    let caps = timestamp_re().captures(line.trim())?;
    let minutes: f64 = caps.get(1)?.as_str().parse().ok()?;
    let seconds: f64 = caps.get(2)?.as_str().parse().ok()?;
    Some(minutes * 60.0 + seconds)
}

/// Parse alternating timestamp/text lines.
///
/// A segment ends at the next pair's timestamp. The final segment has no
/// successor, so its end is estimated from the text length at
/// `options.seconds_per_char`; this is a reading-speed guess, not a measurement.
pub fn parse(raw: &str, normalizer: &dyn TextNormalizer, options: &ParseOptions) -> Transcript {
    let lines: Vec<&str> = raw.trim().split('\n').collect();
    let mut segments = Vec::new();

    for i in (0..lines.len()).step_by(2) {
        let Some(text_line) = lines.get(i + 1) else {
            break;
        };

        let timestamp = lines[i].trim();
        let text = text_line.trim();
        if timestamp.is_empty() || text.is_empty() {
            trace!("Skipping pair at line {}: blank line", i + 1);
            continue;
        }

        let Some(start) = parse_timestamp(timestamp) else {
            trace!("Skipping pair at line {}: bad timestamp {:?}", i + 1, timestamp);
            continue;
        };

        let end = lines
            .get(i + 2)
            .and_then(|next| parse_timestamp(next))
            .unwrap_or_else(|| start + text.chars().count() as f64 * options.seconds_per_char);

        match Segment::new(start, end, normalizer.normalize(text)) {
            Some(segment) => segments.push(segment),
            None => trace!("Skipping pair at line {}: invalid segment", i + 1),
        }
    }

    Transcript::from_segments(segments)
}
