// Delimited-row transcripts: a header line, then `start,end,text` rows.
use super::normalize::TextNormalizer;
use super::{Segment, Transcript};
use regex::Regex;
use std::sync::OnceLock;
use tracing::trace;

fn number_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("Invalid regex")
    })
}

/// Parse delimited rows. The first line is always treated as a header.
pub fn parse(raw: &str, normalizer: &dyn TextNormalizer) -> Transcript {
    let segments = raw
        .trim()
        .split('\n')
        .enumerate()
        .skip(1)
        .filter_map(|(line_no, line)| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }

            let segment = parse_row(line, normalizer);
            if segment.is_none() {
                trace!("Skipping malformed row {}: {:?}", line_no + 1, line);
            }
            segment
        })
        .collect();

    Transcript::from_segments(segments)
}

fn parse_row(line: &str, normalizer: &dyn TextNormalizer) -> Option<Segment> {
    let fields = split_fields(line);
    if fields.len() < 3 {
        return None;
    }

    let start = parse_seconds(&fields[0])?;
    let end = parse_seconds(&fields[1])?;
    let text = strip_quotes(fields[2].trim());

    Segment::new(start, end, normalizer.normalize(text))
}

/// Split on commas outside double quotes. Quote characters toggle quote mode
/// and are not copied into the field.
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    fields.push(current);
    fields
}

fn strip_quotes(text: &str) -> &str {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

/// Read the leading number of a field, ignoring any trailing unit such as `1.5s`.
fn parse_seconds(field: &str) -> Option<f64> {
    let number = number_prefix_re().find(field.trim())?;
    number
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
