// Content sniffing for raw transcripts.
//
// Delimited rows win when any signal matches; paired timestamps are the
// fallback. Any comma routes to the delimited parser, so a timestamped
// transcript whose text contains a comma is misrouted and comes back empty.
use super::ParseOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptFormat {
    /// Header line plus `start,end,text` rows.
    Delimited,
    /// Alternating `M:SS` and text lines.
    Timestamped,
}

impl std::fmt::Display for TranscriptFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptFormat::Delimited => write!(f, "delimited"),
            TranscriptFormat::Timestamped => write!(f, "timestamped"),
        }
    }
}

/// Which test decided the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionSignal {
    HeaderToken,
    Comma,
    MarkerWord,
    Fallback,
}

impl std::fmt::Display for DetectionSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectionSignal::HeaderToken => write!(f, "header token"),
            DetectionSignal::Comma => write!(f, "comma"),
            DetectionSignal::MarkerWord => write!(f, "marker word"),
            DetectionSignal::Fallback => write!(f, "fallback"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub format: TranscriptFormat,
    pub signal: DetectionSignal,
}

pub fn detect_format(raw: &str) -> Detection {
    detect_format_with(raw, &ParseOptions::default())
}

pub fn detect_format_with(raw: &str, options: &ParseOptions) -> Detection {
    let signal = if options
        .header_tokens
        .iter()
        .any(|token| !token.is_empty() && raw.contains(token.as_str()))
    {
        Some(DetectionSignal::HeaderToken)
    } else if raw.contains(',') {
        Some(DetectionSignal::Comma)
    } else if !options.marker_word.is_empty() && raw.contains(options.marker_word.as_str()) {
        Some(DetectionSignal::MarkerWord)
    } else {
        None
    };

    match signal {
        Some(signal) => Detection {
            format: TranscriptFormat::Delimited,
            signal,
        },
        None => Detection {
            format: TranscriptFormat::Timestamped,
            signal: DetectionSignal::Fallback,
        },
    }
}
