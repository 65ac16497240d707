// JSON fragment documents: `{"text": [{"start": 0, "end": 2.5, "content": "..."}]}`.
use super::normalize::TextNormalizer;
use super::{Segment, Transcript};
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct FragmentDocument {
    #[serde(default)]
    text: Vec<Fragment>,
}

#[derive(Debug, Deserialize)]
struct Fragment {
    start: Option<f64>,
    end: Option<f64>,
    #[serde(default)]
    content: String,
}

/// Parse a fragment document. Unreadable documents yield an empty transcript;
/// invalid fragments are skipped.
pub fn parse(raw: &str, normalizer: &dyn TextNormalizer) -> Transcript {
    let document: FragmentDocument = match serde_json::from_str(raw) {
        Ok(document) => document,
        Err(e) => {
            warn!("Unreadable transcript document: {}", e);
            return Transcript::empty();
        }
    };

    let segments = document
        .text
        .into_iter()
        .filter_map(|fragment| {
            Segment::new(
                fragment.start?,
                fragment.end?,
                normalizer.normalize(&fragment.content),
            )
        })
        .collect();

    Transcript::from_segments(segments)
}
