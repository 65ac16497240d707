pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod locator;
pub mod playback;
pub mod player;
pub mod render;
pub mod source;
pub mod transcript;

pub use cache::TranscriptCache;
pub use catalog::{Audiobook, Catalog};
pub use config::Config;
pub use error::{ReadalongError, Result};
pub use locator::{HighlightTracker, HighlightUpdate, SegmentLocator};
pub use player::{format_time, LoadTicket, Player};
pub use transcript::{parse_transcript, parse_transcript_with, Segment, Transcript};
