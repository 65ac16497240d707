use crate::locator::HighlightUpdate;
use crate::player::{format_time, Player};
use crate::transcript::Segment;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Receives the side effects of highlight changes. Implementations decide what
/// "bring into view" means for their surface.
pub trait HighlightSink {
    /// Called once for the first newly active segment of an update.
    fn scroll_into_view(&mut self, index: usize, segment: &Segment);

    /// Called for every update that changes the active set.
    fn highlight_changed(&mut self, _update: &HighlightUpdate) {}
}

/// Configuration for driving a player from a simulated clock.
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Interval between time updates.
    pub tick: Duration,
    /// Media seconds advanced per wall-clock second.
    pub speed: f64,
    /// Position to start from.
    pub start_at: f64,
    /// Stop here when the player has no known duration.
    pub fallback_duration: f64,
    pub show_progress: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(250),
            speed: 1.0,
            start_at: 0.0,
            fallback_duration: 60.0,
            show_progress: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlaybackStats {
    pub updates: usize,
    pub scrolls: usize,
    pub final_position: f64,
    pub elapsed: Duration,
    pub cancelled: bool,
}

/// Feed time updates to the player until the end of the media or cancellation.
pub async fn run_playback(
    player: &mut Player,
    config: &PlaybackConfig,
    sink: &mut dyn HighlightSink,
    cancelled: Arc<AtomicBool>,
) -> PlaybackStats {
    let start_time = Instant::now();
    let duration = player
        .duration()
        .unwrap_or(config.fallback_duration)
        .max(0.0);
    let step = config.tick.as_secs_f64() * config.speed.max(0.0);

    if step <= 0.0 {
        warn!("Playback speed must be positive; nothing to play");
    }

    let progress_bar = if config.show_progress {
        let pb = ProgressBar::new(duration.ceil() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut stats = PlaybackStats {
        updates: 0,
        scrolls: 0,
        final_position: player.seek(config.start_at),
        elapsed: Duration::ZERO,
        cancelled: false,
    };

    player.play();
    info!(
        "Playing from {} at {}x",
        format_time(stats.final_position),
        config.speed
    );

    let mut interval = tokio::time::interval(config.tick);
    let mut time = stats.final_position;

    while step > 0.0 && time < duration {
        interval.tick().await;

        if cancelled.load(Ordering::Relaxed) {
            stats.cancelled = true;
            break;
        }

        let update = player.on_time_update(time);
        stats.updates += 1;

        if !update.is_unchanged() {
            sink.highlight_changed(&update);
        }
        if let Some(index) = update.scroll_to {
            if let Some(segment) = player.transcript().get(index) {
                stats.scrolls += 1;
                match &progress_bar {
                    Some(pb) => pb.suspend(|| sink.scroll_into_view(index, segment)),
                    None => sink.scroll_into_view(index, segment),
                }
            }
        }

        if let Some(ref pb) = progress_bar {
            pb.set_position(time as u64);
            pb.set_message(format!("{} / {}", format_time(time), format_time(duration)));
        }

        stats.final_position = time;
        time += step;
    }

    player.pause();

    if let Some(pb) = progress_bar {
        pb.finish_and_clear();
    }

    stats.elapsed = start_time.elapsed();
    debug!(
        "Playback stopped at {} after {} updates",
        format_time(stats.final_position),
        stats.updates
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::locator::SegmentLocator;
    use crate::transcript::Transcript;

    #[derive(Default)]
    struct Recorder {
        scrolled: Vec<usize>,
        changes: usize,
    }

    impl HighlightSink for Recorder {
        fn scroll_into_view(&mut self, index: usize, _segment: &Segment) {
            self.scrolled.push(index);
        }

        fn highlight_changed(&mut self, _update: &HighlightUpdate) {
            self.changes += 1;
        }
    }

    fn player() -> Player {
        let catalog = Catalog::from_json(r#"[{"id": 1, "title": "One"}]"#).unwrap();
        let mut player = Player::new(catalog, SegmentLocator::default());
        let ticket = player.select(0).unwrap();
        player.apply_transcript(
            ticket,
            Arc::new(Transcript::from_segments(vec![
                Segment::new(0.0, 1.0, "a").unwrap(),
                Segment::new(1.0, 2.0, "b").unwrap(),
                Segment::new(3.0, 4.0, "c").unwrap(),
            ])),
        );
        player
    }

    fn fast_config() -> PlaybackConfig {
        PlaybackConfig {
            tick: Duration::from_millis(1),
            speed: 250.0,
            show_progress: false,
            ..PlaybackConfig::default()
        }
    }

    #[tokio::test]
    async fn test_plays_through_each_segment_once() {
        let mut player = player();
        let mut recorder = Recorder::default();

        let stats = run_playback(
            &mut player,
            &fast_config(),
            &mut recorder,
            Arc::new(AtomicBool::new(false)),
        )
        .await;

        assert_eq!(recorder.scrolled, vec![0, 1, 2]);
        assert_eq!(stats.scrolls, 3);
        assert_eq!(stats.updates, 16);
        assert!(!stats.cancelled);
        assert!(!player.is_playing());
    }

    #[tokio::test]
    async fn test_start_offset() {
        let mut player = player();
        let mut recorder = Recorder::default();
        let config = PlaybackConfig {
            start_at: 3.0,
            ..fast_config()
        };

        run_playback(
            &mut player,
            &config,
            &mut recorder,
            Arc::new(AtomicBool::new(false)),
        )
        .await;

        assert_eq!(recorder.scrolled, vec![2]);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let mut player = player();
        let mut recorder = Recorder::default();

        let stats = run_playback(
            &mut player,
            &fast_config(),
            &mut recorder,
            Arc::new(AtomicBool::new(true)),
        )
        .await;

        assert!(stats.cancelled);
        assert_eq!(stats.updates, 0);
        assert!(recorder.scrolled.is_empty());
    }
}
