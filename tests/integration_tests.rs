//! Integration tests for readalong
//!
//! These tests exercise parsing, location and rendering together without any
//! network or filesystem access.

use readalong::catalog::Catalog;
use readalong::config::{Config, OutputFormat};
use readalong::locator::{HighlightTracker, LocatorConfig, SegmentLocator};
use readalong::player::Player;
use readalong::render::{create_renderer, TranscriptRenderer};
use readalong::transcript::{
    detect_format, parse_transcript, parse_transcript_with, CorrectionTable, ParseOptions,
    Segment, Transcript, TranscriptFormat,
};
use std::sync::Arc;

// ============================================================================
// Parsing Tests
// ============================================================================

mod parsing_tests {
    use super::*;

    #[test]
    fn test_delimited_scenario() {
        let transcript =
            parse_transcript("Waktu Mulai (detik),Waktu Akhir,Teks\n0,2.5,Hello\n2.5,5,World\n");

        assert_eq!(
            transcript.segments(),
            &[
                Segment::new(0.0, 2.5, "Hello").unwrap(),
                Segment::new(2.5, 5.0, "World").unwrap(),
            ]
        );
    }

    #[test]
    fn test_timestamped_scenario() {
        let transcript = parse_transcript("0:05\nHello there\n0:10\nGeneral Kenobi");

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0], Segment::new(5.0, 10.0, "Hello there").unwrap());
        assert_eq!(transcript[1].start, 10.0);
        let expected = 10.0 + "General Kenobi".chars().count() as f64 * 0.08;
        assert!((transcript[1].end - expected).abs() < 1e-9);
    }

    #[test]
    fn test_one_malformed_row_of_four() {
        let raw = "start,end,text\n0,1,One\nabc,5,Hi\n1,2,\"Two, with comma\"\n2,3,Three\n";
        let transcript = parse_transcript(raw);

        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1].text, "Two, with comma");
    }

    #[test]
    fn test_output_never_violates_range() {
        let raw = "Waktu Mulai (detik),Waktu Akhir,Teks\n\
                   0,1,a\n3,2,b\n4,4,c\nx,y,z\n5,6,d\n-1,2,e\n7,inf,f\n";
        let transcript = parse_transcript(raw);

        assert_eq!(transcript.len(), 2);
        assert!(transcript.iter().all(|s| s.end > s.start && s.start >= 0.0));
    }

    #[test]
    fn test_detection_matches_parser_choice() {
        assert_eq!(
            detect_format("0:05\nHello").format,
            TranscriptFormat::Timestamped
        );
        assert_eq!(
            detect_format("a,b,c\n0,1,x").format,
            TranscriptFormat::Delimited
        );
    }

    #[test]
    fn test_corrections_from_config_data() {
        let table =
            CorrectionTable::from_toml_str(include_str!("../data/corrections-th.toml")).unwrap();
        let transcript = parse_transcript_with(
            "0:00\nเจ้านกยืมกว้าง\n0:04\nกะรอกตุ๊กใจ",
            &table,
            &ParseOptions::default(),
        );

        assert_eq!(transcript[0].text, "เจ้าหนูยิ้มกว้าง");
        assert_eq!(transcript[1].text, "กระรอกตกใจ");
    }
}

// ============================================================================
// Locator Tests
// ============================================================================

mod locator_tests {
    use super::*;

    fn book(count: usize) -> Transcript {
        let rows: String = (0..count)
            .map(|i| format!("{},{},Line {}\n", i * 3, i * 3 + 3, i))
            .collect();
        parse_transcript(&format!("start,end,text\n{}", rows))
    }

    #[test]
    fn test_before_start_is_empty() {
        let transcript = parse_transcript("0:05\nLate opening\n0:09\nNext");
        assert!(SegmentLocator::default().locate(&transcript, 1.0).is_empty());
    }

    #[test]
    fn test_every_tick_finds_its_segment() {
        let transcript = book(200);
        let locator = SegmentLocator::default();

        let mut t = 0.0;
        while t < 600.0 {
            let active = locator.locate(&transcript, t);
            assert_eq!(active, vec![(t / 3.0).floor() as usize], "t = {}", t);
            t += 0.25;
        }
    }

    #[test]
    fn test_wider_window_finds_long_segments() {
        let transcript = parse_transcript("start,end,text\n0,100,long\n100,200,longer\n");

        assert!(SegmentLocator::default().locate(&transcript, 150.0).is_empty());

        let wide = SegmentLocator::new(LocatorConfig {
            avg_segment_secs: 100.0,
            ..LocatorConfig::default()
        });
        assert_eq!(wide.locate(&transcript, 150.0), vec![1]);
    }

    #[test]
    fn test_tracker_scrolls_once_per_segment() {
        let transcript = book(10);
        let mut tracker = HighlightTracker::default();

        let scrolls: Vec<usize> = (0..120)
            .filter_map(|tick| tracker.update(&transcript, tick as f64 * 0.25).scroll_to)
            .collect();

        assert_eq!(scrolls, (0..10).collect::<Vec<_>>());
    }
}

// ============================================================================
// Player Tests
// ============================================================================

mod player_tests {
    use super::*;

    #[test]
    fn test_selection_then_time_updates() {
        let catalog = Catalog::from_json(
            r#"[{"id": 1, "title": "One"}, {"id": 2, "title": "Two"}]"#,
        )
        .unwrap();
        let mut player = Player::new(catalog, SegmentLocator::default());

        let stale = player.select(0).unwrap();
        let ticket = player.next_book().unwrap();
        let transcript = Arc::new(parse_transcript("0:00\nFirst\n0:03\nSecond"));

        assert!(!player.apply_transcript(stale, transcript.clone()));
        assert!(player.apply_transcript(ticket, transcript));

        assert_eq!(player.on_time_update(0.5).scroll_to, Some(0));
        assert_eq!(player.on_time_update(3.2).scroll_to, Some(1));
        assert_eq!(player.current_book().unwrap().id, "2");
    }
}

// ============================================================================
// Render & Config Tests
// ============================================================================

mod render_tests {
    use super::*;

    #[test]
    fn test_render_all_formats() {
        let transcript = parse_transcript("0:05\nHello there\n0:10\nGeneral Kenobi");

        let html = create_renderer(OutputFormat::Html).render(&transcript);
        assert!(html.contains("data-start=\"5\" data-end=\"10\">Hello there</p>"));

        let srt = create_renderer(OutputFormat::Srt).render(&transcript);
        assert!(srt.starts_with("1\n00:00:05,000 --> 00:00:10,000\nHello there\n"));

        let vtt = create_renderer(OutputFormat::Vtt).render(&transcript);
        assert!(vtt.starts_with("WEBVTT\n\n00:00:05.000 --> 00:00:10.000\n"));

        let text = create_renderer(OutputFormat::Text).render(&transcript);
        assert_eq!(text, "[0:05] Hello there\n[0:10] General Kenobi\n");

        let json = create_renderer(OutputFormat::Json).render(&transcript);
        assert!(json.contains("\"segment_count\": 2"));
    }

    #[test]
    fn test_render_huge_delimited_times() {
        let transcript =
            parse_transcript("Waktu Mulai (detik),Waktu Akhir,Teks\n1e300,1e301,Hi\n");
        assert_eq!(transcript.len(), 1);

        for format in [OutputFormat::Srt, OutputFormat::Vtt, OutputFormat::Json] {
            let output = create_renderer(format).render(&transcript);
            assert!(output.contains("Hi"), "{}", format);
        }
    }

    #[test]
    fn test_config_default_values() {
        let config = Config::default();
        assert_eq!(config.default_format, OutputFormat::Text);
        assert_eq!(config.locator, LocatorConfig::default());
        assert!(config.validate().is_ok());
    }
}
