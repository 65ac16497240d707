mod interactive;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use readalong::cache::TranscriptCache;
use readalong::catalog::Catalog;
use readalong::config::{Config, OutputFormat};
use readalong::locator::SegmentLocator;
use readalong::playback::{run_playback, HighlightSink, PlaybackConfig};
use readalong::player::{format_time, Player};
use readalong::render::{create_renderer, json::JsonRenderer, TranscriptRenderer};
use readalong::source::{self, AssetSource};
use readalong::transcript::{parse_transcript_with, Segment, Transcript};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "readalong")]
#[command(version, about = "Audiobook transcripts that follow the playback position")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Base URL or directory holding audiobooks.json and the transcripts
    #[arg(short, long, global = true)]
    source: Option<String>,

    /// TOML file of text corrections applied to every transcript
    #[arg(long, global = true)]
    corrections: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List the audiobooks in the catalog
    List,

    /// Print a book's transcript
    Show {
        /// Book id or title
        book: String,

        /// Output format: text, html, srt, vtt, json
        #[arg(short, long)]
        format: Option<String>,

        /// Write to a file, or into a directory, instead of stdout
        #[arg(short = 'o', long = "output")]
        out: Option<PathBuf>,
    },

    /// Parse a local transcript file
    Parse {
        file: PathBuf,

        /// Output format: text, html, srt, vtt, json
        #[arg(short, long)]
        format: Option<String>,

        /// Write to a file, or into a directory, instead of stdout
        #[arg(short = 'o', long = "output")]
        out: Option<PathBuf>,
    },

    /// Show the segments active at a playback position
    At {
        /// Book id or title
        book: String,

        /// Position as M:SS or seconds
        time: String,
    },

    /// Follow a book's transcript along a simulated playback clock
    Play {
        /// Book id or title
        book: String,

        /// Playback speed multiplier
        #[arg(long, default_value = "1.0")]
        speed: f64,

        /// Start position as M:SS or seconds
        #[arg(long, default_value = "0:00")]
        from: String,

        /// Media length in seconds (defaults to the end of the transcript)
        #[arg(long)]
        duration: Option<f64>,
    },

    /// Load every transcript in the catalog
    Warm,

    /// Pick a book and play it
    Interactive,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

struct App {
    config: Config,
    source: Arc<dyn AssetSource>,
    cache: TranscriptCache,
}

impl App {
    fn new(config: Config) -> Result<Self> {
        config
            .validate()
            .context("Configuration validation failed")?;

        let source = source::from_location(&config.source);
        let cache = TranscriptCache::from_config(&config, source.clone())
            .context("Failed to set up transcript cache")?;

        Ok(Self {
            config,
            source,
            cache,
        })
    }

    async fn catalog(&self) -> Result<Catalog> {
        Catalog::load(self.source.as_ref(), &self.config.catalog_path)
            .await
            .with_context(|| {
                format!(
                    "Failed to load {} from {}",
                    self.config.catalog_path, self.config.source
                )
            })
    }

    fn locator(&self) -> SegmentLocator {
        SegmentLocator::new(self.config.locator)
    }

    fn output_format(&self, format: Option<&str>) -> Result<OutputFormat> {
        match format {
            Some(f) => f.parse().map_err(|e: String| anyhow::anyhow!(e)),
            None => Ok(self.config.default_format),
        }
    }
}

/// Prints each newly highlighted segment.
struct TerminalSink;

impl HighlightSink for TerminalSink {
    fn scroll_into_view(&mut self, _index: usize, segment: &Segment) {
        println!(
            "{} {}",
            style(format!("[{}]", format_time(segment.start))).dim(),
            style(&segment.text).bold()
        );
    }
}

/// Resolve `--output`: a directory gets `<stem>.<format extension>` inside it.
fn output_path(output: Option<PathBuf>, stem: &str, format: OutputFormat) -> Option<PathBuf> {
    output.map(|path| {
        if path.is_dir() {
            path.join(format!("{}.{}", stem, format.extension()))
        } else {
            path
        }
    })
}

fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn renderer_for(
    format: OutputFormat,
    book_id: Option<&str>,
    title: Option<&str>,
) -> Box<dyn TranscriptRenderer> {
    match format {
        OutputFormat::Json => Box::new(JsonRenderer {
            book_id: book_id.map(str::to_string),
            title: title.map(str::to_string),
        }),
        other => create_renderer(other),
    }
}

fn parse_position(input: &str) -> Result<f64> {
    interactive::parse_position(input)
        .ok_or_else(|| anyhow::anyhow!("Invalid position: {} (use M:SS or seconds)", input))
}

async fn play(
    app: &App,
    catalog: Catalog,
    index: usize,
    config: PlaybackConfig,
    duration: Option<f64>,
) -> Result<()> {
    let mut player = Player::new(catalog, app.locator());
    player.select_and_load(index, &app.cache).await;
    if duration.is_some() {
        player.set_duration(duration);
    }

    if player.transcript().is_empty() {
        println!(
            "{} No transcript available; nothing to follow",
            style("!").yellow()
        );
        return Ok(());
    }

    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = cancelled.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
        .context("Failed to install Ctrl+C handler")?;

    let stats = run_playback(&mut player, &config, &mut TerminalSink, cancelled).await;

    println!();
    println!(
        "  Stopped at {} ({} segments shown{})",
        format_time(stats.final_position),
        stats.scrolls,
        if stats.cancelled { ", cancelled" } else { "" }
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(source) = cli.source {
        config.source = source;
    }
    if let Some(corrections) = cli.corrections {
        config.corrections_file = Some(corrections);
    }

    match cli.command.unwrap_or(Command::Interactive) {
        Command::List => {
            let app = App::new(config)?;
            let catalog = app.catalog().await?;
            for book in catalog.iter() {
                println!(
                    "{:>6}  {}  {}{}",
                    style(&book.id).dim(),
                    style(&book.title).bold(),
                    if book.author.is_empty() {
                        String::new()
                    } else {
                        format!("By {}", book.author)
                    },
                    book.duration
                        .as_ref()
                        .map(|d| format!(" ({})", d))
                        .unwrap_or_default()
                );
            }
        }

        Command::Show { book, format, out } => {
            let app = App::new(config)?;
            let format = app.output_format(format.as_deref())?;
            let catalog = app.catalog().await?;
            let index = catalog.resolve(&book)?;
            let book = &catalog.books()[index];

            let transcript = app.cache.get_book_transcript(book).await;
            let renderer = renderer_for(format, Some(&book.id), Some(&book.title));
            let output = output_path(out, &book.id, format);
            emit(&renderer.render(&transcript), output.as_deref())?;
        }

        Command::Parse { file, format, out } => {
            let app = App::new(config)?;
            let format = app.output_format(format.as_deref())?;
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let normalizer = app.config.text_normalizer()?;
            let transcript: Transcript = parse_transcript_with(
                &raw,
                normalizer.as_ref(),
                &app.config.parse_options(),
            );
            info!("Parsed {} segments from {}", transcript.len(), file.display());

            let renderer = renderer_for(format, None, None);
            let stem = file.file_stem().unwrap_or_default().to_string_lossy();
            let output = output_path(out, &stem, format);
            emit(&renderer.render(&transcript), output.as_deref())?;
        }

        Command::At { book, time } => {
            let app = App::new(config)?;
            let time = parse_position(&time)?;
            let catalog = app.catalog().await?;
            let index = catalog.resolve(&book)?;

            let transcript = app
                .cache
                .get_book_transcript(&catalog.books()[index])
                .await;
            let active = app.locator().locate(&transcript, time);

            if active.is_empty() {
                println!("No active segment at {}", format_time(time));
            }
            for i in active {
                let segment = &transcript[i];
                println!(
                    "#{} [{} - {}] {}",
                    i,
                    format_time(segment.start),
                    format_time(segment.end),
                    segment.text
                );
            }
        }

        Command::Play {
            book,
            speed,
            from,
            duration,
        } => {
            let app = App::new(config)?;
            let catalog = app.catalog().await?;
            let index = catalog.resolve(&book)?;
            let playback = PlaybackConfig {
                speed,
                start_at: parse_position(&from)?,
                ..PlaybackConfig::default()
            };
            play(&app, catalog, index, playback, duration).await?;
        }

        Command::Warm => {
            let app = App::new(config)?;
            let catalog = app.catalog().await?;
            let stats = app
                .cache
                .prefetch(catalog.books(), app.config.concurrency, true)
                .await;

            println!(
                "  Loaded {}/{} transcripts ({} segments, {} failed) in {:.2}s",
                stats.loaded,
                stats.total,
                stats.segments,
                stats.failed,
                stats.total_time.as_secs_f64()
            );
        }

        Command::Interactive => {
            interactive::print_header();
            interactive::setup_source(&mut config)?;
            let app = App::new(config)?;
            let catalog = app.catalog().await?;
            let choice = interactive::run_interactive_wizard(&catalog)?;

            let playback = PlaybackConfig {
                speed: choice.speed,
                start_at: choice.start_at,
                ..PlaybackConfig::default()
            };
            play(&app, catalog, choice.book_index, playback, None).await?;
        }
    }

    Ok(())
}
