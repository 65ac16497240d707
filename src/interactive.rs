use anyhow::Context;
use console::style;
use dialoguer::{Confirm, FuzzySelect, Input, Select};
use readalong::catalog::{Audiobook, Catalog};
use readalong::config::Config;
use readalong::player::format_time;
use std::fs;

const SPEEDS: &[(&str, f64)] = &[
    ("1x", 1.0),
    ("1.25x", 1.25),
    ("1.5x", 1.5),
    ("2x", 2.0),
];

pub struct InteractiveResult {
    pub book_index: usize,
    pub speed: f64,
    pub start_at: f64,
}

pub fn print_header() {
    println!();
    println!(
        "{}",
        style("╔═══════════════════════════════════════════════════╗").cyan()
    );
    println!(
        "{}",
        style("║         readalong - Audiobook Transcript Player   ║").cyan()
    );
    println!(
        "{}",
        style("╚═══════════════════════════════════════════════════╝").cyan()
    );
    println!();
}

/// Ask for a source when the configured one is still the default.
pub fn setup_source(config: &mut Config) -> anyhow::Result<()> {
    if config.source != Config::default().source {
        println!(
            "{} Source: {}",
            style("✓").green(),
            style(&config.source).cyan()
        );
        return Ok(());
    }

    let source: String = Input::new()
        .with_prompt("Catalog location (base URL or directory)")
        .default(config.source.clone())
        .interact_text()?;

    if source.trim().is_empty() {
        anyhow::bail!("A source is required");
    }
    config.source = source.trim().to_string();

    if Confirm::new()
        .with_prompt("Save source to config file?")
        .default(false)
        .interact()?
    {
        save_config(config)?;
        println!("{} Source saved to config\n", style("✓").green());
    }

    Ok(())
}

fn save_config(config: &Config) -> anyhow::Result<()> {
    if let Some(config_dir) = dirs::config_dir() {
        let app_dir = config_dir.join("readalong");
        fs::create_dir_all(&app_dir)?;

        let config_path = app_dir.join("config.toml");
        let toml_content = toml::to_string_pretty(config)?;
        fs::write(&config_path, toml_content)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
    }
    Ok(())
}

pub fn run_interactive_wizard(catalog: &Catalog) -> anyhow::Result<InteractiveResult> {
    if catalog.is_empty() {
        anyhow::bail!("The catalog has no audiobooks");
    }

    let book_index = select_book(catalog)?;
    let speed = select_speed()?;
    let start_at = select_start()?;

    let book = &catalog.books()[book_index];
    print_summary(book, speed, start_at);

    if !Confirm::new()
        .with_prompt("Start playback?")
        .default(true)
        .interact()?
    {
        anyhow::bail!("Cancelled by user");
    }

    println!();

    Ok(InteractiveResult {
        book_index,
        speed,
        start_at,
    })
}

fn select_book(catalog: &Catalog) -> anyhow::Result<usize> {
    println!("{}", style("Select an audiobook:").bold());

    let items: Vec<String> = catalog.iter().map(book_label).collect();

    let selection = FuzzySelect::new()
        .with_prompt("Audiobook")
        .items(&items)
        .default(0)
        .interact()?;

    Ok(selection)
}

fn book_label(book: &Audiobook) -> String {
    let mut label = book.title.clone();
    if !book.author.is_empty() {
        label.push_str(&format!(" - By {}", book.author));
    }
    if let Some(ref duration) = book.duration {
        label.push_str(&format!(" ({})", duration));
    }
    label
}

fn select_speed() -> anyhow::Result<f64> {
    let items: Vec<&str> = SPEEDS.iter().map(|(name, _)| *name).collect();

    let selection = Select::new()
        .with_prompt("Playback speed")
        .items(&items)
        .default(0)
        .interact()?;

    Ok(SPEEDS[selection].1)
}

fn select_start() -> anyhow::Result<f64> {
    let input: String = Input::new()
        .with_prompt("Start at (M:SS or seconds)")
        .default("0:00".to_string())
        .interact_text()?;

    parse_position(&input)
        .ok_or_else(|| anyhow::anyhow!("Invalid start position: {}", input))
}

/// Accept `M:SS` or plain seconds.
pub fn parse_position(input: &str) -> Option<f64> {
    let input = input.trim();
    let value = match input.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: f64 = minutes.trim().parse().ok()?;
            let seconds: f64 = seconds.trim().parse().ok()?;
            minutes * 60.0 + seconds
        }
        None => input.parse().ok()?,
    };
    (value.is_finite() && value >= 0.0).then_some(value)
}

fn print_summary(book: &Audiobook, speed: f64, start_at: f64) {
    println!("\n{}", style("═══ Summary ═══").bold());
    println!("  Title:   {}", style(&book.title).cyan());
    if !book.author.is_empty() {
        println!("  Author:  {}", book.author);
    }
    println!("  Speed:   {}x", speed);
    println!("  Start:   {}", format_time(start_at));
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("0:00"), Some(0.0));
        assert_eq!(parse_position("1:30"), Some(90.0));
        assert_eq!(parse_position("42.5"), Some(42.5));
        assert_eq!(parse_position("-3"), None);
        assert_eq!(parse_position("soon"), None);
    }

    #[test]
    fn test_book_label() {
        let book = Audiobook {
            id: "1".to_string(),
            title: "Si Kancil".to_string(),
            author: "Anonim".to_string(),
            cover: None,
            audio: None,
            transcript: None,
            duration: Some("5:12".to_string()),
        };

        assert_eq!(book_label(&book), "Si Kancil - By Anonim (5:12)");
    }
}
