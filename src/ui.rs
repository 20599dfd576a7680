//! Terminal output for the `serve` and `init` commands

use std::fmt::Display;
use std::path::Path;
use owo_colors::{OwoColorize, Style};
use crate::config::ItemstoreConfig;

/// Styles for one output stream; empty when the stream is not a terminal
#[derive(Debug, Clone)]
struct Palette {
    title: Style,
    label: Style,
    done: Style,
    failed: Style,
}

impl Palette {
    fn plain() -> Self {
        Self {
            title: Style::new(),
            label: Style::new(),
            done: Style::new(),
            failed: Style::new(),
        }
    }

    fn for_stream(colored: bool) -> Self {
        if !colored {
            return Self::plain();
        }
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().white().dimmed(),
            done: Style::new().green().bold(),
            failed: Style::new().red().bold(),
        }
    }
}

/// Print where the server is about to listen
pub fn serve_banner(config: &ItemstoreConfig) {
    let palette = Palette::for_stream(console::colors_enabled());
    for line in banner_lines(config, &palette) {
        println!("{}", line);
    }
}

/// Report the outcome of writing a default config file
pub fn config_written(path: &Path) {
    let palette = Palette::for_stream(console::colors_enabled());
    println!(
        "✅ {} {}",
        "Wrote default config to".style(palette.done.clone()),
        path.display()
    );
}

pub fn config_failed(path: &Path, err: &impl Display) {
    let palette = Palette::for_stream(console::colors_enabled_stderr());
    eprintln!(
        "❌ {} {}: {}",
        "Could not write".style(palette.failed.clone()),
        path.display(),
        err
    );
}

fn banner_lines(config: &ItemstoreConfig, palette: &Palette) -> Vec<String> {
    let base = format!("http://{}", config.bind_address());
    let limit = if config.rate_limit.enabled {
        format!(
            "{} requests / {}s per client",
            config.rate_limit.max_requests, config.rate_limit.window_secs
        )
    } else {
        "off".to_string()
    };

    let mut lines = vec![format!("📦 {}", "Itemstore".style(palette.title.clone()))];
    for (label, value) in [
        ("Items", format!("{}/api/v1/items", base)),
        ("Health", format!("{}/health", base)),
        ("Rate limit", limit),
    ] {
        lines.push(format!("   {:<10} {}", label.style(palette.label.clone()), value));
    }
    lines
}
