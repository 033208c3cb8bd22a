//! Velvet - a round-trip markdown sync bridge.
//!
//! # Usage
//!
//! ```bash
//! velvet notes.md
//! velvet --no-auto-reload --cooldown-ms 800 notes.md
//! velvet --roundtrip notes.md
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use velvet::app::App;
use velvet::config::{
    ConfigFlags, Settings, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};
use velvet::perf;

/// Keep a markdown file and a rich-text editor in sync over JSON lines
#[derive(Parser, Debug)]
#[command(name = "velvet", version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Markdown file to sync
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Print the file after one load/save cycle and exit
    #[arg(long)]
    roundtrip: bool,

    /// Reload the editor when the file changes on disk (default)
    #[arg(long)]
    auto_reload: bool,

    /// Leave the editor alone when the file changes on disk
    #[arg(long)]
    no_auto_reload: bool,

    /// Reveal markdown syntax around the focused block
    #[arg(long)]
    show_syntax_on_focus: bool,

    /// Quiet period before an editor edit is written, in ms
    #[arg(long, value_name = "MS")]
    save_debounce_ms: Option<u64>,

    /// Quiet period before a file change is examined, in ms
    #[arg(long, value_name = "MS")]
    host_debounce_ms: Option<u64>,

    /// Window after a write in which file changes count as echoes, in ms
    #[arg(long, value_name = "MS")]
    cooldown_ms: Option<u64>,

    /// Minimum spacing of scroll reports, in ms
    #[arg(long, value_name = "MS")]
    scroll_throttle_ms: Option<u64>,

    /// Largest document accepted in either direction, in bytes
    #[arg(long, value_name = "BYTES")]
    max_content_bytes: Option<usize>,

    /// Enable pipeline timing logs
    #[arg(long)]
    perf: bool,

    /// Write sync protocol events to a file
    #[arg(long, value_name = "PATH")]
    sync_debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn main() -> Result<()> {
    // stdout carries protocol messages, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    perf::set_enabled(effective.perf);
    let sync_debug_log_path = effective
        .sync_debug_log
        .clone()
        .or_else(|| std::env::var_os("VELVET_SYNC_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(sync_debug_log_path.as_deref()) {
        eprintln!(
            "[warn] Failed to initialize sync debug log {}: {}",
            sync_debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            err
        );
    }

    if !cli.file.exists() {
        anyhow::bail!("File not found: {}", cli.file.display());
    }

    let settings = Settings::from_flags(&effective);

    if cli.roundtrip {
        let text = std::fs::read_to_string(&cli.file)
            .with_context(|| format!("Failed to read {}", cli.file.display()))?;
        let output = velvet::document::roundtrip_with_limit(&text, settings.max_content_bytes)
            .context("Round trip failed")?;
        print!("{output}");
        return Ok(());
    }

    let mut app = App::new(cli.file).with_settings(settings);

    app.run().context("Bridge error")
}
