//! orgpad - live Org document preview.
//!
//! # Usage
//!
//! ```bash
//! orgpad notes.org
//! orgpad --view raw notes.org
//! orgpad --watch --throttle-ms 50 notes.org
//! orgpad --tree notes.org
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use orgpad::app::App;
use orgpad::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use orgpad::perf;
use orgpad::render::{DEFAULT_COOLDOWN, ViewId};

/// Live Org document preview
#[derive(Parser, Debug)]
#[command(name = "orgpad", version, about, long_about = None)]
struct Cli {
    /// Org file to render
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// View to show
    #[arg(long, value_enum)]
    view: Option<ViewId>,

    /// Keep running and re-render when the file is saved
    #[arg(short, long)]
    watch: bool,

    /// Render cooldown while changes keep arriving, in milliseconds
    #[arg(long, value_name = "MS")]
    throttle_ms: Option<u64>,

    /// Print the syntax tree as JSON instead of the view
    #[arg(long)]
    tree: bool,

    /// Report timing of parse and render stages
    #[arg(long)]
    perf: bool,

    /// Write pipeline debug events to a file
    #[arg(long, value_name = "PATH")]
    render_debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn init_tracing(perf_enabled: bool) -> Result<()> {
    let mut filter =
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());
    if perf_enabled {
        filter = filter.add_directive(
            "orgpad::perf=info"
                .parse()
                .context("Invalid perf log directive")?,
        );
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn main() -> Result<()> {
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

    init_tracing(effective.perf)?;
    perf::set_enabled(effective.perf);
    let render_debug_log_path = effective
        .render_debug_log
        .clone()
        .or_else(|| std::env::var_os("ORGPAD_RENDER_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(render_debug_log_path.as_deref()) {
        tracing::warn!(
            path = ?render_debug_log_path,
            %err,
            "failed to open render debug log"
        );
    }

    if !cli.file.exists() {
        anyhow::bail!("File not found: {}", cli.file.display());
    }

    let cooldown = effective
        .throttle_ms
        .map_or(DEFAULT_COOLDOWN, Duration::from_millis);
    let app = App::new(cli.file)
        .with_view(effective.view.unwrap_or(ViewId::Rendered))
        .with_watch(effective.watch)
        .with_tree_output(effective.tree)
        .with_cooldown(cooldown);

    app.run().context("Application error")
}
