//! CAN Catalog CLI Application
//!
//! This is the command-line front end for the CAN frame catalog.
//! It uses the can-catalog library and adds:
//! - Data source selection (built-in catalog, config file, raw override)
//! - TOML configuration
//! - Plain-text and JSON rendering of stats, frame lists and signal tables

use anyhow::{Context, Result};
use can_catalog::{
    load_selection, CatalogIndex, ExplorerSession, FrameKey, FrameQuery, Indexer, SignalKey,
    SortMode, SourceCatalog, SourceSelection,
};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod report;

use config::{AppConfig, OutputFormat};

/// CAN Catalog - Explore decoded CAN frame definitions
#[derive(Parser, Debug)]
#[command(name = "can-catalog-cli")]
#[command(about = "Search CAN frames, signals and value tables", long_about = None)]
#[command(version)]
struct Args {
    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Data source key (see the `sources` command)
    #[arg(short, long, value_name = "KEY", global = true)]
    source: Option<String>,

    /// Load this dataset file instead; disables source switching
    #[arg(long, value_name = "FILE", global = true)]
    data: Option<PathBuf>,

    /// Output format (default: from config, else text)
    #[arg(long, value_enum, global = true)]
    format: Option<OutputFormat>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the known data sources
    Sources,
    /// Show dataset provenance, totals and filter options
    Stats,
    /// Search frames
    Frames {
        #[command(flatten)]
        filters: FrameFilterArgs,

        /// Maximum number of frames to print
        #[arg(long, value_name = "COUNT")]
        limit: Option<usize>,
    },
    /// Show the signals of one frame
    Signals {
        #[command(flatten)]
        filters: FrameFilterArgs,

        /// Frame key (bus|bus_id|address|name); default: first matching frame
        #[arg(long, value_name = "KEY", conflicts_with = "name")]
        frame: Option<String>,

        /// Frame name; the first visible frame with this name is selected
        #[arg(long, value_name = "NAME")]
        name: Option<String>,

        /// Free-text signal filter
        #[arg(long = "signal-query", value_name = "TEXT")]
        signal_query: Option<String>,

        /// Signal page (1-based; clamped into range)
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Signals per page (default: from config)
        #[arg(long, value_name = "COUNT")]
        page_size: Option<usize>,

        /// Signal index to expand into its value table (can be repeated)
        #[arg(long, value_name = "INDEX")]
        expand: Vec<i64>,
    },
}

#[derive(ClapArgs, Debug, Default)]
struct FrameFilterArgs {
    /// Free-text query; every word must match
    #[arg(long = "query", value_name = "TEXT", default_value = "")]
    text: String,

    /// Bus label, e.g. "CH (6)"
    #[arg(long, value_name = "LABEL")]
    bus: Option<String>,

    /// Module name, e.g. "BMS"
    #[arg(long, value_name = "MODULE")]
    module: Option<String>,

    /// Only frames with enumerated signals
    #[arg(long)]
    enumerated_only: bool,

    /// address | name | signals | enums | vapi
    #[arg(long, value_name = "MODE")]
    sort: Option<SortMode>,
}

impl FrameFilterArgs {
    fn to_query(&self, default_sort: SortMode) -> FrameQuery {
        let mut query = FrameQuery::new()
            .with_text(self.text.as_str())
            .enumerated_only(self.enumerated_only)
            .sorted_by(self.sort.unwrap_or(default_sort));
        if let Some(bus) = &self.bus {
            query = query.with_bus(bus.as_str());
        }
        if let Some(module) = &self.module {
            query = query.with_module(module.as_str());
        }
        query
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("CAN Catalog CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using catalog library v{}", can_catalog::VERSION);

    let app_config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };
    let format = args.format.unwrap_or(app_config.output.format);

    let sources = app_config.source_catalog()?;
    let selection = sources.resolve(args.source.as_deref(), args.data.as_deref())?;

    match &args.command {
        Command::Sources => {
            match format {
                OutputFormat::Json => {
                    println!("{}", report::render_sources_json(&sources, &selection)?)
                }
                OutputFormat::Text => print!("{}", report::render_sources(&sources, &selection)),
            }
            Ok(())
        }
        Command::Stats => {
            let index = build_index(&selection, &app_config)?;
            match format {
                OutputFormat::Json => {
                    println!("{}", report::render_stats_json(&index, &selection)?)
                }
                OutputFormat::Text => print!("{}", report::render_stats(&index, &selection)),
            }
            Ok(())
        }
        Command::Frames { filters, limit } => {
            let index = build_index(&selection, &app_config)?;
            let mut session = ExplorerSession::new(index, &app_config.catalog);
            session.apply_filters(filters.to_query(app_config.catalog.default_sort));
            print_frames(&session, *limit, format)
        }
        Command::Signals {
            filters,
            frame,
            name,
            signal_query,
            page,
            page_size,
            expand,
        } => {
            let index = build_index(&selection, &app_config)?;
            let mut session = ExplorerSession::new(index, &app_config.catalog);
            session.apply_filters(filters.to_query(app_config.catalog.default_sort));
            signals_mode(
                &mut session,
                frame.as_deref(),
                name.as_deref(),
                signal_query.as_deref(),
                *page,
                *page_size,
                expand,
                format,
            )
        }
    }
}

/// Load the selected dataset and index it, logging progress per batch
fn build_index(selection: &SourceSelection, app_config: &AppConfig) -> Result<CatalogIndex> {
    let dataset = load_selection(selection).with_context(|| {
        format!(
            "Failed to load data from {:?}. Check --source/--data or the [sources] config",
            selection.location
        )
    })?;

    let index = Indexer::from_config(&app_config.catalog).build_with_progress(dataset, |progress| {
        log::debug!("Indexing frames {}/{}", progress.processed, progress.total);
    });
    Ok(index)
}

fn print_frames(session: &ExplorerSession, limit: Option<usize>, format: OutputFormat) -> Result<()> {
    let shown = limit.unwrap_or(usize::MAX);
    match format {
        OutputFormat::Json => {
            println!("{}", report::render_frames_json(session.visible_frames().take(shown))?);
        }
        OutputFormat::Text => {
            print!(
                "{}",
                report::render_frames(
                    session.visible_frames().take(shown),
                    session.visible_count(),
                    session.selection().selected(),
                )
            );
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn signals_mode(
    session: &mut ExplorerSession,
    frame: Option<&str>,
    name: Option<&str>,
    signal_query: Option<&str>,
    page: usize,
    page_size: Option<usize>,
    expand: &[i64],
    format: OutputFormat,
) -> Result<()> {
    if let Some(raw_key) = frame {
        let key: FrameKey = raw_key.parse()?;
        session.select_frame(&key)?;
    } else if let Some(name) = name {
        let key = session
            .visible_frames()
            .find(|f| f.frame.frame_name == name)
            .map(|f| f.key().clone())
            .with_context(|| format!("No visible frame named {:?}", name))?;
        session.select_frame(&key)?;
    }

    let Some(selected) = session.selection().selected().cloned() else {
        println!("No frames match your filters.");
        return Ok(());
    };

    if let Some(query) = signal_query {
        session.set_signal_query(query);
    }
    if let Some(size) = page_size {
        session.set_page_size(size);
    }
    session.go_to_page(page);
    for index in expand {
        session.toggle_signal(SignalKey::new(selected.clone(), *index));
    }

    let selection = session.selection().clone();
    let Some(view) = session.signal_view() else {
        println!("No frames match your filters.");
        return Ok(());
    };

    match format {
        OutputFormat::Json => {
            let signals: Vec<_> = view.page().iter().map(|row| row.signal).collect();
            println!("{}", serde_json::to_string_pretty(&signals)?);
        }
        OutputFormat::Text => print!("{}", report::render_signal_view(&view, &selection)),
    }
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frames_command() {
        let args = Args::try_parse_from([
            "can-catalog-cli",
            "frames",
            "--query",
            "gear park",
            "--bus",
            "CH (6)",
            "--enumerated-only",
            "--sort",
            "vapi",
        ])
        .unwrap();

        let Command::Frames { filters, limit } = args.command else {
            panic!("expected frames command");
        };
        assert_eq!(limit, None);
        let query = filters.to_query(SortMode::Address);
        assert_eq!(query.text, "gear park");
        assert_eq!(query.bus.as_deref(), Some("CH (6)"));
        assert!(query.enumerated_only);
        assert_eq!(query.sort, SortMode::AliasCount);
    }

    #[test]
    fn test_parse_signals_command() {
        let args = Args::try_parse_from([
            "can-catalog-cli",
            "--data",
            "custom.json",
            "signals",
            "--name",
            "DI_systemStatus",
            "--expand",
            "0",
            "--expand",
            "3",
            "--page-size",
            "50",
        ])
        .unwrap();

        assert_eq!(args.data, Some(PathBuf::from("custom.json")));
        let Command::Signals { name, expand, page, page_size, .. } = args.command else {
            panic!("expected signals command");
        };
        assert_eq!(name.as_deref(), Some("DI_systemStatus"));
        assert_eq!(expand, vec![0, 3]);
        assert_eq!(page, 1);
        assert_eq!(page_size, Some(50));
    }

    #[test]
    fn test_default_sort_from_config() {
        let filters = FrameFilterArgs::default();
        assert_eq!(filters.to_query(SortMode::Name).sort, SortMode::Name);
    }

    #[test]
    fn test_invalid_sort_is_rejected() {
        let result = Args::try_parse_from(["can-catalog-cli", "frames", "--sort", "random"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_override_keeps_source_label() {
        let selection = SourceCatalog::builtin()
            .resolve(Some("mcu3"), Some(std::path::Path::new("custom.json")))
            .unwrap();
        assert_eq!(selection.source_key, "mcu3");
        assert!(!selection.can_switch());
    }
}
