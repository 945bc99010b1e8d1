//! Standalone catalog explorer
//!
//! Loads a decoded frame catalog, indexes it and prints the frames matching a
//! free-text query, followed by the signals of the first match.
//!
//! Usage:
//!   explore_catalog <catalog.json> [query words...]
//!
//! Example:
//!   explore_catalog data/can_frames_decoded_all_values_mcu2.json gear park

use can_catalog::{load_dataset, CatalogConfig, ExplorerSession, FrameQuery, Indexer};
use std::env;
use std::path::PathBuf;

fn main() {
    env_logger::init();

    let mut args = env::args().skip(1);
    let Some(path) = args.next().map(PathBuf::from) else {
        eprintln!("Usage: explore_catalog <catalog.json> [query words...]");
        std::process::exit(1);
    };
    let query = args.collect::<Vec<_>>().join(" ");

    let dataset = match load_dataset(&path) {
        Ok(dataset) => dataset,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let config = CatalogConfig::new();
    let index = Indexer::from_config(&config).build_with_progress(dataset, |progress| {
        if progress.processed % 1000 == 0 || progress.is_complete() {
            println!("Indexing frames {}/{}", progress.processed, progress.total);
        }
    });

    let totals = index.totals();
    println!("\n=== CATALOG ===");
    println!("Frames: {}", totals.frames);
    println!("Signals: {}", totals.signals);
    println!("Enum values: {}", totals.values);
    println!("VAPI aliases: {}", index.reported_vapi_aliases());

    let mut session = ExplorerSession::new(index, &config);
    session.apply_filters(FrameQuery::new().with_text(query.as_str()));

    println!("\n=== FRAMES matching {:?} ({}) ===", query, session.visible_count());
    for frame in session.visible_frames().take(20) {
        println!(
            "  {:>8}  {:<40} {:>4} signals  {}",
            frame.frame.address_hex,
            frame.frame.frame_name,
            frame.meta.signal_count,
            frame.bus_label()
        );
    }

    let Some(view) = session.signal_view() else {
        println!("\nNo frames match your filters.");
        return;
    };
    println!(
        "\n=== SIGNALS of {} ({}) ===",
        view.frame.frame.frame_name, view.frame.frame.address_hex
    );
    for signal in view.page() {
        println!(
            "  {:>3}  {:<40} {} values",
            signal.signal.signal_index,
            signal.signal.signal_name,
            signal.signal.possible_values.len()
        );
    }
}
