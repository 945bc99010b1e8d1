//! Report rendering
//!
//! Turns catalog stats, frame lists and signal views into plain text (or
//! JSON) for the terminal. Nothing here touches the query engines; it only
//! formats what the session hands over.

use anyhow::Result;
use can_catalog::{
    CatalogIndex, CatalogTotals, DataSource, FrameKey, FrameRef, PossibleValue, Provenance,
    SelectionState, SignalView, SourceCatalog, SourceSelection,
};
use serde::Serialize;
use std::fmt::Write;

/// Group digits in thousands, e.g. `12345` → `"12,345"`
pub fn format_count<N: Into<u64>>(n: N) -> String {
    let digits = n.into().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn count(n: usize) -> String {
    format_count(n as u64)
}

pub fn render_sources(catalog: &SourceCatalog, selection: &SourceSelection) -> String {
    let mut out = String::new();
    for source in catalog.sources() {
        let marker = if source.key == selection.source_key { "*" } else { " " };
        let _ = writeln!(
            out,
            "{} {:<16} {:<28} {}",
            marker,
            source.key,
            source.label,
            source.location.display()
        );
    }
    if selection.is_override {
        let _ = writeln!(
            out,
            "\nSource switching disabled: data override {} is active.",
            selection.location.display()
        );
    }
    out
}

pub fn render_stats(index: &CatalogIndex, selection: &SourceSelection) -> String {
    let totals = index.totals();
    let mut out = String::new();
    let _ = writeln!(out, "Data source: {} ({})", selection.source_label, selection.source_key);
    let _ = writeln!(out, "{}", index.provenance());
    let _ = writeln!(out);
    let _ = writeln!(out, "  Frames:       {}", count(totals.frames));
    let _ = writeln!(out, "  Signals:      {}", count(totals.signals));
    let _ = writeln!(out, "  Enum values:  {}", count(totals.values));
    let _ = writeln!(out, "  VAPI aliases: {}", format_count(index.reported_vapi_aliases()));
    if totals.duplicate_keys > 0 {
        let _ = writeln!(out, "  Duplicate frame keys: {}", count(totals.duplicate_keys));
    }
    let _ = writeln!(out, "\nBuses ({}):", index.bus_labels().len());
    for bus in index.bus_labels() {
        let _ = writeln!(out, "  {}", bus);
    }
    let _ = writeln!(out, "\nModules ({}):", index.modules().len());
    let _ = writeln!(out, "  {}", index.modules().join(", "));
    out
}

#[derive(Debug, Serialize)]
struct SourcesReport<'a> {
    sources: &'a [DataSource],
    default: &'a str,
    selected: &'a SourceSelection,
}

pub fn render_sources_json(catalog: &SourceCatalog, selection: &SourceSelection) -> Result<String> {
    let report = SourcesReport {
        sources: catalog.sources(),
        default: catalog.default_key(),
        selected: selection,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

#[derive(Debug, Serialize)]
struct StatsReport<'a> {
    source: &'a SourceSelection,
    provenance: Provenance,
    totals: CatalogTotals,
    reported_vapi_aliases: u64,
    bus_labels: &'a [String],
    modules: &'a [String],
}

pub fn render_stats_json(index: &CatalogIndex, selection: &SourceSelection) -> Result<String> {
    let report = StatsReport {
        source: selection,
        provenance: index.provenance(),
        totals: index.totals(),
        reported_vapi_aliases: index.reported_vapi_aliases(),
        bus_labels: index.bus_labels(),
        modules: index.modules(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// JSON shape of one frame row
#[derive(Debug, Serialize)]
pub struct FrameSummary<'a> {
    pub key: String,
    pub bus_name: &'a str,
    pub bus_id: &'a str,
    pub address_dec: i64,
    pub address_hex: &'a str,
    pub frame_name: &'a str,
    pub module: &'a str,
    pub signal_count: usize,
    pub enumerated_signal_count: usize,
    pub value_count: usize,
    pub vapi_alias_count: usize,
}

impl<'a> From<FrameRef<'a>> for FrameSummary<'a> {
    fn from(frame: FrameRef<'a>) -> Self {
        Self {
            key: frame.key().to_string(),
            bus_name: &frame.frame.bus_name,
            bus_id: &frame.frame.bus_id,
            address_dec: frame.frame.address_dec,
            address_hex: &frame.frame.address_hex,
            frame_name: &frame.frame.frame_name,
            module: frame.module(),
            signal_count: frame.meta.signal_count,
            enumerated_signal_count: frame.meta.enumerated_signal_count,
            value_count: frame.meta.value_count,
            vapi_alias_count: frame.meta.vapi_alias_count,
        }
    }
}

pub fn render_frames_json<'a, I>(frames: I) -> Result<String>
where
    I: IntoIterator<Item = FrameRef<'a>>,
{
    let rows: Vec<FrameSummary<'a>> = frames.into_iter().map(FrameSummary::from).collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}

/// Frame list; `selected` marks the active frame
pub fn render_frames<'a, I>(frames: I, total: usize, selected: Option<&FrameKey>) -> String
where
    I: IntoIterator<Item = FrameRef<'a>>,
{
    if total == 0 {
        return "No frames match your filters.\n".to_string();
    }

    let mut out = String::new();
    let mut shown = 0;
    for frame in frames {
        shown += 1;
        let marker = if Some(frame.key()) == selected { ">" } else { " " };
        let _ = writeln!(
            out,
            "{} {:>8}  {:<40} Bus {} | {} | {} signals | {} enum | {} VAPI",
            marker,
            frame.frame.address_hex,
            frame.frame.frame_name,
            frame.bus_label(),
            frame.module(),
            count(frame.meta.signal_count),
            count(frame.meta.enumerated_signal_count),
            count(frame.meta.vapi_alias_count)
        );
    }
    if shown < total {
        let _ = writeln!(out, "  ... {} more", count(total - shown));
    }
    let _ = writeln!(out, "{} frames", count(total));
    out
}

/// Frame detail header, pager line and signal table
pub fn render_signal_view(view: &SignalView<'_>, selection: &SelectionState) -> String {
    let frame = view.frame;
    let meta = frame.meta;
    let mut out = String::new();

    let _ = writeln!(out, "{} ({})", frame.frame.frame_name, frame.frame.address_hex);
    let _ = writeln!(
        out,
        "Address {} on {} bus",
        frame.frame.address_dec, frame.frame.bus_name
    );
    let _ = writeln!(
        out,
        "Bus: {} | Module: {} | Signals: {} | Enumerated: {} | Enum Values: {} | VAPI Aliases: {}",
        frame.bus_label(),
        frame.module(),
        count(meta.signal_count),
        count(meta.enumerated_signal_count),
        count(meta.value_count),
        count(meta.vapi_alias_count)
    );

    let (first, last) = view.window.display_range();
    let _ = writeln!(
        out,
        "\nShowing {}-{} of {} signals    Page {} / {}",
        count(first),
        count(last),
        count(view.window.total),
        count(view.window.page),
        count(view.window.total_pages)
    );

    if view.window.total_pages > 1 {
        let nav = |enabled: bool, label: &'static str| if enabled { label } else { "-" };
        let _ = writeln!(
            out,
            "Pager: {} {} {} {}",
            nav(view.window.has_prev(), "First"),
            nav(view.window.has_prev(), "Prev"),
            nav(view.window.has_next(), "Next"),
            nav(view.window.has_next(), "Last")
        );
    }

    let expanded: Vec<String> = selection
        .expanded()
        .filter(|key| &key.frame == frame.key())
        .map(|key| key.signal_index.to_string())
        .collect();
    if !expanded.is_empty() {
        let _ = writeln!(out, "Expanded: {}", expanded.join(", "));
    }

    if view.page().is_empty() {
        let _ = writeln!(out, "No signals match the current filter.");
        return out;
    }

    let _ = writeln!(
        out,
        "{:>4}  {:<40} {:<24} {:<24} {:>6}  Notes",
        "#", "Signal Name", "Enum Map", "VAPI Alias", "Values"
    );
    for row in view.page() {
        let signal = row.signal;
        let _ = writeln!(
            out,
            "{:>4}  {:<40} {:<24} {:<24} {:>6}  {}",
            signal.signal_index,
            signal.signal_name,
            signal.enum_map_symbol.as_deref().unwrap_or("-"),
            signal.vapi_alias.as_deref().unwrap_or("-"),
            count(signal.possible_values.len()),
            signal.possible_values_note.as_deref().unwrap_or("")
        );
        if let Some(source) = signal.vapi_source.as_deref() {
            let _ = writeln!(out, "{:>4}  {:<40} {:<24} {}", "", "", "", source);
        }
        if selection.is_expanded(&row.key()) {
            out.push_str(&render_values(&signal.possible_values));
        }
    }
    out
}

fn render_values(values: &[PossibleValue]) -> String {
    if values.is_empty() {
        return "        No discrete values decoded for this signal.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(out, "        {:>12}  {:>12}  Label", "Value (Dec)", "Value (Hex)");
    for value in values {
        let _ = writeln!(
            out,
            "        {:>12}  {:>12}  {}",
            value.value_dec,
            value.value_hex,
            value.label.as_deref().unwrap_or("")
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use can_catalog::{CatalogConfig, Dataset, ExplorerSession, FrameQuery, Indexer, SignalKey};

    fn session() -> ExplorerSession {
        let dataset = Dataset::from_json_str(
            r#"{"frames": [
                {"bus_name": "CH", "bus_id": "6", "address_dec": 280, "address_hex": "0x118",
                 "frame_name": "DI_systemStatus",
                 "signals": [
                    {"signal_index": 0, "signal_name": "DI_gear", "enum_map_symbol": "DI_gear_E",
                     "possible_values": [{"value_dec": 1, "value_hex": "0x1", "label": "PARK"}]},
                    {"signal_index": 1, "signal_name": "DI_torque"}
                 ]}
            ]}"#,
        )
        .unwrap();
        let config = CatalogConfig::new();
        ExplorerSession::new(Indexer::new().build(dataset), &config)
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0u64), "0");
        assert_eq!(format_count(999u64), "999");
        assert_eq!(format_count(1000u64), "1,000");
        assert_eq!(format_count(1234567u64), "1,234,567");
    }

    #[test]
    fn test_render_empty_frames() {
        let session = session();
        let text = render_frames(session.visible_frames().take(0), 0, None);
        assert_eq!(text, "No frames match your filters.\n");
    }

    #[test]
    fn test_render_frames_marks_selection() {
        let session = session();
        let text = render_frames(session.visible_frames(), 1, session.selection().selected());
        assert!(text.starts_with(">    0x118  DI_systemStatus"));
        assert!(text.contains("Bus CH (6) | DI | 2 signals | 1 enum | 0 VAPI"));
        assert!(text.ends_with("1 frames\n"));
    }

    #[test]
    fn test_render_signal_view_with_expansion() {
        let mut session = session();
        let key = session.selected_frame().unwrap().key().clone();
        session.toggle_signal(SignalKey::new(key, 0));

        let selection = session.selection().clone();
        let view = session.signal_view().unwrap();
        let text = render_signal_view(&view, &selection);
        assert!(text.contains("DI_systemStatus (0x118)"));
        assert!(text.contains("Showing 1-2 of 2 signals    Page 1 / 1"));
        assert!(text.contains("PARK"));
        assert!(text.contains("DI_gear_E"));
    }

    #[test]
    fn test_render_signal_view_pager_and_expanded_rows() {
        let mut session = session();
        session.set_page_size(1);
        let key = session.selected_frame().unwrap().key().clone();
        session.toggle_signal(SignalKey::new(key, 1));

        let selection = session.selection().clone();
        let view = session.signal_view().unwrap();
        let text = render_signal_view(&view, &selection);
        assert!(text.contains("Page 1 / 2"));
        assert!(text.contains("Pager: - - Next Last"));
        assert!(text.contains("Expanded: 1"));

        session.go_to_page(2);
        let view = session.signal_view().unwrap();
        let text = render_signal_view(&view, &selection);
        assert!(text.contains("Pager: First Prev - -"));
    }

    #[test]
    fn test_render_signal_view_no_matches() {
        let mut session = session();
        session.set_signal_query("nothing");
        let selection = session.selection().clone();
        let view = session.signal_view().unwrap();
        let text = render_signal_view(&view, &selection);
        assert!(text.contains("Showing 0-0 of 0 signals"));
        assert!(text.contains("No signals match the current filter."));
    }

    #[test]
    fn test_sources_and_stats_json() {
        let catalog = SourceCatalog::builtin();
        let selection = catalog.resolve(Some("mcu3"), None).unwrap();
        let json = render_sources_json(&catalog, &selection).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["default"], "mcu2");
        assert_eq!(parsed["selected"]["source_key"], "mcu3");
        assert_eq!(parsed["selected"]["is_override"], false);
        assert_eq!(parsed["sources"].as_array().unwrap().len(), 4);

        let session = session();
        let json = render_stats_json(session.index(), &selection).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["totals"]["frames"], 1);
        assert_eq!(parsed["totals"]["signals"], 2);
        assert_eq!(parsed["reported_vapi_aliases"], 0);
        assert_eq!(parsed["bus_labels"][0], "CH (6)");
        assert_eq!(parsed["modules"][0], "DI");
        assert_eq!(parsed["provenance"]["libraries"][0], "libQtCarCANData.so");
    }

    #[test]
    fn test_frames_json() {
        let mut session = session();
        session.apply_filters(FrameQuery::new().with_text("park"));
        let json = render_frames_json(session.visible_frames()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["key"], "CH|6|280|DI_systemStatus");
        assert_eq!(parsed[0]["value_count"], 1);
    }
}
