//! Frame query engine
//!
//! Combines categorical filters (bus label, module, enumerated-only) with
//! free-text tokens and a sort mode. Filters are evaluated first; text tokens
//! are AND-ed, each token matching either the frame search text or the
//! value-label text. The result borrows from the index and is always in a
//! total, deterministic order.

use crate::index::{CatalogIndex, FrameRef};
use crate::query::tokenize;
use crate::types::CatalogError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Ordering applied to frame results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortMode {
    /// Ascending address, then frame name
    #[default]
    #[serde(rename = "address")]
    Address,
    /// Frame name
    #[serde(rename = "name")]
    Name,
    /// Most signals first, then ascending address
    #[serde(rename = "signal-count-desc", alias = "signals")]
    SignalCount,
    /// Most enumerated signals first, then ascending address
    #[serde(rename = "enum-count-desc", alias = "enums")]
    EnumCount,
    /// Most VAPI aliases first, then ascending address
    #[serde(rename = "alias-count-desc", alias = "vapi")]
    AliasCount,
}

impl SortMode {
    pub const ALL: [SortMode; 5] = [
        SortMode::Address,
        SortMode::Name,
        SortMode::SignalCount,
        SortMode::EnumCount,
        SortMode::AliasCount,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Address => "address",
            SortMode::Name => "name",
            SortMode::SignalCount => "signal-count-desc",
            SortMode::EnumCount => "enum-count-desc",
            SortMode::AliasCount => "alias-count-desc",
        }
    }

    /// Compare two frames under this mode
    ///
    /// Every mode ends with the same identity tie-break (name, bus, address,
    /// dataset position), so distinct frames never compare equal.
    pub fn compare(&self, a: &FrameRef<'_>, b: &FrameRef<'_>) -> Ordering {
        let by_address = || a.frame.address_dec.cmp(&b.frame.address_dec);
        let primary = match self {
            SortMode::Address => by_address(),
            SortMode::Name => a
                .frame
                .frame_name
                .cmp(&b.frame.frame_name)
                .then_with(by_address),
            SortMode::SignalCount => b
                .meta
                .signal_count
                .cmp(&a.meta.signal_count)
                .then_with(by_address),
            SortMode::EnumCount => b
                .meta
                .enumerated_signal_count
                .cmp(&a.meta.enumerated_signal_count)
                .then_with(by_address),
            SortMode::AliasCount => b
                .meta
                .vapi_alias_count
                .cmp(&a.meta.vapi_alias_count)
                .then_with(by_address),
        };
        primary.then_with(|| identity_order(a, b))
    }
}

fn identity_order(a: &FrameRef<'_>, b: &FrameRef<'_>) -> Ordering {
    a.frame
        .frame_name
        .cmp(&b.frame.frame_name)
        .then_with(|| a.frame.bus_name.cmp(&b.frame.bus_name))
        .then_with(|| a.frame.bus_id.cmp(&b.frame.bus_id))
        .then_with(|| a.frame.address_dec.cmp(&b.frame.address_dec))
        .then_with(|| a.position.cmp(&b.position))
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "address" => Ok(SortMode::Address),
            "name" => Ok(SortMode::Name),
            "signal-count-desc" | "signals" => Ok(SortMode::SignalCount),
            "enum-count-desc" | "enums" => Ok(SortMode::EnumCount),
            "alias-count-desc" | "vapi" => Ok(SortMode::AliasCount),
            _ => Err(CatalogError::InvalidSortMode(s.to_string())),
        }
    }
}

/// Text, filters and sort mode for one frame search
///
/// An absent (or empty) bus or module filter places no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameQuery {
    #[serde(default)]
    pub text: String,
    /// Exact bus label, e.g. `"CH (6)"`
    #[serde(default)]
    pub bus: Option<String>,
    /// Exact module name
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub enumerated_only: bool,
    #[serde(default)]
    pub sort: SortMode,
}

impl FrameQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_bus(mut self, bus_label: impl Into<String>) -> Self {
        self.bus = Some(bus_label.into());
        self
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn enumerated_only(mut self, enabled: bool) -> Self {
        self.enumerated_only = enabled;
        self
    }

    pub fn sorted_by(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    /// Categorical filters only; text is checked separately
    pub fn passes_filters(&self, frame: &FrameRef<'_>) -> bool {
        if let Some(bus) = self.bus.as_deref().filter(|b| !b.is_empty()) {
            if frame.meta.bus_label != bus {
                return false;
            }
        }
        if let Some(module) = self.module.as_deref().filter(|m| !m.is_empty()) {
            if frame.meta.module != module {
                return false;
            }
        }
        if self.enumerated_only && frame.meta.enumerated_signal_count == 0 {
            return false;
        }
        true
    }

    /// Filters, then every token against search text or label text
    pub fn matches(&self, frame: &FrameRef<'_>, tokens: &[String]) -> bool {
        self.passes_filters(frame) && frame_matches_tokens(frame, tokens)
    }

    /// Run against an index, returning matching frames in sorted order
    pub fn run<'a>(&self, index: &'a CatalogIndex) -> Vec<FrameRef<'a>> {
        let tokens = tokenize(&self.text);
        let mut results: Vec<FrameRef<'a>> = index
            .frames()
            .filter(|frame| self.matches(frame, &tokens))
            .collect();
        results.sort_by(|a, b| self.sort.compare(a, b));

        log::debug!(
            "Frame query {:?} (bus={:?}, module={:?}, enumerated_only={}, sort={}) matched {}/{}",
            self.text,
            self.bus,
            self.module,
            self.enumerated_only,
            self.sort,
            results.len(),
            index.len()
        );
        results
    }
}

/// True when each token occurs in the search text or in the label text
pub fn frame_matches_tokens(frame: &FrameRef<'_>, tokens: &[String]) -> bool {
    let search = frame.meta.search_blob();
    let labels = frame.meta.label_blob();
    tokens
        .iter()
        .all(|token| search.contains(token.as_str()) || labels.contains(token.as_str()))
}

impl CatalogIndex {
    /// Convenience wrapper around [`FrameQuery::run`]
    pub fn search_frames(&self, query: &FrameQuery) -> Vec<FrameRef<'_>> {
        query.run(self)
    }
}
