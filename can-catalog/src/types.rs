//! Core types for the CAN frame catalog
//!
//! This module defines the raw records supplied by the dataset feed (frames,
//! signals, possible values and passthrough provenance), the identity keys
//! used to address them, and the library error type. Raw records are never
//! mutated after loading; everything derived from them lives in the index.

use crate::lenient;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors that can occur while loading or querying a catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to load dataset: {0}")]
    LoadFailure(String),

    #[error("Unknown data source: {0}")]
    UnknownSource(String),

    #[error("Frame not found: {0}")]
    FrameNotFound(String),

    #[error("Invalid frame key: {0}")]
    InvalidFrameKey(String),

    #[error("Invalid sort mode: {0}")]
    InvalidSortMode(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CatalogError {
    /// True when no index could be built and the session cannot start
    pub fn is_fatal(&self) -> bool {
        matches!(self, CatalogError::LoadFailure(_) | CatalogError::IoError(_))
    }
}

/// Root container of a loaded catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Frame definitions in feed order
    #[serde(default, deserialize_with = "lenient::records")]
    pub frames: Vec<Frame>,

    /// Vehicle / firmware the catalog was extracted from
    #[serde(
        default,
        deserialize_with = "lenient::optional_record",
        skip_serializing_if = "Option::is_none"
    )]
    pub dataset_source: Option<DatasetSource>,

    /// Libraries the extraction tooling walked
    #[serde(
        default,
        deserialize_with = "lenient::records",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub sources_processed: Vec<ProcessedSource>,

    /// Precomputed VAPI cross-reference counters
    #[serde(
        default,
        deserialize_with = "lenient::optional_record",
        skip_serializing_if = "Option::is_none"
    )]
    pub vapi_digest: Option<VapiDigest>,
}

/// A decoded bus message definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default, deserialize_with = "lenient::text")]
    pub bus_name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub bus_id: String,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub address_dec: i64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub address_hex: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub frame_name: String,
    #[serde(default, deserialize_with = "lenient::records")]
    pub signals: Vec<Signal>,
}

impl Frame {
    /// Identity of this frame within a dataset
    pub fn key(&self) -> FrameKey {
        FrameKey {
            bus_name: self.bus_name.clone(),
            bus_id: self.bus_id.clone(),
            address_dec: self.address_dec,
            frame_name: self.frame_name.clone(),
        }
    }

    /// Bus label as shown in the bus filter, e.g. `"CH (6)"`
    pub fn bus_label(&self) -> String {
        format!("{} ({})", self.bus_name, self.bus_id)
    }
}

/// A named bitfield decoded from within a frame's payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    #[serde(default, deserialize_with = "lenient::integer")]
    pub signal_index: i64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub signal_name: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub enum_map_symbol: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub possible_values_note: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub vapi_alias: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub vapi_source: Option<String>,
    #[serde(default, deserialize_with = "lenient::records")]
    pub possible_values: Vec<PossibleValue>,
}

impl Signal {
    /// True if the signal carries a value table
    pub fn is_enumerated(&self) -> bool {
        !self.possible_values.is_empty()
    }

    /// True if the signal is cross-referenced to a vehicle-API name
    pub fn has_vapi_alias(&self) -> bool {
        self.vapi_alias.as_deref().is_some_and(|a| !a.is_empty())
    }
}

/// One decoded-code-to-label mapping of an enumerated signal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PossibleValue {
    #[serde(default, deserialize_with = "lenient::text")]
    pub value_dec: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub value_hex: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub label: Option<String>,
}

/// Vehicle and firmware the catalog was extracted from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetSource {
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub vehicle: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub firmware: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub mcu: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub soc: Option<String>,
}

/// One library processed by the extraction tooling
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessedSource {
    #[serde(default, deserialize_with = "lenient::text")]
    pub library: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VapiDigest {
    #[serde(default)]
    pub counts: VapiDigestCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VapiDigestCounts {
    #[serde(default, deserialize_with = "lenient::optional_count")]
    pub db_signals_annotated_with_vapi_alias: Option<u64>,
}

/// Composite identity of a frame: bus, bus id, address and name
///
/// Rendered as `bus_name|bus_id|address_dec|frame_name`. A `|` or `\` inside
/// the bus name or bus id is escaped with a backslash; the frame name is the
/// last component and is written as-is, so it may itself contain `|`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameKey {
    pub bus_name: String,
    pub bus_id: String,
    pub address_dec: i64,
    pub frame_name: String,
}

impl fmt::Display for FrameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}",
            escape_component(&self.bus_name),
            escape_component(&self.bus_id),
            self.address_dec,
            self.frame_name
        )
    }
}

fn escape_component(field: &str) -> Cow<'_, str> {
    if !field.contains(['|', '\\']) {
        return Cow::Borrowed(field);
    }
    let mut out = String::with_capacity(field.len() + 2);
    for ch in field.chars() {
        if ch == '|' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    Cow::Owned(out)
}

/// Split off one escaped component; `None` if no unescaped `|` follows
fn split_component(s: &str) -> Option<(String, &str)> {
    let mut out = String::new();
    let mut chars = s.char_indices();
    while let Some((i, ch)) = chars.next() {
        match ch {
            '\\' => out.push(chars.next()?.1),
            '|' => return Some((out, &s[i + 1..])),
            _ => out.push(ch),
        }
    }
    None
}

impl FromStr for FrameKey {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CatalogError::InvalidFrameKey(s.to_string());
        let (bus_name, rest) = split_component(s).ok_or_else(invalid)?;
        let (bus_id, rest) = split_component(rest).ok_or_else(invalid)?;
        let (address, frame_name) = rest.split_once('|').ok_or_else(invalid)?;
        let address_dec = address
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid())?;

        Ok(FrameKey {
            bus_name,
            bus_id,
            address_dec,
            frame_name: frame_name.to_string(),
        })
    }
}

/// Identity of one signal row: its frame plus its index within that frame
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SignalKey {
    pub frame: FrameKey,
    pub signal_index: i64,
}

impl SignalKey {
    pub fn new(frame: FrameKey, signal_index: i64) -> Self {
        Self { frame, signal_index }
    }
}

impl fmt::Display for SignalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.frame, self.signal_index)
    }
}
