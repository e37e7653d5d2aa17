//! Input and output items exchanged with collaborators.
//!
//! # Design
//! - Items own their bytes; the core never performs IO.
//! - Names use `/` separators; backslashes from uploads are normalised on construction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const PNG_SUFFIX: &str = ".png";

/// A file as received from an input provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    name: String,
    bytes: Vec<u8>,
}

impl RawItem {
    /// Build an item from a possibly prefixed relative name and its content.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into().replace('\\', "/");
        let name = name.trim_start_matches('/').to_string();
        Self { name, bytes }
    }

    /// Relative name including any directory prefix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Final path component, the only part matched against the filename pattern.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.name
            .rsplit_once('/')
            .map_or(self.name.as_str(), |(_, file)| file)
    }

    /// Directory prefix of the name, without a trailing separator.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.name
            .rsplit_once('/')
            .map(|(parent, _)| parent)
            .filter(|parent| !parent.is_empty())
    }

    /// Item content.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Split into name and content.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<u8>) {
        (self.name, self.bytes)
    }
}

/// Placement decision for one successfully mapped item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputItem {
    /// Destination path relative to the output root.
    pub relative_path: String,
    /// Name of the input item the output was produced from.
    pub source_name: String,
    /// Item content, carried over unchanged.
    pub bytes: Vec<u8>,
}

/// One file of a materialised result tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Path relative to the tree root.
    pub path: String,
    /// File content.
    pub bytes: Vec<u8>,
}

/// Where mapped items are placed relative to the inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementMode {
    /// Renamed files land in group folders beside their source; everything else stays put.
    #[default]
    InPlace,
    /// Only renamed files are written, into a fresh root.
    Clean,
}

impl PlacementMode {
    /// Stable identifier used in configuration and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InPlace => "in_place",
            Self::Clean => "clean",
        }
    }

    /// Destination path for a mapped item under this mode.
    #[must_use]
    pub fn place(self, source: &RawItem, group_id: &str, output_name: &str) -> String {
        match (self, source.parent()) {
            (Self::InPlace, Some(parent)) => format!("{parent}/{group_id}/{output_name}"),
            _ => format!("{group_id}/{output_name}"),
        }
    }
}

impl fmt::Display for PlacementMode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for PlacementMode {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "in_place" | "inplace" => Ok(Self::InPlace),
            "clean" | "clean_output" => Ok(Self::Clean),
            _ => Err(CoreError::UnknownPlacementMode {
                value: value.to_string(),
            }),
        }
    }
}

/// Case-insensitive `.png` suffix check applied before mapping.
#[must_use]
pub fn has_png_extension(file_name: &str) -> bool {
    file_name.len() >= PNG_SUFFIX.len()
        && file_name
            .get(file_name.len() - PNG_SUFFIX.len()..)
            .is_some_and(|suffix| suffix.eq_ignore_ascii_case(PNG_SUFFIX))
}
