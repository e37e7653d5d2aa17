//! Render pass filename parsing and normalized name derivation.
//!
//! # Design
//! - The pattern is anchored at the start only; trailing text after a full match is ignored.
//! - Parsing is all-or-nothing: a name either yields every field or is `Unparsable`.
//! - Numeric fields stay decimal digit strings, so arbitrarily long values map without overflow.
//! - Pass indices wrap every seven passes; the raw index decides the lighting suffix.

use regex::Regex;
use serde::Serialize;

use crate::error::{CoreError, CoreResult};

const FILENAME_PATTERN: &str =
    r"^([A-Za-z0-9]+-[A-Za-z0-9]+)-([A-Za-z]+)-V([0-9]+)_Output AOV ([0-9]+)_[0-9]+\.png";

/// Semantic pass codes in pass order; pass `n` maps to slot `(n - 1) mod 7`.
pub const SEMANTIC_CODES: [&str; 7] = ["14Y", "CPG", "WGR", "24Y", "RSG", "GRG", "GYG"];

/// Lighting condition a render pass was captured under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lighting {
    /// Primary capture (`WB`), passes 1 through 7.
    WhiteBalance,
    /// Secondary capture (`TB`), passes above 7.
    Secondary,
}

impl Lighting {
    /// Classify a normalized pass index (decimal digits, no leading zeros).
    #[must_use]
    pub fn from_pass_digits(pass_index: &str) -> Self {
        match pass_index.as_bytes() {
            [digit] if *digit <= b'7' => Self::WhiteBalance,
            _ => Self::Secondary,
        }
    }

    /// Suffix emitted in normalized names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WhiteBalance => "WB",
            Self::Secondary => "TB",
        }
    }
}

/// Fields extracted from a structured render filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    /// Asset/shot identifier; becomes the destination folder name.
    pub group_id: String,
    /// Material code. Captured but never emitted.
    pub metal_code: String,
    /// Render version as decimal digits without leading zeros.
    pub version: String,
    /// AOV pass index as decimal digits without leading zeros, never `"0"`.
    pub pass_index: String,
}

impl ParsedName {
    /// Semantic code for the pass, periodic with period 7.
    #[must_use]
    pub fn semantic_code(&self) -> &'static str {
        let modulus = SEMANTIC_CODES.len();
        let residue = decimal_residue(&self.pass_index, modulus);
        SEMANTIC_CODES[(residue + modulus - 1) % modulus]
    }

    /// Lighting condition derived from the raw pass index.
    #[must_use]
    pub fn lighting(&self) -> Lighting {
        Lighting::from_pass_digits(&self.pass_index)
    }

    /// Normalized output filename: `<group>-<code>-V<version>-<WB|TB>.png`.
    #[must_use]
    pub fn output_name(&self) -> String {
        format!(
            "{}-{}-V{}-{}.png",
            self.group_id,
            self.semantic_code(),
            self.version,
            self.lighting().as_str()
        )
    }
}

/// Strip leading zeros, keeping a single `0` for an all-zero field.
fn trim_leading_zeros(digits: &str) -> &str {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() { "0" } else { trimmed }
}

/// `digits mod modulus` for an ASCII decimal string of any length.
fn decimal_residue(digits: &str, modulus: usize) -> usize {
    digits
        .bytes()
        .map(|byte| usize::from(byte.wrapping_sub(b'0')))
        .fold(0, |acc, digit| (acc * 10 + digit) % modulus)
}

/// Outcome of mapping one filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingResult {
    /// The filename matched; carries the normalized name and its group folder.
    Mapped {
        /// Normalized filename.
        output_name: String,
        /// Destination folder name.
        group_id: String,
    },
    /// The filename does not follow the render naming structure.
    Unparsable,
}

impl MappingResult {
    /// Whether the filename was mapped.
    #[must_use]
    pub const fn is_mapped(&self) -> bool {
        matches!(self, Self::Mapped { .. })
    }
}

/// Compiled filename mapper. Cheap to clone and safe to share across runs.
#[derive(Debug, Clone)]
pub struct AovMapper {
    pattern: Regex,
}

impl AovMapper {
    /// Compile the render filename pattern.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PatternCompile`] if the pattern cannot be compiled.
    pub fn new() -> CoreResult<Self> {
        Regex::new(FILENAME_PATTERN)
            .map(|pattern| Self { pattern })
            .map_err(|source| CoreError::PatternCompile {
                pattern: FILENAME_PATTERN,
                source,
            })
    }

    /// Extract the structured fields of `name`, or `None` when any field is missing.
    #[must_use]
    pub fn parse(&self, name: &str) -> Option<ParsedName> {
        let captures = self.pattern.captures(name)?;
        let group_id = captures.get(1)?.as_str().to_owned();
        let metal_code = captures.get(2)?.as_str().to_owned();
        let version = trim_leading_zeros(captures.get(3)?.as_str()).to_owned();
        let pass_index = Some(trim_leading_zeros(captures.get(4)?.as_str()))
            .filter(|index| *index != "0")?
            .to_owned();
        Some(ParsedName {
            group_id,
            metal_code,
            version,
            pass_index,
        })
    }

    /// Map a bare filename (no directory prefix) to its normalized name.
    #[must_use]
    pub fn map(&self, name: &str) -> MappingResult {
        self.parse(name)
            .map_or(MappingResult::Unparsable, |parsed| MappingResult::Mapped {
                output_name: parsed.output_name(),
                group_id: parsed.group_id,
            })
    }
}
