use anyhow::anyhow;
use rendersort_core::{AovMapper, MappingResult, RawItem};
use serde::Serialize;

use crate::cli::{MapArgs, OutputFormat};
use crate::client::{CliError, CliResult};
use crate::output::render_mappings;

/// One mapped (or rejected) filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct MappingRow {
    pub(crate) name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) output_name: Option<String>,
}

pub(crate) fn handle_map(args: MapArgs, format: OutputFormat) -> CliResult<()> {
    let mapper = AovMapper::new()
        .map_err(|err| CliError::failure(anyhow!("failed to prepare filename mapper: {err}")))?;
    let rows = map_names(&mapper, &args.names);
    render_mappings(&rows, format)
}

/// Directory prefixes are stripped before matching.
pub(crate) fn map_names(mapper: &AovMapper, names: &[String]) -> Vec<MappingRow> {
    names
        .iter()
        .map(|name| {
            let item = RawItem::new(name.as_str(), Vec::new());
            match mapper.map(item.file_name()) {
                MappingResult::Mapped {
                    output_name,
                    group_id,
                } => MappingRow {
                    name: name.clone(),
                    group_id: Some(group_id),
                    output_name: Some(output_name),
                },
                MappingResult::Unparsable => MappingRow {
                    name: name.clone(),
                    group_id: None,
                    output_name: None,
                },
            }
        })
        .collect()
}
