//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};
use crate::commands::map::MappingRow;
use crate::commands::run::RunSummary;
use crate::commands::upload::UploadSummary;

const UNPARSABLE: &str = "<unparsable>";

pub(crate) fn render_mappings(rows: &[MappingRow], format: OutputFormat) -> CliResult<()> {
    println!("{}", format_mappings(rows, format)?);
    Ok(())
}

pub(crate) fn render_run(summary: &RunSummary, format: OutputFormat) -> CliResult<()> {
    println!("{}", format_run(summary, format)?);
    Ok(())
}

pub(crate) fn render_upload(summary: &UploadSummary, format: OutputFormat) -> CliResult<()> {
    println!("{}", format_upload(summary, format)?);
    Ok(())
}

pub(crate) fn format_mappings(rows: &[MappingRow], format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(rows),
        OutputFormat::Table => {
            let width = rows
                .iter()
                .map(|row| row.name.len())
                .max()
                .unwrap_or(0)
                .max("NAME".len());
            let mut lines = vec![format!("{:<width$}  OUTPUT", "NAME")];
            for row in rows {
                let output = match (&row.group_id, &row.output_name) {
                    (Some(group), Some(name)) => format!("{group}/{name}"),
                    _ => UNPARSABLE.to_string(),
                };
                lines.push(format!("{:<width$}  {output}", row.name));
            }
            Ok(lines.join("\n"))
        }
    }
}

pub(crate) fn format_run(summary: &RunSummary, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(summary),
        OutputFormat::Table => {
            let mut lines: Vec<String> = summary
                .report
                .entries
                .iter()
                .map(ToString::to_string)
                .collect();
            let counts = &summary.counts;
            lines.push(format!(
                "mode: {}{}",
                summary.mode,
                if summary.dry_run { " (dry run)" } else { "" }
            ));
            lines.push(format!(
                "renamed: {}  skipped (unparsable): {}  skipped (exists): {}  ignored: {}",
                counts.renamed, counts.skipped_unparsable, counts.skipped_duplicate, counts.ignored
            ));
            if let Some(archive) = &summary.archive {
                lines.push(format!("archive: {}", archive.display()));
            }
            lines.push(format!("job: {}", summary.job_id));
            Ok(lines.join("\n"))
        }
    }
}

pub(crate) fn format_upload(summary: &UploadSummary, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(summary),
        OutputFormat::Table => {
            let mut lines = vec![
                format!("files sent: {}", summary.files_sent),
                format!(
                    "archive: {} ({} bytes)",
                    summary.archive.display(),
                    summary.archive_bytes
                ),
            ];
            if let Some(renamed) = summary.renamed {
                lines.push(format!("renamed: {renamed}"));
            }
            if let Some(skipped) = summary.skipped_unparsable {
                lines.push(format!("skipped (unparsable): {skipped}"));
            }
            if let Some(skipped) = summary.skipped_duplicate {
                lines.push(format!("skipped (exists): {skipped}"));
            }
            Ok(lines.join("\n"))
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use rendersort_api_models::OutcomeCounts;
    use rendersort_core::{OutcomeKind, PlacementMode, ReportEntry, RunReport};
    use std::path::PathBuf;
    use uuid::Uuid;

    fn rows() -> Vec<MappingRow> {
        vec![
            MappingRow {
                name: "AB12-CD34-Y-V1_Output AOV 3_0001.png".to_string(),
                group_id: Some("AB12-CD34".to_string()),
                output_name: Some("AB12-CD34-WGR-V1-WB.png".to_string()),
            },
            MappingRow {
                name: "randomfile.png".to_string(),
                group_id: None,
                output_name: None,
            },
        ]
    }

    fn summary() -> RunSummary {
        let report = RunReport {
            mode: PlacementMode::Clean,
            entries: vec![
                ReportEntry {
                    kind: OutcomeKind::Renamed,
                    source: "a.png".to_string(),
                    target: Some("G-1/x.png".to_string()),
                },
                ReportEntry {
                    kind: OutcomeKind::SkippedUnparsable,
                    source: "b.png".to_string(),
                    target: None,
                },
            ],
            ignored: 3,
        };
        RunSummary {
            job_id: Uuid::nil(),
            mode: PlacementMode::Clean,
            dry_run: true,
            counts: OutcomeCounts::from(&report),
            archive: None,
            report,
            steps: Vec::new(),
        }
    }

    #[test]
    fn mapping_table_aligns_and_marks_unparsable() -> Result<()> {
        let text = format_mappings(&rows(), OutputFormat::Table)?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("NAME"));
        assert!(lines[1].ends_with("AB12-CD34/AB12-CD34-WGR-V1-WB.png"));
        assert!(lines[2].starts_with("randomfile.png"));
        assert!(lines[2].ends_with(UNPARSABLE));
        assert_eq!(lines[1].find("AB12-CD34/"), lines[2].find(UNPARSABLE));
        Ok(())
    }

    #[test]
    fn mapping_json_omits_missing_fields() -> Result<()> {
        let value: serde_json::Value =
            serde_json::from_str(&format_mappings(&rows(), OutputFormat::Json)?)?;
        assert_eq!(value[0]["output_name"], "AB12-CD34-WGR-V1-WB.png");
        assert!(value[1].get("output_name").is_none());
        Ok(())
    }

    #[test]
    fn run_table_lists_entries_then_totals() -> Result<()> {
        let text = format_run(&summary(), OutputFormat::Table)?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "RENAMED: a.png -> G-1/x.png");
        assert_eq!(lines[1], "SKIPPED (skipped_unparsable): b.png");
        assert_eq!(lines[2], "mode: clean (dry run)");
        assert_eq!(
            lines[3],
            "renamed: 1  skipped (unparsable): 1  skipped (exists): 0  ignored: 3"
        );
        Ok(())
    }

    #[test]
    fn run_json_carries_counts_and_report() -> Result<()> {
        let value: serde_json::Value =
            serde_json::from_str(&format_run(&summary(), OutputFormat::Json)?)?;
        assert_eq!(value["mode"], "clean");
        assert_eq!(value["dry_run"], true);
        assert_eq!(value["counts"]["ignored"], 3);
        assert_eq!(value["report"]["entries"][0]["kind"], "renamed");
        assert!(value.get("archive").is_none());
        Ok(())
    }

    #[test]
    fn upload_table_skips_absent_counts() -> Result<()> {
        let summary = UploadSummary {
            files_sent: 4,
            archive: PathBuf::from("processed.zip"),
            archive_bytes: 128,
            renamed: Some(2),
            skipped_unparsable: None,
            skipped_duplicate: None,
        };
        let text = format_upload(&summary, OutputFormat::Table)?;
        assert_eq!(
            text,
            "files sent: 4\narchive: processed.zip (128 bytes)\nrenamed: 2"
        );
        Ok(())
    }
}
