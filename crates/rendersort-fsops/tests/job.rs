use rendersort_core::{AovMapper, OutcomeKind, PlacementMode};
use rendersort_fsops::{
    FsOpsError, JobRequest, JobSource, Materialize, ReorganizeJob, ScratchSpace, StepKind,
    StepStatus,
};
use rendersort_telemetry::Metrics;
use rendersort_test_support::archive::{read_zip, zip_bytes};
use rendersort_test_support::assert::assert_tree;
use rendersort_test_support::fixtures::{
    SAMPLE_GROUP, expected_output, pass_name, sample_batch, temp_dir, write_tree,
};

#[test]
fn nested_directories_are_anchored_independently() -> anyhow::Result<()> {
    let mapper = AovMapper::new()?;
    let dir = temp_dir("rendersort-nested-")?;
    write_tree(
        dir.path(),
        &[
            (format!("shots/a/{}", pass_name(3, 70)), b"a".to_vec()),
            (format!("shots/b/{}", pass_name(3, 70)), b"b".to_vec()),
            (pass_name(10, 70), b"root".to_vec()),
        ],
    )?;

    let outcome = ReorganizeJob::new(&mapper, Metrics::new()?).run(JobRequest {
        source: JobSource::Directory(dir.path().to_path_buf()),
        mode: PlacementMode::InPlace,
        materialize: Materialize::InPlace,
        package: false,
    })?;

    assert_eq!(outcome.report.count(OutcomeKind::Renamed), 3);
    assert_eq!(outcome.report.count(OutcomeKind::SkippedDuplicate), 0);
    assert_tree(
        dir.path(),
        &[
            expected_output("WGR", "TB"),
            format!("shots/a/{}", expected_output("WGR", "WB")),
            format!("shots/b/{}", expected_output("WGR", "WB")),
        ],
    )?;
    Ok(())
}

#[test]
fn staged_uploads_run_through_scratch_space() -> anyhow::Result<()> {
    let mapper = AovMapper::new()?;
    let root = temp_dir("rendersort-scratch-root-")?;
    let scratch = ScratchSpace::create_in(root.path())?;
    for (name, bytes) in sample_batch() {
        scratch.stage_input(&name, &bytes)?;
    }

    let outcome = ReorganizeJob::new(&mapper, Metrics::new()?).run(JobRequest {
        source: JobSource::Directory(scratch.input_dir()),
        mode: PlacementMode::Clean,
        materialize: Materialize::Into(scratch.output_dir()),
        package: true,
    })?;

    assert_tree(
        &scratch.output_dir(),
        &[expected_output("WGR", "TB"), expected_output("WGR", "WB")],
    )?;
    let archive = outcome
        .archive
        .ok_or_else(|| anyhow::anyhow!("expected archive"))?;
    let files = read_zip(&archive)?;
    assert_eq!(files.len(), 2);
    assert!(files.keys().all(|name| name.starts_with(SAMPLE_GROUP)));
    Ok(())
}

#[test]
fn escaping_archive_entries_are_rejected_before_any_work() -> anyhow::Result<()> {
    let mapper = AovMapper::new()?;
    let bytes = zip_bytes(&[("../evil.png", b"x".to_vec())])?;
    let result = ReorganizeJob::new(&mapper, Metrics::new()?).run(JobRequest {
        source: JobSource::Archive(bytes),
        mode: PlacementMode::Clean,
        materialize: Materialize::Skip,
        package: true,
    });
    let Err(err) = result else {
        anyhow::bail!("expected escaping entry to fail");
    };
    assert!(matches!(err, FsOpsError::InvalidInput { .. }));
    assert!(err.is_client_error());
    Ok(())
}

#[test]
fn dry_runs_leave_the_directory_untouched() -> anyhow::Result<()> {
    let mapper = AovMapper::new()?;
    let dir = temp_dir("rendersort-dry-")?;
    let batch = sample_batch();
    write_tree(dir.path(), &batch)?;

    let outcome = ReorganizeJob::new(&mapper, Metrics::new()?).run(JobRequest {
        source: JobSource::Directory(dir.path().to_path_buf()),
        mode: PlacementMode::InPlace,
        materialize: Materialize::Skip,
        package: false,
    })?;

    assert_eq!(outcome.report.count(OutcomeKind::Renamed), 2);
    assert_eq!(
        outcome.step_status(StepKind::Materialize),
        Some(StepStatus::Skipped)
    );
    let names: Vec<&str> = batch.iter().map(|(name, _)| name.as_str()).collect();
    assert_tree(dir.path(), &names)?;
    Ok(())
}
