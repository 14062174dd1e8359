//! Tests for the pipeline orchestrator.

use anyhow::anyhow;
use seafarer::testing::*;
use seafarer::*;

#[test]
fn test_items_written_in_source_order() -> anyhow::Result<()> {
    let mut pipeline = Pipeline::new(VecSource::new(vec![3, 1, 2]), RecordingSink::new());
    let report = pipeline.run()?;

    assert_eq!(report.items, 3);
    assert_eq!(pipeline.sink().written(), vec![3, 1, 2]);
    assert_eq!(pipeline.state(), PipelineState::Completed);
    Ok(())
}

#[test]
fn test_empty_source_writes_nothing_and_closes_both() -> anyhow::Result<()> {
    let mut pipeline = Pipeline::new(VecSource::<i32>::new(vec![]), RecordingSink::new());
    let report = pipeline.run()?;

    assert_eq!(report.items, 0);
    let (source, sink) = pipeline.into_parts();
    assert!(sink.written().is_empty());
    assert_eq!(source.closes(), 1);
    assert_eq!(sink.closes(), 1);
    Ok(())
}

#[test]
fn test_transform_applied_exactly_once_per_item() -> anyhow::Result<()> {
    let calls = EventLog::new();
    let seen = calls.clone();
    let mut pipeline = Pipeline::new(VecSource::new(vec![1, 2, 3]), RecordingSink::new())
        .with_transform(move |x: i32| {
            seen.push(format!("transform {x}"));
            Ok(x + 100)
        });
    pipeline.run()?;

    assert_eq!(pipeline.sink().written(), vec![101, 102, 103]);
    assert_eq!(
        calls.events(),
        vec!["transform 1", "transform 2", "transform 3"]
    );
    Ok(())
}

#[test]
fn test_identity_without_transform() -> anyhow::Result<()> {
    let batch = people_batch();
    let mut pipeline = Pipeline::new(VecSource::new(vec![batch.clone()]), RecordingSink::new());
    pipeline.run()?;

    let written = pipeline.sink().written();
    assert_eq!(written.len(), 1);
    assert_tables_equal(&written[0], &batch);
    Ok(())
}

#[test]
fn test_both_ports_closed_after_success() -> anyhow::Result<()> {
    let mut pipeline = Pipeline::new(VecSource::new(vec![1]), RecordingSink::new());
    pipeline.run()?;

    assert!(!pipeline.source().is_open());
    assert!(!pipeline.sink().is_open());
    assert_eq!(pipeline.source().closes(), 1);
    assert_eq!(pipeline.sink().closes(), 1);
    Ok(())
}

#[test]
fn test_sink_closed_before_source() -> anyhow::Result<()> {
    let log = EventLog::new();
    let mut pipeline = Pipeline::new(
        VecSource::new(vec![1, 2]).with_log(&log),
        RecordingSink::new().with_log(&log),
    );
    pipeline.run()?;

    assert_eq!(
        log.events(),
        vec![
            "source.read",
            "sink.write",
            "sink.write",
            "sink.close",
            "source.close"
        ]
    );
    Ok(())
}

#[test]
fn test_write_failure_stops_run_and_closes_both() {
    // Fail the 2nd of 4 writes.
    let log = EventLog::new();
    let mut pipeline = Pipeline::new(
        VecSource::new(vec![10, 20, 30, 40]).with_log(&log),
        RecordingSink::new().failing_on_write(2).with_log(&log),
    );

    let err = pipeline.run().unwrap_err();
    assert_eq!(pipeline.state(), PipelineState::Failed);
    assert!(format!("{err:#}").contains("write item #2"));

    let (source, sink) = pipeline.into_parts();
    assert_eq!(sink.written(), vec![10]);
    assert_eq!(sink.write_attempts(), 2);
    assert_eq!(source.closes(), 1);
    assert_eq!(sink.closes(), 1);
    assert_eq!(
        log.events(),
        vec![
            "source.read",
            "sink.write",
            "sink.write",
            "sink.close",
            "source.close"
        ]
    );
}

#[test]
fn test_read_failure_before_any_item() {
    let mut pipeline = Pipeline::new(VecSource::new(vec![1, 2]).failing_read(), RecordingSink::new());

    let err = pipeline.run().unwrap_err();
    let port_err = err.downcast_ref::<PortError>().expect("port error preserved");
    assert_eq!(port_err.kind, ErrorKind::Network);

    let (source, sink) = pipeline.into_parts();
    assert_eq!(sink.write_attempts(), 0);
    assert_eq!(source.closes(), 1);
    assert_eq!(sink.closes(), 1);
}

#[test]
fn test_failing_item_mid_sequence() {
    let mut pipeline = Pipeline::new(
        VecSource::new(vec!["a", "b", "c"]).failing_at(1),
        RecordingSink::new(),
    );

    let err = pipeline.run().unwrap_err();
    assert!(format!("{err:#}").contains("read item #2"));
    let (source, sink) = pipeline.into_parts();
    assert_eq!(sink.written(), vec!["a"]);
    assert!(!source.is_open());
    assert!(!sink.is_open());
}

#[test]
fn test_transform_error_propagates_and_skips_write() {
    let mut pipeline = Pipeline::new(VecSource::new(vec![1, 2, 3]), RecordingSink::new())
        .with_transform(|x: i32| {
            if x == 2 {
                Err(anyhow!("bad value {x}"))
            } else {
                Ok(x)
            }
        });

    let err = pipeline.run().unwrap_err();
    let rendered = format!("{err:#}");
    assert!(rendered.contains("transform item #2"));
    assert!(rendered.contains("bad value 2"));

    let (source, sink) = pipeline.into_parts();
    assert_eq!(sink.written(), vec![1]);
    assert_eq!(source.closes(), 1);
    assert_eq!(sink.closes(), 1);
}

#[test]
fn test_run_error_wins_over_close_error() {
    let mut pipeline = Pipeline::new(
        VecSource::new(vec![1]).failing_close(),
        RecordingSink::new().failing_on_write(1).failing_close(),
    );

    let err = pipeline.run().unwrap_err();
    assert!(format!("{err:#}").contains("write item #1"));
    assert_eq!(pipeline.source().closes(), 1);
    assert_eq!(pipeline.sink().closes(), 1);
}

#[test]
fn test_sink_close_failure_still_closes_source() {
    let mut pipeline = Pipeline::new(
        VecSource::new(vec![1, 2]),
        RecordingSink::new().failing_close(),
    );

    let err = pipeline.run().unwrap_err();
    assert!(format!("{err:#}").contains("close recording-sink"));
    assert_eq!(pipeline.state(), PipelineState::Failed);
    assert_eq!(pipeline.sink().written(), vec![1, 2]);
    assert!(!pipeline.source().is_open());
    assert_eq!(pipeline.source().closes(), 1);
}

#[test]
fn test_source_close_failure_reported_after_success() {
    let mut pipeline = Pipeline::new(VecSource::new(vec![1]).failing_close(), RecordingSink::new());

    let err = pipeline.run().unwrap_err();
    assert!(format!("{err:#}").contains("close vec-source"));
    assert!(!pipeline.sink().is_open());
}

#[test]
fn test_second_run_is_rejected_without_touching_ports() -> anyhow::Result<()> {
    let mut pipeline = Pipeline::new(VecSource::new(vec![1]), RecordingSink::new());
    pipeline.run()?;

    let err = pipeline.run().unwrap_err();
    assert!(err.to_string().contains("already ran"));
    assert_eq!(pipeline.source().reads(), 1);
    assert_eq!(pipeline.source().closes(), 1);
    assert_eq!(pipeline.sink().written(), vec![1]);
    Ok(())
}

#[test]
fn test_closed_source_reports_not_initialized() {
    let mut source = VecSource::new(vec![1]);
    source.close().unwrap();

    let mut pipeline = Pipeline::new(source, RecordingSink::new());
    let err = pipeline.run().unwrap_err();
    let port_err = err.downcast_ref::<PortError>().expect("port error preserved");
    assert!(port_err.is_not_initialized());

    let (source, sink) = pipeline.into_parts();
    assert_eq!(source.reads(), 0);
    assert_eq!(source.closes(), 1);
    assert_eq!(sink.closes(), 1);
}

#[test]
fn test_pipeline_over_borrowed_ports() -> anyhow::Result<()> {
    let mut source = VecSource::new(vec![1, 2]);
    let mut sink = RecordingSink::new();

    Pipeline::new(&mut source, &mut sink).run()?;

    assert_eq!(sink.written(), vec![1, 2]);
    assert!(!source.is_open());
    assert!(!sink.is_open());
    Ok(())
}
