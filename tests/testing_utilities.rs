//! Integration tests for the testing utilities themselves.

use anyhow::Result;
use seafarer::testing::*;
use seafarer::*;
use serde::{Deserialize, Serialize};

#[test]
fn test_vec_source_yields_items_and_counts_reads() -> Result<()> {
    let mut source = VecSource::new(vec![1, 2, 3]);

    let first: Vec<i32> = source.read()?.collect::<PortResult<_>>()?;
    let second: Vec<i32> = source.read()?.collect::<PortResult<_>>()?;

    assert_eq!(first, vec![1, 2, 3]);
    assert_eq!(second, first);
    assert_eq!(source.reads(), 2);
    Ok(())
}

#[test]
fn test_vec_source_failing_at_index() -> Result<()> {
    let mut source = VecSource::new(vec!['a', 'b', 'c']).failing_at(1);
    let items: Vec<PortResult<char>> = source.read()?.collect();

    assert_eq!(items.len(), 3);
    assert!(items[0].is_ok());
    assert!(items[1].is_err());
    assert!(items[2].is_ok());
    Ok(())
}

#[test]
fn test_mock_ports_close_contract() {
    let mut source = VecSource::new(vec![1]).failing_close();
    let mut sink = RecordingSink::<i32>::new();

    assert!(source.close().is_err());
    assert!(source.close().is_ok());
    sink.close().unwrap();
    sink.close().unwrap();

    assert_eq!(source.closes(), 1);
    assert_eq!(sink.closes(), 1);
    assert!(source.read().err().unwrap().is_not_initialized());
    assert!(sink.write(1).unwrap_err().is_not_initialized());
    assert_eq!(sink.write_attempts(), 0);
}

#[test]
fn test_recording_sink_fails_kth_write() {
    let mut sink = RecordingSink::new().failing_on_write(3);

    for i in 1..=4 {
        let result = sink.write(i);
        assert_eq!(result.is_err(), i == 3, "write {i}");
    }
    assert_eq!(sink.written(), vec![1, 2, 4]);
    assert_eq!(sink.write_attempts(), 4);
}

#[test]
fn test_event_log_is_shared_between_clones() {
    let log = EventLog::new();
    let clone = log.clone();

    log.push("one");
    clone.push(String::from("two"));

    assert_eq!(log.events(), vec!["one", "two"]);
}

#[test]
fn test_fixtures_match_their_csv() -> Result<()> {
    assert_eq!(people_csv(), PEOPLE_CSV.as_bytes());

    let people = people_batch();
    assert_columns(&people, &["id", "name"]);
    assert_eq!(people.num_rows(), 2);

    let mixed = mixed_types_batch();
    assert_columns(&mixed, &["int", "float", "string", "bool"]);
    assert_eq!(mixed.num_rows(), 3);
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Person {
    id: i64,
    name: String,
}

#[test]
fn test_batch_from_rows_round_trip() -> Result<()> {
    let people = vec![
        Person {
            id: 1,
            name: "Alice".into(),
        },
        Person {
            id: 2,
            name: "Bob".into(),
        },
    ];

    let batch = batch_from_rows(&people)?;
    assert_columns(&batch, &["id", "name"]);

    let back: Vec<Person> = rows_from_batch(&batch)?;
    assert_eq!(back, people);

    let typed: Vec<Person> = rows_from_batch(&people_batch())?;
    assert_eq!(typed, people);
    Ok(())
}

#[test]
fn test_batch_from_no_rows() -> Result<()> {
    let batch = batch_from_rows::<Person>(&[])?;
    assert_eq!(batch.num_rows(), 0);
    assert_columns(&batch, &["id", "name"]);
    Ok(())
}

#[cfg(feature = "io-csv")]
#[test]
#[should_panic(expected = "Value mismatch in column 1")]
fn test_assert_tables_equal_reports_value_mismatch() {
    let other = decode_csv(b"id,name\n1,Alice\n2,Carol\n", &config::CsvOptions::default())
        .expect("valid csv");
    assert_tables_equal(&other, &people_batch());
}

#[test]
#[should_panic(expected = "Column mismatch")]
fn test_assert_columns_reports_mismatch() {
    assert_columns(&people_batch(), &["id"]);
}
