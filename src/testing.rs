//! Testing utilities for Seafarer pipelines and ports.
//!
//! Everything here is in-memory, so pipeline behaviour can be tested without a
//! storage account:
//!
//! - **Mock ports**: [`VecSource`] and [`RecordingSink`] implement the port
//!   contract over plain vectors, with failure injection and close counting
//! - **Event log**: [`EventLog`] records port calls across a source/sink pair so
//!   tests can assert on ordering
//! - **Fixtures**: small tables and CSV payloads
//! - **Assertions**: table comparison by column names, types and values
//!
//! # Quick Start
//!
//! ```
//! use seafarer::pipeline::Pipeline;
//! use seafarer::testing::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let log = EventLog::new();
//! let source = VecSource::new(vec![people_batch()]).with_log(&log);
//! let sink = RecordingSink::new().with_log(&log);
//!
//! let mut pipeline = Pipeline::new(source, sink);
//! pipeline.run()?;
//!
//! let (_, sink) = pipeline.into_parts();
//! assert_tables_equal(&sink.written()[0], &people_batch());
//! assert_eq!(log.events(), vec!["source.read", "sink.write", "sink.close", "source.close"]);
//! # Ok(())
//! # }
//! ```

mod assertions;
mod fixtures;
mod mock_ports;

pub use assertions::*;
pub use fixtures::*;
pub use mock_ports::*;
