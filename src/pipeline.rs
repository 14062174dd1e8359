//! The pipeline orchestrator.
//!
//! A [`Pipeline`] wires exactly one [`SourcePort`] to one [`SinkPort`], with an
//! optional transform in between, and runs them once:
//!
//! 1. both ports are entered as [`PortScope`](crate::ports::PortScope)s;
//! 2. every item the source yields is transformed (if a transform is set) and
//!    written to the sink, in order, one at a time;
//! 3. the sink and then the source are closed, on success and on failure alike,
//!    and a failure closing one does not stop the other from being closed;
//! 4. the first failure of the loop is returned to the caller. A close failure
//!    is only returned when the loop itself succeeded.
//!
//! ```
//! use seafarer::pipeline::{Pipeline, PipelineState};
//! use seafarer::testing::{RecordingSink, VecSource};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut pipeline = Pipeline::new(VecSource::new(vec![1, 2]), RecordingSink::new())
//!     .with_transform(|x: i32| Ok(x * 2));
//! let report = pipeline.run()?;
//!
//! assert_eq!(report.items, 2);
//! assert_eq!(pipeline.state(), PipelineState::Completed);
//! assert_eq!(pipeline.sink().written(), vec![2, 4]);
//! # Ok(())
//! # }
//! ```

use crate::error::PortResult;
use crate::ports::{Port, SinkPort, SourcePort};
use anyhow::{Context, Result, bail};
use std::time::{Duration, Instant};

/// A transform applied to every item between source and sink.
pub type Transform<T> = Box<dyn FnMut(T) -> Result<T>>;

/// Where a pipeline is in its single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Constructed, `run` not called yet.
    Idle,
    /// Inside `run`. A pipeline left in this state panicked mid-run.
    Running,
    Completed,
    Failed,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Items written to the sink.
    pub items: usize,
    pub elapsed: Duration,
}

pub struct Pipeline<S, K>
where
    S: SourcePort,
    K: SinkPort<Item = S::Item>,
{
    source: S,
    sink: K,
    transform: Option<Transform<S::Item>>,
    state: PipelineState,
}

impl<S, K> Pipeline<S, K>
where
    S: SourcePort,
    K: SinkPort<Item = S::Item>,
{
    pub fn new(source: S, sink: K) -> Self {
        Self {
            source,
            sink,
            transform: None,
            state: PipelineState::Idle,
        }
    }

    /// Apply `transform` to every item, exactly once, before it is written.
    /// An `Err` from the transform fails the run.
    #[must_use]
    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: FnMut(S::Item) -> Result<S::Item> + 'static,
    {
        self.transform = Some(Box::new(transform));
        self
    }

    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn into_parts(self) -> (S, K) {
        (self.source, self.sink)
    }

    /// Run the pipeline. A pipeline runs once; later calls fail without
    /// touching either port.
    ///
    /// # Errors
    ///
    /// Returns the first read, transform or write failure (port errors are
    /// carried unchanged and can be recovered with
    /// `downcast_ref::<PortError>()`), or a close failure if everything else
    /// succeeded.
    pub fn run(&mut self) -> Result<RunReport> {
        if self.state != PipelineState::Idle {
            bail!("pipeline already ran (state: {:?})", self.state);
        }
        self.state = PipelineState::Running;

        let source_name = self.source.name().to_string();
        let sink_name = self.sink.name().to_string();
        let span = tracing::info_span!("pipeline", source = %source_name, sink = %sink_name);
        let _entered = span.enter();
        tracing::info!("pipeline started");
        let started = Instant::now();

        let outcome = {
            let mut source = self.source.scope();
            let mut sink = self.sink.scope();
            let outcome = drive(&mut *source, &mut *sink, &mut self.transform);

            let sink_closed = sink.release();
            let source_closed = source.release();
            first_error(
                outcome,
                [(sink_name.as_str(), sink_closed), (source_name.as_str(), source_closed)],
            )
        };

        match outcome {
            Ok(items) => {
                self.state = PipelineState::Completed;
                let report = RunReport {
                    items,
                    elapsed: started.elapsed(),
                };
                tracing::info!(
                    items,
                    elapsed_ms = report.elapsed.as_millis(),
                    "pipeline completed"
                );
                Ok(report)
            }
            Err(err) => {
                self.state = PipelineState::Failed;
                tracing::error!(error = %format_args!("{err:#}"), "pipeline failed");
                Err(err)
            }
        }
    }
}

/// The read -> transform -> write loop. Returns the number of items written.
fn drive<S, K>(
    source: &mut S,
    sink: &mut K,
    transform: &mut Option<Transform<S::Item>>,
) -> Result<usize>
where
    S: SourcePort,
    K: SinkPort<Item = S::Item>,
{
    let source_name = source.name().to_string();
    let mut written = 0usize;
    for item in source
        .read()
        .with_context(|| format!("read from {source_name}"))?
    {
        let index = written + 1;
        let item = item.with_context(|| format!("read item #{index} from {source_name}"))?;
        let item = match transform.as_mut() {
            Some(f) => f(item).with_context(|| format!("transform item #{index}"))?,
            None => item,
        };
        sink.write(item)
            .with_context(|| format!("write item #{index} to {}", sink.name()))?;
        written = index;
        tracing::debug!(item = index, "item written");
    }
    Ok(written)
}

/// Combine the loop outcome with the close results, keeping the first failure.
fn first_error<const N: usize>(
    outcome: Result<usize>,
    closes: [(&str, PortResult<()>); N],
) -> Result<usize> {
    let mut close_error = None;
    for (name, closed) in closes {
        if let Err(err) = closed {
            tracing::warn!(port = %name, error = %err, "failed to close port");
            if close_error.is_none() {
                close_error = Some(anyhow::Error::new(err).context(format!("close {name}")));
            }
        }
    }
    match (outcome, close_error) {
        (Err(err), _) | (Ok(_), Some(err)) => Err(err),
        (Ok(items), None) => Ok(items),
    }
}

/// Build the CSV-to-Parquet pipeline described by `config`.
///
/// # Errors
///
/// Returns a configuration error if either endpoint cannot be connected. A
/// source that was already connected is closed before returning.
#[cfg(all(feature = "io-csv", feature = "io-parquet"))]
pub fn csv_to_parquet(
    config: &crate::config::PipelineConfig,
) -> PortResult<Pipeline<crate::ports::BlobCsvReader, crate::ports::BlobParquetWriter>> {
    use crate::ports::{BlobCsvReader, BlobParquetWriter};

    let mut source = BlobCsvReader::new(config.source().clone())?;
    let sink = match BlobParquetWriter::new(config.sink().clone()) {
        Ok(sink) => sink,
        Err(err) => {
            if let Err(close_err) = source.close() {
                tracing::warn!(error = %close_err, "failed to close source after sink setup failed");
            }
            return Err(err);
        }
    };
    Ok(Pipeline::new(source, sink))
}
