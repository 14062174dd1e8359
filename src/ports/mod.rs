//! Source and sink ports.
//!
//! A port is one data endpoint of a [`Pipeline`](crate::pipeline::Pipeline).
//! Any type implementing [`SourcePort`] or [`SinkPort`] can be plugged in; the
//! orchestrator never sees storage or encoding details.
//!
//! Every port honours the same lifecycle:
//!
//! - [`Port::close`] releases the underlying client. Calling it again is a no-op
//!   that returns `Ok(())`.
//! - After `close`, [`SourcePort::read`] and [`SinkPort::write`] fail with
//!   [`ErrorKind::NotInitialized`](crate::error::ErrorKind::NotInitialized)
//!   without touching the network.
//! - [`Port::scope`] returns a [`PortScope`] guard that closes the port exactly
//!   once on every exit path.
//!
//! ```
//! use seafarer::ports::{Port, SinkPort, SourcePort};
//! use seafarer::testing::{RecordingSink, VecSource};
//!
//! # fn main() -> seafarer::PortResult<()> {
//! let mut source = VecSource::new(vec![1, 2, 3]);
//! let mut sink = RecordingSink::new();
//! {
//!     let mut source = source.scope();
//!     let mut sink = sink.scope();
//!     for item in source.read()? {
//!         sink.write(item? * 10)?;
//!     }
//! }
//! assert_eq!(sink.written(), vec![10, 20, 30]);
//! assert!(!source.is_open() && !sink.is_open());
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "io-csv")]
pub mod blob_csv_reader;
#[cfg(feature = "io-parquet")]
pub mod blob_parquet_writer;
pub mod scope;

#[cfg(feature = "io-csv")]
pub use blob_csv_reader::BlobCsvReader;
#[cfg(feature = "io-parquet")]
pub use blob_parquet_writer::BlobParquetWriter;
pub use scope::PortScope;

use crate::error::PortResult;

/// Lazy, finite sequence of items produced by one [`SourcePort::read`] call.
pub type Batches<'a, T> = Box<dyn Iterator<Item = PortResult<T>> + 'a>;

/// Lifecycle shared by sources and sinks.
pub trait Port {
    /// Stable name used in log events and error messages.
    fn name(&self) -> &str;

    /// Whether the port still holds its client handle.
    fn is_open(&self) -> bool;

    /// Release the client handle. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error only if the underlying client fails to shut down on the
    /// first call; the handle is dropped either way.
    fn close(&mut self) -> PortResult<()>;

    /// Enter a scope that closes this port when it ends.
    fn scope(&mut self) -> PortScope<'_, Self>
    where
        Self: Sized,
    {
        PortScope::new(self)
    }
}

/// A port that produces items.
pub trait SourcePort: Port {
    type Item;

    /// Start reading. The returned sequence is not restartable; calling `read`
    /// again fetches from the external system afresh.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` if the port is closed. Transport and decoding
    /// failures surface either here or as an `Err` item of the sequence.
    fn read(&mut self) -> PortResult<Batches<'_, Self::Item>>;
}

/// A port that consumes items.
pub trait SinkPort: Port {
    type Item;

    /// Fully transmit one item before returning.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` if the port is closed, or the transport/encoding failure.
    fn write(&mut self, item: Self::Item) -> PortResult<()>;
}

impl<P: Port + ?Sized> Port for &mut P {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn close(&mut self) -> PortResult<()> {
        (**self).close()
    }
}

impl<P: SourcePort + ?Sized> SourcePort for &mut P {
    type Item = P::Item;

    fn read(&mut self) -> PortResult<Batches<'_, Self::Item>> {
        (**self).read()
    }
}

impl<P: SinkPort + ?Sized> SinkPort for &mut P {
    type Item = P::Item;

    fn write(&mut self, item: Self::Item) -> PortResult<()> {
        (**self).write(item)
    }
}

impl<P: Port + ?Sized> Port for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn close(&mut self) -> PortResult<()> {
        (**self).close()
    }
}

impl<P: SourcePort + ?Sized> SourcePort for Box<P> {
    type Item = P::Item;

    fn read(&mut self) -> PortResult<Batches<'_, Self::Item>> {
        (**self).read()
    }
}

impl<P: SinkPort + ?Sized> SinkPort for Box<P> {
    type Item = P::Item;

    fn write(&mut self, item: Self::Item) -> PortResult<()> {
        (**self).write(item)
    }
}
