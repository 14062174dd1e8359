//! Scoped acquisition of a port.

use crate::error::PortResult;
use crate::ports::Port;
use std::ops::{Deref, DerefMut};

/// Guard that closes its port when the scope ends.
///
/// Call [`PortScope::release`] to close explicitly and observe the result. If
/// the guard is dropped instead (an early return, a `?`, or a panic unwinding
/// through it), the port is closed in `Drop` and a close failure is logged,
/// since it can no longer be returned. Either way `close` runs exactly once
/// per scope.
pub struct PortScope<'a, P: Port + ?Sized> {
    port: &'a mut P,
    released: bool,
}

impl<'a, P: Port + ?Sized> PortScope<'a, P> {
    pub fn new(port: &'a mut P) -> Self {
        Self {
            port,
            released: false,
        }
    }

    /// End the scope now, returning the result of `close`.
    ///
    /// # Errors
    ///
    /// Returns whatever the port's `close` returns.
    pub fn release(mut self) -> PortResult<()> {
        self.released = true;
        self.port.close()
    }
}

impl<P: Port + ?Sized> Deref for PortScope<'_, P> {
    type Target = P;

    fn deref(&self) -> &P {
        self.port
    }
}

impl<P: Port + ?Sized> DerefMut for PortScope<'_, P> {
    fn deref_mut(&mut self) -> &mut P {
        self.port
    }
}

impl<P: Port + ?Sized> Drop for PortScope<'_, P> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(err) = self.port.close() {
            tracing::warn!(port = self.port.name(), error = %err, "failed to close port");
        }
    }
}
