// Shared window for a producer and a consumer on different threads.
//
// One mutex guards the whole window: append, copy and consume all move the
// same cursors.  A condvar wakes the other side whenever space frees up or
// bytes arrive.  The window itself never blocks; the waiting loops live
// here, on the caller's side of the boundary.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use log::trace;

use crate::error::WindowError;
use crate::window::{Drain, Window};

struct Shared {
    window: Mutex<Window>,
    changed: Condvar,
}

/// Cloneable handle to a window behind a single lock.
#[derive(Clone)]
pub struct SharedWindow {
    inner: Arc<Shared>,
}

impl SharedWindow {
    pub fn new(window: Window) -> Self {
        Self {
            inner: Arc::new(Shared {
                window: Mutex::new(window),
                changed: Condvar::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Window> {
        self.inner
            .window
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, Window>) -> MutexGuard<'a, Window> {
        self.inner
            .changed
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the window.
    pub fn with<R>(&self, f: impl FnOnce(&mut Window) -> R) -> R {
        let r = f(&mut self.lock());
        self.inner.changed.notify_all();
        r
    }

    /// Append all of `bytes`, waiting for the consumer whenever the window
    /// is full.
    pub fn write_all(&self, mut bytes: &[u8]) -> Result<(), WindowError> {
        let mut guard = self.lock();
        while !bytes.is_empty() {
            match guard.append_literal(bytes) {
                Ok(n) => {
                    bytes = &bytes[n..];
                    self.inner.changed.notify_all();
                }
                Err(WindowError::Capacity { .. }) => {
                    trace!("shared window full, producer waiting");
                    guard = self.wait(guard);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Append a back-reference, splitting it over as many waits as the free
    /// space requires.
    pub fn copy(&self, distance: usize, length: usize) -> Result<(), WindowError> {
        let mut guard = self.lock();
        let mut remaining = length;
        loop {
            let n = remaining.min(guard.available());
            guard.append_copy(distance, n)?;
            remaining -= n;
            if n > 0 {
                self.inner.changed.notify_all();
            }
            if remaining == 0 {
                return Ok(());
            }
            if guard.is_eof() {
                return Err(WindowError::Closed);
            }
            trace!("shared window full, copy waiting for {remaining} bytes");
            guard = self.wait(guard);
        }
    }

    /// Read up to `buf.len()` bytes, waiting while the window is empty.
    ///
    /// Returns 0 only at end of stream (or for an empty `buf`).
    pub fn read(&self, buf: &mut [u8]) -> usize {
        if buf.is_empty() {
            return 0;
        }
        let mut guard = self.lock();
        loop {
            match guard.consume(buf) {
                Drain::Bytes(n) => {
                    self.inner.changed.notify_all();
                    return n;
                }
                Drain::EndOfStream => return 0,
                Drain::Pending => guard = self.wait(guard),
            }
        }
    }

    /// Read until end of stream.
    pub fn read_to_end(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = self.read(&mut buf);
            if n == 0 {
                return out;
            }
            out.extend_from_slice(&buf[..n]);
        }
    }

    /// Signal end of stream and wake every waiter.
    pub fn close(&self) {
        self.lock().set_eof();
        self.inner.changed.notify_all();
    }
}
