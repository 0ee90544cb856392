// Sliding dictionary window.
//
// A fixed-capacity ring of `dict_capacity + headroom` bytes addressed by
// absolute stream position.  The slot of position `p` is `p % capacity`, so
// old bytes are reclaimed lazily: a slot is only overwritten when the write
// cursor wraps onto it.
//
// Two cursors:
//   - `written`: absolute count of bytes ever appended.
//   - `read`:    absolute count of bytes ever consumed.
//
// `read <= written <= read + capacity` holds after every call.

use std::fmt;
use std::io;

use log::debug;

use crate::error::{ConfigError, WindowError};

// ---------------------------------------------------------------------------
// Usage modes
// ---------------------------------------------------------------------------

/// Which cursor the retained history hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Decoder output: `dict_capacity` bytes behind the write cursor stay
    /// addressable.  Writes may fill the whole ring.
    Write,
    /// Encoder input: `dict_capacity` bytes behind the read cursor stay
    /// addressable.  Writes may run at most `headroom` bytes ahead of it.
    Read,
}

/// Outcome of [`Window::consume`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drain {
    /// This many bytes were copied out.
    Bytes(usize),
    /// Nothing buffered yet; the producer has to run first.
    Pending,
    /// Nothing buffered and end of stream is set.  Repeats forever.
    EndOfStream,
}

impl Drain {
    /// Bytes copied out (zero for `Pending` and `EndOfStream`).
    pub fn len(self) -> usize {
        match self {
            Drain::Bytes(n) => n,
            Drain::Pending | Drain::EndOfStream => 0,
        }
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    pub fn is_end(self) -> bool {
        self == Drain::EndOfStream
    }
}

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// Circular byte buffer with absolute stream addressing.
pub struct Window {
    /// Ring storage; `data.len()` is the physical capacity.
    data: Vec<u8>,
    dict_capacity: usize,
    headroom: usize,
    anchor: Anchor,
    written: u64,
    read: u64,
    eof: bool,
}

impl Window {
    /// Create a decoder-side window (history anchored at the write cursor).
    pub fn new(dict_capacity: usize, headroom: usize) -> Result<Self, ConfigError> {
        Self::with_anchor(dict_capacity, headroom, Anchor::Write)
    }

    /// Create an encoder-input window (history anchored at the read cursor).
    pub fn for_input(dict_capacity: usize, headroom: usize) -> Result<Self, ConfigError> {
        if headroom == 0 {
            return Err(ConfigError::ZeroHeadroom);
        }
        Self::with_anchor(dict_capacity, headroom, Anchor::Read)
    }

    fn with_anchor(
        dict_capacity: usize,
        headroom: usize,
        anchor: Anchor,
    ) -> Result<Self, ConfigError> {
        if dict_capacity == 0 {
            return Err(ConfigError::ZeroDictionary);
        }
        let capacity = dict_capacity.saturating_add(headroom);
        debug!("window: dict={dict_capacity} headroom={headroom} capacity={capacity} anchor={anchor:?}");
        Ok(Self {
            data: vec![0u8; capacity],
            dict_capacity,
            headroom,
            anchor,
            written: 0,
            read: 0,
            eof: false,
        })
    }

    // -----------------------------------------------------------------------
    // Geometry and cursors
    // -----------------------------------------------------------------------

    /// Maximum back-reference distance.
    pub fn dict_capacity(&self) -> usize {
        self.dict_capacity
    }

    /// Bytes the producer may run ahead of the retained history.
    pub fn headroom(&self) -> usize {
        self.headroom
    }

    /// Physical ring size (`dict_capacity + headroom`).
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Usage mode chosen at construction.
    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// Absolute write cursor (`total_written`).
    pub fn position(&self) -> u64 {
        self.written
    }

    /// Absolute read cursor (`total_read`).
    pub fn read_position(&self) -> u64 {
        self.read
    }

    /// Bytes appended but not yet consumed.
    pub fn buffered(&self) -> usize {
        (self.written - self.read) as usize
    }

    /// Bytes that can be appended right now.
    pub fn available(&self) -> usize {
        let limit = match self.anchor {
            Anchor::Write => self.capacity(),
            Anchor::Read => self.headroom,
        };
        limit.saturating_sub(self.buffered())
    }

    /// Mark end of stream.  Buffered bytes stay readable; further appends
    /// fail with [`WindowError::Closed`].
    pub fn set_eof(&mut self) {
        self.eof = true;
    }

    /// Whether end of stream has been marked.
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Drop all content and rewind both cursors to zero.
    pub fn reset(&mut self) {
        debug!(
            "window reset: written={} read={} eof={}",
            self.written, self.read, self.eof
        );
        self.written = 0;
        self.read = 0;
        self.eof = false;
    }

    #[inline(always)]
    fn slot(&self, pos: u64) -> usize {
        (pos % self.data.len() as u64) as usize
    }

    // -----------------------------------------------------------------------
    // Producing
    // -----------------------------------------------------------------------

    /// Append as many of `bytes` as fit.
    ///
    /// A short count is back-pressure, not an error.  Fails with
    /// [`WindowError::Capacity`] only when not a single byte fits.
    pub fn append_literal(&mut self, bytes: &[u8]) -> Result<usize, WindowError> {
        if bytes.is_empty() {
            return Ok(0);
        }
        if self.eof {
            return Err(WindowError::Closed);
        }
        let n = bytes.len().min(self.available());
        if n == 0 {
            return Err(WindowError::Capacity {
                requested: bytes.len(),
                available: 0,
            });
        }

        let start = self.slot(self.written);
        let first = n.min(self.capacity() - start);
        self.data[start..start + first].copy_from_slice(&bytes[..first]);
        self.data[..n - first].copy_from_slice(&bytes[first..n]);
        self.written += n as u64;
        Ok(n)
    }

    /// Append a single literal byte.
    pub fn append_byte(&mut self, byte: u8) -> Result<(), WindowError> {
        self.append_literal(&[byte]).map(|_| ())
    }

    /// Append `length` bytes copied from `distance` bytes behind the write
    /// cursor.
    ///
    /// `distance < length` repeats the last `distance` bytes periodically.
    /// The copy is all-or-nothing: if it does not fit, nothing is written.
    pub fn append_copy(&mut self, distance: usize, length: usize) -> Result<(), WindowError> {
        if distance == 0 || distance as u64 > self.written || distance > self.dict_capacity {
            return Err(WindowError::InvalidDistance {
                distance,
                history: self.written,
                dict_capacity: self.dict_capacity,
            });
        }
        if length == 0 {
            return Ok(());
        }
        if self.eof {
            return Err(WindowError::Closed);
        }
        let available = self.available();
        if length > available {
            return Err(WindowError::Capacity {
                requested: length,
                available,
            });
        }

        // Chunks never exceed `distance`, so every byte read was written
        // before the chunk starts.
        let capacity = self.capacity();
        let mut src = self.written - distance as u64;
        let mut remaining = length;
        while remaining > 0 {
            let s = self.slot(src);
            let d = self.slot(self.written);
            let n = remaining
                .min(distance)
                .min(capacity - s)
                .min(capacity - d);
            self.data.copy_within(s..s + n, d);
            src += n as u64;
            self.written += n as u64;
            remaining -= n;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Consuming
    // -----------------------------------------------------------------------

    /// Copy up to `buf.len()` unread bytes out, oldest first.
    pub fn consume(&mut self, buf: &mut [u8]) -> Drain {
        if self.buffered() == 0 {
            return if self.eof {
                Drain::EndOfStream
            } else {
                Drain::Pending
            };
        }
        let n = self.peek(buf);
        self.read += n as u64;
        Drain::Bytes(n)
    }

    /// Copy up to `buf.len()` unread bytes out without consuming them.
    pub fn peek(&self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.buffered());
        let start = self.slot(self.read);
        let first = n.min(self.capacity() - start);
        buf[..first].copy_from_slice(&self.data[start..start + first]);
        buf[first..n].copy_from_slice(&self.data[..n - first]);
        n
    }

    /// Consume up to `n` bytes without copying them anywhere.
    pub fn advance(&mut self, n: usize) -> usize {
        let n = n.min(self.buffered());
        self.read += n as u64;
        n
    }

    // -----------------------------------------------------------------------
    // Random access (match finder)
    // -----------------------------------------------------------------------

    /// Whether the byte at absolute `pos` is still physically present.
    #[inline]
    pub fn is_retained(&self, pos: u64) -> bool {
        pos < self.written && self.written - pos <= self.capacity() as u64
    }

    pub fn byte_at(&self, pos: u64) -> Option<u8> {
        self.is_retained(pos).then(|| self.data[self.slot(pos)])
    }

    /// Length of the common run of bytes starting at absolute positions `a`
    /// and `b`, capped at `limit` and at the write cursor.
    ///
    /// Returns 0 when either start position is no longer retained.
    pub fn match_len(&self, a: u64, b: u64, limit: usize) -> usize {
        if !self.is_retained(a) || !self.is_retained(b) {
            return 0;
        }
        let limit = limit.min((self.written - a.max(b)) as usize);
        let capacity = self.capacity();
        let mut len = 0usize;
        while len < limit {
            let ia = self.slot(a + len as u64);
            let ib = self.slot(b + len as u64);
            let run = (limit - len).min(capacity - ia).min(capacity - ib);
            let eq = common_prefix(&self.data[ia..ia + run], &self.data[ib..ib + run]);
            len += eq;
            if eq < run {
                break;
            }
        }
        len
    }

    /// Copy the `buf.len()` bytes starting at absolute `pos` into `buf`.
    ///
    /// Returns `false` (leaving `buf` untouched) if any of them is not
    /// retained.
    pub fn read_at(&self, pos: u64, buf: &mut [u8]) -> bool {
        if buf.is_empty() {
            return true;
        }
        let end = pos + buf.len() as u64;
        if !self.is_retained(pos) || end > self.written {
            return false;
        }
        let start = self.slot(pos);
        let first = buf.len().min(self.capacity() - start);
        buf[..first].copy_from_slice(&self.data[start..start + first]);
        let rest = buf.len() - first;
        buf[first..].copy_from_slice(&self.data[..rest]);
        true
    }
}

/// Length of the common prefix of two equally long slices, eight bytes at a
/// time.
#[inline]
fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    let n = a.len().min(b.len());
    let mut i = 0;
    let (words_a, _) = a[..n].as_chunks::<8>();
    let (words_b, _) = b[..n].as_chunks::<8>();
    for (wa, wb) in words_a.iter().zip(words_b) {
        let x = u64::from_le_bytes(*wa) ^ u64::from_le_bytes(*wb);
        if x != 0 {
            return i + (x.trailing_zeros() / 8) as usize;
        }
        i += 8;
    }
    i + a[i..n]
        .iter()
        .zip(&b[i..n])
        .take_while(|(x, y)| x == y)
        .count()
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("dict_capacity", &self.dict_capacity)
            .field("headroom", &self.headroom)
            .field("anchor", &self.anchor)
            .field("written", &self.written)
            .field("read", &self.read)
            .field("eof", &self.eof)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// std::io adapters
// ---------------------------------------------------------------------------

impl io::Write for Window {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.append_literal(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Read for Window {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.consume(buf) {
            Drain::Bytes(n) => Ok(n),
            Drain::EndOfStream => Ok(0),
            Drain::Pending if buf.is_empty() => Ok(0),
            Drain::Pending => Err(io::Error::new(
                io::ErrorKind::WouldBlock,
                "window starved: no bytes buffered",
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::io::{Read, Write};

    fn random_bytes(n: usize, seed: u64) -> Vec<u8> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n).map(|_| rng.random::<u8>()).collect()
    }

    fn drain_all(w: &mut Window) -> Vec<u8> {
        let mut out = vec![0u8; w.buffered()];
        let n = w.consume(&mut out).len();
        out.truncate(n);
        out
    }

    #[test]
    fn write_then_read_across_wrap() {
        let mut w = Window::new(20, 10).unwrap();
        assert_eq!(w.capacity(), 30);

        let data = random_bytes(12, 15);
        assert_eq!(w.append_literal(&data).unwrap(), 12);
        assert_eq!(w.position(), 12);
        assert_eq!(w.read_position(), 0);

        let mut buf = [0u8; 2];
        assert_eq!(w.consume(&mut buf), Drain::Bytes(2));
        assert_eq!(buf, data[..2]);

        let more = random_bytes(19, 16);
        assert_eq!(w.append_literal(&more).unwrap(), 19);

        let mut buf = [0u8; 19];
        assert_eq!(w.consume(&mut buf), Drain::Bytes(19));
        let mut expected = data[2..].to_vec();
        expected.extend_from_slice(&more[..9]);
        assert_eq!(buf.as_slice(), expected.as_slice());
    }

    #[test]
    fn partial_literal_write_is_not_an_error() {
        let mut w = Window::new(4, 2).unwrap();
        assert_eq!(w.append_literal(&[1; 10]).unwrap(), 6);
        assert_eq!(w.available(), 0);
        assert_eq!(
            w.append_literal(&[1]),
            Err(WindowError::Capacity {
                requested: 1,
                available: 0
            })
        );
        assert_eq!(w.append_literal(&[]), Ok(0));
    }

    #[test]
    fn copy_match_sequence() {
        let mut w = Window::new(10, 10).unwrap();
        w.append_literal(&random_bytes(5, 15)).unwrap();
        w.append_copy(2, 3).unwrap();
        assert_eq!(w.position(), 8);
        w.append_copy(8, 8).unwrap();
        assert_eq!(w.position(), 16);
        assert_eq!(drain_all(&mut w).len(), 16);
        w.append_copy(2, 5).unwrap();
        assert_eq!(w.position(), 21);
        assert_eq!(drain_all(&mut w).len(), 5);
        w.append_copy(2, 2).unwrap();
        assert_eq!(w.position(), 23);
    }

    #[test]
    fn overlapping_copy_repeats_pattern() {
        let mut w = Window::new(16, 16).unwrap();
        w.append_literal(b"xyAB").unwrap();
        w.append_copy(2, 5).unwrap();
        assert_eq!(drain_all(&mut w), b"xyABABABA");
    }

    #[test]
    fn run_copy_with_distance_one() {
        let mut w = Window::new(8, 8).unwrap();
        w.append_byte(b'z').unwrap();
        w.append_copy(1, 7).unwrap();
        assert_eq!(drain_all(&mut w), b"zzzzzzzz");
    }

    #[test]
    fn copy_wraps_around_ring() {
        let mut w = Window::new(6, 4).unwrap();
        w.append_literal(b"abcdefgh").unwrap();
        drain_all(&mut w);
        // write cursor at slot 8 of 10; source straddles the wrap too
        w.append_copy(6, 6).unwrap();
        assert_eq!(drain_all(&mut w), b"cdefgh");
        w.append_copy(3, 4).unwrap();
        assert_eq!(drain_all(&mut w), b"fghf");
    }

    #[test]
    fn copy_rejects_bad_distance() {
        let mut w = Window::new(4, 4).unwrap();
        w.append_literal(b"abc").unwrap();
        assert!(matches!(
            w.append_copy(4, 1),
            Err(WindowError::InvalidDistance { distance: 4, .. })
        ));
        assert!(matches!(
            w.append_copy(0, 1),
            Err(WindowError::InvalidDistance { .. })
        ));
        w.append_literal(b"de").unwrap();
        assert!(matches!(
            w.append_copy(5, 1),
            Err(WindowError::InvalidDistance {
                dict_capacity: 4,
                ..
            })
        ));
        assert_eq!(w.position(), 5);
    }

    #[test]
    fn copy_is_all_or_nothing() {
        let mut w = Window::new(4, 2).unwrap();
        w.append_literal(b"abcd").unwrap();
        assert_eq!(
            w.append_copy(2, 3),
            Err(WindowError::Capacity {
                requested: 3,
                available: 2
            })
        );
        assert_eq!(w.position(), 4);
        w.append_copy(2, 2).unwrap();
        assert_eq!(drain_all(&mut w), b"abcdcd");
    }

    #[test]
    fn reset_clears_cursors() {
        let mut w = Window::new(10, 10).unwrap();
        w.append_literal(&random_bytes(5, 15)).unwrap();
        assert_eq!(w.position(), 5);
        w.set_eof();
        w.reset();
        assert_eq!(w.position(), 0);
        assert_eq!(w.read_position(), 0);
        assert_eq!(w.buffered(), 0);
        assert!(!w.is_eof());
        assert_eq!(w.byte_at(0), None);
    }

    #[test]
    fn eof_is_terminal_and_repeatable() {
        let mut w = Window::new(10, 10).unwrap();
        let data = random_bytes(5, 15);
        w.append_literal(&data).unwrap();
        w.set_eof();

        let mut buf = [0u8; 5];
        assert_eq!(w.consume(&mut buf), Drain::Bytes(5));
        assert_eq!(buf.as_slice(), data.as_slice());
        for _ in 0..3 {
            assert_eq!(w.consume(&mut buf), Drain::EndOfStream);
        }
        assert_eq!(w.append_literal(b"x"), Err(WindowError::Closed));
    }

    #[test]
    fn starved_window_reports_pending() {
        let mut w = Window::new(10, 10).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(w.consume(&mut buf), Drain::Pending);
        assert!(w.consume(&mut buf).is_empty());
    }

    #[test]
    fn input_window_keeps_history_behind_reader() {
        let mut w = Window::for_input(8, 4).unwrap();
        assert_eq!(w.append_literal(b"0123456789").unwrap(), 4);
        assert_eq!(w.advance(4), 4);
        assert_eq!(w.append_literal(b"456789").unwrap(), 4);
        assert_eq!(w.advance(4), 4);
        assert_eq!(w.append_literal(b"89ab").unwrap(), 4);
        // 8 bytes of history behind the read cursor remain addressable.
        for pos in 0..8 {
            assert_eq!(w.byte_at(pos), Some(b'0' + pos as u8));
        }
    }

    #[test]
    fn match_len_spans_overlap_and_wrap() {
        let mut w = Window::new(6, 2).unwrap();
        w.append_literal(b"abab").unwrap();
        drain_all(&mut w);
        w.append_literal(b"abab").unwrap();
        assert_eq!(w.match_len(2, 4, 16), 4);
        assert_eq!(w.match_len(0, 1, 16), 0);
        drain_all(&mut w);
        w.append_literal(b"ab").unwrap();
        // positions 0 and 1 were overwritten by 8 and 9
        assert_eq!(w.match_len(0, 2, 16), 0);
        assert_eq!(w.match_len(2, 4, 16), 6);
    }

    #[test]
    fn common_prefix_word_and_tail() {
        let a = b"0123456789abcdefXYZ";
        let mut b = *a;
        assert_eq!(common_prefix(a, &b), a.len());
        b[11] = b'!';
        assert_eq!(common_prefix(a, &b), 11);
        b[3] = b'!';
        assert_eq!(common_prefix(a, &b), 3);
        let mut c = *a;
        c[17] = b'!';
        assert_eq!(common_prefix(a, &c), 17);
        assert_eq!(common_prefix(&a[..8], &c[..5]), 5);
    }

    #[test]
    fn io_adapters() {
        let mut w = Window::new(4, 0).unwrap();
        assert_eq!(w.write(b"abcdef").unwrap(), 4);
        let err = w.write(b"e").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);

        let mut buf = [0u8; 8];
        assert_eq!(w.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], b"abcd");
        assert_eq!(
            w.read(&mut buf).unwrap_err().kind(),
            io::ErrorKind::WouldBlock
        );
        w.set_eof();
        assert_eq!(w.read(&mut buf).unwrap(), 0);
    }
}
