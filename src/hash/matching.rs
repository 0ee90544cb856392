// Hash-chain match finder.
//
// Owns an encoder-input window plus the hash indexes:
//   1. One single-position `HashTable` per tier (e.g. 2- and 3-byte digests)
//   2. A `HashChain` over a longer digest for several candidates per step
//
// Each step hashes the bytes at the cursor, collects candidate positions,
// verifies and extends them against the live window and returns them
// ranked so that the last record is the preferred one.  `skip` advances
// the cursor and indexes every position it passes.
//
// Digests are folded into a space sized from the dictionary before they
// key any index, so table memory stays bounded by D, not by stream length.

use log::{debug, trace};

use super::chain::HashChain;
use super::config::{FinderConfig, INITIAL_CHAIN_RECORDS};
use super::digest::{DigestSpace, digest_at};
use super::table::HashTable;
use crate::error::{ConfigError, WindowError};
use crate::window::Window;

// ---------------------------------------------------------------------------
// Match record
// ---------------------------------------------------------------------------

/// A back-reference candidate: `length` bytes equal to those `distance`
/// bytes behind the cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Match {
    pub distance: usize,
    pub length: usize,
}

// ---------------------------------------------------------------------------
// Indexes
// ---------------------------------------------------------------------------

/// Digest length plus the first position not yet inserted.
///
/// Positions below the cursor whose digest bytes have not arrived yet stay
/// pending until a later `write` supplies them.
#[derive(Clone, Copy)]
struct Frontier {
    len: usize,
    next: u64,
}

struct Tier {
    frontier: Frontier,
    table: HashTable,
}

// ---------------------------------------------------------------------------
// Match finder
// ---------------------------------------------------------------------------

/// Hash-chain match finder over a sliding input window.
pub struct MatchFinder {
    config: FinderConfig,
    window: Window,
    tiers: Vec<Tier>,
    chain_frontier: Frontier,
    chain: HashChain,
    space: DigestSpace,
    min_match_len: usize,
    /// Scratch buffer for chain lookups (`depth` entries).
    candidates: Vec<u64>,
    /// Scratch buffer for verified matches.
    found: Vec<Match>,
}

impl MatchFinder {
    pub fn new(config: FinderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let window = Window::for_input(config.dict_capacity, config.headroom)?;
        let tiers = config
            .tiers
            .iter()
            .map(|&len| Tier {
                frontier: Frontier { len, next: 0 },
                table: HashTable::new(),
            })
            .collect();
        let ring = config.ring_capacity();
        let chain = HashChain::growable(config.depth, INITIAL_CHAIN_RECORDS.min(ring), ring);
        let space = DigestSpace::new(config.dict_capacity);
        debug!(
            "match finder '{}': dict={} headroom={} tiers={:?} chain_len={} depth={} ring<={ring} buckets={}",
            config.name,
            config.dict_capacity,
            config.headroom,
            config.tiers,
            config.chain_len,
            config.depth,
            space.size
        );
        Ok(Self {
            min_match_len: config.min_match_len(),
            chain_frontier: Frontier {
                len: config.chain_len,
                next: 0,
            },
            candidates: vec![0; config.depth],
            found: Vec::with_capacity(config.depth + config.tiers.len()),
            tiers,
            chain,
            space,
            window,
            config,
        })
    }

    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Shortest match length ever reported.
    pub fn min_match_len(&self) -> usize {
        self.min_match_len
    }

    /// The input window.
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Bytes written but not yet skipped.
    pub fn buffered(&self) -> usize {
        self.window.buffered()
    }

    /// Bytes `write` can accept right now.
    pub fn available(&self) -> usize {
        self.window.available()
    }

    /// Absolute position of the cursor (the next byte to encode).
    pub fn position(&self) -> u64 {
        self.window.read_position()
    }

    /// Absolute count of bytes written.
    pub fn written(&self) -> u64 {
        self.window.position()
    }

    /// Byte at the cursor, if one is buffered.
    pub fn current_byte(&self) -> Option<u8> {
        if self.window.buffered() == 0 {
            return None;
        }
        self.window.byte_at(self.window.read_position())
    }

    pub fn is_eof(&self) -> bool {
        self.window.is_eof()
    }

    /// Buckets of the digest space every index is keyed by.
    pub fn digest_buckets(&self) -> usize {
        self.space.size
    }

    /// Allocated index entries: tier table slots, chain head slots and
    /// chain ring records.  Bounded by the dictionary, not the stream.
    pub fn index_slots(&self) -> usize {
        let tiers: usize = self.tiers.iter().map(|t| t.table.slots()).sum();
        tiers + self.chain.head_slots() + self.chain.capacity()
    }

    /// Signal that no more input follows.
    pub fn finish(&mut self) {
        self.window.set_eof();
    }

    /// Start a new stream: drop all input and every indexed position.
    pub fn reset(&mut self) {
        self.window.reset();
        for tier in &mut self.tiers {
            tier.table.clear();
            tier.frontier.next = 0;
        }
        self.chain.clear();
        self.chain_frontier.next = 0;
    }

    /// Feed input bytes.  Same contract as [`Window::append_literal`].
    pub fn write(&mut self, bytes: &[u8]) -> Result<usize, WindowError> {
        let n = self.window.append_literal(bytes)?;
        self.index_pending();
        Ok(n)
    }

    /// Advance the cursor by up to `n` bytes, indexing every position
    /// passed.  Returns how far the cursor moved.
    pub fn skip(&mut self, n: usize) -> usize {
        let skipped = self.window.advance(n);
        if skipped < n {
            debug!("skip({n}) clamped to {skipped} buffered bytes");
        }
        self.index_pending();
        skipped
    }

    /// Collect matches at the cursor into `out`.
    ///
    /// Records are ordered by preference, best last: longer first wins, and
    /// between equal lengths the shorter distance wins.  A record is only
    /// kept if it is shorter in distance than every better one.  When `out`
    /// is too small the least preferred records are dropped.  Returns 0 when
    /// no match of at least `min_match_len` bytes exists.
    pub fn find_matches(&mut self, out: &mut [Match]) -> usize {
        let avail = self.window.buffered();
        if avail < self.min_match_len || out.is_empty() {
            return 0;
        }
        let cursor = self.window.read_position();
        let oldest = cursor.saturating_sub(self.config.dict_capacity as u64);
        let limit = avail.min(self.config.max_match_len);
        let min = self.min_match_len;

        self.found.clear();
        for tier in &self.tiers {
            let len = tier.frontier.len;
            if len > avail {
                continue;
            }
            if let Some(pos) = digest_at(&self.window, cursor, len)
                .and_then(|d| tier.table.get(self.space.fold(d)))
            {
                verify(&self.window, &mut self.found, pos, cursor, oldest, limit, min);
            }
        }
        if self.chain_frontier.len <= avail
            && let Some(d) = digest_at(&self.window, cursor, self.chain_frontier.len)
        {
            let n = self
                .chain
                .get_recent(self.space.fold(d), oldest, &mut self.candidates);
            for &pos in &self.candidates[..n] {
                verify(&self.window, &mut self.found, pos, cursor, oldest, limit, min);
                if self.found.last().is_some_and(|m| m.length == limit) {
                    break;
                }
            }
        }

        rank(&mut self.found);
        let k = self.found.len().min(out.len());
        // `found` is best first; `out` is best last.
        for (i, m) in self.found[..k].iter().enumerate() {
            out[k - 1 - i] = *m;
        }
        if k > 0 {
            trace!(
                "pos {cursor}: {k} matches, best d={} l={}",
                out[k - 1].distance,
                out[k - 1].length
            );
        }
        k
    }

    /// Insert every position below the cursor whose digest bytes are
    /// available.
    fn index_pending(&mut self) {
        let cursor = self.window.read_position();
        let written = self.window.position();
        let window = &self.window;
        let space = self.space;
        for tier in &mut self.tiers {
            advance_frontier(window, &mut tier.frontier, cursor, written, |d, pos| {
                tier.table.put(space.fold(d), pos)
            });
        }
        let chain = &mut self.chain;
        advance_frontier(
            window,
            &mut self.chain_frontier,
            cursor,
            written,
            |d, pos| chain.put(space.fold(d), pos),
        );
    }
}

fn advance_frontier(
    window: &Window,
    frontier: &mut Frontier,
    cursor: u64,
    written: u64,
    mut insert: impl FnMut(u32, u64),
) {
    // Nothing before the retained span can be hashed any more.
    let retained_from = written.saturating_sub(window.capacity() as u64);
    frontier.next = frontier.next.max(retained_from);
    while frontier.next < cursor && frontier.next + frontier.len as u64 <= written {
        if let Some(d) = digest_at(window, frontier.next, frontier.len) {
            insert(d, frontier.next);
        }
        frontier.next += 1;
    }
}

/// Verify candidate `pos` against the window and record it if it matches
/// at least `min` bytes.
#[inline]
fn verify(
    window: &Window,
    found: &mut Vec<Match>,
    pos: u64,
    cursor: u64,
    oldest: u64,
    limit: usize,
    min: usize,
) {
    if pos >= cursor || pos < oldest || !window.is_retained(pos) {
        return;
    }
    let length = window.match_len(pos, cursor, limit);
    if length >= min {
        found.push(Match {
            distance: (cursor - pos) as usize,
            length,
        });
    }
}

/// Sort `found` best first and drop dominated records.
fn rank(found: &mut Vec<Match>) {
    found.sort_unstable_by(|a, b| {
        b.length
            .cmp(&a.length)
            .then_with(|| a.distance.cmp(&b.distance))
    });
    let mut closest = usize::MAX;
    found.retain(|m| {
        let keep = m.distance < closest;
        closest = closest.min(m.distance);
        keep
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
