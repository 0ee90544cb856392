// Hash chain: digest -> several recent positions, most recent first.
//
// Heads live in a `HashTable`; links live in a ring of records indexed by
// `pos % capacity`, each record holding its own position and the previous
// position for the same digest.  Xdelta3's `small_prev` array works the
// same way.  A record overwritten by a newer position ends the walk, so a
// chain reaches about `capacity` positions back.

use log::debug;

use super::table::{HASH_CKOFFSET, HashTable};

#[derive(Clone, Copy, Default)]
struct Link {
    /// `pos + HASH_CKOFFSET` of the position owning this record, 0 if empty.
    stored: u64,
    /// `prev + HASH_CKOFFSET` of the previous position in the chain, 0 at
    /// the tail.
    prev: u64,
}

/// Multi-candidate hash index.
#[derive(Clone)]
pub struct HashChain {
    heads: HashTable,
    ring: Vec<Link>,
    /// Ring size the chain may grow to on its own.
    limit: usize,
    /// Maximum positions returned per lookup.
    depth: usize,
}

impl HashChain {
    /// Chain with a fixed ring of `capacity` records.
    pub fn new(depth: usize, capacity: usize) -> Self {
        Self::growable(depth, capacity, capacity)
    }

    /// Chain starting with `initial` records and doubling up to `limit` as
    /// positions reach the end of the ring.
    pub fn growable(depth: usize, initial: usize, limit: usize) -> Self {
        let initial = initial.clamp(1, limit.max(1));
        Self {
            heads: HashTable::new(),
            ring: vec![Link::default(); initial],
            limit: limit.max(initial),
            depth: depth.max(1),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Current ring size.
    pub fn capacity(&self) -> usize {
        self.ring.len()
    }

    /// Number of distinct digests with a chain.
    pub fn heads(&self) -> usize {
        self.heads.len()
    }

    /// Slot array size of the head table.
    pub fn head_slots(&self) -> usize {
        self.heads.slots()
    }

    pub fn clear(&mut self) {
        self.heads.clear();
        self.ring.fill(Link::default());
    }

    /// Prepend `pos` to the chain of `digest`.
    ///
    /// Positions are expected in increasing order.
    #[inline]
    pub fn put(&mut self, digest: u32, pos: u64) {
        if pos >= self.ring.len() as u64 && self.ring.len() < self.limit {
            let grown = self.ring.len().saturating_mul(2).min(self.limit);
            self.resize(grown);
        }
        let prev = self
            .heads
            .get(digest)
            .map_or(0, |head| head + HASH_CKOFFSET);
        let idx = self.slot(pos);
        self.ring[idx] = Link {
            stored: pos + HASH_CKOFFSET,
            prev,
        };
        self.heads.put(digest, pos);
    }

    /// Write the positions of `digest` into `out`, most recent first.
    pub fn get(&self, digest: u32, out: &mut [u64]) -> usize {
        self.get_recent(digest, 0, out)
    }

    /// Like [`get`](Self::get) but stops at the first position below
    /// `oldest`.
    ///
    /// Returns how many positions were written; at most
    /// `min(out.len(), depth)`.
    pub fn get_recent(&self, digest: u32, oldest: u64, out: &mut [u64]) -> usize {
        let limit = out.len().min(self.depth);
        let Some(mut pos) = self.heads.get(digest) else {
            return 0;
        };
        let mut n = 0;
        while n < limit && pos >= oldest {
            out[n] = pos;
            n += 1;

            let link = self.ring[self.slot(pos)];
            if link.stored != pos + HASH_CKOFFSET || link.prev == 0 {
                break;
            }
            let prev = link.prev - HASH_CKOFFSET;
            if prev >= pos {
                break;
            }
            pos = prev;
        }
        n
    }

    /// Grow the ring to `capacity` records.
    ///
    /// Every record is rehomed at `pos % capacity`; where two records land
    /// on the same slot the newer one is kept.  Shrinking is ignored.
    pub fn resize(&mut self, capacity: usize) {
        if capacity <= self.ring.len() {
            return;
        }
        debug!("hash chain resize: {} -> {capacity} records", self.ring.len());
        let old = std::mem::replace(&mut self.ring, vec![Link::default(); capacity]);
        for link in old.into_iter().filter(|l| l.stored != 0) {
            let idx = self.slot(link.stored - HASH_CKOFFSET);
            if self.ring[idx].stored < link.stored {
                self.ring[idx] = link;
            }
        }
        self.limit = self.limit.max(capacity);
    }

    #[inline(always)]
    fn slot(&self, pos: u64) -> usize {
        (pos % self.ring.len() as u64) as usize
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
