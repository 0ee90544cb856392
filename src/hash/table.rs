// Growable hash table: digest -> most recent absolute position.
//
// Open addressing with linear probing over a power-of-two slot array.
// Stored positions carry HASH_CKOFFSET so that 0 means "empty slot".
// The table doubles before an insert of a new digest would push the load
// factor above one half.

use log::debug;

/// Offset added to stored positions so 0 means "empty slot".
pub const HASH_CKOFFSET: u64 = 1;

/// Smallest non-empty slot array.
pub const MIN_SLOTS: usize = 8;

/// Fibonacci multiplier spreading digests over the slot index.
const SPREAD: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Clone, Copy, Default)]
struct Slot {
    digest: u32,
    /// `pos + HASH_CKOFFSET`, or 0 when empty.
    stored: u64,
}

impl Slot {
    #[inline(always)]
    fn is_empty(&self) -> bool {
        self.stored == 0
    }
}

/// Single-position hash table keyed by digest.
///
/// The most recent `put` for a digest wins.
#[derive(Clone, Default)]
pub struct HashTable {
    slots: Vec<Slot>,
    count: usize,
    /// `64 - log2(slots.len())`.
    shift: u32,
}

impl HashTable {
    /// Empty table; nothing is allocated until the first insert.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table pre-sized to hold `entries` digests without growing.
    pub fn with_capacity(entries: usize) -> Self {
        let mut t = Self::new();
        if entries > 0 {
            t.allocate(entries.saturating_mul(2).next_power_of_two().max(MIN_SLOTS));
        }
        t
    }

    /// Number of distinct digests stored.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Slot array size (always zero or a power of two).
    pub fn slots(&self) -> usize {
        self.slots.len()
    }

    /// Forget every entry, keeping the allocation.
    pub fn clear(&mut self) {
        self.slots.fill(Slot::default());
        self.count = 0;
    }

    /// Position most recently stored under `digest`.
    #[inline]
    pub fn get(&self, digest: u32) -> Option<u64> {
        if self.slots.is_empty() {
            return None;
        }
        let slot = &self.slots[self.probe(digest)];
        (!slot.is_empty()).then(|| slot.stored - HASH_CKOFFSET)
    }

    /// Store `pos` under `digest`, replacing any previous position.
    #[inline]
    pub fn put(&mut self, digest: u32, pos: u64) {
        if self.slots.is_empty() {
            self.allocate(MIN_SLOTS);
        }
        let mut idx = self.probe(digest);
        if self.slots[idx].is_empty() {
            if (self.count + 1) * 2 > self.slots.len() {
                self.grow();
                idx = self.probe(digest);
            }
            self.count += 1;
        }
        self.slots[idx] = Slot {
            digest,
            stored: pos + HASH_CKOFFSET,
        };
    }

    /// Index of the slot holding `digest`, or of the empty slot ending its
    /// probe sequence.
    #[inline(always)]
    fn probe(&self, digest: u32) -> usize {
        let mask = self.slots.len() - 1;
        let mut idx = ((digest as u64).wrapping_mul(SPREAD) >> self.shift) as usize;
        loop {
            let slot = &self.slots[idx];
            if slot.is_empty() || slot.digest == digest {
                return idx;
            }
            idx = (idx + 1) & mask;
        }
    }

    fn allocate(&mut self, size: usize) {
        debug_assert!(size.is_power_of_two());
        self.slots = vec![Slot::default(); size];
        self.shift = 64 - size.trailing_zeros();
        self.count = 0;
    }

    fn grow(&mut self) {
        let old = std::mem::take(&mut self.slots);
        let size = old.len() * 2;
        debug!("hash table grow: {} -> {size} slots", old.len());
        self.allocate(size);
        for slot in old.into_iter().filter(|s| !s.is_empty()) {
            let idx = self.probe(slot.digest);
            self.slots[idx] = slot;
            self.count += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
