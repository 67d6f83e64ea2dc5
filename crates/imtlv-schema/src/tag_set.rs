/// Fixed-size set of context tag numbers (0-255).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagSet {
    bits: [u64; 4],
}

impl TagSet {
    pub const fn new() -> Self {
        Self { bits: [0; 4] }
    }

    /// Insert a tag number. Returns `false` if it was already present.
    pub fn insert(&mut self, tag: u8) -> bool {
        let (word, mask) = Self::slot(tag);
        let fresh = self.bits[word] & mask == 0;
        self.bits[word] |= mask;
        fresh
    }

    pub fn contains(&self, tag: u8) -> bool {
        let (word, mask) = Self::slot(tag);
        self.bits[word] & mask != 0
    }

    /// Number of distinct tags inserted.
    pub fn count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    fn slot(tag: u8) -> (usize, u64) {
        ((tag >> 6) as usize, 1u64 << (tag & 0x3F))
    }
}
