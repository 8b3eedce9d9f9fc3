use crate::block::Block;
use alloc::collections::BTreeMap;

/// Ordered interval index over live tracked blocks, keyed by `start`.
///
/// `insert` is idempotent on a duplicate start (first writer wins),
/// `delete` is a no-op on an absent key, and `predecessor` returns the
/// block with the largest `start <= query` (the caller still checks
/// `query < start + size` to confirm containment — the index does not
/// encode intervals intrinsically).
///
/// Backed by `BTreeMap` rather than a hand-rolled red-black tree:
/// `range(..=query).next_back()` gives predecessor search in O(log n)
/// with zero allocation on the lookup path, without unsafe
/// arena-index plumbing.
#[derive(Default)]
pub struct BlockIndex {
    blocks: BTreeMap<u64, Block>,
}

impl BlockIndex {
    pub fn new() -> Self {
        Self {
            blocks: BTreeMap::new(),
        }
    }

    /// Idempotent: a second insert at an existing `start` is a no-op,
    /// matching the source's `insert_block_rb` ("same start address
    /// already present - nothing to do").
    pub fn insert(&mut self, block: Block) {
        self.blocks.entry(block.start).or_insert(block);
    }

    /// No-op if `start` is absent.
    pub fn delete(&mut self, start: u64) {
        self.blocks.remove(&start);
    }

    /// Largest live block with `start <= query`, if any.
    pub fn predecessor(&self, query: u64) -> Option<&Block> {
        self.blocks.range(..=query).next_back().map(|(_, b)| b)
    }

    /// Look up the block that contains `addr`, combining predecessor
    /// search with a caller-side containment check.
    pub fn find_containing(&self, addr: u64) -> Option<&Block> {
        self.predecessor(addr).filter(|b| b.contains(addr))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Drops every tracked block. No synthetic `Free` events are
    /// emitted for blocks still live at shutdown.
    pub fn drop_all(&mut self) {
        self.blocks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::ContextHandle;
    use alloc::string::String;

    #[derive(Debug, Clone)]
    struct Ctx(&'static str);
    impl crate::block::AllocationContext for Ctx {
        fn describe(&self) -> String {
            String::from(self.0)
        }
    }

    fn block(start: u64, size: u64) -> Block {
        Block {
            start,
            size,
            context: ContextHandle::new(Ctx("ctx")),
        }
    }

    #[test]
    fn empty_predecessor_is_none() {
        let idx = BlockIndex::new();
        assert!(idx.predecessor(0x1000).is_none());
    }

    #[test]
    fn predecessor_may_not_contain_query() {
        let mut idx = BlockIndex::new();
        idx.insert(block(0x1000, 0x2000));
        // predecessor exists but the query is one past the end
        assert!(idx.predecessor(0x3000).is_some());
        assert!(idx.find_containing(0x3000).is_none());
    }

    #[test]
    fn insert_is_idempotent_first_wins() {
        let mut idx = BlockIndex::new();
        idx.insert(block(0x1000, 0x2000));
        idx.insert(block(0x1000, 0x9999));
        assert_eq!(idx.find_containing(0x1000).unwrap().size, 0x2000);
    }

    #[test]
    fn delete_twice_is_a_no_op() {
        let mut idx = BlockIndex::new();
        idx.insert(block(0x1000, 0x2000));
        idx.delete(0x1000);
        idx.delete(0x1000);
        assert!(idx.is_empty());
    }

    #[test]
    fn find_containing_matches_unique_live_block() {
        let mut idx = BlockIndex::new();
        idx.insert(block(0x1000, 0x1000));
        idx.insert(block(0x3000, 0x1000));
        assert_eq!(idx.find_containing(0x1500).unwrap().start, 0x1000);
        assert_eq!(idx.find_containing(0x3500).unwrap().start, 0x3000);
        assert!(idx.find_containing(0x2500).is_none());
    }
}
