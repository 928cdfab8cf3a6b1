use std::collections::HashMap;

use parking_lot::RwLock;

use crate::chain::ChainView;
use crate::errors::{ChainError, ChainResult};
use crate::types::{Block, BlockHash, BlockHeader, Transaction, TxHash};

/// In-memory chain view over fully indexed blocks. Serves as the test
/// substitute for a persistent store and as a light in-process view.
#[derive(Default)]
pub struct MemoryChainStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    blocks: HashMap<BlockHash, Block>,
    heights: HashMap<u32, BlockHash>,
    transactions: HashMap<TxHash, Transaction>,
}

impl MemoryChainStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes a block by hash and height, along with its transactions.
    pub fn insert_block(&self, block: Block) {
        let hash = block.hash();
        let mut inner = self.inner.write();
        for tx in &block.transactions {
            inner.transactions.insert(tx.hash(), tx.clone());
        }
        inner.heights.insert(block.header.height, hash);
        inner.blocks.insert(hash, block);
    }

    /// Indexes a transaction that is not part of an inserted block.
    pub fn insert_transaction(&self, tx: Transaction) {
        self.inner.write().transactions.insert(tx.hash(), tx);
    }

    pub fn height(&self) -> Option<u32> {
        self.inner.read().heights.keys().copied().max()
    }
}

impl ChainView for MemoryChainStore {
    fn get_header(&self, hash: &BlockHash) -> ChainResult<BlockHeader> {
        self.inner
            .read()
            .blocks
            .get(hash)
            .map(|block| block.header.clone())
            .ok_or_else(|| ChainError::NotFound(format!("header {}", hex::encode(hash))))
    }

    fn get_block(&self, hash: &BlockHash) -> ChainResult<Block> {
        self.inner
            .read()
            .blocks
            .get(hash)
            .cloned()
            .ok_or_else(|| ChainError::NotFound(format!("block {}", hex::encode(hash))))
    }

    fn get_block_hash(&self, height: u32) -> ChainResult<BlockHash> {
        self.inner
            .read()
            .heights
            .get(&height)
            .copied()
            .ok_or_else(|| ChainError::NotFound(format!("block at height {height}")))
    }

    fn get_block_time(&self, hash: &BlockHash) -> ChainResult<i64> {
        self.inner
            .read()
            .blocks
            .get(hash)
            .map(|block| block.header.timestamp)
            .ok_or_else(|| ChainError::NotFound(format!("block time {}", hex::encode(hash))))
    }

    fn get_transaction(&self, hash: &TxHash) -> ChainResult<Transaction> {
        self.inner
            .read()
            .transactions
            .get(hash)
            .cloned()
            .ok_or_else(|| ChainError::NotFound(format!("transaction {}", hex::encode(hash))))
    }
}
