mod memory;

pub use memory::MemoryChainStore;

use crate::errors::ChainResult;
use crate::types::{Block, BlockHash, BlockHeader, Transaction, TxHash};

/// Read contract the admission engine demands of whatever backs block
/// storage. Lookups must stay consistent for the duration of a single
/// admission attempt; callers serialize admissions against reorgs.
pub trait ChainView {
    fn get_header(&self, hash: &BlockHash) -> ChainResult<BlockHeader>;
    fn get_block(&self, hash: &BlockHash) -> ChainResult<Block>;
    fn get_block_hash(&self, height: u32) -> ChainResult<BlockHash>;
    /// Timestamp of the named block; split out from [`ChainView::get_header`]
    /// so backends can answer it from an index.
    fn get_block_time(&self, hash: &BlockHash) -> ChainResult<i64>;
    fn get_transaction(&self, hash: &TxHash) -> ChainResult<Transaction>;
}
