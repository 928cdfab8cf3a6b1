mod block;
mod sigchain;
mod transaction;

pub use block::{Block, BlockHash, BlockHeader, VBlock, WinnerType};
pub use sigchain::{SigChain, SigChainElem};
pub use transaction::{Transaction, TxHash};
