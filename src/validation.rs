use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing::{info, warn};

use crate::chain::ChainView;
use crate::config::ConsensusParams;
use crate::crypto::{decode_public_key, decode_signature, verify_signature};
use crate::errors::ChainResult;
use crate::payload::{Payload, PayloadKind};
use crate::types::{Block, BlockHash, BlockHeader, SigChain, Transaction, VBlock, WinnerType};

/// Height of the block whose signer takes over when the proposer stalls.
/// Frozen at genesis; every node must use the same constant until the
/// protocol upgrades it in lockstep.
pub const SNAPSHOT_PROPOSER_HEIGHT: u32 = 0;

#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("previous header not found")]
    PrevMissing,
    #[error("header height {found} does not follow previous height {prev}")]
    HeightMismatch { prev: u32, found: u32 },
    #[error("header timestamp {timestamp} is more than {tolerance_secs}s ahead of local time {now}")]
    PostdatedTimestamp {
        timestamp: i64,
        now: i64,
        tolerance_secs: u64,
    },
    #[error("header timestamp {timestamp} does not advance past previous timestamp {prev}")]
    NonMonotonicTimestamp { prev: i64, timestamp: i64 },
    #[error("invalid winner type: {0}")]
    InvalidWinnerType(String),
    #[error("proposer lookup failed: {0}")]
    ProposerLookup(String),
    #[error("unexpected block signer {found}, expected {expected}")]
    WrongSigner { expected: String, found: String },
    #[error("header signature rejected: {0}")]
    BadSignature(String),
}

#[derive(Debug, Error)]
pub enum TxError {
    #[error("block carries no transactions")]
    EmptyBlock,
    #[error("first transaction in block is not coinbase")]
    MissingCoinbase,
    #[error("coinbase transaction at position {index}")]
    DuplicateCoinbase { index: usize },
    #[error("transaction {index} rejected: {reason}")]
    TxCheckFailed { index: usize, reason: String },
    #[error("block-scoped transaction check failed: {0}")]
    BlockScopedTxCheckFailed(String),
}

#[derive(Debug, Error)]
pub enum TimestampError {
    #[error("timestamp {timestamp} is older than the accepted window starting {earliest}")]
    Stale { timestamp: i64, earliest: i64 },
    #[error("timestamp {timestamp} is beyond the accepted window ending {latest}")]
    Postdated { timestamp: i64, latest: i64 },
}

/// Transaction-level oracle the engine consults during
/// [`BlockAdmission::check_transactions`]. Script and history semantics
/// live behind this seam.
pub trait TransactionValidator {
    /// Stateless structural sanity of a single transaction.
    fn verify_transaction(&self, tx: &Transaction) -> ChainResult<()>;
    /// A single transaction against ledger history.
    fn verify_transaction_with_ledger(&self, tx: &Transaction) -> ChainResult<()>;
    /// Cross-transaction checks over the block as a whole.
    fn verify_transactions_with_block(&self, txs: &[Transaction]) -> ChainResult<()>;
}

/// Proposer the network expects to sign a block, as derived from the
/// predecessor. The chord ID is carried through for future cross-checking
/// against the overlay; it is not compared yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpectedProposer {
    pub public_key: Vec<u8>,
    pub chord_id: Vec<u8>,
}

/// Block admission engine: a pure function of `(block, receive_time,
/// chain view)`. Holds no state of its own beyond borrowed collaborators.
pub struct BlockAdmission<'a> {
    view: &'a dyn ChainView,
    tx_validator: &'a dyn TransactionValidator,
    params: ConsensusParams,
}

impl<'a> BlockAdmission<'a> {
    pub fn new(
        view: &'a dyn ChainView,
        tx_validator: &'a dyn TransactionValidator,
        params: ConsensusParams,
    ) -> Self {
        Self {
            view,
            tx_validator,
            params,
        }
    }

    /// Full admission check: header first, so an impostor signer short-
    /// circuits before any transaction is verified.
    pub fn admit(&self, vblock: &VBlock) -> ChainResult<()> {
        let header = &vblock.block.header;
        if let Err(err) = self.check_header(header, vblock.receive_time) {
            warn!(
                height = header.height,
                hash = %hex::encode(header.hash()),
                %err,
                "block header rejected"
            );
            return Err(err.into());
        }
        if let Err(err) = self.check_transactions(&vblock.block) {
            warn!(
                height = header.height,
                hash = %hex::encode(header.hash()),
                %err,
                "block transactions rejected"
            );
            return Err(err.into());
        }
        Ok(())
    }

    pub fn check_header(
        &self,
        header: &BlockHeader,
        receive_time: i64,
    ) -> Result<(), HeaderError> {
        if header.height == 0 {
            return Ok(());
        }
        let prev = self
            .view
            .get_header(&header.prev_block_hash)
            .map_err(|_| HeaderError::PrevMissing)?;
        if prev.height + 1 != header.height {
            return Err(HeaderError::HeightMismatch {
                prev: prev.height,
                found: header.height,
            });
        }
        let now = unix_now();
        let tolerance_secs = self.params.timestamp_tolerance_secs;
        if header.timestamp > now + tolerance_secs as i64 {
            return Err(HeaderError::PostdatedTimestamp {
                timestamp: header.timestamp,
                now,
                tolerance_secs,
            });
        }
        if header.timestamp <= prev.timestamp {
            return Err(HeaderError::NonMonotonicTimestamp {
                prev: prev.timestamp,
                timestamp: header.timestamp,
            });
        }
        if header.winner_type == WinnerType::GenesisSigner
            && header.height >= self.params.genesis_block_proposed_height
        {
            return Err(HeaderError::InvalidWinnerType(format!(
                "genesis signer is not allowed at height {}",
                header.height
            )));
        }

        let expected = self.elect_proposer(&prev, &header.prev_block_hash, receive_time)?;
        if expected.public_key != header.signer {
            return Err(HeaderError::WrongSigner {
                expected: hex::encode(&expected.public_key),
                found: hex::encode(&header.signer),
            });
        }
        let public_key = decode_public_key(&header.signer)
            .map_err(|err| HeaderError::BadSignature(err.to_string()))?;
        let signature = decode_signature(&header.signature)
            .map_err(|err| HeaderError::BadSignature(err.to_string()))?;
        verify_signature(&public_key, &header.hash_for_signing(), &signature)
            .map_err(|err| HeaderError::BadSignature(err.to_string()))?;

        Ok(())
    }

    /// Proposer expected to sign the block that extends `header`.
    pub fn expected_proposer(
        &self,
        header: &BlockHeader,
        receive_time: i64,
    ) -> Result<ExpectedProposer, HeaderError> {
        let prev = self
            .view
            .get_header(&header.prev_block_hash)
            .map_err(|_| HeaderError::PrevMissing)?;
        self.elect_proposer(&prev, &header.prev_block_hash, receive_time)
    }

    fn elect_proposer(
        &self,
        prev: &BlockHeader,
        prev_hash: &BlockHash,
        receive_time: i64,
    ) -> Result<ExpectedProposer, HeaderError> {
        let genesis_hash = self.view.get_block_hash(0).map_err(lookup_failed)?;
        let genesis = self.view.get_block(&genesis_hash).map_err(lookup_failed)?;
        let prev_timestamp = self.view.get_block_time(prev_hash).map_err(lookup_failed)?;

        // A predecessor still carrying the genesis timestamp means the chain
        // has not produced a timed block yet; rotation starts from zero.
        let time_diff = if prev_timestamp == genesis.header.timestamp {
            0
        } else {
            receive_time - prev_timestamp
        };
        let time_slot = self.params.proposer_change_time_secs as i64;

        if time_diff >= time_slot {
            let snapshot_hash = self
                .view
                .get_block_hash(SNAPSHOT_PROPOSER_HEIGHT)
                .map_err(lookup_failed)?;
            let snapshot = self.view.get_block(&snapshot_hash).map_err(lookup_failed)?;
            let (public_key, chord_id) = snapshot.signer().map_err(lookup_failed)?;
            info!(
                snapshot_height = SNAPSHOT_PROPOSER_HEIGHT,
                public_key = %hex::encode(&public_key),
                chord_id = %hex::encode(&chord_id),
                "proposer rotated to snapshot block signer"
            );
            return Ok(ExpectedProposer {
                public_key,
                chord_id,
            });
        }

        match prev.winner_type {
            WinnerType::GenesisSigner => {
                let (public_key, chord_id) = genesis.signer().map_err(lookup_failed)?;
                info!(
                    public_key = %hex::encode(&public_key),
                    "expected signer is the genesis block proposer"
                );
                Ok(ExpectedProposer {
                    public_key,
                    chord_id,
                })
            }
            WinnerType::TxnSigner => {
                let txn = self
                    .view
                    .get_transaction(&prev.winner_hash)
                    .map_err(lookup_failed)?;
                let commit = match &txn.payload {
                    Payload::Commit(commit) => commit,
                    other => {
                        return Err(HeaderError::InvalidWinnerType(format!(
                            "winner transaction carries a {:?} payload, expected a commit",
                            other.kind()
                        )))
                    }
                };
                let sigchain = SigChain::from_bytes(&commit.sigchain)
                    .map_err(|err| HeaderError::ProposerLookup(err.to_string()))?;
                let (public_key, chord_id) = sigchain.miner().ok_or_else(|| {
                    HeaderError::ProposerLookup("sigchain has no relay elements".into())
                })?;
                info!(
                    winner_tx = %hex::encode(txn.hash()),
                    public_key = %hex::encode(public_key),
                    chord_id = %hex::encode(chord_id),
                    "expected signer extracted from sigchain transaction"
                );
                Ok(ExpectedProposer {
                    public_key: public_key.to_vec(),
                    chord_id: chord_id.to_vec(),
                })
            }
        }
    }

    pub fn check_transactions(&self, block: &Block) -> Result<(), TxError> {
        if block.transactions.is_empty() {
            return Err(TxError::EmptyBlock);
        }
        if block.transactions[0].payload_kind() != PayloadKind::Coinbase {
            return Err(TxError::MissingCoinbase);
        }
        for (index, tx) in block.transactions.iter().enumerate() {
            if index != 0 && tx.payload_kind() == PayloadKind::Coinbase {
                return Err(TxError::DuplicateCoinbase { index });
            }
            self.tx_validator
                .verify_transaction(tx)
                .map_err(|err| TxError::TxCheckFailed {
                    index,
                    reason: err.to_string(),
                })?;
            self.tx_validator
                .verify_transaction_with_ledger(tx)
                .map_err(|err| TxError::TxCheckFailed {
                    index,
                    reason: err.to_string(),
                })?;
        }
        self.tx_validator
            .verify_transactions_with_block(&block.transactions)
            .map_err(|err| TxError::BlockScopedTxCheckFailed(err.to_string()))?;
        Ok(())
    }

    /// Standalone tolerance check for peer-gossiped timestamps.
    pub fn check_timestamp(&self, timestamp: i64) -> Result<(), TimestampError> {
        self.check_timestamp_at(timestamp, unix_now())
    }

    fn check_timestamp_at(&self, timestamp: i64, now: i64) -> Result<(), TimestampError> {
        let tolerance = self.params.timestamp_tolerance_secs as i64;
        let earliest = now - tolerance;
        let latest = now + tolerance;
        if timestamp < earliest {
            return Err(TimestampError::Stale {
                timestamp,
                earliest,
            });
        }
        if timestamp > latest {
            return Err(TimestampError::Postdated { timestamp, latest });
        }
        Ok(())
    }
}

fn lookup_failed<E: std::fmt::Display>(err: E) -> HeaderError {
    HeaderError::ProposerLookup(err.to_string())
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
