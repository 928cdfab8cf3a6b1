use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::crypto::{chord_id_from_public_key, sha256};
use crate::errors::{ChainError, ChainResult};
use crate::serialization::{
    read_hash, read_i64, read_u32, read_u8, read_var_bytes, read_var_uint, write_i64, write_u32,
    write_u8, write_var_bytes, write_var_uint, CodecError, CodecResult,
};
use crate::types::Transaction;

pub type BlockHash = [u8; 32];

/// Tag selecting how the next expected proposer is encoded in a header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinnerType {
    /// The genesis proposer keeps signing; only allowed during the first
    /// few heights of the chain.
    GenesisSigner,
    /// The winner hash names a relay-proof transaction whose terminal
    /// signer proposes the next block.
    TxnSigner,
}

impl WinnerType {
    pub fn as_byte(self) -> u8 {
        match self {
            WinnerType::GenesisSigner => 0,
            WinnerType::TxnSigner => 1,
        }
    }

    pub fn from_byte(byte: u8) -> CodecResult<Self> {
        match byte {
            0 => Ok(WinnerType::GenesisSigner),
            1 => Ok(WinnerType::TxnSigner),
            other => Err(CodecError::Malformed(format!(
                "unknown winner type {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub prev_block_hash: BlockHash,
    pub height: u32,
    pub timestamp: i64,
    pub winner_hash: BlockHash,
    pub winner_type: WinnerType,
    pub signer: Vec<u8>,
    pub signature: Vec<u8>,
}

impl BlockHeader {
    /// Canonical encoding of everything a signature covers.
    pub fn serialize_unsigned<W: Write>(&self, w: &mut W) -> CodecResult<()> {
        w.write_all(&self.prev_block_hash)?;
        write_u32(w, self.height)?;
        write_i64(w, self.timestamp)?;
        w.write_all(&self.winner_hash)?;
        write_u8(w, self.winner_type.as_byte())?;
        write_var_bytes(w, &self.signer)
    }

    pub fn serialize<W: Write>(&self, w: &mut W) -> CodecResult<()> {
        self.serialize_unsigned(w)?;
        write_var_bytes(w, &self.signature)
    }

    pub fn deserialize<R: Read>(r: &mut R) -> CodecResult<Self> {
        let prev_block_hash =
            read_hash(r).map_err(|err| err.for_field("header.prev_block_hash"))?;
        let height = read_u32(r).map_err(|err| err.for_field("header.height"))?;
        let timestamp = read_i64(r).map_err(|err| err.for_field("header.timestamp"))?;
        let winner_hash = read_hash(r).map_err(|err| err.for_field("header.winner_hash"))?;
        let winner_type = WinnerType::from_byte(
            read_u8(r).map_err(|err| err.for_field("header.winner_type"))?,
        )?;
        let signer = read_var_bytes(r).map_err(|err| err.for_field("header.signer"))?;
        let signature = read_var_bytes(r).map_err(|err| err.for_field("header.signature"))?;
        Ok(Self {
            prev_block_hash,
            height,
            timestamp,
            winner_hash,
            winner_type,
            signer,
            signature,
        })
    }

    /// Digest the proposer signs: SHA-256 over the unsigned serialization.
    pub fn hash_for_signing(&self) -> [u8; 32] {
        let mut buf = Vec::new();
        self.serialize_unsigned(&mut buf)
            .expect("serializing header into memory");
        sha256(&buf)
    }

    pub fn hash(&self) -> BlockHash {
        let mut buf = Vec::new();
        self.serialize(&mut buf)
            .expect("serializing header into memory");
        sha256(&buf)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn serialize<W: Write>(&self, w: &mut W) -> CodecResult<()> {
        self.header.serialize(w)?;
        write_var_uint(w, self.transactions.len() as u64)?;
        for tx in &self.transactions {
            tx.serialize(w)?;
        }
        Ok(())
    }

    pub fn deserialize<R: Read>(r: &mut R) -> CodecResult<Self> {
        let header = BlockHeader::deserialize(r)?;
        let count = read_var_uint(r).map_err(|err| err.for_field("block.transactions"))?;
        let mut transactions = Vec::with_capacity(count.min(1024) as usize);
        for _ in 0..count {
            transactions.push(Transaction::deserialize(r)?);
        }
        Ok(Self {
            header,
            transactions,
        })
    }

    pub fn hash(&self) -> BlockHash {
        self.header.hash()
    }

    /// Public key and overlay identity of the block's proposer.
    pub fn signer(&self) -> ChainResult<(Vec<u8>, Vec<u8>)> {
        if self.header.signer.is_empty() {
            return Err(ChainError::Crypto("block header carries no signer".into()));
        }
        let chord_id = chord_id_from_public_key(&self.header.signer);
        Ok((self.header.signer.clone(), chord_id.to_vec()))
    }
}

/// A received block paired with the wall-clock moment it arrived. The
/// receive time drives proposer rotation, not the header timestamp.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VBlock {
    pub block: Block,
    pub receive_time: i64,
}
