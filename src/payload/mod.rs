mod commit;
mod subscribe;

pub use commit::{Commit, CommitInfo};
pub use subscribe::{Subscribe, SubscribeInfo};

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::serialization::{
    read_u64, read_u8, read_var_bytes, write_u64, write_u8, write_var_bytes, CodecError,
    CodecResult,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadKind {
    Coinbase,
    Transfer,
    Commit,
    Subscribe,
}

impl PayloadKind {
    pub fn as_byte(self) -> u8 {
        match self {
            PayloadKind::Coinbase => 0,
            PayloadKind::Transfer => 1,
            PayloadKind::Commit => 2,
            PayloadKind::Subscribe => 3,
        }
    }

    pub fn from_byte(byte: u8) -> CodecResult<Self> {
        match byte {
            0 => Ok(PayloadKind::Coinbase),
            1 => Ok(PayloadKind::Transfer),
            2 => Ok(PayloadKind::Commit),
            3 => Ok(PayloadKind::Subscribe),
            other => Err(CodecError::Malformed(format!(
                "unknown payload kind {other}"
            ))),
        }
    }
}

/// Block-minting payload. Appears exactly once per block, at position 0.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coinbase {
    pub recipient: Vec<u8>,
    pub amount: u64,
}

impl Coinbase {
    pub fn serialize<W: Write>(&self, w: &mut W) -> CodecResult<()> {
        write_var_bytes(w, &self.recipient)?;
        write_u64(w, self.amount)
    }

    pub fn deserialize<R: Read>(r: &mut R) -> CodecResult<Self> {
        let recipient = read_var_bytes(r).map_err(|err| err.for_field("coinbase.recipient"))?;
        let amount = read_u64(r).map_err(|err| err.for_field("coinbase.amount"))?;
        Ok(Self { recipient, amount })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub sender: Vec<u8>,
    pub recipient: Vec<u8>,
    pub amount: u64,
}

impl Transfer {
    pub fn serialize<W: Write>(&self, w: &mut W) -> CodecResult<()> {
        write_var_bytes(w, &self.sender)?;
        write_var_bytes(w, &self.recipient)?;
        write_u64(w, self.amount)
    }

    pub fn deserialize<R: Read>(r: &mut R) -> CodecResult<Self> {
        let sender = read_var_bytes(r).map_err(|err| err.for_field("transfer.sender"))?;
        let recipient = read_var_bytes(r).map_err(|err| err.for_field("transfer.recipient"))?;
        let amount = read_u64(r).map_err(|err| err.for_field("transfer.amount"))?;
        Ok(Self {
            sender,
            recipient,
            amount,
        })
    }
}

/// Tagged payload sum. Unknown kinds are rejected at the codec layer, so a
/// decoded payload always carries a well-formed variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    Coinbase(Coinbase),
    Transfer(Transfer),
    Commit(Commit),
    Subscribe(Subscribe),
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Coinbase(_) => PayloadKind::Coinbase,
            Payload::Transfer(_) => PayloadKind::Transfer,
            Payload::Commit(_) => PayloadKind::Commit,
            Payload::Subscribe(_) => PayloadKind::Subscribe,
        }
    }

    pub fn serialize<W: Write>(&self, w: &mut W) -> CodecResult<()> {
        write_u8(w, self.kind().as_byte())?;
        match self {
            Payload::Coinbase(coinbase) => coinbase.serialize(w),
            Payload::Transfer(transfer) => transfer.serialize(w),
            Payload::Commit(commit) => commit.serialize(w),
            Payload::Subscribe(subscribe) => subscribe.serialize(w),
        }
    }

    pub fn deserialize<R: Read>(r: &mut R) -> CodecResult<Self> {
        let kind = read_u8(r).map_err(|err| err.for_field("payload.kind"))?;
        match PayloadKind::from_byte(kind)? {
            PayloadKind::Coinbase => Ok(Payload::Coinbase(Coinbase::deserialize(r)?)),
            PayloadKind::Transfer => Ok(Payload::Transfer(Transfer::deserialize(r)?)),
            PayloadKind::Commit => Ok(Payload::Commit(Commit::deserialize(r)?)),
            PayloadKind::Subscribe => Ok(Payload::Subscribe(Subscribe::deserialize(r)?)),
        }
    }
}
