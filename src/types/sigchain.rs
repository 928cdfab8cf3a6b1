use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::serialization::{
    read_hash, read_u32, read_var_bytes, read_var_uint, write_u32, write_var_bytes,
    write_var_uint, CodecResult,
};

/// One hop of a relay chain: the node that carried the packet, its overlay
/// identity, and its signature over the chain so far.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigChainElem {
    pub pubkey: Vec<u8>,
    pub chord_id: Vec<u8>,
    pub signature: Vec<u8>,
}

impl SigChainElem {
    pub fn serialize<W: Write>(&self, w: &mut W) -> CodecResult<()> {
        write_var_bytes(w, &self.pubkey)?;
        write_var_bytes(w, &self.chord_id)?;
        write_var_bytes(w, &self.signature)
    }

    pub fn deserialize<R: Read>(r: &mut R) -> CodecResult<Self> {
        let pubkey = read_var_bytes(r).map_err(|err| err.for_field("sigchain.elem.pubkey"))?;
        let chord_id =
            read_var_bytes(r).map_err(|err| err.for_field("sigchain.elem.chord_id"))?;
        let signature =
            read_var_bytes(r).map_err(|err| err.for_field("sigchain.elem.signature"))?;
        Ok(Self {
            pubkey,
            chord_id,
            signature,
        })
    }
}

/// Chained record of relay signatures embedded in a commit payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigChain {
    pub nonce: u32,
    pub data_size: u32,
    pub data_hash: [u8; 32],
    pub block_hash: [u8; 32],
    pub src_pubkey: Vec<u8>,
    pub dest_pubkey: Vec<u8>,
    pub elems: Vec<SigChainElem>,
}

impl SigChain {
    pub fn serialize<W: Write>(&self, w: &mut W) -> CodecResult<()> {
        write_u32(w, self.nonce)?;
        write_u32(w, self.data_size)?;
        w.write_all(&self.data_hash)?;
        w.write_all(&self.block_hash)?;
        write_var_bytes(w, &self.src_pubkey)?;
        write_var_bytes(w, &self.dest_pubkey)?;
        write_var_uint(w, self.elems.len() as u64)?;
        for elem in &self.elems {
            elem.serialize(w)?;
        }
        Ok(())
    }

    pub fn deserialize<R: Read>(r: &mut R) -> CodecResult<Self> {
        let nonce = read_u32(r).map_err(|err| err.for_field("sigchain.nonce"))?;
        let data_size = read_u32(r).map_err(|err| err.for_field("sigchain.data_size"))?;
        let data_hash = read_hash(r).map_err(|err| err.for_field("sigchain.data_hash"))?;
        let block_hash = read_hash(r).map_err(|err| err.for_field("sigchain.block_hash"))?;
        let src_pubkey =
            read_var_bytes(r).map_err(|err| err.for_field("sigchain.src_pubkey"))?;
        let dest_pubkey =
            read_var_bytes(r).map_err(|err| err.for_field("sigchain.dest_pubkey"))?;
        let count = read_var_uint(r).map_err(|err| err.for_field("sigchain.elems"))?;
        let mut elems = Vec::with_capacity(count.min(1024) as usize);
        for _ in 0..count {
            elems.push(SigChainElem::deserialize(r)?);
        }
        Ok(Self {
            nonce,
            data_size,
            data_hash,
            block_hash,
            src_pubkey,
            dest_pubkey,
            elems,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.serialize(&mut buf)
            .expect("serializing sigchain into memory");
        buf
    }

    pub fn from_bytes(data: &[u8]) -> CodecResult<Self> {
        Self::deserialize(&mut &data[..])
    }

    /// Terminal relay of the chain: the node eligible to propose the next
    /// block when this sigchain wins.
    pub fn miner(&self) -> Option<(&[u8], &[u8])> {
        self.elems
            .last()
            .map(|elem| (elem.pubkey.as_slice(), elem.chord_id.as_slice()))
    }
}
