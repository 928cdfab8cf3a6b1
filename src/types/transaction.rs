use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::crypto::sha256;
use crate::payload::{Payload, PayloadKind};
use crate::serialization::{read_var_bytes, write_var_bytes, CodecResult};

pub type TxHash = [u8; 32];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub payload: Payload,
    pub attributes: Vec<u8>,
}

impl Transaction {
    pub fn new(payload: Payload) -> Self {
        Self {
            payload,
            attributes: Vec::new(),
        }
    }

    pub fn payload_kind(&self) -> PayloadKind {
        self.payload.kind()
    }

    pub fn serialize<W: Write>(&self, w: &mut W) -> CodecResult<()> {
        self.payload.serialize(w)?;
        write_var_bytes(w, &self.attributes)
    }

    pub fn deserialize<R: Read>(r: &mut R) -> CodecResult<Self> {
        let payload = Payload::deserialize(r)?;
        let attributes =
            read_var_bytes(r).map_err(|err| err.for_field("transaction.attributes"))?;
        Ok(Self {
            payload,
            attributes,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.serialize(&mut buf)
            .expect("serializing transaction into memory");
        buf
    }

    pub fn hash(&self) -> TxHash {
        sha256(&self.to_bytes())
    }
}
