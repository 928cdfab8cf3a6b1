use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::errors::ChainResult;
use crate::serialization::{read_var_bytes, write_var_bytes, CodecResult};

/// Relay-proof payload: a serialized sigchain plus the key of the node that
/// submitted it. The terminal signer of the embedded sigchain is the
/// proposer candidate for the next block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sigchain: Vec<u8>,
    pub submitter: Vec<u8>,
}

impl Commit {
    pub fn serialize<W: Write>(&self, w: &mut W) -> CodecResult<()> {
        write_var_bytes(w, &self.sigchain)?;
        write_var_bytes(w, &self.submitter)
    }

    pub fn deserialize<R: Read>(r: &mut R) -> CodecResult<Self> {
        let sigchain = read_var_bytes(r).map_err(|err| err.for_field("commit.sigchain"))?;
        let submitter = read_var_bytes(r).map_err(|err| err.for_field("commit.submitter"))?;
        Ok(Self {
            sigchain,
            submitter,
        })
    }

    pub fn to_json(&self) -> ChainResult<Vec<u8>> {
        let info = CommitInfo {
            sig_chain: hex::encode(&self.sigchain),
            submitter: hex::encode(&self.submitter),
        };
        Ok(serde_json::to_vec(&info)?)
    }
}

/// JSON mirror of [`Commit`] with both fields hex-encoded.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CommitInfo {
    pub sig_chain: String,
    pub submitter: String,
}
