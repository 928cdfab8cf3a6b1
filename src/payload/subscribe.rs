use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::errors::ChainResult;
use crate::serialization::{
    read_u32, read_var_bytes, read_var_string, write_u32, write_var_bytes, write_var_string,
    CodecResult,
};

/// Topic subscription record. The canonical exemplar of the payload wire
/// format: length-prefixed byte fields, then fixed-width integers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscribe {
    pub subscriber: Vec<u8>,
    pub identifier: String,
    pub topic: String,
    pub bucket: u32,
    pub duration: u32,
}

impl Subscribe {
    pub fn serialize<W: Write>(&self, w: &mut W) -> CodecResult<()> {
        write_var_bytes(w, &self.subscriber)?;
        write_var_string(w, &self.identifier)?;
        write_var_string(w, &self.topic)?;
        write_u32(w, self.bucket)?;
        write_u32(w, self.duration)
    }

    pub fn deserialize<R: Read>(r: &mut R) -> CodecResult<Self> {
        let subscriber =
            read_var_bytes(r).map_err(|err| err.for_field("subscribe.subscriber"))?;
        let identifier =
            read_var_string(r).map_err(|err| err.for_field("subscribe.identifier"))?;
        let topic = read_var_string(r).map_err(|err| err.for_field("subscribe.topic"))?;
        let bucket = read_u32(r).map_err(|err| err.for_field("subscribe.bucket"))?;
        let duration = read_u32(r).map_err(|err| err.for_field("subscribe.duration"))?;
        Ok(Self {
            subscriber,
            identifier,
            topic,
            bucket,
            duration,
        })
    }

    /// Addressable identity of the subscriber: `identifier.pubkey-hex`, or
    /// just the hex when no identifier is set.
    pub fn subscriber_string(&self) -> String {
        let subscriber = hex::encode(&self.subscriber);
        if self.identifier.is_empty() {
            subscriber
        } else {
            format!("{}.{}", self.identifier, subscriber)
        }
    }

    pub fn to_json(&self) -> ChainResult<Vec<u8>> {
        let info = SubscribeInfo {
            subscriber: hex::encode(&self.subscriber),
            identifier: self.identifier.clone(),
            topic: self.topic.clone(),
            bucket: self.bucket,
            duration: self.duration,
        };
        Ok(serde_json::to_vec(&info)?)
    }

    pub fn from_json(data: &[u8]) -> ChainResult<Self> {
        let info: SubscribeInfo = serde_json::from_slice(data)?;
        Ok(Self {
            // malformed hex degrades to an empty subscriber; existing peers
            // emit and accept this shape
            subscriber: hex::decode(&info.subscriber).unwrap_or_default(),
            identifier: info.identifier,
            topic: info.topic,
            bucket: info.bucket,
            duration: info.duration,
        })
    }
}

/// JSON mirror of [`Subscribe`] with the subscriber key hex-encoded.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubscribeInfo {
    pub subscriber: String,
    pub identifier: String,
    pub topic: String,
    pub bucket: u32,
    pub duration: u32,
}
