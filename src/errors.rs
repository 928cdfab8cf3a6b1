use std::io;

use thiserror::Error;

use crate::serialization::CodecError;
use crate::validation::{HeaderError, TimestampError, TxError};

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("header rejected: {0}")]
    Header(#[from] HeaderError),
    #[error("transactions rejected: {0}")]
    Transactions(#[from] TxError),
    #[error("timestamp rejected: {0}")]
    Timestamp(#[from] TimestampError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("cryptography error: {0}")]
    Crypto(String),
    #[error("transaction rejected: {0}")]
    Transaction(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type ChainResult<T> = Result<T, ChainError>;
