//! Admission core of a proof-of-relay blockchain node.
//!
//! The crate validates received blocks against the local chain tip and
//! derives the proposer the network expects to have signed them. The
//! [`validation`] module carries the admission engine, [`chain`] the read
//! contract it demands of block storage, [`payload`] and [`types`] the wire
//! records it operates on, and [`serialization`] the varint codec beneath
//! every binary format.
//!
//! Applications typically construct a [`validation::BlockAdmission`] over a
//! [`chain::ChainView`] implementation and feed it `(block, receive_time)`
//! pairs as they arrive from peers.

pub mod chain;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod payload;
pub mod serialization;
pub mod types;
pub mod validation;
