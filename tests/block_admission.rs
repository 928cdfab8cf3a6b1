use ed25519_dalek::{Keypair, PublicKey, SecretKey, Signer};

use por_chain::chain::MemoryChainStore;
use por_chain::config::ConsensusParams;
use por_chain::errors::{ChainError, ChainResult};
use por_chain::payload::{Coinbase, Commit, Payload, Subscribe};
use por_chain::types::{
    Block, BlockHeader, SigChain, SigChainElem, Transaction, VBlock, WinnerType,
};
use por_chain::validation::{BlockAdmission, HeaderError, TransactionValidator};

const GENESIS_TIMESTAMP: i64 = 1_000;

struct AcceptAll;

impl TransactionValidator for AcceptAll {
    fn verify_transaction(&self, _tx: &Transaction) -> ChainResult<()> {
        Ok(())
    }

    fn verify_transaction_with_ledger(&self, _tx: &Transaction) -> ChainResult<()> {
        Ok(())
    }

    fn verify_transactions_with_block(&self, _txs: &[Transaction]) -> ChainResult<()> {
        Ok(())
    }
}

fn keypair(seed: u8) -> Keypair {
    let secret = SecretKey::from_bytes(&[seed; 32]).expect("secret");
    let public = PublicKey::from(&secret);
    Keypair { secret, public }
}

fn sign_header(header: &mut BlockHeader, proposer: &Keypair) {
    header.signer = proposer.public.to_bytes().to_vec();
    let digest = header.hash_for_signing();
    header.signature = proposer.sign(&digest).to_bytes().to_vec();
}

fn coinbase_block(header: BlockHeader) -> Block {
    Block {
        transactions: vec![Transaction::new(Payload::Coinbase(Coinbase {
            recipient: header.signer.clone(),
            amount: 5,
        }))],
        header,
    }
}

fn genesis_block(proposer: &Keypair) -> Block {
    let mut header = BlockHeader {
        prev_block_hash: [0u8; 32],
        height: 0,
        timestamp: GENESIS_TIMESTAMP,
        winner_hash: [0u8; 32],
        winner_type: WinnerType::GenesisSigner,
        signer: Vec::new(),
        signature: Vec::new(),
    };
    sign_header(&mut header, proposer);
    coinbase_block(header)
}

fn child_header(
    prev: &Block,
    timestamp: i64,
    winner_type: WinnerType,
    winner_hash: [u8; 32],
) -> BlockHeader {
    BlockHeader {
        prev_block_hash: prev.hash(),
        height: prev.header.height + 1,
        timestamp,
        winner_hash,
        winner_type,
        signer: Vec::new(),
        signature: Vec::new(),
    }
}

fn signed_child(
    prev: &Block,
    timestamp: i64,
    winner_type: WinnerType,
    winner_hash: [u8; 32],
    proposer: &Keypair,
) -> Block {
    let mut header = child_header(prev, timestamp, winner_type, winner_hash);
    sign_header(&mut header, proposer);
    coinbase_block(header)
}

/// Genesis plus two directly-inserted blocks; returns the tip (height 2).
fn seed_chain(
    store: &MemoryChainStore,
    proposer: &Keypair,
    tip_timestamp: i64,
    tip_winner_type: WinnerType,
    tip_winner_hash: [u8; 32],
) -> Block {
    let genesis = genesis_block(proposer);
    store.insert_block(genesis.clone());
    let block1 = signed_child(
        &genesis,
        GENESIS_TIMESTAMP + 1,
        WinnerType::GenesisSigner,
        [0u8; 32],
        proposer,
    );
    store.insert_block(block1.clone());
    let block2 = signed_child(
        &block1,
        tip_timestamp,
        tip_winner_type,
        tip_winner_hash,
        proposer,
    );
    store.insert_block(block2.clone());
    block2
}

#[test]
fn genesis_block_is_admitted_without_predecessor_state() {
    let store = MemoryChainStore::new();
    let admission = BlockAdmission::new(&store, &AcceptAll, ConsensusParams::default());
    let genesis = genesis_block(&keypair(1));
    admission
        .admit(&VBlock {
            block: genesis,
            receive_time: GENESIS_TIMESTAMP,
        })
        .unwrap();
}

#[test]
fn chain_extends_with_contiguous_heights() {
    let store = MemoryChainStore::new();
    let proposer = keypair(1);
    let admission = BlockAdmission::new(&store, &AcceptAll, ConsensusParams::default());

    let genesis = genesis_block(&proposer);
    store.insert_block(genesis.clone());
    let mut tip = genesis;
    for step in 1..=3 {
        let timestamp = GENESIS_TIMESTAMP + i64::from(step);
        let block = signed_child(&tip, timestamp, WinnerType::GenesisSigner, [0u8; 32], &proposer);
        admission
            .admit(&VBlock {
                block: block.clone(),
                receive_time: timestamp,
            })
            .unwrap();
        store.insert_block(block.clone());
        assert_eq!(block.header.height, tip.header.height + 1);
        tip = block;
    }
    assert_eq!(store.height(), Some(3));
}

#[test]
fn out_of_order_timestamp_is_rejected() {
    let store = MemoryChainStore::new();
    let proposer = keypair(1);
    let admission = BlockAdmission::new(&store, &AcceptAll, ConsensusParams::default());

    let genesis = genesis_block(&proposer);
    store.insert_block(genesis.clone());
    let candidate = signed_child(
        &genesis,
        GENESIS_TIMESTAMP - 1,
        WinnerType::GenesisSigner,
        [0u8; 32],
        &proposer,
    );
    let err = admission
        .check_header(&candidate.header, GENESIS_TIMESTAMP)
        .unwrap_err();
    assert!(matches!(err, HeaderError::NonMonotonicTimestamp { .. }));
}

#[test]
fn postdated_timestamp_is_rejected() {
    let store = MemoryChainStore::new();
    let proposer = keypair(1);
    let admission = BlockAdmission::new(&store, &AcceptAll, ConsensusParams::default());

    let genesis = genesis_block(&proposer);
    store.insert_block(genesis.clone());
    let far_future = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
        + 100;
    let candidate = signed_child(
        &genesis,
        far_future,
        WinnerType::GenesisSigner,
        [0u8; 32],
        &proposer,
    );
    let err = admission
        .check_header(&candidate.header, far_future)
        .unwrap_err();
    assert!(matches!(err, HeaderError::PostdatedTimestamp { .. }));
}

#[test]
fn height_gap_is_rejected() {
    let store = MemoryChainStore::new();
    let proposer = keypair(1);
    let admission = BlockAdmission::new(&store, &AcceptAll, ConsensusParams::default());

    let genesis = genesis_block(&proposer);
    store.insert_block(genesis.clone());
    let mut candidate = signed_child(
        &genesis,
        GENESIS_TIMESTAMP + 1,
        WinnerType::GenesisSigner,
        [0u8; 32],
        &proposer,
    );
    candidate.header.height = 2;
    sign_header(&mut candidate.header, &proposer);
    let err = admission
        .check_header(&candidate.header, GENESIS_TIMESTAMP + 1)
        .unwrap_err();
    assert!(matches!(
        err,
        HeaderError::HeightMismatch { prev: 0, found: 2 }
    ));
}

#[test]
fn genesis_winner_type_is_bounded_by_height() {
    let store = MemoryChainStore::new();
    let proposer = keypair(1);
    let admission = BlockAdmission::new(&store, &AcceptAll, ConsensusParams::default());

    let tip = seed_chain(
        &store,
        &proposer,
        GENESIS_TIMESTAMP + 2,
        WinnerType::GenesisSigner,
        [0u8; 32],
    );
    // Height 3 still allows the genesis signer.
    let block3 = signed_child(
        &tip,
        GENESIS_TIMESTAMP + 3,
        WinnerType::GenesisSigner,
        [0u8; 32],
        &proposer,
    );
    admission
        .check_header(&block3.header, GENESIS_TIMESTAMP + 3)
        .unwrap();
    store.insert_block(block3.clone());

    // Height 4 does not.
    let block4 = signed_child(
        &block3,
        GENESIS_TIMESTAMP + 4,
        WinnerType::GenesisSigner,
        [0u8; 32],
        &proposer,
    );
    let err = admission
        .check_header(&block4.header, GENESIS_TIMESTAMP + 4)
        .unwrap_err();
    assert!(matches!(err, HeaderError::InvalidWinnerType(_)));
}

#[test]
fn stalled_predecessor_at_genesis_time_elects_the_genesis_signer() {
    let store = MemoryChainStore::new();
    let proposer = keypair(1);
    let admission = BlockAdmission::new(&store, &AcceptAll, ConsensusParams::default());

    // Tip at height 2 still carries the genesis timestamp; the block is
    // received 120 s later with a 60 s slot.
    let tip = seed_chain(
        &store,
        &proposer,
        GENESIS_TIMESTAMP,
        WinnerType::GenesisSigner,
        [0u8; 32],
    );
    let receive_time = GENESIS_TIMESTAMP + 120;
    let expected = admission
        .expected_proposer(
            &child_header(&tip, GENESIS_TIMESTAMP + 121, WinnerType::GenesisSigner, [0u8; 32]),
            receive_time,
        )
        .unwrap();
    assert_eq!(expected.public_key, proposer.public.to_bytes().to_vec());
}

#[test]
fn stalled_proposer_rotates_to_the_snapshot_block_signer() {
    let store = MemoryChainStore::new();
    let proposer = keypair(1);
    let impostor = keypair(2);
    let admission = BlockAdmission::new(&store, &AcceptAll, ConsensusParams::default());

    // Tip timestamp is past genesis, and the receive time overshoots the
    // 60 s slot, so the election falls back to the signer of block 0.
    let tip = seed_chain(
        &store,
        &proposer,
        GENESIS_TIMESTAMP + 1_000,
        WinnerType::GenesisSigner,
        [0u8; 32],
    );
    let receive_time = tip.header.timestamp + 120;

    let stale_candidate = signed_child(
        &tip,
        tip.header.timestamp + 121,
        WinnerType::GenesisSigner,
        [0u8; 32],
        &impostor,
    );
    let err = admission
        .check_header(&stale_candidate.header, receive_time)
        .unwrap_err();
    assert!(matches!(err, HeaderError::WrongSigner { .. }));

    let rotated = signed_child(
        &tip,
        tip.header.timestamp + 121,
        WinnerType::GenesisSigner,
        [0u8; 32],
        &proposer,
    );
    admission.check_header(&rotated.header, receive_time).unwrap();
}

#[test]
fn sigchain_winner_elects_the_terminal_relay() {
    let store = MemoryChainStore::new();
    let proposer = keypair(1);
    let miner = keypair(3);
    let impostor = keypair(4);
    let admission = BlockAdmission::new(&store, &AcceptAll, ConsensusParams::default());

    let sigchain = SigChain {
        nonce: 7,
        data_size: 128,
        data_hash: [1u8; 32],
        block_hash: [2u8; 32],
        src_pubkey: keypair(5).public.to_bytes().to_vec(),
        dest_pubkey: keypair(6).public.to_bytes().to_vec(),
        elems: vec![
            SigChainElem {
                pubkey: keypair(5).public.to_bytes().to_vec(),
                chord_id: vec![5u8; 32],
                signature: vec![0u8; 64],
            },
            SigChainElem {
                pubkey: miner.public.to_bytes().to_vec(),
                chord_id: vec![3u8; 32],
                signature: vec![0u8; 64],
            },
        ],
    };
    let winner_tx = Transaction::new(Payload::Commit(Commit {
        sigchain: sigchain.to_bytes(),
        submitter: keypair(5).public.to_bytes().to_vec(),
    }));
    let winner_hash = winner_tx.hash();
    store.insert_transaction(winner_tx);

    let tip = seed_chain(
        &store,
        &proposer,
        GENESIS_TIMESTAMP + 2,
        WinnerType::TxnSigner,
        winner_hash,
    );

    let expected = admission
        .expected_proposer(
            &child_header(&tip, GENESIS_TIMESTAMP + 3, WinnerType::GenesisSigner, [0u8; 32]),
            GENESIS_TIMESTAMP + 3,
        )
        .unwrap();
    assert_eq!(expected.public_key, miner.public.to_bytes().to_vec());
    assert_eq!(expected.chord_id, vec![3u8; 32]);

    let forged = signed_child(
        &tip,
        GENESIS_TIMESTAMP + 3,
        WinnerType::GenesisSigner,
        [0u8; 32],
        &impostor,
    );
    let err = admission
        .check_header(&forged.header, GENESIS_TIMESTAMP + 3)
        .unwrap_err();
    assert!(matches!(err, HeaderError::WrongSigner { .. }));

    let legitimate = signed_child(
        &tip,
        GENESIS_TIMESTAMP + 3,
        WinnerType::GenesisSigner,
        [0u8; 32],
        &miner,
    );
    admission
        .check_header(&legitimate.header, GENESIS_TIMESTAMP + 3)
        .unwrap();
}

#[test]
fn non_commit_winner_transaction_is_rejected() {
    let store = MemoryChainStore::new();
    let proposer = keypair(1);
    let admission = BlockAdmission::new(&store, &AcceptAll, ConsensusParams::default());

    let winner_tx = Transaction::new(Payload::Subscribe(Subscribe {
        subscriber: vec![1u8; 32],
        identifier: String::new(),
        topic: "relay".into(),
        bucket: 0,
        duration: 1,
    }));
    let winner_hash = winner_tx.hash();
    store.insert_transaction(winner_tx);

    let tip = seed_chain(
        &store,
        &proposer,
        GENESIS_TIMESTAMP + 2,
        WinnerType::TxnSigner,
        winner_hash,
    );
    let candidate = signed_child(
        &tip,
        GENESIS_TIMESTAMP + 3,
        WinnerType::GenesisSigner,
        [0u8; 32],
        &proposer,
    );
    let err = admission
        .check_header(&candidate.header, GENESIS_TIMESTAMP + 3)
        .unwrap_err();
    assert!(matches!(err, HeaderError::InvalidWinnerType(_)));
}

#[test]
fn tampered_signature_is_rejected() {
    let store = MemoryChainStore::new();
    let proposer = keypair(1);
    let admission = BlockAdmission::new(&store, &AcceptAll, ConsensusParams::default());

    let genesis = genesis_block(&proposer);
    store.insert_block(genesis.clone());
    let mut candidate = signed_child(
        &genesis,
        GENESIS_TIMESTAMP + 1,
        WinnerType::GenesisSigner,
        [0u8; 32],
        &proposer,
    );
    candidate.header.signature[0] ^= 0xff;
    let err = admission
        .check_header(&candidate.header, GENESIS_TIMESTAMP + 1)
        .unwrap_err();
    assert!(matches!(err, HeaderError::BadSignature(_)));
}

#[test]
fn admission_checks_the_header_before_transactions() {
    let store = MemoryChainStore::new();
    let proposer = keypair(1);
    let impostor = keypair(2);
    let admission = BlockAdmission::new(&store, &AcceptAll, ConsensusParams::default());

    let genesis = genesis_block(&proposer);
    store.insert_block(genesis.clone());
    // Forged signer and a missing coinbase at once: the header verdict wins.
    let mut block = signed_child(
        &genesis,
        GENESIS_TIMESTAMP + 1,
        WinnerType::GenesisSigner,
        [0u8; 32],
        &impostor,
    );
    block.transactions.clear();
    let err = admission
        .admit(&VBlock {
            block,
            receive_time: GENESIS_TIMESTAMP + 1,
        })
        .unwrap_err();
    assert!(matches!(err, ChainError::Header(_)));
}
