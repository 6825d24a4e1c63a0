use shared::{
    domain::Pubkey,
    protocol::{GifPortalInstruction, SYSTEM_PROGRAM_ID},
};
use solana_sdk::{
    hash::Hash,
    message::Message,
    signature::{Keypair, Signer},
    signer::SignerError,
    transaction::Transaction,
};

use crate::program;

fn program_id() -> Pubkey {
    Pubkey::new_from_array([5u8; 32])
}

#[test]
fn initialize_message_puts_payer_first_and_requires_both_signers() {
    let user = Keypair::new();
    let base = Keypair::new();
    let ix = program::initialize(program_id(), base.pubkey(), user.pubkey()).expect("ix");
    let message = Message::new(&[ix], Some(&user.pubkey()));

    assert_eq!(message.header.num_required_signatures, 2);
    assert_eq!(message.header.num_readonly_signed_accounts, 0);
    assert_eq!(message.header.num_readonly_unsigned_accounts, 2);
    assert_eq!(message.account_keys[0], user.pubkey());
    assert_eq!(message.account_keys[1], base.pubkey());
    assert!(message.account_keys.contains(&SYSTEM_PROGRAM_ID));

    let compiled = &message.instructions[0];
    assert_eq!(
        message.account_keys[compiled.program_id_index as usize],
        program_id()
    );
    assert_eq!(
        GifPortalInstruction::decode(&compiled.data).expect("decode"),
        GifPortalInstruction::Initialize
    );
}

#[test]
fn transaction_verifies_only_once_every_signer_has_signed() {
    let user = Keypair::new();
    let base = Keypair::new();
    let blockhash = Hash::new_from_array([9u8; 32]);
    let ix = program::initialize(program_id(), base.pubkey(), user.pubkey()).expect("ix");
    let mut tx = Transaction::new_unsigned(Message::new_with_blockhash(
        &[ix],
        Some(&user.pubkey()),
        &blockhash,
    ));

    tx.try_partial_sign(&[&base], blockhash).expect("base signs");
    assert!(tx.verify().is_err());
    tx.try_partial_sign(&[&user], blockhash).expect("user signs");
    assert!(tx.verify().is_ok());

    let stranger = Keypair::new();
    assert!(matches!(
        tx.try_partial_sign(&[&stranger], blockhash),
        Err(SignerError::KeypairPubkeyMismatch)
    ));
}

#[test]
fn add_gif_needs_only_the_submitter_signature() {
    let user = Keypair::new();
    let base = Pubkey::new_unique();
    let ix = program::add_gif(program_id(), base, user.pubkey(), "https://example.com/a.gif")
        .expect("ix");
    assert!(!ix.accounts[0].is_signer);
    assert!(ix.accounts[0].is_writable);
    assert!(ix.accounts[1].is_signer);

    let message = Message::new(&[ix], Some(&user.pubkey()));
    assert_eq!(message.header.num_required_signatures, 1);
    assert_eq!(
        GifPortalInstruction::decode(&message.instructions[0].data).expect("decode"),
        GifPortalInstruction::AddGif {
            gif_link: "https://example.com/a.gif".to_string()
        }
    );
}
