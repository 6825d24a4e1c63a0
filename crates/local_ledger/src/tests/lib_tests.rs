use super::*;
use chain::{program, Instruction, Keypair, Signer};

fn program_id() -> Pubkey {
    Pubkey::new_from_array([42u8; 32])
}

fn sign(message: Message, signers: &[&Keypair]) -> Transaction {
    let blockhash = message.recent_blockhash;
    let mut tx = Transaction::new_unsigned(message);
    for signer in signers {
        tx.try_partial_sign(&[*signer], blockhash).expect("signer");
    }
    tx
}

async fn signed(
    ledger: &LocalLedger,
    ix: Instruction,
    payer: &Keypair,
    extra_signers: &[&Keypair],
) -> Transaction {
    let blockhash = ledger.latest_blockhash().await.expect("blockhash");
    let message = Message::new_with_blockhash(&[ix], Some(&payer.pubkey()), &blockhash);
    let mut signers = vec![payer];
    signers.extend_from_slice(extra_signers);
    sign(message, &signers)
}

async fn initialized(ledger: &LocalLedger, user: &Keypair, base: &Keypair) {
    let tx = signed(
        ledger,
        program::initialize(program_id(), base.pubkey(), user.pubkey()).expect("ix"),
        user,
        &[base],
    )
    .await;
    ledger.send_and_confirm(&tx).await.expect("initialize");
}

#[tokio::test]
async fn initialize_creates_empty_program_owned_account() {
    let ledger = LocalLedger::new(program_id());
    let user = Keypair::new();
    let base = Keypair::new();

    assert!(ledger
        .get_account(&base.pubkey())
        .await
        .expect("read")
        .is_none());
    initialized(&ledger, &user, &base).await;

    let account = ledger.account(&base.pubkey()).await.expect("created");
    assert_eq!(account.owner, program_id());
    assert_eq!(account.data.len(), BASE_ACCOUNT_SPACE);
    assert_eq!(account.lamports, BASE_ACCOUNT_RENT_LAMPORTS);
    assert_eq!(
        ledger.base_account(&base.pubkey()).await,
        Some(BaseAccount::default())
    );
}

#[tokio::test]
async fn second_initialize_fails_and_leaves_account_untouched() {
    let ledger = LocalLedger::new(program_id());
    let user = Keypair::new();
    let base = Keypair::new();
    initialized(&ledger, &user, &base).await;

    let add = signed(
        &ledger,
        program::add_gif(program_id(), base.pubkey(), user.pubkey(), "https://example.com/a.gif")
            .expect("ix"),
        &user,
        &[],
    )
    .await;
    ledger.send_and_confirm(&add).await.expect("add gif");

    let again = signed(
        &ledger,
        program::initialize(program_id(), base.pubkey(), user.pubkey()).expect("ix"),
        &user,
        &[&base],
    )
    .await;
    let err = ledger.send_and_confirm(&again).await.expect_err("reinit");
    match err {
        TransportError::TransactionFailed { reason } => {
            assert!(reason.contains("already in use"), "{reason}")
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(
        ledger
            .base_account(&base.pubkey())
            .await
            .expect("account")
            .total_gifs,
        1
    );
}

#[tokio::test]
async fn add_gif_appends_in_order_with_submitter() {
    let ledger = LocalLedger::new(program_id());
    let alice = Keypair::new();
    let bob = Keypair::new();
    let base = Keypair::new();
    initialized(&ledger, &alice, &base).await;

    for (user, link) in [(&alice, "https://example.com/1.gif"), (&bob, "https://example.com/2.gif")] {
        let tx = signed(
            &ledger,
            program::add_gif(program_id(), base.pubkey(), user.pubkey(), link).expect("ix"),
            user,
            &[],
        )
        .await;
        ledger.send_and_confirm(&tx).await.expect("add gif");
    }

    let account = ledger.base_account(&base.pubkey()).await.expect("account");
    assert_eq!(account.total_gifs, 2);
    assert_eq!(account.gif_list[0].user_address, alice.pubkey());
    assert_eq!(account.gif_list[1].user_address, bob.pubkey());
    assert_eq!(account.gif_list[1].gif_link, "https://example.com/2.gif");
}

#[tokio::test]
async fn add_gif_before_initialize_is_account_not_initialized() {
    let ledger = LocalLedger::new(program_id());
    let user = Keypair::new();
    let base = Keypair::new();

    let tx = signed(
        &ledger,
        program::add_gif(program_id(), base.pubkey(), user.pubkey(), "x").expect("ix"),
        &user,
        &[],
    )
    .await;
    let err = ledger.send_and_confirm(&tx).await.expect_err("not initialized");
    assert!(err.to_string().contains("AccountNotInitialized"));
    assert!(ledger.account(&base.pubkey()).await.is_none());
}

#[tokio::test]
async fn unsigned_or_replayed_transactions_are_rejected() {
    let ledger = LocalLedger::new(program_id());
    let user = Keypair::new();
    let base = Keypair::new();

    let unsigned = signed(
        &ledger,
        program::initialize(program_id(), base.pubkey(), user.pubkey()).expect("ix"),
        &user,
        &[],
    )
    .await;
    assert!(matches!(
        ledger.send_and_confirm(&unsigned).await,
        Err(TransportError::Rejected(_))
    ));

    let tx = signed(
        &ledger,
        program::initialize(program_id(), base.pubkey(), user.pubkey()).expect("ix"),
        &user,
        &[&base],
    )
    .await;
    ledger.send_and_confirm(&tx).await.expect("first");
    assert!(matches!(
        ledger.send_and_confirm(&tx).await,
        Err(TransportError::Rejected(_))
    ));
    assert_eq!(ledger.processed_transaction_count().await, 1);
}

#[tokio::test]
async fn stale_blockhash_is_rejected() {
    let ledger = LocalLedger::new(program_id());
    let user = Keypair::new();
    let base = Keypair::new();
    let message = Message::new_with_blockhash(
        &[program::initialize(program_id(), base.pubkey(), user.pubkey()).expect("ix")],
        Some(&user.pubkey()),
        &Hash::new_from_array([1u8; 32]),
    );
    let tx = sign(message, &[&user, &base]);

    let err = ledger.send_and_confirm(&tx).await.expect_err("stale");
    assert!(err.to_string().contains("Blockhash not found"));
}

#[tokio::test]
async fn blockhashes_and_replay_records_expire_after_the_age_window() {
    let ledger = LocalLedger::new(program_id());
    let user = Keypair::new();
    let base = Keypair::new();
    initialized(&ledger, &user, &base).await;

    let pending = signed(
        &ledger,
        program::add_gif(program_id(), base.pubkey(), user.pubkey(), "https://example.com/late.gif")
            .expect("ix"),
        &user,
        &[],
    )
    .await;
    {
        let state = ledger.state.read().await;
        assert_eq!(state.recent_blockhashes.len(), 2);
        assert_eq!(state.processed.len(), 1);
    }

    ledger.advance_slots(MAX_BLOCKHASH_AGE_SLOTS).await;
    {
        let state = ledger.state.read().await;
        assert_eq!(state.recent_blockhashes.len(), 1, "newest blockhash still usable");
        assert!(state.processed.is_empty());
    }

    ledger.advance_slots(1).await;
    let err = ledger.send_and_confirm(&pending).await.expect_err("expired");
    assert!(err.to_string().contains("Blockhash not found"), "{err}");
    {
        let state = ledger.state.read().await;
        assert!(state.recent_blockhashes.is_empty());
        assert!(state.processed.is_empty());
    }
    assert_eq!(ledger.processed_transaction_count().await, 1);
    assert_eq!(ledger.slot().await, 2 + MAX_BLOCKHASH_AGE_SLOTS + 1);

    let fresh = signed(
        &ledger,
        program::add_gif(program_id(), base.pubkey(), user.pubkey(), "https://example.com/late.gif")
            .expect("ix"),
        &user,
        &[],
    )
    .await;
    ledger.send_and_confirm(&fresh).await.expect("fresh blockhash accepted");
    assert_eq!(ledger.base_account(&base.pubkey()).await.expect("account").total_gifs, 1);
}

#[tokio::test]
async fn full_account_rejects_further_gifs() {
    let ledger = LocalLedger::new(program_id());
    let user = Keypair::new();
    let base = Keypair::new();
    initialized(&ledger, &user, &base).await;

    let link = format!("https://example.com/{}.gif", "y".repeat(600));
    let mut accepted = 0;
    loop {
        let tx = signed(
            &ledger,
            program::add_gif(program_id(), base.pubkey(), user.pubkey(), &link).expect("ix"),
            &user,
            &[],
        )
        .await;
        match ledger.send_and_confirm(&tx).await {
            Ok(_) => accepted += 1,
            Err(err) => {
                assert!(err.to_string().contains("AccountDidNotSerialize"), "{err}");
                break;
            }
        }
    }

    let account = ledger.base_account(&base.pubkey()).await.expect("account");
    assert_eq!(account.total_gifs, accepted);
    assert!(accepted > 0);
}

#[tokio::test]
async fn offline_ledger_fails_every_call() {
    let ledger = LocalLedger::new(program_id());
    ledger.set_offline(true).await;

    assert!(matches!(
        ledger.get_account(&Pubkey::new_unique()).await,
        Err(TransportError::Unavailable(_))
    ));
    assert!(matches!(
        ledger.latest_blockhash().await,
        Err(TransportError::Unavailable(_))
    ));

    ledger.set_offline(false).await;
    assert!(ledger.latest_blockhash().await.is_ok());
}
