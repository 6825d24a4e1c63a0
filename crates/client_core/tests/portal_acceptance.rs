use std::sync::Arc;

use chain::Keypair;
use client_core::{
    Cluster, InitializeOutcome, KeypairWallet, PortalConfig, PortalController, SubmitOutcome,
    ViewState, WalletProvider,
};
use local_ledger::LocalLedger;
use shared::domain::Pubkey;

fn controller(
    ledger: &Arc<LocalLedger>,
    base_account: &Arc<Keypair>,
    wallet: &Arc<KeypairWallet>,
) -> Arc<PortalController> {
    let config = PortalConfig {
        cluster: Cluster::Shared(ledger.clone()),
        program_id: ledger.program_id(),
        base_account: Arc::clone(base_account),
    };
    let provider: Arc<dyn WalletProvider> = wallet.clone();
    PortalController::new(config, Some(provider))
}

fn gif_links(view: &ViewState) -> Vec<String> {
    match view {
        ViewState::Ready { gifs } => gifs.iter().map(|g| g.gif_link.clone()).collect(),
        other => panic!("expected ready view, got {other:?}"),
    }
}

#[tokio::test]
async fn first_visit_setup_then_shared_list_across_users() {
    let ledger = Arc::new(LocalLedger::new(Pubkey::new_from_array([7u8; 32])));
    let base_account = Arc::new(Keypair::new());
    let alice = Arc::new(KeypairWallet::new("alice", Keypair::new(), true));
    let bob = Arc::new(KeypairWallet::new("bob", Keypair::new(), false));

    let alice_portal = controller(&ledger, &base_account, &alice);
    assert_eq!(alice_portal.on_load().await, ViewState::Uninitialized);
    assert_eq!(
        alice_portal.initialize_account().await,
        InitializeOutcome::Initialized
    );
    assert_eq!(alice_portal.view().await, ViewState::Ready { gifs: Vec::new() });

    for link in ["https://example.com/1.gif", "https://example.com/2.gif"] {
        assert_eq!(alice_portal.submit(link).await, SubmitOutcome::Submitted);
    }

    let bob_portal = controller(&ledger, &base_account, &bob);
    assert_eq!(bob_portal.on_load().await, ViewState::Disconnected);
    let view = bob_portal.connect_wallet().await;
    assert_eq!(gif_links(&view).len(), 2);

    assert_eq!(
        bob_portal.submit("https://example.com/a.gif").await,
        SubmitOutcome::Submitted
    );
    let links = gif_links(&bob_portal.view().await);
    assert_eq!(links.len(), 3);
    assert_eq!(links.last().map(String::as_str), Some("https://example.com/a.gif"));

    let view = alice_portal.refresh().await;
    match view {
        ViewState::Ready { gifs } => {
            assert_eq!(gifs[0].user_address, alice.pubkey());
            assert_eq!(gifs[2].user_address, bob.pubkey());
        }
        other => panic!("expected ready view, got {other:?}"),
    }
}

#[tokio::test]
async fn returning_user_never_sees_setup_again() {
    let ledger = Arc::new(LocalLedger::new(Pubkey::new_from_array([7u8; 32])));
    let base_account = Arc::new(Keypair::new());
    let wallet = Arc::new(KeypairWallet::new("wallet", Keypair::new(), true));

    let first = controller(&ledger, &base_account, &wallet);
    first.on_load().await;
    assert_eq!(first.initialize_account().await, InitializeOutcome::Initialized);
    drop(first);

    let second = controller(&ledger, &base_account, &wallet);
    assert_eq!(second.on_load().await, ViewState::Ready { gifs: Vec::new() });
    assert_eq!(second.initialize_account().await, InitializeOutcome::Skipped);
    assert_eq!(ledger.processed_transaction_count().await, 1);
}
