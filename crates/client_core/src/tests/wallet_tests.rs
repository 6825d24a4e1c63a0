use super::*;
use chain::Message;

struct ForeignWallet;

#[async_trait]
impl WalletProvider for ForeignWallet {
    fn name(&self) -> &str {
        "Foreign"
    }

    fn is_supported(&self) -> bool {
        false
    }

    async fn connect(&self, _only_if_trusted: bool) -> Result<Pubkey, WalletError> {
        Ok(Pubkey::new_from_array([1u8; 32]))
    }

    async fn sign_transaction(&self, _transaction: &mut Transaction) -> Result<(), WalletError> {
        Err(WalletError::NotConnected)
    }
}

#[tokio::test]
async fn no_provider_is_reported_without_identity() {
    let connector = WalletConnector::new(None);
    assert_eq!(
        connector.check_existing_connection().await,
        ConnectionCheck::NoProvider
    );
    assert_eq!(connector.connect().await, Err(ConnectError::NoProvider));
    assert!(connector.identity().await.is_none());
}

#[tokio::test]
async fn approval_makes_later_trusted_connects_silent() {
    let wallet: Arc<dyn WalletProvider> =
        Arc::new(KeypairWallet::new("keypair", Keypair::new(), false));
    let connector = WalletConnector::new(Some(Arc::clone(&wallet)));

    assert_eq!(
        connector.check_existing_connection().await,
        ConnectionCheck::NotConnected(WalletError::NotTrusted)
    );
    let identity = connector.connect().await.expect("prompted connect");

    let restarted = WalletConnector::new(Some(wallet));
    assert_eq!(
        restarted.check_existing_connection().await,
        ConnectionCheck::Connected(identity)
    );
    assert_eq!(restarted.identity().await, Some(identity));
}

#[tokio::test]
async fn unsupported_provider_is_not_auto_connected() {
    let connector = WalletConnector::new(Some(Arc::new(ForeignWallet)));
    assert_eq!(
        connector.check_existing_connection().await,
        ConnectionCheck::Unsupported("Foreign".into())
    );
    assert!(connector.identity().await.is_none());
    assert_eq!(connector.connect().await, Ok(Pubkey::new_from_array([1u8; 32])));
}

#[tokio::test]
async fn keypair_wallet_signs_only_once_connected() {
    let keypair = Keypair::new();
    let payer = keypair.pubkey();
    let wallet = KeypairWallet::new("keypair", keypair, true);
    let message = Message::new(&[], Some(&payer));
    let mut tx = Transaction::new_unsigned(message);

    assert_eq!(
        wallet.sign_transaction(&mut tx).await,
        Err(WalletError::NotConnected)
    );
    wallet.connect(true).await.expect("trusted connect");
    wallet.sign_transaction(&mut tx).await.expect("sign");
    assert!(tx.verify().is_ok());
}
