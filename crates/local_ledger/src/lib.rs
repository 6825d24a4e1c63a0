//! In-process stand-in for a Solana cluster running the GIF portal program.
//!
//! Transactions go through the same checks a validator applies before the
//! program sees them (signatures, recent blockhash, replay) and are executed
//! atomically against an account map. Used for offline runs and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chain::{Account, ChainTransport, Hash, Message, Signature, Transaction, TransportError};
use shared::{
    domain::{BaseAccount, GifItem, Pubkey},
    protocol::{GifPortalInstruction, ProtocolError, BASE_ACCOUNT_SPACE, SYSTEM_PROGRAM_ID},
};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Rent-exempt minimum for the allocated space at 3480 lamports per
/// byte-year over two years, including the 128-byte account overhead.
pub const BASE_ACCOUNT_RENT_LAMPORTS: u64 = (BASE_ACCOUNT_SPACE as u64 + 128) * 6960;

/// Slots a blockhash stays usable after it was handed out. Replay records
/// are dropped together with the blockhash they were sent with.
pub const MAX_BLOCKHASH_AGE_SLOTS: u64 = 150;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Allocate: account {0} already in use")]
    AccountInUse(Pubkey),
    #[error("AnchorError: AccountNotInitialized (3012) for {0}")]
    AccountNotInitialized(Pubkey),
    #[error("AnchorError: AccountOwnedByWrongProgram (3007) for {0}")]
    WrongOwner(Pubkey),
    #[error("AnchorError: AccountDidNotSerialize (3004): {0}")]
    AccountDidNotSerialize(String),
    #[error("AnchorError: AccountDidNotDeserialize (3003): {0}")]
    AccountDidNotDeserialize(String),
    #[error("AnchorError: AccountNotSigner (3010) for {0}")]
    NotSigner(Pubkey),
    #[error("AnchorError: ConstraintMut (2000) for {0}")]
    NotWritable(Pubkey),
    #[error("AnchorError: AccountNotEnoughKeys (3005)")]
    NotEnoughAccounts,
    #[error("AnchorError: InvalidProgramId (3008): expected system program, got {0}")]
    InvalidSystemProgram(Pubkey),
    #[error("AnchorError: InstructionDidNotDeserialize (102): {0}")]
    InvalidInstruction(String),
    #[error("program {0} is not deployed on this ledger")]
    UnknownProgram(Pubkey),
}

struct LedgerState {
    accounts: HashMap<Pubkey, Account>,
    slot: u64,
    /// Blockhash to the slot it was handed out at.
    recent_blockhashes: HashMap<Hash, u64>,
    /// Signature to the slot of the blockhash it was sent with.
    processed: HashMap<Signature, u64>,
    transaction_count: usize,
    offline: bool,
}

impl LedgerState {
    fn current_blockhash(&self) -> Hash {
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&self.slot.to_le_bytes());
        bytes[31] = 0x6c;
        Hash::new_from_array(bytes)
    }

    fn advance(&mut self, slots: u64) {
        self.slot += slots;
        let oldest = self.slot.saturating_sub(MAX_BLOCKHASH_AGE_SLOTS);
        self.recent_blockhashes.retain(|_, issued| *issued >= oldest);
        self.processed.retain(|_, issued| *issued >= oldest);
    }
}

fn is_signer(message: &Message, index: usize) -> bool {
    index < message.header.num_required_signatures as usize
}

fn is_writable(message: &Message, index: usize) -> bool {
    let header = &message.header;
    let signed = header.num_required_signatures as usize;
    if index < signed {
        index < signed.saturating_sub(header.num_readonly_signed_accounts as usize)
    } else {
        index
            < message
                .account_keys
                .len()
                .saturating_sub(header.num_readonly_unsigned_accounts as usize)
    }
}

pub struct LocalLedger {
    program_id: Pubkey,
    state: RwLock<LedgerState>,
}

impl LocalLedger {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            state: RwLock::new(LedgerState {
                accounts: HashMap::new(),
                slot: 1,
                recent_blockhashes: HashMap::new(),
                processed: HashMap::new(),
                transaction_count: 0,
                offline: false,
            }),
        }
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    /// While offline every call fails as if the cluster were unreachable.
    pub async fn set_offline(&self, offline: bool) {
        self.state.write().await.offline = offline;
    }

    /// Moves the ledger forward without transactions, expiring blockhashes
    /// older than [`MAX_BLOCKHASH_AGE_SLOTS`].
    pub async fn advance_slots(&self, slots: u64) {
        self.state.write().await.advance(slots);
    }

    pub async fn slot(&self) -> u64 {
        self.state.read().await.slot
    }

    pub async fn account(&self, address: &Pubkey) -> Option<Account> {
        self.state.read().await.accounts.get(address).cloned()
    }

    pub async fn base_account(&self, address: &Pubkey) -> Option<BaseAccount> {
        let account = self.account(address).await?;
        BaseAccount::try_from_account_data(&account.data).ok()
    }

    /// Successful transactions since the ledger was created.
    pub async fn processed_transaction_count(&self) -> usize {
        self.state.read().await.transaction_count
    }

    fn execute(
        &self,
        accounts: &mut HashMap<Pubkey, Account>,
        message: &Message,
        program_id_index: u8,
        account_indexes: &[u8],
        data: &[u8],
    ) -> Result<(), LedgerError> {
        let key_at = |position: usize| -> Result<(Pubkey, usize), LedgerError> {
            let index = *account_indexes
                .get(position)
                .ok_or(LedgerError::NotEnoughAccounts)? as usize;
            let key = message
                .account_keys
                .get(index)
                .copied()
                .ok_or(LedgerError::NotEnoughAccounts)?;
            Ok((key, index))
        };

        let program_id = message
            .account_keys
            .get(program_id_index as usize)
            .copied()
            .ok_or(LedgerError::NotEnoughAccounts)?;
        if program_id != self.program_id {
            return Err(LedgerError::UnknownProgram(program_id));
        }

        let instruction = GifPortalInstruction::decode(data)
            .map_err(|err| LedgerError::InvalidInstruction(err.to_string()))?;

        match instruction {
            GifPortalInstruction::Initialize => {
                let (base, base_index) = key_at(0)?;
                let (user, user_index) = key_at(1)?;
                let (system, _) = key_at(2)?;
                if system != SYSTEM_PROGRAM_ID {
                    return Err(LedgerError::InvalidSystemProgram(system));
                }
                for (key, index) in [(base, base_index), (user, user_index)] {
                    if !is_signer(message, index) {
                        return Err(LedgerError::NotSigner(key));
                    }
                    if !is_writable(message, index) {
                        return Err(LedgerError::NotWritable(key));
                    }
                }
                if accounts.contains_key(&base) {
                    return Err(LedgerError::AccountInUse(base));
                }

                let data = BaseAccount::default()
                    .to_account_data(BASE_ACCOUNT_SPACE)
                    .map_err(|err| LedgerError::AccountDidNotSerialize(err.to_string()))?;
                accounts.insert(
                    base,
                    Account {
                        lamports: BASE_ACCOUNT_RENT_LAMPORTS,
                        data,
                        owner: self.program_id,
                        executable: false,
                        rent_epoch: 0,
                    },
                );
                info!("ledger: initialized base_account={base} payer={user}");
            }
            GifPortalInstruction::AddGif { gif_link } => {
                let (base, base_index) = key_at(0)?;
                let (user, user_index) = key_at(1)?;
                if !is_signer(message, user_index) {
                    return Err(LedgerError::NotSigner(user));
                }
                if !is_writable(message, base_index) {
                    return Err(LedgerError::NotWritable(base));
                }

                let account = accounts
                    .get_mut(&base)
                    .ok_or(LedgerError::AccountNotInitialized(base))?;
                if account.owner != self.program_id {
                    return Err(LedgerError::WrongOwner(base));
                }
                let mut state = BaseAccount::try_from_account_data(&account.data)
                    .map_err(|err| LedgerError::AccountDidNotDeserialize(err.to_string()))?;
                state.push(GifItem {
                    gif_link,
                    user_address: user,
                });
                account.data = state
                    .to_account_data(BASE_ACCOUNT_SPACE)
                    .map_err(|err| match err {
                        ProtocolError::AccountTooLarge { needed, space } => {
                            LedgerError::AccountDidNotSerialize(format!(
                                "needs {needed} bytes, {space} allocated"
                            ))
                        }
                        other => LedgerError::AccountDidNotSerialize(other.to_string()),
                    })?;
                debug!(
                    "ledger: add_gif base_account={base} user={user} total_gifs={}",
                    state.total_gifs
                );
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ChainTransport for LocalLedger {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, TransportError> {
        let state = self.state.read().await;
        if state.offline {
            return Err(TransportError::Unavailable("local ledger is offline".into()));
        }
        Ok(state.accounts.get(address).cloned())
    }

    async fn latest_blockhash(&self) -> Result<Hash, TransportError> {
        let mut state = self.state.write().await;
        if state.offline {
            return Err(TransportError::Unavailable("local ledger is offline".into()));
        }
        let blockhash = state.current_blockhash();
        let slot = state.slot;
        state.recent_blockhashes.entry(blockhash).or_insert(slot);
        Ok(blockhash)
    }

    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature, TransportError> {
        let mut state = self.state.write().await;
        if state.offline {
            return Err(TransportError::Unavailable("local ledger is offline".into()));
        }

        let message = &transaction.message;
        if transaction.signatures.len() != message.header.num_required_signatures as usize {
            return Err(TransportError::Rejected(
                "signature count does not match the message header".into(),
            ));
        }
        let Some(signature) = transaction.signatures.first().cloned() else {
            return Err(TransportError::Rejected("transaction carries no signatures".into()));
        };
        transaction
            .verify()
            .map_err(|err| TransportError::Rejected(err.to_string()))?;
        if state.processed.contains_key(&signature) {
            return Err(TransportError::Rejected(
                "This transaction has already been processed".into(),
            ));
        }
        let Some(blockhash_slot) = state
            .recent_blockhashes
            .get(&message.recent_blockhash)
            .copied()
        else {
            return Err(TransportError::Rejected("Blockhash not found".into()));
        };

        let mut accounts = state.accounts.clone();
        for ix in &message.instructions {
            if let Err(err) =
                self.execute(&mut accounts, message, ix.program_id_index, &ix.accounts, &ix.data)
            {
                warn!("ledger: transaction failed signature={signature} error={err}");
                return Err(TransportError::TransactionFailed {
                    reason: err.to_string(),
                });
            }
        }

        state.accounts = accounts;
        state.processed.insert(signature, blockhash_slot);
        state.transaction_count += 1;
        state.advance(1);
        Ok(signature)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
