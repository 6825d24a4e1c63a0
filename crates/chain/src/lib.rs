//! Solana plumbing for the GIF portal: keypair files, instruction builders and
//! the transport used to read accounts and submit transactions.

pub mod keypair;
pub mod program;
pub mod rpc;
pub mod transport;

pub use keypair::{read_keypair, write_keypair, KeypairError};
pub use rpc::SolanaRpc;
pub use solana_commitment_config::CommitmentConfig;
pub use solana_sdk::{
    account::Account,
    hash::Hash,
    instruction::{AccountMeta, Instruction},
    message::Message,
    signature::{Keypair, Signature, Signer},
    signer::SignerError,
    transaction::Transaction,
};
pub use transport::{ChainTransport, TransportError};

#[cfg(test)]
#[path = "tests/keypair_tests.rs"]
mod keypair_tests;

#[cfg(test)]
#[path = "tests/program_tests.rs"]
mod program_tests;

#[cfg(test)]
#[path = "tests/rpc_tests.rs"]
mod rpc_tests;
