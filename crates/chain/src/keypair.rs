//! Keypair files in the Solana CLI format: a JSON array of the 32 secret
//! bytes followed by the 32 public bytes.

use std::path::Path;

use solana_sdk::signature::{read_keypair_file, write_keypair_file, Keypair, Signer};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum KeypairError {
    #[error("failed to read keypair file '{path}': {reason}")]
    Read { path: String, reason: String },
    #[error("failed to write keypair file '{path}': {reason}")]
    Write { path: String, reason: String },
}

pub fn read_keypair(path: impl AsRef<Path>) -> Result<Keypair, KeypairError> {
    let path = path.as_ref();
    read_keypair_file(path).map_err(|err| KeypairError::Read {
        path: path.display().to_string(),
        reason: err.to_string(),
    })
}

/// Parent directories are created as needed.
pub fn write_keypair(keypair: &Keypair, path: impl AsRef<Path>) -> Result<(), KeypairError> {
    let path = path.as_ref();
    write_keypair_file(keypair, path).map_err(|err| KeypairError::Write {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    debug!("keypair: wrote {} pubkey={}", path.display(), keypair.pubkey());
    Ok(())
}
