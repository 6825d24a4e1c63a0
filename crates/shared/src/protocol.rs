//! GIF program interface: instruction encoding and `BaseAccount` layout,
//! following Anchor's discriminator conventions.

use borsh::BorshDeserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::domain::{BaseAccount, GifItem, Pubkey};

pub const DISCRIMINATOR_LEN: usize = 8;

/// Space the program allocates for `BaseAccount` at initialization.
pub const BASE_ACCOUNT_SPACE: usize = 9000;

/// Deployed GIF portal program on devnet.
pub const DEFAULT_PROGRAM_ID: &str = "2Ph9ShJ7wV3PwPdrFcFaJZm53t33CSBYkv3DEB56cdsq";

pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::new_from_array([0u8; 32]);

const INITIALIZE_IX: &str = "initialize";
const ADD_GIF_IX: &str = "add_gif";
const BASE_ACCOUNT_NAME: &str = "BaseAccount";

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("account data too short: {len} bytes")]
    TooShort { len: usize },
    #[error("account discriminator mismatch")]
    DiscriminatorMismatch,
    #[error("unknown instruction discriminator {0:?}")]
    UnknownInstruction([u8; DISCRIMINATOR_LEN]),
    #[error("borsh codec error: {0}")]
    Borsh(#[from] std::io::Error),
    #[error("encoded account needs {needed} bytes but only {space} are allocated")]
    AccountTooLarge { needed: usize, space: usize },
}

fn sighash(namespace: &str, name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let digest = Sha256::digest(format!("{namespace}:{name}").as_bytes());
    let mut out = [0u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
    out
}

pub fn instruction_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    sighash("global", name)
}

pub fn account_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    sighash("account", name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GifPortalInstruction {
    Initialize,
    AddGif { gif_link: String },
}

impl GifPortalInstruction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialize => INITIALIZE_IX,
            Self::AddGif { .. } => ADD_GIF_IX,
        }
    }

    /// Discriminator followed by the Borsh-encoded arguments.
    pub fn data(&self) -> Result<Vec<u8>, ProtocolError> {
        let mut data = instruction_discriminator(self.name()).to_vec();
        if let Self::AddGif { gif_link } = self {
            data.extend_from_slice(&borsh::to_vec(gif_link)?);
        }
        Ok(data)
    }

    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(ProtocolError::TooShort { len: data.len() });
        }
        let (head, mut rest) = data.split_at(DISCRIMINATOR_LEN);
        let mut discriminator = [0u8; DISCRIMINATOR_LEN];
        discriminator.copy_from_slice(head);

        if discriminator == instruction_discriminator(INITIALIZE_IX) {
            Ok(Self::Initialize)
        } else if discriminator == instruction_discriminator(ADD_GIF_IX) {
            let gif_link = String::deserialize(&mut rest)?;
            Ok(Self::AddGif { gif_link })
        } else {
            Err(ProtocolError::UnknownInstruction(discriminator))
        }
    }
}

impl BaseAccount {
    pub fn discriminator() -> [u8; DISCRIMINATOR_LEN] {
        account_discriminator(BASE_ACCOUNT_NAME)
    }

    /// Decodes raw account data. Trailing zero padding is ignored.
    pub fn try_from_account_data(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(ProtocolError::TooShort { len: data.len() });
        }
        if data[..DISCRIMINATOR_LEN] != Self::discriminator() {
            return Err(ProtocolError::DiscriminatorMismatch);
        }
        let mut body = &data[DISCRIMINATOR_LEN..];
        Ok(Self::deserialize(&mut body)?)
    }

    /// Encodes into a buffer of exactly `space` bytes, zero padded.
    pub fn to_account_data(&self, space: usize) -> Result<Vec<u8>, ProtocolError> {
        let mut data = Self::discriminator().to_vec();
        data.extend_from_slice(&borsh::to_vec(self)?);
        if data.len() > space {
            return Err(ProtocolError::AccountTooLarge {
                needed: data.len(),
                space,
            });
        }
        data.resize(space, 0);
        Ok(data)
    }

    pub fn push(&mut self, item: GifItem) {
        self.gif_list.push(item);
        self.total_gifs += 1;
    }

    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.gif_list.iter().map(|item| item.gif_link.as_str())
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
