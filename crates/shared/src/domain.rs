use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

pub use solana_pubkey::Pubkey;

/// A connected wallet's public key. Lives for the process lifetime only.
pub type WalletIdentity = Pubkey;

/// Abbreviated address used in logs and the grid, e.g. `7xKX…gAsU`.
pub fn short_address(pubkey: &Pubkey) -> String {
    let full = pubkey.to_string();
    if full.len() <= 10 {
        return full;
    }
    format!("{}…{}", &full[..4], &full[full.len() - 4..])
}

/// Serde adapter keeping addresses in their base58 text form.
pub mod base58 {
    use std::str::FromStr;

    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::Pubkey;

    pub fn serialize<S: Serializer>(pubkey: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(pubkey)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pubkey, D::Error> {
        let raw = <String as Deserialize>::deserialize(deserializer)?;
        Pubkey::from_str(raw.trim()).map_err(de::Error::custom)
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct GifItem {
    pub gif_link: String,
    #[serde(with = "base58")]
    pub user_address: Pubkey,
}

#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct BaseAccount {
    pub total_gifs: u64,
    pub gif_list: Vec<GifItem>,
}
