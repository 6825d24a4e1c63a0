//! Instruction builders for the GIF portal program.

use shared::{
    domain::Pubkey,
    protocol::{GifPortalInstruction, ProtocolError, SYSTEM_PROGRAM_ID},
};
use solana_sdk::instruction::{AccountMeta, Instruction};

/// `initialize`: creates the base account. Both `base_account` and `user`
/// must sign; `user` pays.
pub fn initialize(
    program_id: Pubkey,
    base_account: Pubkey,
    user: Pubkey,
) -> Result<Instruction, ProtocolError> {
    Ok(Instruction {
        program_id,
        accounts: vec![
            AccountMeta::new(base_account, true),
            AccountMeta::new(user, true),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
        ],
        data: GifPortalInstruction::Initialize.data()?,
    })
}

/// `add_gif`: appends `gif_link` with `user` recorded as the submitter.
pub fn add_gif(
    program_id: Pubkey,
    base_account: Pubkey,
    user: Pubkey,
    gif_link: &str,
) -> Result<Instruction, ProtocolError> {
    let data = GifPortalInstruction::AddGif {
        gif_link: gif_link.to_string(),
    }
    .data()?;
    Ok(Instruction {
        program_id,
        accounts: vec![
            AccountMeta::new(base_account, false),
            AccountMeta::new(user, true),
        ],
        data,
    })
}
