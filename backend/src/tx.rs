use borsh::BorshSerialize;
use solana_sdk::{
    hash::hash,
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use crate::pda::ClaimAccounts;

pub const CLAIM_TOKENS: &str = "claim_tokens";

/// sha256("global:{name}")[..8]
pub fn instruction_discriminator(name: &str) -> [u8; 8] {
    let digest = hash(format!("global:{name}").as_bytes());
    let mut disc = [0u8; 8];
    disc.copy_from_slice(&digest.to_bytes()[..8]);
    disc
}

pub fn claim_tokens(program_id: &Pubkey, accounts: &ClaimAccounts, company_name: &str) -> Instruction {
    let mut data = instruction_discriminator(CLAIM_TOKENS).to_vec();
    // Single `String` argument; writing into a Vec cannot fail.
    let _ = company_name.serialize(&mut data);

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(accounts.beneficiary, true),
            AccountMeta::new(accounts.employee_account, false),
            AccountMeta::new(accounts.vesting_account, false),
            AccountMeta::new_readonly(accounts.mint, false),
            AccountMeta::new(accounts.treasury_token_account, false),
            AccountMeta::new(accounts.employee_token_account, false),
            AccountMeta::new_readonly(accounts.token_program, false),
            AccountMeta::new_readonly(accounts.associated_token_program, false),
            AccountMeta::new_readonly(accounts.system_program, false),
        ],
        data,
    }
}
