//! Address derivation for the vesting program's accounts.
//!
//! All functions here are pure: the same inputs always yield the same
//! addresses. Seeds longer than the runtime's 32-byte limit are reported as
//! errors rather than panicking.

use solana_sdk::{pubkey::Pubkey, system_program};
use spl_associated_token_account::get_associated_token_address_with_program_id;

use crate::{config::ProgramSettings, error::ClaimError};

pub const EMPLOYEE_SEED: &[u8] = b"employee_vesting";
pub const TREASURY_SEED: &[u8] = b"vesting_treasury";

fn find(seeds: &[&[u8]], program_id: &Pubkey, label: &str) -> Result<Pubkey, ClaimError> {
    Pubkey::try_find_program_address(seeds, program_id)
        .map(|(address, _bump)| address)
        .ok_or_else(|| ClaimError::SeedTooLong(label.to_string()))
}

/// `[company_name]`
pub fn vesting_address(company_name: &str, program_id: &Pubkey) -> Result<Pubkey, ClaimError> {
    find(&[company_name.as_bytes()], program_id, company_name)
}

/// `["employee_vesting", beneficiary, vesting_account]`
pub fn employee_address(beneficiary: &Pubkey, vesting: &Pubkey, program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[EMPLOYEE_SEED, beneficiary.as_ref(), vesting.as_ref()],
        program_id,
    )
    .0
}

/// `["vesting_treasury", company_name]`
pub fn treasury_address(company_name: &str, program_id: &Pubkey) -> Result<Pubkey, ClaimError> {
    find(&[TREASURY_SEED, company_name.as_bytes()], program_id, company_name)
}

/// Every account the `claim_tokens` instruction touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimAccounts {
    pub beneficiary: Pubkey,
    pub employee_account: Pubkey,
    pub vesting_account: Pubkey,
    pub mint: Pubkey,
    pub treasury_token_account: Pubkey,
    pub employee_token_account: Pubkey,
    pub token_program: Pubkey,
    pub associated_token_program: Pubkey,
    pub system_program: Pubkey,
}

impl ClaimAccounts {
    pub fn derive(
        settings: &ProgramSettings,
        beneficiary: &Pubkey,
        company_name: &str,
    ) -> Result<Self, ClaimError> {
        let program_id = &settings.program_id;
        let token_program = settings.token_program.id();
        let vesting_account = vesting_address(company_name, program_id)?;

        Ok(ClaimAccounts {
            beneficiary: *beneficiary,
            employee_account: employee_address(beneficiary, &vesting_account, program_id),
            vesting_account,
            mint: settings.mint,
            treasury_token_account: treasury_address(company_name, program_id)?,
            employee_token_account: get_associated_token_address_with_program_id(
                beneficiary,
                &settings.mint,
                &token_program,
            ),
            token_program,
            associated_token_program: spl_associated_token_account::id(),
            system_program: system_program::id(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenProgram;

    fn settings(token_program: TokenProgram) -> ProgramSettings {
        ProgramSettings {
            program_id: Pubkey::new_unique(),
            mint: Pubkey::new_unique(),
            token_program,
            cluster: "devnet".to_string(),
        }
    }

    #[test]
    fn derivation_is_deterministic() {
        let settings = settings(TokenProgram::Token2022);
        let beneficiary = Pubkey::new_unique();

        let first = ClaimAccounts::derive(&settings, &beneficiary, "refferAI").unwrap();
        let second = ClaimAccounts::derive(&settings, &beneficiary, "refferAI").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn addresses_depend_on_every_input() {
        let settings = settings(TokenProgram::Token2022);
        let beneficiary = Pubkey::new_unique();
        let base = ClaimAccounts::derive(&settings, &beneficiary, "acme").unwrap();

        let other_company = ClaimAccounts::derive(&settings, &beneficiary, "globex").unwrap();
        assert_ne!(base.vesting_account, other_company.vesting_account);
        assert_ne!(base.treasury_token_account, other_company.treasury_token_account);
        assert_ne!(base.employee_account, other_company.employee_account);

        let other_beneficiary =
            ClaimAccounts::derive(&settings, &Pubkey::new_unique(), "acme").unwrap();
        assert_eq!(base.treasury_token_account, other_beneficiary.treasury_token_account);
        assert_ne!(base.employee_account, other_beneficiary.employee_account);

        let mut other_program = settings.clone();
        other_program.program_id = Pubkey::new_unique();
        let moved = ClaimAccounts::derive(&other_program, &beneficiary, "acme").unwrap();
        assert_ne!(base.vesting_account, moved.vesting_account);
    }

    #[test]
    fn employee_address_matches_manual_derivation() {
        let settings = settings(TokenProgram::Token2022);
        let beneficiary = Pubkey::new_unique();
        let accounts = ClaimAccounts::derive(&settings, &beneficiary, "acme").unwrap();

        let (vesting, _) = Pubkey::find_program_address(&[b"acme"], &settings.program_id);
        let (employee, _) = Pubkey::find_program_address(
            &[b"employee_vesting", beneficiary.as_ref(), vesting.as_ref()],
            &settings.program_id,
        );
        assert_eq!(accounts.vesting_account, vesting);
        assert_eq!(accounts.employee_account, employee);
    }

    #[test]
    fn token_account_follows_token_program() {
        let legacy = settings(TokenProgram::Token);
        let mut modern = legacy.clone();
        modern.token_program = TokenProgram::Token2022;
        let beneficiary = Pubkey::new_unique();

        let a = ClaimAccounts::derive(&legacy, &beneficiary, "acme").unwrap();
        let b = ClaimAccounts::derive(&modern, &beneficiary, "acme").unwrap();
        assert_ne!(a.employee_token_account, b.employee_token_account);
        assert_eq!(b.token_program, spl_token_2022::id());
    }

    #[test]
    fn oversized_seed_is_an_error() {
        let settings = settings(TokenProgram::Token2022);
        let name = "x".repeat(40);
        let err = ClaimAccounts::derive(&settings, &Pubkey::new_unique(), &name).unwrap_err();
        assert!(matches!(err, ClaimError::SeedTooLong(_)));
    }
}
