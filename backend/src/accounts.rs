//! Decoders for the vesting program's on-chain records.
//!
//! Every record is laid out as an 8-byte account discriminator followed by
//! the Borsh-encoded fields. Accounts are allocated at their maximum size, so
//! bytes after the last field are padding and are ignored.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::{hash::hash, pubkey::Pubkey};

use crate::error::DecodeError;

pub const DISCRIMINATOR_LEN: usize = 8;

pub trait AccountRecord: BorshDeserialize + BorshSerialize + Sized {
    /// Type name as declared in the program; feeds the discriminator.
    const NAME: &'static str;

    fn discriminator() -> [u8; DISCRIMINATOR_LEN] {
        let digest = hash(format!("account:{}", Self::NAME).as_bytes());
        let mut disc = [0u8; DISCRIMINATOR_LEN];
        disc.copy_from_slice(&digest.to_bytes()[..DISCRIMINATOR_LEN]);
        disc
    }

    fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(DecodeError::TooShort {
                account: Self::NAME,
                len: data.len(),
            });
        }
        let (disc, mut body) = data.split_at(DISCRIMINATOR_LEN);
        if disc != Self::discriminator() {
            return Err(DecodeError::Discriminator(Self::NAME));
        }
        Self::deserialize(&mut body).map_err(|source| DecodeError::Borsh {
            account: Self::NAME,
            source,
        })
    }

    /// Account bytes as the program would store them, without padding.
    fn to_account_data(&self) -> Vec<u8> {
        let mut data = Self::discriminator().to_vec();
        // Writing into a Vec cannot fail.
        let _ = self.serialize(&mut data);
        data
    }
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct VestingAccount {
    /// Employer that funded the treasury
    pub owner: Pubkey,
    pub mint: Pubkey,
    pub treasury_token_account: Pubkey,
    /// Seed of the vesting PDA
    pub company_name: String,
    pub treasury_bump: u8,
    pub bump: u8,
}

impl AccountRecord for VestingAccount {
    const NAME: &'static str = "VestingAccount";
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct EmployeeAccount {
    pub beneficiary: Pubkey,
    pub start_time: i64,
    pub end_time: i64,
    /// Total entitlement, raw token units
    pub total_amount: i64,
    /// Cumulative amount already claimed, raw token units
    pub total_withdrawn: i64,
    pub cliff_time: i64,
    pub vesting_account: Pubkey,
    pub bump: u8,
}

impl AccountRecord for EmployeeAccount {
    const NAME: &'static str = "EmployeeAccount";
}

impl EmployeeAccount {
    /// Entitled amount not yet withdrawn. Never negative.
    pub fn claimable(&self) -> u64 {
        let remaining = i128::from(self.total_amount) - i128::from(self.total_withdrawn);
        clamp_to_u64(remaining)
    }

    pub fn claimed(&self) -> u64 {
        clamp_to_u64(i128::from(self.total_withdrawn))
    }

    /// Amount vested at `now` under the program's linear schedule.
    pub fn vested_at(&self, now: i64) -> u64 {
        if now < self.cliff_time {
            return 0;
        }
        if now >= self.end_time {
            return clamp_to_u64(i128::from(self.total_amount));
        }
        let duration = i128::from(self.end_time) - i128::from(self.start_time);
        if duration <= 0 {
            return clamp_to_u64(i128::from(self.total_amount));
        }
        let elapsed = (i128::from(now) - i128::from(self.start_time)).max(0);
        clamp_to_u64(i128::from(self.total_amount) * elapsed / duration)
    }

    /// Vested at `now` minus what has already been withdrawn.
    pub fn unlocked_at(&self, now: i64) -> u64 {
        let vested = i128::from(self.vested_at(now));
        clamp_to_u64(vested - i128::from(self.total_withdrawn))
    }
}

fn clamp_to_u64(value: i128) -> u64 {
    u64::try_from(value.max(0)).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(total: i64, withdrawn: i64) -> EmployeeAccount {
        EmployeeAccount {
            beneficiary: Pubkey::new_unique(),
            start_time: 1_000,
            end_time: 2_000,
            total_amount: total,
            total_withdrawn: withdrawn,
            cliff_time: 1_200,
            vesting_account: Pubkey::new_unique(),
            bump: 254,
        }
    }

    #[test]
    fn decodes_padded_vesting_account() {
        let vesting = VestingAccount {
            owner: Pubkey::new_unique(),
            mint: Pubkey::new_unique(),
            treasury_token_account: Pubkey::new_unique(),
            company_name: "refferAI".to_string(),
            treasury_bump: 253,
            bump: 255,
        };
        let mut data = vesting.to_account_data();
        data.extend_from_slice(&[0u8; 42]);

        assert_eq!(VestingAccount::decode(&data).unwrap(), vesting);
    }

    #[test]
    fn rejects_wrong_discriminator() {
        let data = employee(10, 0).to_account_data();
        assert!(matches!(
            VestingAccount::decode(&data),
            Err(DecodeError::Discriminator("VestingAccount"))
        ));
    }

    #[test]
    fn rejects_short_and_truncated_data() {
        assert!(matches!(
            EmployeeAccount::decode(&[1, 2, 3]),
            Err(DecodeError::TooShort { len: 3, .. })
        ));

        let data = employee(10, 0).to_account_data();
        assert!(matches!(
            EmployeeAccount::decode(&data[..20]),
            Err(DecodeError::Borsh { .. })
        ));
    }

    #[test]
    fn discriminators_differ_per_record() {
        assert_ne!(
            VestingAccount::discriminator(),
            EmployeeAccount::discriminator()
        );
    }

    #[test]
    fn claimable_is_entitlement_minus_withdrawn() {
        let record = employee(1_000, 300);
        assert_eq!(record.claimable(), 700);
        assert_eq!(record.claimed(), 300);
    }

    #[test]
    fn claimable_never_negative() {
        let record = employee(100, 300);
        assert_eq!(record.claimable(), 0);
        assert_eq!(employee(100, -5).claimed(), 0);
    }

    #[test]
    fn schedule_projection() {
        let record = employee(1_000, 100);
        assert_eq!(record.vested_at(1_100), 0);
        assert_eq!(record.vested_at(1_500), 500);
        assert_eq!(record.vested_at(5_000), 1_000);
        assert_eq!(record.unlocked_at(1_500), 400);
        assert_eq!(record.unlocked_at(1_050), 0);
    }

    #[test]
    fn schedule_projection_handles_large_amounts() {
        let record = employee(i64::MAX, 0);
        assert_eq!(record.vested_at(1_500), (i64::MAX / 2) as u64);
    }
}
