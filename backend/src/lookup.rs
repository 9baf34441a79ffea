use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, info, warn};

use crate::{
    accounts::{EmployeeAccount, VestingAccount},
    client::VestingClient,
    error::ClaimError,
    models::format_amount,
    pda,
    solana::Ledger,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    NotFound,
    Found(ResolvedClaim),
}

/// A vesting record matched by a query, with the beneficiary's balances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedClaim {
    pub company_name: String,
    pub vesting_address: Pubkey,
    pub employee_address: Pubkey,
    pub mint: Pubkey,
    pub decimals: u8,
    /// `None` when the claim record is missing or could not be read.
    pub record: Option<EmployeeAccount>,
}

impl ResolvedClaim {
    pub fn claimable(&self) -> u64 {
        self.record.as_ref().map_or(0, EmployeeAccount::claimable)
    }

    pub fn claimed(&self) -> u64 {
        self.record.as_ref().map_or(0, EmployeeAccount::claimed)
    }

    pub fn summary(&self, now: DateTime<Utc>) -> ClaimSummary {
        let schedule = self.record.as_ref().map(|record| {
            let unlocked = record.unlocked_at(now.timestamp());
            ScheduleSummary {
                start: timestamp(record.start_time),
                cliff: timestamp(record.cliff_time),
                end: timestamp(record.end_time),
                unlocked,
                unlocked_display: format_amount(unlocked, self.decimals),
            }
        });

        ClaimSummary {
            company_name: self.company_name.clone(),
            vesting_address: self.vesting_address.to_string(),
            employee_address: self.employee_address.to_string(),
            decimals: self.decimals,
            claimable: self.claimable(),
            claimed: self.claimed(),
            claimable_display: format_amount(self.claimable(), self.decimals),
            claimed_display: format_amount(self.claimed(), self.decimals),
            schedule,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimSummary {
    pub company_name: String,
    pub vesting_address: String,
    pub employee_address: String,
    pub decimals: u8,
    pub claimable: u64,
    pub claimed: u64,
    pub claimable_display: String,
    pub claimed_display: String,
    pub schedule: Option<ScheduleSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleSummary {
    pub start: Option<DateTime<Utc>>,
    pub cliff: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub unlocked: u64,
    pub unlocked_display: String,
}

fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

/// Address match first, then exact company name.
pub fn find_vesting<'a>(
    records: &'a [(Pubkey, VestingAccount)],
    query: &str,
) -> Option<&'a (Pubkey, VestingAccount)> {
    if let Ok(address) = Pubkey::from_str(query) {
        if let Some(found) = records.iter().find(|(key, _)| *key == address) {
            return Some(found);
        }
    }
    records
        .iter()
        .find(|(_, record)| record.company_name == query)
}

impl<L: Ledger> VestingClient<L> {
    /// Resolve `query` (company name or vesting address) for `beneficiary`.
    ///
    /// A missing or unreadable claim record resolves with zero balances; only
    /// a failure to list the vesting records is an error.
    pub async fn lookup(&self, beneficiary: &Pubkey, query: &str) -> Result<LookupOutcome, ClaimError> {
        if query.trim().is_empty() {
            return Ok(LookupOutcome::NotFound);
        }

        let records = self.vesting_records().await?;
        let Some((vesting_address, vesting)) = find_vesting(&records, query) else {
            info!(query, "🔍 no vesting record matches");
            return Ok(LookupOutcome::NotFound);
        };

        if vesting.mint != self.settings.mint {
            warn!(
                company = %vesting.company_name,
                record_mint = %vesting.mint,
                configured_mint = %self.settings.mint,
                "vesting record uses a different mint than configured"
            );
        }

        let employee_address =
            pda::employee_address(beneficiary, vesting_address, &self.settings.program_id);
        let record = match self.employee_record(&employee_address).await {
            Ok(Some(record)) => Some(record),
            Ok(None) => {
                debug!(%employee_address, "claim record not initialized");
                None
            }
            Err(err) => {
                warn!(%employee_address, %err, "claim record unavailable, treating as empty");
                None
            }
        };

        let decimals = self.decimals().await.unwrap_or_else(|err| {
            warn!(%err, "mint decimals unavailable, showing raw amounts");
            0
        });

        Ok(LookupOutcome::Found(ResolvedClaim {
            company_name: vesting.company_name.clone(),
            vesting_address: *vesting_address,
            employee_address,
            mint: self.settings.mint,
            decimals,
            record,
        }))
    }
}
