use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;
use tokio::sync::OnceCell;
use tracing::warn;

use crate::{
    accounts::{AccountRecord, EmployeeAccount, VestingAccount},
    config::ProgramSettings,
    error::ClaimError,
    solana::Ledger,
};

/// Program-level access shared by the lookup and claim workflows.
pub struct VestingClient<L> {
    pub(crate) ledger: Arc<L>,
    pub(crate) settings: ProgramSettings,
    decimals: OnceCell<u8>,
}

impl<L: Ledger> VestingClient<L> {
    pub fn new(ledger: Arc<L>, settings: ProgramSettings) -> Self {
        Self {
            ledger,
            settings,
            decimals: OnceCell::new(),
        }
    }

    pub fn settings(&self) -> &ProgramSettings {
        &self.settings
    }

    /// Every vesting record of the program. Records that fail to decode are
    /// skipped with a warning.
    pub async fn vesting_records(&self) -> Result<Vec<(Pubkey, VestingAccount)>, ClaimError> {
        let raw = self
            .ledger
            .program_accounts(&self.settings.program_id, VestingAccount::discriminator())
            .await?;

        Ok(raw
            .into_iter()
            .filter_map(|(address, data)| match VestingAccount::decode(&data) {
                Ok(record) => Some((address, record)),
                Err(err) => {
                    warn!(%address, %err, "skipping undecodable vesting record");
                    None
                }
            })
            .collect())
    }

    /// `Ok(None)` when the claim record has not been initialized.
    pub async fn employee_record(
        &self,
        address: &Pubkey,
    ) -> Result<Option<EmployeeAccount>, ClaimError> {
        match self.ledger.account_data(address).await? {
            Some(data) => Ok(Some(EmployeeAccount::decode(&data)?)),
            None => Ok(None),
        }
    }

    /// Mint decimals, fetched once.
    pub async fn decimals(&self) -> Result<u8, ClaimError> {
        self.decimals
            .get_or_try_init(|| self.ledger.mint_decimals(&self.settings.mint))
            .await
            .copied()
    }
}
