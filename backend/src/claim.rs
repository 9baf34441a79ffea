use solana_sdk::signature::Signature;
use tracing::{debug, info};

use crate::{
    client::VestingClient,
    error::ClaimError,
    pda::{self, ClaimAccounts},
    solana::Ledger,
    tx,
    wallet::Wallet,
};

impl<L: Ledger> VestingClient<L> {
    /// Submit one `claim_tokens` instruction for `company_name` signed by
    /// `wallet`, and wait for confirmation. Never retried.
    pub async fn submit_claim(&self, wallet: &Wallet, company_name: &str) -> Result<Signature, ClaimError> {
        let program_id = &self.settings.program_id;
        let records = self.vesting_records().await?;
        let (listed, _) = records
            .iter()
            .find(|(_, record)| record.company_name == company_name)
            .ok_or(ClaimError::VestingNotFound)?;

        if *listed != pda::vesting_address(company_name, program_id)? {
            return Err(ClaimError::VestingNotFound);
        }

        let accounts = ClaimAccounts::derive(&self.settings, &wallet.address(), company_name)?;
        debug!(
            vesting = %accounts.vesting_account,
            employee = %accounts.employee_account,
            treasury = %accounts.treasury_token_account,
            token_account = %accounts.employee_token_account,
            "🔑 derived claim accounts"
        );

        let instruction = tx::claim_tokens(program_id, &accounts, company_name);
        let signature = self.ledger.submit(instruction, wallet.keypair()).await?;

        info!(company = company_name, %signature, "✅ claim confirmed");
        Ok(signature)
    }
}
