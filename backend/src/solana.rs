use std::{future::Future, time::Duration};

use backoff::{future::retry, ExponentialBackoff, ExponentialBackoffBuilder};
use solana_account_decoder::UiAccountEncoding;
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    nonblocking::rpc_client::RpcClient,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig},
    rpc_filter::{Memcmp, RpcFilterType},
    rpc_request::RpcError,
};
use solana_sdk::{
    commitment_config::CommitmentConfig,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};
use tracing::debug;

use crate::error::ClaimError;

/// Read and submit access to the cluster.
pub trait Ledger: Send + Sync + 'static {
    /// Accounts owned by `program_id` whose data starts with `discriminator`.
    fn program_accounts(
        &self,
        program_id: &Pubkey,
        discriminator: [u8; 8],
    ) -> impl Future<Output = Result<Vec<(Pubkey, Vec<u8>)>, ClaimError>> + Send;

    /// Raw account data, `None` when the account does not exist.
    fn account_data(
        &self,
        address: &Pubkey,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, ClaimError>> + Send;

    fn mint_decimals(&self, mint: &Pubkey) -> impl Future<Output = Result<u8, ClaimError>> + Send;

    /// Sign `instruction` with `payer`, send it and wait for confirmation.
    fn submit(
        &self,
        instruction: Instruction,
        payer: &Keypair,
    ) -> impl Future<Output = Result<Signature, ClaimError>> + Send;
}

pub struct RpcLedger {
    client: RpcClient,
    commitment: CommitmentConfig,
    retry_window: Duration,
}

impl RpcLedger {
    pub fn new(rpc_url: String, commitment: CommitmentConfig, retry_window: Duration) -> Self {
        Self {
            client: RpcClient::new_with_commitment(rpc_url, commitment),
            commitment,
            retry_window,
        }
    }

    fn read_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(self.retry_window))
            .build()
    }
}

impl Ledger for RpcLedger {
    async fn program_accounts(
        &self,
        program_id: &Pubkey,
        discriminator: [u8; 8],
    ) -> Result<Vec<(Pubkey, Vec<u8>)>, ClaimError> {
        let config = RpcProgramAccountsConfig {
            filters: Some(vec![RpcFilterType::Memcmp(Memcmp::new_raw_bytes(
                0,
                discriminator.to_vec(),
            ))]),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.commitment),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };

        let config = &config;
        let accounts = retry(self.read_backoff(), move || async move {
            self.client
                .get_program_accounts_with_config(program_id, config.clone())
                .await
                .map_err(read_error)
        })
        .await?;

        debug!(program = %program_id, count = accounts.len(), "listed program accounts");
        Ok(accounts
            .into_iter()
            .map(|(address, account)| (address, account.data))
            .collect())
    }

    async fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, ClaimError> {
        let response = retry(self.read_backoff(), move || async move {
            self.client
                .get_account_with_commitment(address, self.commitment)
                .await
                .map_err(read_error)
        })
        .await?;

        Ok(response.value.map(|account| account.data))
    }

    async fn mint_decimals(&self, mint: &Pubkey) -> Result<u8, ClaimError> {
        let supply = retry(self.read_backoff(), move || async move {
            self.client
                .get_token_supply(mint)
                .await
                .map_err(read_error)
        })
        .await?;

        Ok(supply.decimals)
    }

    async fn submit(&self, instruction: Instruction, payer: &Keypair) -> Result<Signature, ClaimError> {
        let blockhash = self.client.get_latest_blockhash().await?;
        let tx = Transaction::new_signed_with_payer(
            &[instruction],
            Some(&payer.pubkey()),
            &[payer],
            blockhash,
        );

        self.client
            .send_and_confirm_transaction(&tx)
            .await
            .map_err(submit_error)
    }
}

/// Transport failures are retried; anything the node answered is final.
fn read_error(err: ClientError) -> backoff::Error<ClientError> {
    match err.kind() {
        ClientErrorKind::Io(_)
        | ClientErrorKind::Reqwest(_)
        | ClientErrorKind::RpcError(RpcError::RpcRequestError(_)) => {
            backoff::Error::transient(err)
        }
        _ => backoff::Error::permanent(err),
    }
}

fn submit_error(err: ClientError) -> ClaimError {
    match err.get_transaction_error() {
        Some(tx_err) => ClaimError::Transaction(tx_err.to_string()),
        None => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::transaction::TransactionError;

    #[test]
    fn transport_errors_are_retried() {
        let err = ClientError::from(ClientErrorKind::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset",
        )));
        assert!(matches!(read_error(err), backoff::Error::Transient { .. }));
    }

    #[test]
    fn node_rejections_are_final() {
        let err = ClientError::from(ClientErrorKind::RpcError(RpcError::ForUser(
            "not a Token mint".to_string(),
        )));
        assert!(matches!(read_error(err), backoff::Error::Permanent(_)));

        let err = ClientError::from(ClientErrorKind::Custom("bad param".to_string()));
        assert!(matches!(read_error(err), backoff::Error::Permanent(_)));
    }

    #[test]
    fn rejected_transaction_is_a_transaction_error() {
        let err = ClientError::from(ClientErrorKind::TransactionError(
            TransactionError::InsufficientFundsForFee,
        ));
        let err = submit_error(err);

        assert!(matches!(err, ClaimError::Transaction(_)));
        assert_eq!(
            err.to_string(),
            format!("transaction failed: {}", TransactionError::InsufficientFundsForFee)
        );
    }

    #[test]
    fn transport_failure_on_submit_stays_rpc() {
        let err = ClientError::from(ClientErrorKind::Custom("timed out".to_string()));
        assert!(matches!(submit_error(err), ClaimError::Rpc(_)));
    }
}
