use std::{path::Path, sync::Arc};

use solana_sdk::{
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair},
    signer::Signer,
};

use crate::config::ConfigError;

/// Connected wallet: the beneficiary address and the signer for claims.
#[derive(Clone)]
pub struct Wallet {
    keypair: Arc<Keypair>,
}

impl Wallet {
    pub fn new(keypair: Keypair) -> Self {
        Self {
            keypair: Arc::new(keypair),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let keypair = read_keypair_file(path).map_err(|err| ConfigError::Keypair {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        Ok(Self::new(keypair))
    }

    pub fn address(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .finish()
    }
}
