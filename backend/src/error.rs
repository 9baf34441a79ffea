use solana_client::client_error::ClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("vesting not found for user")]
    VestingNotFound,

    #[error("seed `{0}` exceeds the maximum seed length")]
    SeedTooLong(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("rpc request failed: {0}")]
    Rpc(#[from] Box<ClientError>),

    #[error("transaction failed: {0}")]
    Transaction(String),
}

impl From<ClientError> for ClaimError {
    fn from(err: ClientError) -> Self {
        ClaimError::Rpc(Box::new(err))
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{account} data too short ({len} bytes)")]
    TooShort { account: &'static str, len: usize },

    #[error("{0} discriminator mismatch")]
    Discriminator(&'static str),

    #[error("{account} fields could not be decoded: {source}")]
    Borsh {
        account: &'static str,
        #[source]
        source: std::io::Error,
    },
}
