pub mod accounts;
pub mod claim;
pub mod client;
pub mod config;
pub mod debounce;
pub mod error;
pub mod lookup;
pub mod models;
pub mod pda;
pub mod routes;
pub mod session;
pub mod solana;
pub mod tx;
pub mod wallet;

pub use client::VestingClient;
pub use error::{ClaimError, DecodeError};
pub use routes::{router, AppState};
pub use session::{Capabilities, ClaimGate, ClaimSession};
pub use solana::{Ledger, RpcLedger};
pub use wallet::Wallet;
