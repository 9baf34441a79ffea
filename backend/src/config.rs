use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use thiserror::Error;

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8899";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_CLUSTER: &str = "devnet";
pub const DEFAULT_LOOKUP_DEBOUNCE_MS: u64 = 1_000;
pub const DEFAULT_RPC_RETRY_SECS: u64 = 5;

// Fixed at build time when present; the runtime environment still wins.
const BUILD_PROGRAM_ID: Option<&str> = option_env!("VESTING_PROGRAM_ID");
const BUILD_TOKEN_MINT: Option<&str> = option_env!("VESTING_TOKEN_MINT");
const BUILD_CLUSTER: Option<&str> = option_env!("VESTING_CLUSTER");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{var} has an invalid value `{value}`: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to read keypair from {path}: {reason}")]
    Keypair { path: PathBuf, reason: String },
}

/// Token program that owns the mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenProgram {
    Token,
    Token2022,
}

impl TokenProgram {
    pub fn id(self) -> Pubkey {
        match self {
            TokenProgram::Token => spl_token::id(),
            TokenProgram::Token2022 => spl_token_2022::id(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TokenProgram::Token => "token",
            TokenProgram::Token2022 => "token-2022",
        }
    }
}

impl FromStr for TokenProgram {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "token" | "spl-token" => Ok(TokenProgram::Token),
            "token-2022" | "token2022" | "spl-token-2022" => Ok(TokenProgram::Token2022),
            other => Err(format!("unknown token program `{other}`")),
        }
    }
}

/// Addresses and network the claim workflows operate against.
#[derive(Debug, Clone)]
pub struct ProgramSettings {
    pub program_id: Pubkey,
    pub mint: Pubkey,
    pub token_program: TokenProgram,
    pub cluster: String,
}

impl ProgramSettings {
    pub fn explorer_tx_url(&self, signature: &str) -> String {
        format!(
            "https://explorer.solana.com/tx/{signature}?cluster={}",
            self.cluster
        )
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub commitment: CommitmentConfig,
    pub program: ProgramSettings,
    pub keypair_path: Option<PathBuf>,
    pub bind_addr: SocketAddr,
    pub lookup_debounce: Duration,
    pub rpc_retry_window: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &'static str| get(name).filter(|v| !v.trim().is_empty());

        let program_id = var("VESTING_PROGRAM_ID")
            .or_else(|| BUILD_PROGRAM_ID.map(str::to_string))
            .ok_or(ConfigError::Missing("VESTING_PROGRAM_ID"))?;
        let mint = var("VESTING_TOKEN_MINT")
            .or_else(|| BUILD_TOKEN_MINT.map(str::to_string))
            .ok_or(ConfigError::Missing("VESTING_TOKEN_MINT"))?;
        let cluster = var("VESTING_CLUSTER")
            .or_else(|| BUILD_CLUSTER.map(str::to_string))
            .unwrap_or_else(|| DEFAULT_CLUSTER.to_string());

        let token_program = match var("VESTING_TOKEN_PROGRAM") {
            Some(value) => parse("VESTING_TOKEN_PROGRAM", value)?,
            None => TokenProgram::Token2022,
        };
        let commitment = match var("VESTING_COMMITMENT") {
            Some(value) => parse("VESTING_COMMITMENT", value)?,
            None => CommitmentConfig::processed(),
        };
        let bind_addr = parse(
            "VESTING_BIND_ADDR",
            var("VESTING_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        )?;
        let debounce_ms: u64 = match var("VESTING_LOOKUP_DEBOUNCE_MS") {
            Some(value) => parse("VESTING_LOOKUP_DEBOUNCE_MS", value)?,
            None => DEFAULT_LOOKUP_DEBOUNCE_MS,
        };
        let retry_secs: u64 = match var("VESTING_RPC_RETRY_SECS") {
            Some(value) => parse("VESTING_RPC_RETRY_SECS", value)?,
            None => DEFAULT_RPC_RETRY_SECS,
        };

        Ok(Config {
            rpc_url: var("VESTING_RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
            commitment,
            program: ProgramSettings {
                program_id: parse("VESTING_PROGRAM_ID", program_id)?,
                mint: parse("VESTING_TOKEN_MINT", mint)?,
                token_program,
                cluster,
            },
            keypair_path: var("VESTING_KEYPAIR").map(PathBuf::from),
            bind_addr,
            lookup_debounce: Duration::from_millis(debounce_ms),
            rpc_retry_window: Duration::from_secs(retry_secs),
        })
    }
}

fn parse<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
        var,
        reason: err.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const PROGRAM: &str = "EZjEf9iwX4K5U6y8XU8tbgWDLA3TBWRGZ53WceATdCHM";
    const MINT: &str = "CqYzY3dRdbEBUg29TFBWXLrQQhumMeyRr6vJv76RNiTq";

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|var| map.get(var).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[("VESTING_PROGRAM_ID", PROGRAM), ("VESTING_TOKEN_MINT", MINT)]).unwrap();

        assert_eq!(config.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(config.program.token_program, TokenProgram::Token2022);
        assert_eq!(config.program.program_id.to_string(), PROGRAM);
        assert_eq!(config.lookup_debounce, Duration::from_secs(1));
        assert_eq!(config.bind_addr.port(), 3000);
        assert!(config.keypair_path.is_none());
        assert_eq!(config.commitment, CommitmentConfig::processed());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("VESTING_PROGRAM_ID", PROGRAM),
            ("VESTING_TOKEN_MINT", MINT),
            ("VESTING_TOKEN_PROGRAM", "token"),
            ("VESTING_CLUSTER", "testnet"),
            ("VESTING_LOOKUP_DEBOUNCE_MS", "250"),
            ("VESTING_KEYPAIR", "/tmp/id.json"),
            ("VESTING_COMMITMENT", "confirmed"),
        ])
        .unwrap();

        assert_eq!(config.program.token_program, TokenProgram::Token);
        assert_eq!(config.program.token_program.id(), spl_token::id());
        assert_eq!(config.program.cluster, "testnet");
        assert_eq!(config.lookup_debounce, Duration::from_millis(250));
        assert_eq!(config.keypair_path, Some(PathBuf::from("/tmp/id.json")));
        assert_eq!(config.commitment, CommitmentConfig::confirmed());
    }

    #[test]
    fn invalid_mint_names_the_variable() {
        let err = load(&[("VESTING_PROGRAM_ID", PROGRAM), ("VESTING_TOKEN_MINT", "not-a-key")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "VESTING_TOKEN_MINT", .. }));
    }

    #[test]
    fn explorer_link_carries_cluster() {
        let config = load(&[
            ("VESTING_PROGRAM_ID", PROGRAM),
            ("VESTING_TOKEN_MINT", MINT),
            ("VESTING_CLUSTER", "devnet"),
        ])
        .unwrap();
        assert_eq!(
            config.program.explorer_tx_url("5sig"),
            "https://explorer.solana.com/tx/5sig?cluster=devnet"
        );
    }
}
