use serde::{Deserialize, Serialize};

use crate::lookup::ClaimSummary;

/// Exact decimal rendering of a raw token amount.
pub fn format_amount(raw: u64, decimals: u8) -> String {
    if decimals == 0 {
        return raw.to_string();
    }
    // u128 holds scales up to 10^38; past that show the raw amount.
    let Some(scale) = 10u128.checked_pow(u32::from(decimals)) else {
        return raw.to_string();
    };
    let raw = u128::from(raw);
    let whole = raw / scale;
    let frac = raw % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:0width$}", width = usize::from(decimals));
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LookupResponse {
    Found(ClaimSummary),
    NotFound { query: String },
    Skipped,
}

#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub company_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimResponse {
    pub signature: String,
    pub explorer_url: String,
}

#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub cluster: String,
    pub program_id: String,
    pub mint: String,
    pub token_program: &'static str,
    pub wallet: Option<String>,
}
