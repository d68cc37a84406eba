use ethers::types::{Address, U256};
use ethers::utils::{format_units, to_checksum};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::errors::DappError;
use crate::wallet::signer::Signer;

/// Claimed EVM address and balance of the active signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// `None` when the account has no claimed address.
    pub claimed_evm_address: Option<Address>,
    /// Native balance in whole units, e.g. `12.5`.
    pub balance: String,
}

/// Which EVM address to show for an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvmAddressDisplay {
    Claimed(String),
    Default(String),
}

impl AccountInfo {
    /// The claimed address, or the signer's default when none is claimed.
    pub fn display_address(&self, default_address: Address) -> EvmAddressDisplay {
        match self.claimed_evm_address {
            Some(claimed) => EvmAddressDisplay::Claimed(to_checksum(&claimed, None)),
            None => EvmAddressDisplay::Default(to_checksum(&default_address, None)),
        }
    }
}

/// Fetch the claimed address and balance concurrently.
///
/// Both must succeed; a single failure fails the whole load so callers never
/// see half an `AccountInfo`.
pub async fn load_info(signer: &Signer) -> Result<AccountInfo, DappError> {
    debug!(signer = %signer.id(), "Loading account info");
    let (claimed, balance) = tokio::try_join!(signer.query_evm_address(), signer.get_balance())?;

    Ok(AccountInfo {
        claimed_evm_address: claimed.filter(|address| !address.is_zero()),
        balance: format_balance(balance)?,
    })
}

/// Format a wei amount with 18 decimals, trimming trailing zeros but keeping
/// one fractional digit (`12.5`, `1.0`).
pub fn format_balance(wei: U256) -> Result<String, DappError> {
    let formatted = format_units(wei, "ether")
        .map_err(|e| DappError::Rpc(format!("cannot format balance: {}", e)))?;
    if !formatted.contains('.') {
        return Ok(format!("{}.0", formatted));
    }
    let trimmed = formatted.trim_end_matches('0');
    if trimmed.ends_with('.') {
        Ok(format!("{}0", trimmed))
    } else {
        Ok(trimmed.to_string())
    }
}
