use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::Signature;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::errors::DappError;

/// An account exposed by a wallet extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    /// Chain-native address string.
    pub address: String,
}

impl Account {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self { name: name.into(), address: address.into() }
    }
}

/// Signing capability of a wallet extension.
#[async_trait]
pub trait ExtensionSigner: Send + Sync {
    /// Signs `tx` on behalf of `address`. The extension may refuse.
    async fn sign_transaction(
        &self,
        address: &str,
        tx: &TypedTransaction,
    ) -> Result<Signature, DappError>;
}

/// One wallet provider granted by the host environment.
#[async_trait]
pub trait WalletExtension: Send + Sync {
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    async fn accounts(&self) -> Result<Vec<Account>, DappError>;

    fn signer(&self) -> Arc<dyn ExtensionSigner>;
}

/// Host environment that injects wallet extensions.
///
/// `enable` is a command, not a query: every call asks the host to authorize
/// the application again and may prompt the user.
#[async_trait]
pub trait WalletHost: Send + Sync {
    async fn enable(&self, app_name: &str) -> Result<Vec<Arc<dyn WalletExtension>>, DappError>;
}

/// Ask the host for extensions authorized for `app_name`.
///
/// The host's order is kept; later extensions reusing an already-seen name are
/// dropped so names stay unique within the session.
pub async fn discover_extensions(
    host: &dyn WalletHost,
    app_name: &str,
) -> Result<Vec<Arc<dyn WalletExtension>>, DappError> {
    info!(app = %app_name, "Requesting wallet authorization");
    let granted = host.enable(app_name).await?;

    let mut seen = HashSet::new();
    let mut extensions = Vec::with_capacity(granted.len());
    for ext in granted {
        if seen.insert(ext.name().to_string()) {
            extensions.push(ext);
        } else {
            warn!(name = %ext.name(), "Dropping duplicate wallet extension");
        }
    }

    info!(count = extensions.len(), "Wallet extensions enabled");
    Ok(extensions)
}

/// List the accounts of an extension. No accounts is a valid answer.
pub async fn list_accounts(ext: &dyn WalletExtension) -> Result<Vec<Account>, DappError> {
    let accounts = ext.accounts().await?;
    debug!(extension = %ext.name(), count = accounts.len(), "Listed accounts");
    Ok(accounts)
}
