// Local wallet host backed by HD mnemonics from the environment.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use ethers::signers::{coins_bip39::English, LocalWallet, MnemonicBuilder, Signer as _};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Signature};
use ethers::utils::to_checksum;
use tracing::{debug, info};

use crate::core::config::WalletEntry;
use crate::core::errors::DappError;
use crate::wallet::bridge::{Account, ExtensionSigner, WalletExtension, WalletHost};

/// Signs with locally held keys, one per account.
pub struct LocalSigner {
    wallets: HashMap<Address, LocalWallet>,
}

#[async_trait]
impl ExtensionSigner for LocalSigner {
    async fn sign_transaction(
        &self,
        address: &str,
        tx: &TypedTransaction,
    ) -> Result<Signature, DappError> {
        let address = Address::from_str(address.trim())
            .map_err(|e| DappError::Signing(format!("invalid signer address {}: {}", address, e)))?;
        let wallet = self
            .wallets
            .get(&address)
            .ok_or_else(|| DappError::Signing(format!("no key for {:?}", address)))?;

        let wallet = match tx.chain_id() {
            Some(chain_id) => wallet.clone().with_chain_id(chain_id.as_u64()),
            None => wallet.clone(),
        };
        debug!(address = ?address, "Signing transaction");
        wallet.sign_transaction(tx).await.map_err(|e| DappError::Signing(e.to_string()))
    }
}

/// A wallet extension whose accounts are derived from one mnemonic.
pub struct LocalExtension {
    name: String,
    version: String,
    authorized_apps: Vec<String>,
    accounts: Vec<Account>,
    signer: Arc<LocalSigner>,
}

impl LocalExtension {
    /// Derive one account per display name at `m/44'/60'/0'/0/{index}`.
    pub fn from_mnemonic(
        name: impl Into<String>,
        version: impl Into<String>,
        phrase: &str,
        account_names: &[String],
    ) -> Result<Self, DappError> {
        let name = name.into();
        let mut accounts = Vec::with_capacity(account_names.len());
        let mut wallets = HashMap::with_capacity(account_names.len());

        for (index, account_name) in account_names.iter().enumerate() {
            let wallet = MnemonicBuilder::<English>::default()
                .phrase(phrase)
                .index(index as u32)
                .and_then(|builder| builder.build())
                .map_err(|e| {
                    DappError::Wallet(format!("{}: cannot derive account {}: {}", name, index, e))
                })?;
            let address = wallet.address();
            accounts.push(Account::new(account_name.clone(), to_checksum(&address, None)));
            wallets.insert(address, wallet);
        }

        Ok(Self {
            name,
            version: version.into(),
            authorized_apps: Vec::new(),
            accounts,
            signer: Arc::new(LocalSigner { wallets }),
        })
    }

    /// Build from a config entry, reading the phrase from its env var.
    pub fn from_entry(entry: &WalletEntry) -> Result<Self, DappError> {
        let phrase = std::env::var(&entry.mnemonic_env).map_err(|_| {
            DappError::Config(format!(
                "wallet {} expects a mnemonic in ${}",
                entry.name, entry.mnemonic_env
            ))
        })?;
        let mut ext =
            Self::from_mnemonic(&entry.name, &entry.version, phrase.trim(), &entry.accounts)?;
        ext.authorized_apps = entry.authorized_apps.clone();
        Ok(ext)
    }

    pub fn with_authorized_apps(mut self, apps: Vec<String>) -> Self {
        self.authorized_apps = apps;
        self
    }

    fn authorizes(&self, app_name: &str) -> bool {
        self.authorized_apps.is_empty() || self.authorized_apps.iter().any(|a| a == app_name)
    }
}

#[async_trait]
impl WalletExtension for LocalExtension {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    async fn accounts(&self) -> Result<Vec<Account>, DappError> {
        Ok(self.accounts.clone())
    }

    fn signer(&self) -> Arc<dyn ExtensionSigner> {
        self.signer.clone()
    }
}

/// Wallet host serving locally configured extensions.
pub struct KeystoreHost {
    extensions: Vec<Arc<LocalExtension>>,
    prompts: AtomicUsize,
}

impl KeystoreHost {
    pub fn new(extensions: Vec<LocalExtension>) -> Self {
        Self { extensions: extensions.into_iter().map(Arc::new).collect(), prompts: AtomicUsize::new(0) }
    }

    pub fn from_entries(entries: &[WalletEntry]) -> Result<Self, DappError> {
        let extensions =
            entries.iter().map(LocalExtension::from_entry).collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(extensions))
    }

    /// Number of authorization requests received so far.
    pub fn prompt_count(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletHost for KeystoreHost {
    async fn enable(&self, app_name: &str) -> Result<Vec<Arc<dyn WalletExtension>>, DappError> {
        let prompt = self.prompts.fetch_add(1, Ordering::SeqCst) + 1;
        info!(app = %app_name, prompt, "Authorization requested");

        Ok(self
            .extensions
            .iter()
            .filter(|ext| ext.authorizes(app_name))
            .map(|ext| ext.clone() as Arc<dyn WalletExtension>)
            .collect())
    }
}
