use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Signature, U256};
use sha3::{Digest, Keccak256};

use crate::blockchain::traits::ChainConnection;
use crate::core::errors::DappError;
use crate::wallet::bridge::{ExtensionSigner, WalletExtension};

static NEXT_SIGNER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one derived signer. A new id is issued on every derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignerId(u64);

impl SignerId {
    fn next() -> Self {
        SignerId(NEXT_SIGNER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SignerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "signer#{}", self.0)
    }
}

/// Authorization for one account, through one extension, against one chain
/// connection. Immutable once built.
#[derive(Clone)]
pub struct Signer {
    id: SignerId,
    connection: ChainConnection,
    address: String,
    signing: Arc<dyn ExtensionSigner>,
}

impl Signer {
    pub fn new(
        connection: ChainConnection,
        address: impl Into<String>,
        signing: Arc<dyn ExtensionSigner>,
    ) -> Self {
        Self { id: SignerId::next(), connection, address: address.into(), signing }
    }

    pub fn id(&self) -> SignerId {
        self.id
    }

    pub fn connection(&self) -> &ChainConnection {
        &self.connection
    }

    /// Chain-native account address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// EVM address derived from the account alone, used when none is claimed.
    pub fn compute_default_evm_address(&self) -> Address {
        default_evm_address(&self.address)
    }

    /// EVM address transactions are sent from.
    pub fn evm_address(&self) -> Address {
        resolve_evm_address(&self.address)
    }

    pub async fn query_evm_address(&self) -> Result<Option<Address>, DappError> {
        self.connection.session().query_evm_address(&self.address).await
    }

    pub async fn get_balance(&self) -> Result<U256, DappError> {
        self.connection.session().get_balance(&self.address).await
    }

    pub async fn sign_transaction(&self, tx: &TypedTransaction) -> Result<Signature, DappError> {
        self.signing.sign_transaction(&self.address, tx).await
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("id", &self.id)
            .field("address", &self.address)
            .field("connection", &self.connection)
            .finish()
    }
}

/// Build a signer when connection, account and extension are all present.
///
/// Every call that returns `Some` yields a fresh [`SignerId`].
pub fn derive_signer(
    connection: Option<&ChainConnection>,
    address: Option<&str>,
    extension: Option<&Arc<dyn WalletExtension>>,
) -> Option<Signer> {
    let connection = connection?;
    let address = address.filter(|a| !a.trim().is_empty())?;
    let extension = extension?;
    Some(Signer::new(connection.clone(), address, extension.signer()))
}

/// Deterministic EVM address for an account: the first 20 bytes of
/// `keccak256("evm:" ++ account bytes)`.
///
/// Account bytes are the hex-decoded address for `0x`-hex input, otherwise the
/// UTF-8 bytes of the address string.
pub fn default_evm_address(account: &str) -> Address {
    let account = account.trim();
    let raw = account
        .strip_prefix("0x")
        .and_then(|hex_part| hex::decode(hex_part).ok())
        .unwrap_or_else(|| account.as_bytes().to_vec());

    let mut keccak = Keccak256::new();
    keccak.update(b"evm:");
    keccak.update(&raw);
    let digest = keccak.finalize();
    Address::from_slice(&digest[..20])
}

/// The account itself when it is already an EVM address, else its default.
pub fn resolve_evm_address(account: &str) -> Address {
    Address::from_str(account.trim()).unwrap_or_else(|_| default_evm_address(account))
}
