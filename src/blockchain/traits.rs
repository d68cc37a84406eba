use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use ethers::types::{Address, H256, U256};

use crate::blockchain::artifact::ContractArtifact;
use crate::core::errors::DappError;
use crate::wallet::signer::Signer;

/// Result of a confirmed contract-creation transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployReceipt {
    pub contract_address: Address,
    pub tx_hash: H256,
}

/// A live session with a chain node.
#[async_trait]
pub trait ChainSession: Send + Sync {
    /// Endpoint the session was opened against.
    fn endpoint(&self) -> &str;

    fn chain_id(&self) -> u64;

    /// Whether the session completed its readiness handshake.
    fn is_ready(&self) -> bool;

    /// Returns the EVM address bound to a chain-native account, if one is claimed.
    async fn query_evm_address(&self, account: &str) -> Result<Option<Address>, DappError>;

    /// Returns the native balance of an account in wei.
    async fn get_balance(&self, account: &str) -> Result<U256, DappError>;

    /// Submits a contract-creation transaction signed by `signer` and waits
    /// for `confirmations` blocks.
    async fn deploy_contract(
        &self,
        signer: &Signer,
        artifact: &ContractArtifact,
        confirmations: usize,
    ) -> Result<DeployReceipt, DappError>;

    /// Calls a zero-argument view method on a deployed contract.
    async fn probe_view(
        &self,
        contract: Address,
        artifact: &ContractArtifact,
        method: &str,
    ) -> Result<(), DappError>;
}

/// Opens chain sessions.
#[async_trait]
pub trait ChainConnector: Send + Sync {
    async fn connect(&self, node_url: &str) -> Result<ChainConnection, DappError>;
}

/// Shared handle to a ready chain session.
#[derive(Clone)]
pub struct ChainConnection {
    session: Arc<dyn ChainSession>,
}

impl ChainConnection {
    pub fn new(session: Arc<dyn ChainSession>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &dyn ChainSession {
        self.session.as_ref()
    }

    pub fn endpoint(&self) -> &str {
        self.session.endpoint()
    }

    pub fn chain_id(&self) -> u64 {
        self.session.chain_id()
    }

    pub fn is_ready(&self) -> bool {
        self.session.is_ready()
    }
}

impl fmt::Debug for ChainConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainConnection")
            .field("endpoint", &self.endpoint())
            .field("chain_id", &self.chain_id())
            .field("ready", &self.is_ready())
            .finish()
    }
}
