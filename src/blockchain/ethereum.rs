use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use ethers::{
    abi::Token,
    contract::{Contract, ContractFactory},
    prelude::JsonRpcClient,
    providers::{Middleware, Provider, Ws},
    types::{Address, U256, U64},
};
use tracing::{debug, info, warn};

use super::artifact::ContractArtifact;
use super::traits::{ChainSession, DeployReceipt};
use crate::core::errors::DappError;
use crate::wallet::signer::{resolve_evm_address, Signer};

/// Human-readable network name for a chain id.
pub fn network_name(chain_id: u64) -> String {
    match chain_id {
        787 => "acala".to_string(),
        686 => "karura".to_string(),
        595 => "mandala".to_string(),
        1 => "ethereum".to_string(),
        11155111 => "sepolia".to_string(),
        _ => format!("evm-{}", chain_id),
    }
}

/// Chain session backed by an `ethers` provider.
#[derive(Clone)]
pub struct EthersSession<P: JsonRpcClient + Clone = Ws> {
    provider: Provider<P>,
    endpoint: String,
    network_name: String,
    chain_id: u64,
    ready: bool,
}

impl<P> EthersSession<P>
where
    P: JsonRpcClient + Clone + 'static,
{
    /// Wait for the provider to answer `eth_chainId`, then mark the session ready.
    pub async fn ready(provider: Provider<P>, endpoint: &str) -> Result<Self, DappError> {
        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| {
                DappError::Connection(format!(
                    "Failed to get chain ID from {}. Error: {}. This might be due to a network issue, firewall, or an invalid node URL.",
                    endpoint, e
                ))
            })?
            .as_u64();

        let network_name = network_name(chain_id);
        info!("Connected to {} (Chain ID: {})", network_name, chain_id);

        Ok(Self { provider, endpoint: endpoint.to_string(), network_name, chain_id, ready: true })
    }

    /// Creates a session around an existing provider without a handshake.
    /// This is useful for testing with a `MockProvider`.
    pub fn new_with_provider(provider: Provider<P>, chain_id: u64) -> Self {
        EthersSession {
            provider,
            endpoint: "test".to_string(),
            network_name: network_name(chain_id),
            chain_id,
            ready: true,
        }
    }

    pub fn network_name(&self) -> &str {
        &self.network_name
    }

    async fn get_nonce(&self, address: Address) -> Result<U256, DappError> {
        debug!(address = ?address, "get_nonce called for address");
        self.provider
            .get_transaction_count(address, None)
            .await
            .map_err(|e| DappError::Rpc(format!("Failed to get nonce: {}", e)))
    }
}

#[async_trait]
impl<P> ChainSession for EthersSession<P>
where
    P: JsonRpcClient + Clone + 'static + Send + Sync,
{
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    /// Resolved locally without a node round-trip: plain EVM nodes keep no
    /// account bindings, so a `0x` account is bound to itself and any other
    /// format has no claimed address.
    async fn query_evm_address(&self, account: &str) -> Result<Option<Address>, DappError> {
        Ok(Address::from_str(account.trim()).ok())
    }

    async fn get_balance(&self, account: &str) -> Result<U256, DappError> {
        let address = resolve_evm_address(account);
        debug!("Getting balance for address: {:?}", address);

        let balance = self
            .provider
            .get_balance(address, None)
            .await
            .map_err(|e| DappError::Rpc(format!("Failed to get balance: {}", e)))?;

        debug!("Balance: {} wei", balance);
        Ok(balance)
    }

    async fn deploy_contract(
        &self,
        signer: &Signer,
        artifact: &ContractArtifact,
        confirmations: usize,
    ) -> Result<DeployReceipt, DappError> {
        let from = signer.evm_address();
        info!(contract = %artifact.name(), from = ?from, "Submitting contract creation");

        let factory = ContractFactory::new(
            artifact.abi().clone(),
            artifact.bytecode().clone(),
            Arc::new(self.provider.clone()),
        );
        // EVM+ nodes price gas through eth_gasPrice; send a legacy transaction.
        let deployer = factory
            .deploy(())
            .map_err(|e| {
                DappError::Deployment(format!("{}: cannot encode constructor: {}", artifact.name(), e))
            })?
            .legacy();

        let mut tx = deployer.tx;
        tx.set_from(from);
        tx.set_chain_id(self.chain_id);
        tx.set_nonce(self.get_nonce(from).await?);
        self.provider
            .fill_transaction(&mut tx, None)
            .await
            .map_err(|e| DappError::Rpc(format!("Failed to fill deployment transaction: {}", e)))?;

        let signature = signer.sign_transaction(&tx).await?;
        let raw = tx.rlp_signed(&signature);

        let pending = self
            .provider
            .send_raw_transaction(raw)
            .await
            .map_err(|e| DappError::Deployment(format!("Failed to send transaction: {}", e)))?;
        let tx_hash = pending.tx_hash();
        info!(tx_hash = ?tx_hash, "Deployment transaction sent");

        let receipt = pending
            .confirmations(confirmations)
            .await
            .map_err(|e| DappError::Deployment(format!("Failed to confirm {:?}: {}", tx_hash, e)))?
            .ok_or_else(|| {
                DappError::Deployment(format!("transaction {:?} dropped from mempool", tx_hash))
            })?;

        if receipt.status != Some(U64::from(1)) {
            return Err(DappError::Deployment(format!("transaction {:?} reverted", tx_hash)));
        }
        let contract_address = receipt.contract_address.ok_or_else(|| {
            DappError::Deployment(format!("receipt for {:?} has no contract address", tx_hash))
        })?;

        Ok(DeployReceipt { contract_address, tx_hash })
    }

    async fn probe_view(
        &self,
        contract: Address,
        artifact: &ContractArtifact,
        method: &str,
    ) -> Result<(), DappError> {
        let instance = Contract::<Provider<P>>::new(
            contract,
            artifact.abi().clone(),
            Arc::new(self.provider.clone()),
        );
        let call = instance
            .method::<_, Token>(method, ())
            .map_err(|e| DappError::Rpc(format!("{}.{}: {}", artifact.name(), method, e)))?;
        match call.call().await {
            Ok(value) => {
                debug!(contract = ?contract, method, value = ?value, "View call answered");
                Ok(())
            }
            Err(e) => {
                warn!("View call {}.{} failed: {}", artifact.name(), method, e);
                Err(DappError::Rpc(format!("{}.{}: {}", artifact.name(), method, e)))
            }
        }
    }
}
