// tests/util.rs
// Shared fakes for the session workflow tests: a chain session, a connector,
// wallet extensions and a host, each with gates to hold a call mid-flight.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dapp_deployer::blockchain::artifact::ContractArtifact;
use dapp_deployer::blockchain::deployer::ContractKind;
use dapp_deployer::blockchain::traits::{ChainConnection, ChainConnector, ChainSession, DeployReceipt};
use dapp_deployer::core::errors::DappError;
use dapp_deployer::session::{SessionController, SessionSettings};
use dapp_deployer::wallet::bridge::{Account, ExtensionSigner, WalletExtension, WalletHost};
use dapp_deployer::wallet::signer::Signer;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Signature, TransactionRequest, H256, U256};
use parking_lot::Mutex;
use tokio::sync::Notify;

pub const NODE_URL: &str = "wss://node.test/ws";
pub const APP_NAME: &str = "test-app";

/// Holds the first call after `arm` until `open`.
#[derive(Default)]
pub struct Gate {
    armed: AtomicBool,
    entered: Notify,
    release: Notify,
}

impl Gate {
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    pub async fn pass(&self) {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
    }

    /// Resolves once a call is parked at the gate.
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    pub fn open(&self) {
        self.release.notify_one();
    }
}

pub fn ether(amount: &str) -> U256 {
    ethers::utils::parse_ether(amount).unwrap()
}

#[derive(Default)]
pub struct FakeSession {
    claimed: Mutex<HashMap<String, Address>>,
    balances: Mutex<HashMap<String, U256>>,
    query_gates: Mutex<HashMap<String, Arc<Gate>>>,
    fail_info: AtomicBool,
    fail_balance: AtomicBool,
    fail_probe: AtomicBool,
    deploy_failures: Mutex<VecDeque<DappError>>,
    pub deploy_gate: Gate,
    pub deploy_calls: AtomicUsize,
    pub probes: Mutex<Vec<String>>,
}

impl FakeSession {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_balance(&self, account: &str, wei: U256) {
        self.balances.lock().insert(account.to_string(), wei);
    }

    pub fn claim(&self, account: &str, evm: Address) {
        self.claimed.lock().insert(account.to_string(), evm);
    }

    pub fn fail_info(&self, fail: bool) {
        self.fail_info.store(fail, Ordering::SeqCst);
    }

    pub fn fail_balance(&self, fail: bool) {
        self.fail_balance.store(fail, Ordering::SeqCst);
    }

    pub fn fail_probe(&self, fail: bool) {
        self.fail_probe.store(fail, Ordering::SeqCst);
    }

    pub fn fail_next_deploy(&self, error: DappError) {
        self.deploy_failures.lock().push_back(error);
    }

    /// Gate on the claimed-address query of one account.
    pub fn query_gate(&self, account: &str) -> Arc<Gate> {
        self.query_gates.lock().entry(account.to_string()).or_default().clone()
    }
}

#[async_trait]
impl ChainSession for FakeSession {
    fn endpoint(&self) -> &str {
        NODE_URL
    }

    fn chain_id(&self) -> u64 {
        595
    }

    fn is_ready(&self) -> bool {
        true
    }

    async fn query_evm_address(&self, account: &str) -> Result<Option<Address>, DappError> {
        let gate = self.query_gate(account);
        gate.pass().await;
        if self.fail_info.load(Ordering::SeqCst) {
            return Err(DappError::Rpc("evmAccounts unavailable".into()));
        }
        Ok(self.claimed.lock().get(account).copied())
    }

    async fn get_balance(&self, account: &str) -> Result<U256, DappError> {
        if self.fail_balance.load(Ordering::SeqCst) {
            return Err(DappError::Rpc("eth_getBalance unavailable".into()));
        }
        Ok(self.balances.lock().get(account).copied().unwrap_or_default())
    }

    async fn deploy_contract(
        &self,
        signer: &Signer,
        artifact: &ContractArtifact,
        _confirmations: usize,
    ) -> Result<DeployReceipt, DappError> {
        let call = self.deploy_calls.fetch_add(1, Ordering::SeqCst) as u64 + 1;
        self.deploy_gate.pass().await;

        let tx: TypedTransaction = TransactionRequest::new()
            .from(signer.evm_address())
            .data(artifact.bytecode().clone())
            .into();
        signer.sign_transaction(&tx).await?;

        if let Some(error) = self.deploy_failures.lock().pop_front() {
            return Err(error);
        }
        Ok(DeployReceipt {
            contract_address: Address::from_low_u64_be(0xc0de_0000 + call),
            tx_hash: H256::from_low_u64_be(call),
        })
    }

    async fn probe_view(
        &self,
        _contract: Address,
        _artifact: &ContractArtifact,
        method: &str,
    ) -> Result<(), DappError> {
        self.probes.lock().push(method.to_string());
        if self.fail_probe.load(Ordering::SeqCst) {
            return Err(DappError::Rpc("execution reverted".into()));
        }
        Ok(())
    }
}

pub struct FakeConnector {
    session: Arc<FakeSession>,
    failures: Mutex<VecDeque<DappError>>,
    pub gate: Gate,
    pub urls: Mutex<Vec<String>>,
}

impl FakeConnector {
    pub fn new(session: Arc<FakeSession>) -> Arc<Self> {
        Arc::new(Self {
            session,
            failures: Mutex::new(VecDeque::new()),
            gate: Gate::default(),
            urls: Mutex::new(Vec::new()),
        })
    }

    pub fn fail_next(&self, error: DappError) {
        self.failures.lock().push_back(error);
    }
}

#[async_trait]
impl ChainConnector for FakeConnector {
    async fn connect(&self, node_url: &str) -> Result<ChainConnection, DappError> {
        self.urls.lock().push(node_url.to_string());
        self.gate.pass().await;
        if let Some(error) = self.failures.lock().pop_front() {
            return Err(error);
        }
        Ok(ChainConnection::new(self.session.clone()))
    }
}

#[derive(Default)]
pub struct FakeSigner {
    reject: AtomicBool,
    pub signed: AtomicUsize,
}

impl FakeSigner {
    pub fn reject(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }
}

#[async_trait]
impl ExtensionSigner for FakeSigner {
    async fn sign_transaction(
        &self,
        _address: &str,
        _tx: &TypedTransaction,
    ) -> Result<Signature, DappError> {
        if self.reject.load(Ordering::SeqCst) {
            return Err(DappError::Signing("rejected by user".into()));
        }
        self.signed.fetch_add(1, Ordering::SeqCst);
        Ok(Signature { r: U256::one(), s: U256::one(), v: 27 })
    }
}

pub struct FakeExtension {
    name: String,
    version: String,
    accounts: Vec<Account>,
    pub gate: Gate,
    pub signing: Arc<FakeSigner>,
}

impl FakeExtension {
    pub fn new(name: &str, version: &str, accounts: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            version: version.to_string(),
            accounts: accounts.iter().map(|(n, a)| Account::new(*n, *a)).collect(),
            gate: Gate::default(),
            signing: Arc::new(FakeSigner::default()),
        })
    }
}

#[async_trait]
impl WalletExtension for FakeExtension {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    async fn accounts(&self) -> Result<Vec<Account>, DappError> {
        self.gate.pass().await;
        Ok(self.accounts.clone())
    }

    fn signer(&self) -> Arc<dyn ExtensionSigner> {
        self.signing.clone()
    }
}

pub struct FakeHost {
    extensions: Vec<Arc<FakeExtension>>,
    pub prompts: AtomicUsize,
}

impl FakeHost {
    pub fn new(extensions: Vec<Arc<FakeExtension>>) -> Arc<Self> {
        Arc::new(Self { extensions, prompts: AtomicUsize::new(0) })
    }
}

#[async_trait]
impl WalletHost for FakeHost {
    async fn enable(&self, _app_name: &str) -> Result<Vec<Arc<dyn WalletExtension>>, DappError> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        Ok(self.extensions.iter().map(|e| e.clone() as Arc<dyn WalletExtension>).collect())
    }
}

pub fn artifact(kind: ContractKind) -> ContractArtifact {
    ContractArtifact::from_json(kind.contract_name(), r#"{"bytecode":"0x6080604052","abi":[]}"#)
        .unwrap()
}

pub fn settings() -> SessionSettings {
    SessionSettings { node_url: NODE_URL.to_string(), app_name: APP_NAME.to_string(), confirmations: 1 }
}

/// Controller with both artifacts loaded.
pub fn controller(connector: Arc<FakeConnector>, host: Arc<FakeHost>) -> SessionController {
    SessionController::new(settings(), connector, host)
        .with_artifact(ContractKind::Profile, artifact(ContractKind::Profile))
        .with_artifact(ContractKind::Ticket, artifact(ContractKind::Ticket))
}

/// Session, connector, walletX/1.0 with Alice and Bob, and a controller over them.
pub struct Fixture {
    pub session: Arc<FakeSession>,
    pub connector: Arc<FakeConnector>,
    pub wallet: Arc<FakeExtension>,
    pub host: Arc<FakeHost>,
    pub controller: SessionController,
}

pub const ALICE: &str = "0xabc";
pub const BOB: &str = "0xbcd";

pub fn fixture() -> Fixture {
    let session = FakeSession::new();
    session.set_balance(ALICE, ether("12.5"));
    session.set_balance(BOB, ether("2"));
    let connector = FakeConnector::new(session.clone());
    let wallet = FakeExtension::new("walletX", "1.0", &[("Alice", ALICE), ("Bob", BOB)]);
    let host = FakeHost::new(vec![wallet.clone()]);
    let controller = controller(connector.clone(), host.clone());
    Fixture { session, connector, wallet, host, controller }
}
