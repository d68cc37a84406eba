use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::blockchain::artifact::ContractArtifact;
use crate::blockchain::deployer::{self, ContractKind, DeployedContract};
use crate::blockchain::traits::{ChainConnection, ChainConnector};
use crate::core::config::{AppConfig, DEFAULT_APP_NAME, DEFAULT_NODE_URL};
use crate::core::errors::DappError;
use crate::session::account_info;
use crate::session::state::{SessionSnapshot, SessionState};
use crate::session::view::SessionView;
use crate::wallet::bridge::{self, WalletExtension, WalletHost};
use crate::wallet::signer::Signer;

/// Settings the controller needs from the app configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub node_url: String,
    pub app_name: String,
    pub confirmations: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            node_url: DEFAULT_NODE_URL.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
            confirmations: 1,
        }
    }
}

impl From<&AppConfig> for SessionSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            node_url: config.node.url.clone(),
            app_name: config.app_name.clone(),
            confirmations: config.node.confirmations,
        }
    }
}

/// What a deploy request did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    Deployed(DeployedContract),
    /// The kind was deployed earlier in this session; nothing was sent.
    AlreadyDeployed(DeployedContract),
    /// Another deployment of the same kind is still running.
    InFlight,
    NoSigner,
}

#[derive(Debug, Clone, Copy)]
enum BusyFlag {
    Connecting,
    Deploying(ContractKind),
}

/// Clears a busy flag when dropped, on success, error or cancellation alike.
struct BusyGuard<'a> {
    state: &'a Mutex<SessionState>,
    flag: BusyFlag,
}

impl<'a> BusyGuard<'a> {
    fn new(state: &'a Mutex<SessionState>, flag: BusyFlag) -> Self {
        Self { state, flag }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        match self.flag {
            BusyFlag::Connecting => state.connecting = false,
            BusyFlag::Deploying(kind) => state.deployments.slot_mut(kind).deploying = false,
        }
    }
}

/// Drives the connect → select → inspect → deploy workflow and owns its state.
///
/// The state lock is only held between suspension points. Results of async
/// steps are applied only when the step is still current: account listings
/// carry the generation they were launched with and account info carries the
/// signer id.
pub struct SessionController {
    settings: SessionSettings,
    connector: Arc<dyn ChainConnector>,
    host: Arc<dyn WalletHost>,
    artifacts: HashMap<ContractKind, Arc<ContractArtifact>>,
    state: Mutex<SessionState>,
}

impl SessionController {
    pub fn new(
        settings: SessionSettings,
        connector: Arc<dyn ChainConnector>,
        host: Arc<dyn WalletHost>,
    ) -> Self {
        let state = Mutex::new(SessionState::new(settings.node_url.clone()));
        Self { settings, connector, host, artifacts: HashMap::new(), state }
    }

    pub fn with_artifact(mut self, kind: ContractKind, artifact: ContractArtifact) -> Self {
        self.artifacts.insert(kind, Arc::new(artifact));
        self
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().snapshot()
    }

    pub fn view(&self) -> SessionView {
        SessionView::new(self.snapshot())
    }

    pub fn current_signer(&self) -> Option<Signer> {
        self.state.lock().signer.clone()
    }

    pub fn node_url(&self) -> String {
        self.state.lock().node_url.clone()
    }

    /// Edit the node URL used by the next [`connect_wallet`](Self::connect_wallet).
    pub fn set_node_url(&self, node_url: impl Into<String>) {
        self.state.lock().node_url = node_url.into();
    }

    /// Connect to `node_url`. On failure the connection is reset to absent.
    pub async fn connect(&self, node_url: &str) -> Result<ChainConnection, DappError> {
        let node_url = node_url.trim().to_string();
        {
            let mut state = self.state.lock();
            if state.connecting {
                return Err(DappError::Busy("a connection attempt is already running".into()));
            }
            state.connecting = true;
            state.node_url = node_url.clone();
        }
        let guard = BusyGuard::new(&self.state, BusyFlag::Connecting);

        let result = self.connector.connect(&node_url).await;
        let signer = {
            let mut state = self.state.lock();
            match &result {
                Ok(connection) => {
                    info!(endpoint = %connection.endpoint(), chain_id = connection.chain_id(), "Chain connection ready");
                    state.connection = Some(connection.clone());
                }
                Err(e) => {
                    error!(retryable = e.is_retryable(), "Failed to connect to {}: {}", node_url, e);
                    state.connection = None;
                }
            }
            state.rederive_signer()
        };
        drop(guard);

        self.load_account_info(signer).await;
        result
    }

    /// Connect to the current node URL and enable wallet extensions, then
    /// select the first extension granted.
    ///
    /// A failed connection is logged and leaves the session unconnected; only
    /// a failed authorization request is returned as an error.
    pub async fn connect_wallet(&self) -> Result<(), DappError> {
        let node_url = self.node_url();
        let (connected, extensions) = tokio::join!(
            self.connect(&node_url),
            bridge::discover_extensions(self.host.as_ref(), &self.settings.app_name)
        );
        if let Err(e) = connected {
            warn!("Continuing without chain connection: {}", e);
        }
        let extensions = extensions?;

        let first = {
            let mut state = self.state.lock();
            state.extensions = extensions;
            state.extensions.first().cloned()
        };
        self.activate_extension(first).await;
        Ok(())
    }

    /// Switch to the extension named `name` and reload its accounts.
    pub async fn select_extension(&self, name: &str) -> Result<(), DappError> {
        let ext = {
            let state = self.state.lock();
            if state.selection_locked() {
                return Err(DappError::SelectionLocked);
            }
            state
                .extensions
                .iter()
                .find(|e| e.name() == name)
                .cloned()
                .ok_or_else(|| DappError::Wallet(format!("unknown wallet extension {}", name)))?
        };
        self.activate_extension(Some(ext)).await;
        Ok(())
    }

    /// Select one of the current extension's accounts by address.
    pub async fn select_account(&self, address: &str) -> Result<(), DappError> {
        let signer = {
            let mut state = self.state.lock();
            if state.selection_locked() {
                return Err(DappError::SelectionLocked);
            }
            if !state.accounts.iter().any(|a| a.address == address) {
                return Err(DappError::Wallet(format!("unknown account {}", address)));
            }
            state.selected_address = Some(address.to_string());
            state.rederive_signer()
        };
        self.load_account_info(signer).await;
        Ok(())
    }

    /// Reload account info for the current signer.
    pub async fn refresh_account_info(&self) {
        let signer = self.current_signer();
        self.load_account_info(signer).await;
    }

    /// Deploy `kind` with the current signer.
    ///
    /// Without a signer, after a successful deployment of the same kind, or
    /// while one is in flight, this returns without sending anything. A failed
    /// deployment is recorded on the kind's slot and returned.
    pub async fn deploy(&self, kind: ContractKind) -> Result<DeployOutcome, DappError> {
        let signer = {
            let mut state = self.state.lock();
            let Some(signer) = state.signer.clone() else {
                return Ok(DeployOutcome::NoSigner);
            };
            let slot = state.deployments.slot_mut(kind);
            if let Some(deployed) = &slot.deployed {
                return Ok(DeployOutcome::AlreadyDeployed(deployed.clone()));
            }
            if slot.deploying {
                return Ok(DeployOutcome::InFlight);
            }
            slot.deploying = true;
            slot.last_error = None;
            signer
        };
        let _guard = BusyGuard::new(&self.state, BusyFlag::Deploying(kind));

        let result = match self.artifacts.get(&kind) {
            Some(artifact) => {
                deployer::deploy(kind, artifact, &signer, self.settings.confirmations).await
            }
            None => Err(DappError::Artifact(format!("no artifact loaded for {}", kind))),
        };

        let mut state = self.state.lock();
        let slot = state.deployments.slot_mut(kind);
        match result {
            Ok(deployed) => {
                slot.deployed = Some(deployed.clone());
                Ok(DeployOutcome::Deployed(deployed))
            }
            Err(e) => {
                error!(%kind, "Deployment failed: {}", e);
                slot.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn activate_extension(&self, ext: Option<Arc<dyn WalletExtension>>) {
        let (generation, signer) = {
            let mut state = self.state.lock();
            state.current_extension = ext.clone();
            state.accounts_generation += 1;
            state.accounts.clear();
            state.selected_address = None;
            (state.accounts_generation, state.rederive_signer())
        };
        self.load_account_info(signer).await;

        let Some(ext) = ext else {
            return;
        };
        let listed = bridge::list_accounts(ext.as_ref()).await;

        let signer = {
            let mut state = self.state.lock();
            if state.accounts_generation != generation {
                debug!(extension = %ext.name(), generation, "Discarding stale account list");
                return;
            }
            match listed {
                Ok(accounts) => {
                    state.selected_address = accounts.first().map(|a| a.address.clone());
                    state.accounts = accounts;
                }
                Err(e) => {
                    warn!(extension = %ext.name(), "Failed to list accounts: {}", e);
                }
            }
            state.rederive_signer()
        };
        self.load_account_info(signer).await;
    }

    async fn load_account_info(&self, signer: Option<Signer>) {
        let Some(signer) = signer else {
            self.state.lock().clear_unsigned_account_info();
            return;
        };

        {
            let mut state = self.state.lock();
            if state.signer_id() != Some(signer.id()) {
                return;
            }
            state.loading_account = true;
            state.account_info = None;
            state.account_info_failed = false;
        }

        let result = account_info::load_info(&signer).await;

        let mut state = self.state.lock();
        if state.signer_id() != Some(signer.id()) {
            debug!(signer = %signer.id(), "Discarding account info for stale signer");
            return;
        }
        state.loading_account = false;
        match result {
            Ok(info) => state.account_info = Some(info),
            Err(e) => {
                warn!(signer = %signer.id(), "Failed to load account info: {}", e);
                state.account_info = None;
                state.account_info_failed = true;
            }
        }
    }
}
