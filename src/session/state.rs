use std::sync::Arc;

use ethers::types::Address;
use serde::{Deserialize, Serialize};

use crate::blockchain::deployer::{ContractKind, DeployedContract};
use crate::blockchain::traits::ChainConnection;
use crate::session::account_info::AccountInfo;
use crate::wallet::bridge::{Account, WalletExtension};
use crate::wallet::signer::{derive_signer, Signer, SignerId};

/// Deployment progress for one contract kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentSlot {
    pub deploying: bool,
    pub deployed: Option<DeployedContract>,
    /// Last failure, cleared when a new attempt starts.
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployments {
    pub profile: DeploymentSlot,
    pub ticket: DeploymentSlot,
}

impl Deployments {
    pub fn slot(&self, kind: ContractKind) -> &DeploymentSlot {
        match kind {
            ContractKind::Profile => &self.profile,
            ContractKind::Ticket => &self.ticket,
        }
    }

    pub fn slot_mut(&mut self, kind: ContractKind) -> &mut DeploymentSlot {
        match kind {
            ContractKind::Profile => &mut self.profile,
            ContractKind::Ticket => &mut self.ticket,
        }
    }

    pub fn any_deployed(&self) -> bool {
        self.profile.deployed.is_some() || self.ticket.deployed.is_some()
    }
}

/// Mutable session state owned by the controller.
///
/// Dependent values are replaced, never merged: any change to connection,
/// extension or account re-derives the signer and drops account info.
pub struct SessionState {
    pub node_url: String,
    pub connecting: bool,
    pub connection: Option<ChainConnection>,
    pub extensions: Vec<Arc<dyn WalletExtension>>,
    pub current_extension: Option<Arc<dyn WalletExtension>>,
    pub accounts: Vec<Account>,
    pub accounts_generation: u64,
    pub selected_address: Option<String>,
    pub signer: Option<Signer>,
    pub loading_account: bool,
    pub account_info: Option<AccountInfo>,
    /// The last fetch for the current signer failed; nothing is displayed.
    pub account_info_failed: bool,
    pub deployments: Deployments,
}

impl SessionState {
    pub fn new(node_url: impl Into<String>) -> Self {
        Self {
            node_url: node_url.into(),
            connecting: false,
            connection: None,
            extensions: Vec::new(),
            current_extension: None,
            accounts: Vec::new(),
            accounts_generation: 0,
            selected_address: None,
            signer: None,
            loading_account: false,
            account_info: None,
            account_info_failed: false,
            deployments: Deployments::default(),
        }
    }

    /// Replace the signer from the current inputs and return it.
    pub fn rederive_signer(&mut self) -> Option<Signer> {
        self.signer = derive_signer(
            self.connection.as_ref(),
            self.selected_address.as_deref(),
            self.current_extension.as_ref(),
        );
        self.account_info = None;
        self.account_info_failed = false;
        self.signer.clone()
    }

    /// Drop account info left by a signer that is gone, unless a newer signer
    /// has been derived since.
    pub fn clear_unsigned_account_info(&mut self) {
        if self.signer.is_none() {
            self.account_info = None;
            self.account_info_failed = false;
            self.loading_account = false;
        }
    }

    pub fn signer_id(&self) -> Option<SignerId> {
        self.signer.as_ref().map(Signer::id)
    }

    /// Selection controls freeze once anything has been deployed.
    pub fn selection_locked(&self) -> bool {
        self.deployments.any_deployed()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            node_url: self.node_url.clone(),
            connecting: self.connecting,
            connection: self.connection.as_ref().map(|c| ConnectionSummary {
                endpoint: c.endpoint().to_string(),
                chain_id: c.chain_id(),
                ready: c.is_ready(),
            }),
            extensions: self.extensions.iter().map(|e| ExtensionInfo::of(e.as_ref())).collect(),
            current_extension: self.current_extension.as_ref().map(|e| ExtensionInfo::of(e.as_ref())),
            accounts: self.accounts.clone(),
            selected_address: self.selected_address.clone(),
            signer: self.signer.as_ref().map(|s| SignerSummary {
                id: s.id().get(),
                address: s.address().to_string(),
                default_evm_address: s.compute_default_evm_address(),
            }),
            loading_account: self.loading_account,
            account_info: self.account_info.clone(),
            account_info_failed: self.account_info_failed,
            deployments: self.deployments.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionInfo {
    pub name: String,
    pub version: String,
}

impl ExtensionInfo {
    fn of(ext: &dyn WalletExtension) -> Self {
        Self { name: ext.name().to_string(), version: ext.version().to_string() }
    }

    /// `name/version`, as shown on selectors and the connect button.
    pub fn label(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSummary {
    pub endpoint: String,
    pub chain_id: u64,
    pub ready: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerSummary {
    pub id: u64,
    pub address: String,
    pub default_evm_address: Address,
}

/// Plain-data copy of the session for rendering and assertions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub node_url: String,
    pub connecting: bool,
    pub connection: Option<ConnectionSummary>,
    pub extensions: Vec<ExtensionInfo>,
    pub current_extension: Option<ExtensionInfo>,
    pub accounts: Vec<Account>,
    pub selected_address: Option<String>,
    pub signer: Option<SignerSummary>,
    pub loading_account: bool,
    pub account_info: Option<AccountInfo>,
    pub account_info_failed: bool,
    pub deployments: Deployments,
}
