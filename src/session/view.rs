// Text rendering of the session, one section per workflow step.

use std::fmt;

use crate::blockchain::deployer::ContractKind;
use crate::session::account_info::EvmAddressDisplay;
use crate::session::state::{ExtensionInfo, SessionSnapshot};

const CHECK: &str = "✓";

/// Read-only view derived from a [`SessionSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    snapshot: SessionSnapshot,
}

impl SessionView {
    pub fn new(snapshot: SessionSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.snapshot
    }

    pub fn connect_label(&self) -> String {
        match &self.snapshot.current_extension {
            Some(ext) => format!("Connected to {}", ext.label()),
            None => "Connect".to_string(),
        }
    }

    pub fn wallet_connected(&self) -> bool {
        self.snapshot.signer.is_some()
    }

    /// Extension and account selectors are frozen once anything is deployed.
    pub fn selectors_enabled(&self) -> bool {
        !self.snapshot.deployments.any_deployed()
    }

    pub fn extension_options(&self) -> Vec<String> {
        self.snapshot.extensions.iter().map(ExtensionInfo::label).collect()
    }

    pub fn account_options(&self) -> Vec<String> {
        self.snapshot.accounts.iter().map(|a| format!("{} / {}", a.name, a.address)).collect()
    }

    /// Address line under the connect step, `None` without a signer or
    /// after a failed fetch.
    pub fn address_line(&self) -> Option<String> {
        let signer = self.snapshot.signer.as_ref()?;
        if self.snapshot.loading_account {
            return Some("Loading account info...".to_string());
        }
        if self.snapshot.account_info_failed {
            return None;
        }
        let display = match &self.snapshot.account_info {
            Some(info) => info.display_address(signer.default_evm_address),
            None => EvmAddressDisplay::Default(ethers::utils::to_checksum(
                &signer.default_evm_address,
                None,
            )),
        };
        Some(match display {
            EvmAddressDisplay::Claimed(address) => format!("Claimed EVM address: {}", address),
            EvmAddressDisplay::Default(address) => format!("Default EVM address: {}", address),
        })
    }

    pub fn balance_line(&self) -> Option<String> {
        if self.snapshot.signer.is_none() || self.snapshot.loading_account {
            return None;
        }
        let info = self.snapshot.account_info.as_ref()?;
        if info.balance.is_empty() {
            return None;
        }
        Some(format!("Account balance: {}", info.balance))
    }

    pub fn deploy_enabled(&self, kind: ContractKind) -> bool {
        let slot = self.snapshot.deployments.slot(kind);
        self.snapshot.signer.is_some() && !slot.deploying && slot.deployed.is_none()
    }

    pub fn deploy_label(&self, kind: ContractKind) -> &'static str {
        let slot = self.snapshot.deployments.slot(kind);
        if slot.deployed.is_some() {
            "Contract deployed"
        } else if slot.deploying {
            "Deploying..."
        } else {
            "Deploy"
        }
    }

    pub fn contract_address_line(&self, kind: ContractKind) -> Option<String> {
        let deployed = self.snapshot.deployments.slot(kind).deployed.as_ref()?;
        Some(format!("Contract address: {}", deployed.address_checksum()))
    }

    /// Failure of the last attempt; the deploy button stays enabled for a retry.
    pub fn deploy_error_line(&self, kind: ContractKind) -> Option<String> {
        let error = self.snapshot.deployments.slot(kind).last_error.as_ref()?;
        Some(format!("✗ {}", error))
    }

    fn step_title(title: &str, done: bool) -> String {
        if done {
            format!("{} {}", title, CHECK)
        } else {
            title.to_string()
        }
    }
}

impl fmt::Display for SessionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", Self::step_title("Connect Wallet", self.wallet_connected()))?;
        writeln!(f, "  [{}]", self.connect_label())?;
        if let Some(connection) = &self.snapshot.connection {
            writeln!(f, "  node: {} (chain {})", connection.endpoint, connection.chain_id)?;
        } else if self.snapshot.connecting {
            writeln!(f, "  node: connecting to {}...", self.snapshot.node_url)?;
        }

        let lock = if self.selectors_enabled() { "" } else { " (locked)" };
        if !self.snapshot.extensions.is_empty() {
            let current = self.snapshot.current_extension.as_ref().map(|e| e.name.as_str());
            writeln!(f, "  select a wallet{}:", lock)?;
            for (ext, label) in self.snapshot.extensions.iter().zip(self.extension_options()) {
                let marker = if Some(ext.name.as_str()) == current { "*" } else { " " };
                writeln!(f, "   {} {}", marker, label)?;
            }
        }
        if !self.snapshot.accounts.is_empty() {
            let selected = self.snapshot.selected_address.as_deref();
            writeln!(f, "  account{}:", lock)?;
            for (account, label) in self.snapshot.accounts.iter().zip(self.account_options()) {
                let marker = if Some(account.address.as_str()) == selected { "*" } else { " " };
                writeln!(f, "   {} {}", marker, label)?;
            }
        }
        if let Some(line) = self.address_line() {
            writeln!(f, "  {}", line)?;
        }
        if let Some(line) = self.balance_line() {
            writeln!(f, "  {}", line)?;
        }

        for kind in ContractKind::ALL {
            let slot = self.snapshot.deployments.slot(kind);
            let title = format!("Deploy {} Contract", kind.contract_name());
            writeln!(f)?;
            writeln!(f, "{}", Self::step_title(&title, slot.deployed.is_some()))?;
            let state = if self.deploy_enabled(kind) { "" } else { " (disabled)" };
            writeln!(f, "  [{}]{}", self.deploy_label(kind), state)?;
            if let Some(line) = self.contract_address_line(kind) {
                writeln!(f, "  {}", line)?;
            }
            if let Some(line) = self.deploy_error_line(kind) {
                writeln!(f, "  {}", line)?;
            }
        }
        Ok(())
    }
}
