use std::fmt;

use ethers::types::{Address, H256};
use ethers::utils::to_checksum;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::artifact::ContractArtifact;
use crate::core::errors::DappError;
use crate::wallet::signer::Signer;

/// The two contracts this tool deploys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContractKind {
    Profile,
    Ticket,
}

impl ContractKind {
    pub const ALL: [ContractKind; 2] = [ContractKind::Profile, ContractKind::Ticket];

    /// Solidity contract name of the artifact.
    pub fn contract_name(&self) -> &'static str {
        match self {
            ContractKind::Profile => "ProfileImage",
            ContractKind::Ticket => "TicketFactory",
        }
    }

    /// Zero-argument view used to check the deployed code answers.
    pub fn probe_method(&self) -> &'static str {
        match self {
            ContractKind::Profile => "profileImage",
            ContractKind::Ticket => "ticket",
        }
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.contract_name())
    }
}

/// A contract created in this session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedContract {
    pub kind: ContractKind,
    pub address: Address,
    pub tx_hash: H256,
}

impl DeployedContract {
    /// EIP-55 form of the contract address.
    pub fn address_checksum(&self) -> String {
        to_checksum(&self.address, None)
    }
}

/// Deploy `artifact` through `signer` and wait for `confirmations`.
///
/// The follow-up view call is advisory: a failing probe is logged and the
/// deployment is still reported.
pub async fn deploy(
    kind: ContractKind,
    artifact: &ContractArtifact,
    signer: &Signer,
    confirmations: usize,
) -> Result<DeployedContract, DappError> {
    info!(%kind, signer = %signer.id(), "Deploying contract");
    let session = signer.connection().session();
    let receipt = session.deploy_contract(signer, artifact, confirmations).await?;

    if let Err(e) =
        session.probe_view(receipt.contract_address, artifact, kind.probe_method()).await
    {
        warn!(%kind, "Deployed contract did not answer {}: {}", kind.probe_method(), e);
    }

    let deployed =
        DeployedContract { kind, address: receipt.contract_address, tx_hash: receipt.tx_hash };
    info!(%kind, address = %deployed.address_checksum(), "Contract deployed");
    Ok(deployed)
}
