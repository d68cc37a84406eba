use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_NODE_URL: &str = "wss://mandala-rpc.aca-staging.network/ws";
pub const DEFAULT_APP_NAME: &str = "bodhijs-example";

/// Chain node configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeConfig {
    /// WebSocket endpoint of the node
    #[serde(default = "NodeConfig::default_url")]
    pub url: String,

    /// Seconds to wait for the provider to report ready
    #[serde(default = "NodeConfig::default_ready_timeout")]
    pub ready_timeout_secs: u64,

    /// Confirmations to wait for before a deployment counts as final
    #[serde(default = "NodeConfig::default_confirmations")]
    pub confirmations: usize,
}

impl NodeConfig {
    fn default_url() -> String { DEFAULT_NODE_URL.to_string() }
    fn default_ready_timeout() -> u64 { 30 }
    fn default_confirmations() -> usize { 1 }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
            ready_timeout_secs: Self::default_ready_timeout(),
            confirmations: Self::default_confirmations(),
        }
    }
}

/// Locations of the compiled contract artifacts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContractsConfig {
    #[serde(default = "ContractsConfig::default_profile")]
    pub profile: PathBuf,
    #[serde(default = "ContractsConfig::default_ticket")]
    pub ticket: PathBuf,
}

impl ContractsConfig {
    fn default_profile() -> PathBuf { PathBuf::from("abi/ProfileImage.json") }
    fn default_ticket() -> PathBuf { PathBuf::from("abi/TicketFactory.json") }
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self { profile: Self::default_profile(), ticket: Self::default_ticket() }
    }
}

/// One wallet the local keystore host exposes as an extension.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WalletEntry {
    pub name: String,

    #[serde(default = "WalletEntry::default_version")]
    pub version: String,

    /// Apps this wallet grants access to. Empty means any app.
    #[serde(default)]
    pub authorized_apps: Vec<String>,

    /// Environment variable holding the BIP-39 phrase
    pub mnemonic_env: String,

    /// Display names; one account is derived per name.
    #[serde(default = "WalletEntry::default_accounts")]
    pub accounts: Vec<String>,
}

impl WalletEntry {
    fn default_version() -> String { "1.0.0".to_string() }
    fn default_accounts() -> Vec<String> { vec!["Account 1".to_string()] }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Name presented to wallets when asking for authorization
    #[serde(default = "AppConfig::default_app_name")]
    pub app_name: String,

    #[serde(default)]
    pub node: NodeConfig,

    #[serde(default)]
    pub contracts: ContractsConfig,

    #[serde(default)]
    pub wallets: Vec<WalletEntry>,
}

impl AppConfig {
    fn default_app_name() -> String { DEFAULT_APP_NAME.to_string() }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: Self::default_app_name(),
            node: NodeConfig::default(),
            contracts: ContractsConfig::default(),
            wallets: Vec::new(),
        }
    }
}
