pub mod artifact;
pub mod connector;
pub mod deployer;
pub mod ethereum;
pub mod traits;

pub use artifact::ContractArtifact;
pub use connector::{validate_node_url, WsConnector};
pub use deployer::{ContractKind, DeployedContract};
pub use ethereum::EthersSession;
pub use traits::{ChainConnection, ChainConnector, ChainSession, DeployReceipt};
