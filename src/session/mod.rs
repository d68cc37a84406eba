pub mod account_info;
pub mod controller;
pub mod state;
pub mod view;

pub use account_info::{load_info, AccountInfo, EvmAddressDisplay};
pub use controller::{DeployOutcome, SessionController, SessionSettings};
pub use state::{DeploymentSlot, Deployments, SessionSnapshot};
pub use view::SessionView;
