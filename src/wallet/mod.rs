pub mod bridge;
pub mod keystore;
pub mod signer;

pub use bridge::{discover_extensions, list_accounts, Account, ExtensionSigner, WalletExtension, WalletHost};
pub use keystore::{KeystoreHost, LocalExtension};
pub use signer::{derive_signer, Signer, SignerId};
