// src/lib.rs

pub mod blockchain;
pub mod cli;
pub mod config;
pub mod core;
pub mod session;
pub mod wallet;

pub use crate::core::errors::DappError;
pub use crate::session::{DeployOutcome, SessionController, SessionSettings, SessionView};
