// Compiled contract artifacts (bytecode + ABI) loaded from JSON.

use std::fs;
use std::path::Path;

use ethers::abi::Abi;
use ethers::types::Bytes;
use serde_json::Value;

use crate::core::errors::DappError;

/// Deployable bytecode and interface descriptor for one contract.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractArtifact {
    name: String,
    abi: Abi,
    bytecode: Bytes,
}

impl ContractArtifact {
    pub fn new(name: impl Into<String>, abi: Abi, bytecode: Bytes) -> Self {
        Self { name: name.into(), abi, bytecode }
    }

    /// Parse an artifact from compiler output JSON.
    ///
    /// The bytecode is read from `bytecode` (a hex string or an object with an
    /// `object` field) and the ABI from `output.abi`, falling back to `abi`.
    pub fn from_json(name: impl Into<String>, json: &str) -> Result<Self, DappError> {
        let name = name.into();
        let value: Value = serde_json::from_str(json)
            .map_err(|e| DappError::Artifact(format!("{}: invalid JSON: {}", name, e)))?;

        let bytecode_hex = match value.get("bytecode") {
            Some(Value::String(s)) => s.as_str(),
            Some(Value::Object(obj)) => obj.get("object").and_then(Value::as_str).unwrap_or(""),
            _ => "",
        };
        let bytecode_hex = bytecode_hex.trim().trim_start_matches("0x");
        if bytecode_hex.is_empty() {
            return Err(DappError::Artifact(format!("{}: missing bytecode", name)));
        }
        let bytecode = hex::decode(bytecode_hex)
            .map_err(|e| DappError::Artifact(format!("{}: bytecode is not hex: {}", name, e)))?;

        let abi_value = value
            .pointer("/output/abi")
            .or_else(|| value.get("abi"))
            .cloned()
            .ok_or_else(|| DappError::Artifact(format!("{}: missing ABI", name)))?;
        let abi: Abi = serde_json::from_value(abi_value)
            .map_err(|e| DappError::Artifact(format!("{}: invalid ABI: {}", name, e)))?;

        Ok(Self { name, abi, bytecode: Bytes::from(bytecode) })
    }

    pub fn from_file(name: impl Into<String>, path: &Path) -> Result<Self, DappError> {
        let name = name.into();
        let json = fs::read_to_string(path).map_err(|e| {
            DappError::Artifact(format!("{}: cannot read {}: {}", name, path.display(), e))
        })?;
        Self::from_json(name, &json)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn abi(&self) -> &Abi {
        &self.abi
    }

    pub fn bytecode(&self) -> &Bytes {
        &self.bytecode
    }
}
