use std::path::Path;

use alloy::json_abi::JsonAbi;
use alloy::sol;

use crate::error::ChainError;

/// Event emitted by the factory for every token it deploys.
pub const TOKEN_CREATED_EVENT: &str = "TokenCreated";

sol! {
    /// Token factory: charges `CREATION_FEE` and deploys an ERC-20 per call.
    #[derive(Debug, PartialEq, Eq)]
    interface TokenFactory {
        event TokenCreated(
            address indexed tokenAddress,
            address indexed creator,
            string name,
            uint256 initialSupply,
            string imageURI
        );

        function CREATION_FEE() external view returns (uint256);

        function createToken(
            string name,
            string symbol,
            uint256 initialSupply,
            string imageURI
        ) external payable returns (address);
    }

    /// The slice of the ERC-20 metadata extension the listener needs.
    interface IERC20Metadata {
        function symbol() external view returns (string);
    }
}

/// JSON form of the factory ABI, matching the compiled-in binding.
pub fn factory_abi_json() -> serde_json::Value {
    serde_json::json!([
        {
            "type": "function",
            "name": "CREATION_FEE",
            "inputs": [],
            "outputs": [{ "name": "", "type": "uint256", "internalType": "uint256" }],
            "stateMutability": "view"
        },
        {
            "type": "function",
            "name": "createToken",
            "inputs": [
                { "name": "name", "type": "string", "internalType": "string" },
                { "name": "symbol", "type": "string", "internalType": "string" },
                { "name": "initialSupply", "type": "uint256", "internalType": "uint256" },
                { "name": "imageURI", "type": "string", "internalType": "string" }
            ],
            "outputs": [{ "name": "", "type": "address", "internalType": "address" }],
            "stateMutability": "payable"
        },
        {
            "type": "event",
            "name": "TokenCreated",
            "inputs": [
                { "name": "tokenAddress", "type": "address", "indexed": true, "internalType": "address" },
                { "name": "creator", "type": "address", "indexed": true, "internalType": "address" },
                { "name": "name", "type": "string", "indexed": false, "internalType": "string" },
                { "name": "initialSupply", "type": "uint256", "indexed": false, "internalType": "uint256" },
                { "name": "imageURI", "type": "string", "indexed": false, "internalType": "string" }
            ],
            "anonymous": false
        }
    ])
}

/// Parse an ABI from JSON. Accepts a bare ABI array or a compiler artifact
/// with an `abi` field.
pub fn parse_factory_abi(json: &str) -> Result<JsonAbi, ChainError> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| ChainError::Config(format!("factory ABI is not valid JSON: {e}")))?;
    let abi = match value {
        serde_json::Value::Object(mut artifact) => artifact
            .remove("abi")
            .ok_or_else(|| ChainError::Config("factory artifact has no `abi` field".into()))?,
        array => array,
    };
    serde_json::from_value(abi).map_err(|e| ChainError::Config(format!("invalid factory ABI: {e}")))
}

/// Load a factory ABI artifact from disk.
pub fn load_factory_abi(path: &Path) -> Result<JsonAbi, ChainError> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        ChainError::Config(format!("failed to read factory ABI {}: {e}", path.display()))
    })?;
    parse_factory_abi(&json)
}

/// The built-in factory ABI as a [`JsonAbi`].
pub fn default_factory_abi() -> Result<JsonAbi, ChainError> {
    parse_factory_abi(&factory_abi_json().to_string())
}
