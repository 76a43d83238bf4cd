//! Local signing wallet.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables or explicit input
//! - Keys are never logged or serialized

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "MARKET_PRIVATE_KEY";

/// Signing account the gateway submits transactions from.
#[derive(Debug, Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string (with or without 0x prefix).
    pub fn from_private_key(private_key_hex: &str) -> BlockchainResult<Self> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        tracing::info!(address = %signer.address(), "Wallet initialized");

        Ok(Self { signer })
    }

    /// Load wallet from the `MARKET_PRIVATE_KEY` environment variable.
    pub fn from_env() -> BlockchainResult<Self> {
        let private_key = std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            BlockchainError::Wallet(format!(
                "Environment variable {} not set",
                PRIVATE_KEY_ENV_VAR
            ))
        })?;

        Self::from_private_key(&private_key)
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Wrap the signer for use as a provider filler.
    pub fn to_ethereum_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_wallet_from_private_key() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(
            wallet.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_wallet_with_0x_prefix_and_whitespace() {
        let wallet = Wallet::from_private_key(&format!(" 0x{}\n", TEST_PRIVATE_KEY)).unwrap();
        assert_eq!(
            wallet.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_invalid_private_key() {
        let result = Wallet::from_private_key("invalid_key");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid private key"));
    }
}
