//! Asset registration via `wallet_watchAsset`
//! ([EIP-747](https://eips.ethereum.org/EIPS/eip-747)).
//!
//! Unlike connection and signing flows, a user declining the watch-asset
//! dialog is a normal `Ok(false)` outcome rather than an error.

use crate::{connection::ConnectionManager, error::WalletError, provider::ProviderRequest};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// A fungible token to track in the wallet UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Erc20Asset {
    pub address: Address,
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
}

/// A specific non-fungible token to track in the wallet UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Erc721Asset {
    pub address: Address,
    pub token_id: String,
    pub symbol: String,
    pub name: String,
    pub image: String,
}

/// `wallet_watchAsset` parameters, serialized in the EIP-747 wire shape
/// `{"type": ..., "options": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "options")]
pub enum WatchAssetParams {
    #[serde(rename = "ERC20")]
    Erc20(Erc20Asset),
    #[serde(rename = "ERC721")]
    Erc721(Erc721Asset),
}

/// Asks the session's wallet to track an asset in its UI.
pub struct AssetRegistrar {
    connection: Arc<ConnectionManager>,
}

impl AssetRegistrar {
    pub fn new(connection: Arc<ConnectionManager>) -> Self {
        Self { connection }
    }

    /// Request that the wallet track `asset`.
    ///
    /// `Ok(true)` only when the wallet reports the asset was added. A user
    /// decline, whether reported as a `false` result or a 4001 rejection, is
    /// `Ok(false)`.
    pub async fn watch_asset(&self, asset: WatchAssetParams) -> Result<bool, WalletError> {
        let (_, provider) = self.connection.require_session()?;
        debug!(target: "wallet::assets", ?asset, "requesting watch asset");
        match provider.request(ProviderRequest::WatchAsset(asset)).await {
            Ok(added) => Ok(added.as_bool().unwrap_or(false)),
            Err(e) if e.is_user_rejection() => Ok(false),
            Err(e) => Err(WalletError::WatchAssetFailed(e.message)),
        }
    }
}
