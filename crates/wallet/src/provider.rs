//! Injected provider abstraction.
//!
//! The host environment supplies one or more wallet providers exposing the
//! uniform EIP-1193 `request({method, params})` interface plus
//! `accountsChanged`/`chainChanged` events. The app never owns the wallet;
//! it holds a non-owning handle for the lifetime of a session, and every
//! component receives the handle explicitly instead of reaching into ambient
//! global state.

use crate::{assets::WatchAssetParams, error::ProviderError};
use alloy_dyn_abi::TypedData;
use alloy_primitives::{Address, ChainId, TxHash};
use alloy_rpc_types::TransactionRequest;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::{fmt, sync::Arc};
use tokio::sync::broadcast;

/// Provider requests used by this crate, in the EIP-1193 wire shape.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum ProviderRequest {
    #[serde(rename = "eth_requestAccounts")]
    RequestAccounts,

    #[serde(rename = "eth_chainId")]
    ChainId,

    #[serde(rename = "personal_sign")]
    PersonalSign(String, Address),

    #[serde(rename = "eth_signTypedData_v4")]
    SignTypedData(Address, TypedData),

    #[serde(rename = "eth_call")]
    Call(TransactionRequest, String),

    #[serde(rename = "eth_sendTransaction")]
    SendTransaction([TransactionRequest; 1]),

    #[serde(rename = "eth_getTransactionReceipt")]
    GetTransactionReceipt([TxHash; 1]),

    #[serde(rename = "wallet_watchAsset")]
    WatchAsset(WatchAssetParams),
}

impl ProviderRequest {
    /// The JSON-RPC method name of this request.
    pub const fn method(&self) -> &'static str {
        match self {
            Self::RequestAccounts => "eth_requestAccounts",
            Self::ChainId => "eth_chainId",
            Self::PersonalSign(..) => "personal_sign",
            Self::SignTypedData(..) => "eth_signTypedData_v4",
            Self::Call(..) => "eth_call",
            Self::SendTransaction(..) => "eth_sendTransaction",
            Self::GetTransactionReceipt(..) => "eth_getTransactionReceipt",
            Self::WatchAsset(..) => "wallet_watchAsset",
        }
    }
}

/// Session-relevant events emitted by an injected provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The wallet's exposed account list changed. An empty list means the
    /// wallet disconnected or locked.
    AccountsChanged(Vec<Address>),
    /// The wallet switched to a different chain.
    ChainChanged(ChainId),
}

/// Handle to an injected EIP-1193 wallet provider.
#[async_trait]
pub trait ProviderHandle: fmt::Debug + Send + Sync {
    /// Issue a request and suspend until the wallet resolves or rejects it.
    async fn request(&self, req: ProviderRequest) -> Result<Value, ProviderError>;

    /// Subscribe to `accountsChanged`/`chainChanged` events.
    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;

    /// The wallet brand this provider self-identifies as, if any.
    fn label(&self) -> Option<&str> {
        None
    }
}

/// Select a provider among possibly multiple injected wallets.
///
/// Prefers the provider self-identifying as `preferred`, falls back to the
/// first available one, and yields `None` when the host exposes no wallet at
/// all. Absence is a normal outcome, not an error; no network or signing
/// calls are made.
pub fn resolve_provider(
    providers: &[Arc<dyn ProviderHandle>],
    preferred: &str,
) -> Option<Arc<dyn ProviderHandle>> {
    providers
        .iter()
        .find(|p| p.label().is_some_and(|label| label.eq_ignore_ascii_case(preferred)))
        .or_else(|| providers.first())
        .cloned()
}

/// Parse an `eth_chainId` result. Injected wallets disagree on whether the
/// quantity comes back as a hex string or a bare number.
pub(crate) fn parse_chain_id(value: &Value) -> Option<ChainId> {
    match value {
        Value::String(s) => {
            let digits = s.strip_prefix("0x").unwrap_or(s);
            ChainId::from_str_radix(digits, 16).ok()
        }
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}
