//! Message and typed-data signing against the active session.
//!
//! Produces two kinds of attestations: a plain `personal_sign` signature for
//! login challenges, and an [EIP-2612](https://eips.ethereum.org/EIPS/eip-2612)
//! permit signed as [EIP-712](https://eips.ethereum.org/EIPS/eip-712) typed
//! data, authorizing token spending without an on-chain approval
//! transaction. Signatures are opaque bytes; the client never parses them.

use crate::{
    connection::ConnectionManager,
    error::WalletError,
    provider::{ProviderHandle, ProviderRequest},
    types::PermitToken,
};
use alloy_primitives::{Address, Bytes, U256, hex};
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use alloy_sol_types::{Eip712Domain, SolCall, sol};
use serde_json::Value;
use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};
use tracing::debug;

sol! {
    /// EIP-2612 permit message.
    #[derive(serde::Serialize)]
    struct Permit {
        address owner;
        address spender;
        uint256 value;
        uint256 nonce;
        uint256 deadline;
    }

    interface IERC2612 {
        function nonces(address owner) external view returns (uint256);
    }
}

/// A signed permit, together with the message fields a relayer or spender
/// contract must submit alongside the raw signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermitSignature {
    /// Opaque signature bytes, never parsed client-side.
    pub signature: Bytes,
    /// The on-chain nonce the permit was built against.
    pub nonce: U256,
    /// Unix timestamp after which the contract must refuse the permit.
    pub deadline: u64,
    /// The approved spending amount.
    pub value: U256,
}

/// Requests signatures from the wallet backing the active session.
pub struct SessionSigner {
    connection: Arc<ConnectionManager>,
    /// Serializes signature prompts; wallets reject concurrent ones.
    prompt: tokio::sync::Mutex<()>,
}

impl SessionSigner {
    pub fn new(connection: Arc<ConnectionManager>) -> Self {
        Self { connection, prompt: tokio::sync::Mutex::new(()) }
    }

    /// Request a plain personal-message signature from the wallet.
    pub async fn sign_message(&self, message: &str) -> Result<Bytes, WalletError> {
        let (session, provider) = self.connection.require_session()?;
        let encoded = format!("0x{}", hex::encode(message.as_bytes()));

        let _prompt = self.prompt.lock().await;
        debug!(target: "wallet::signer", address = %session.address, "requesting personal_sign");
        let signature = provider
            .request(ProviderRequest::PersonalSign(encoded, session.address))
            .await
            .map_err(WalletError::signature)?;
        parse_signature(signature)
    }

    /// Build and sign an EIP-2612 permit.
    ///
    /// The deadline is validated locally before any provider traffic, and
    /// the permit nonce is read fresh from the token contract on every call;
    /// a stale nonce makes the contract reject the signature.
    pub async fn sign_permit(
        &self,
        token: &PermitToken,
        owner: Address,
        spender: Address,
        value: U256,
        deadline: u64,
    ) -> Result<PermitSignature, WalletError> {
        let now = unix_now();
        if deadline <= now {
            return Err(WalletError::InvalidDeadline { deadline, now });
        }

        let (session, provider) = self.connection.require_session()?;
        let nonce = read_permit_nonce(provider.as_ref(), token, owner).await?;

        let domain = Eip712Domain::new(
            Some(token.name.clone().into()),
            Some(token.version.clone().into()),
            Some(U256::from(session.chain_id)),
            Some(token.address),
            None,
        );
        let permit =
            Permit { owner, spender, value, nonce, deadline: U256::from(deadline) };
        let payload = alloy_dyn_abi::TypedData::from_struct(&permit, Some(domain));

        let _prompt = self.prompt.lock().await;
        debug!(
            target: "wallet::signer",
            token = %token.address, %owner, %spender, %nonce, deadline,
            "requesting permit signature"
        );
        let signature = provider
            .request(ProviderRequest::SignTypedData(owner, payload))
            .await
            .map_err(WalletError::signature)?;
        Ok(PermitSignature { signature: parse_signature(signature)?, nonce, deadline, value })
    }
}

/// Read the token's current permit nonce for `owner` with an `eth_call` to
/// `nonces(address)`. Failures are surfaced as
/// [`WalletError::ContractReadFailed`] and never retried here.
async fn read_permit_nonce(
    provider: &dyn ProviderHandle,
    token: &PermitToken,
    owner: Address,
) -> Result<U256, WalletError> {
    let calldata = IERC2612::noncesCall { owner }.abi_encode();
    let call = TransactionRequest {
        to: Some(token.address.into()),
        input: TransactionInput::new(calldata.into()),
        ..Default::default()
    };
    let raw = provider
        .request(ProviderRequest::Call(call, "latest".into()))
        .await
        .map_err(|e| WalletError::ContractReadFailed(e.message))?;
    let data: Bytes = serde_json::from_value(raw)
        .map_err(|e| WalletError::ContractReadFailed(format!("malformed call result: {e}")))?;
    IERC2612::noncesCall::abi_decode_returns(&data)
        .map_err(|e| WalletError::ContractReadFailed(e.to_string()))
}

fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default()
}

fn parse_signature(value: Value) -> Result<Bytes, WalletError> {
    serde_json::from_value(value)
        .map_err(|e| WalletError::SignatureFailed(format!("malformed signature: {e}")))
}
