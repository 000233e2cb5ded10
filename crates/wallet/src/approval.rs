//! Token spending authorization.
//!
//! The preferred path produces an off-chain permit signature that a relayer
//! or the spender contract submits together with its own call, so the user
//! pays no gas. When the token does not support permits, or the caller wants
//! an on-chain allowance, the fallback path submits a direct `approve`
//! transaction and awaits its inclusion. The caller picks the path; there is
//! no automatic fallback from one to the other.

use crate::{
    connection::ConnectionManager,
    error::WalletError,
    provider::ProviderRequest,
    signer::{PermitSignature, SessionSigner},
    types::PermitToken,
};
use alloy_primitives::{Address, TxHash, U64, U256};
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use alloy_sol_types::{SolCall, sol};
use serde::Deserialize;
use std::{sync::Arc, time::Duration};
use tracing::trace;

sol! {
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// How an approval should be authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalPath {
    /// Sign an EIP-2612 permit; no transaction is submitted by the client.
    Permit,
    /// Submit an on-chain `approve` transaction and await inclusion.
    Transaction,
}

/// Parameters of a single approval request.
#[derive(Debug, Clone)]
pub struct ApprovalRequest {
    pub token: PermitToken,
    pub owner: Address,
    pub spender: Address,
    pub amount: U256,
    /// Permit expiry; only consulted on the permit path.
    pub deadline: u64,
    pub path: ApprovalPath,
}

/// The artifact produced by a successful approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// Off-chain authorization for a relayer or spender contract to submit.
    Permit(PermitSignature),
    /// Hash of the confirmed on-chain approval transaction.
    Transaction(TxHash),
}

/// Minimal receipt view; only inclusion and revert status matter here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptStatus {
    #[serde(default)]
    status: Option<U64>,
}

/// Orchestrates the two authorization paths against the active session.
pub struct ApprovalCoordinator {
    connection: Arc<ConnectionManager>,
    signer: Arc<SessionSigner>,
    poll_interval: Duration,
}

impl ApprovalCoordinator {
    pub fn new(connection: Arc<ConnectionManager>, signer: Arc<SessionSigner>) -> Self {
        Self { connection, signer, poll_interval: Duration::from_secs(1) }
    }

    /// Override the receipt polling interval. There is no polling timeout; a
    /// pending transaction blocks only the awaiting caller.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Authorize `spender` to move `amount` of the token on the caller's
    /// chosen path.
    pub async fn approve(&self, req: ApprovalRequest) -> Result<ApprovalOutcome, WalletError> {
        match req.path {
            ApprovalPath::Permit => self
                .signer
                .sign_permit(&req.token, req.owner, req.spender, req.amount, req.deadline)
                .await
                .map(ApprovalOutcome::Permit),
            ApprovalPath::Transaction => self.approve_onchain(&req).await,
        }
    }

    async fn approve_onchain(&self, req: &ApprovalRequest) -> Result<ApprovalOutcome, WalletError> {
        let (_, provider) = self.connection.require_session()?;

        let calldata =
            IERC20::approveCall { spender: req.spender, amount: req.amount }.abi_encode();
        let tx = TransactionRequest {
            from: Some(req.owner),
            to: Some(req.token.address.into()),
            input: TransactionInput::new(calldata.into()),
            ..Default::default()
        };

        let raw = provider
            .request(ProviderRequest::SendTransaction([tx]))
            .await
            .map_err(WalletError::approval)?;
        let hash: TxHash = serde_json::from_value(raw)
            .map_err(|e| WalletError::ApprovalTxFailed(format!("malformed tx hash: {e}")))?;
        trace!(target: "wallet::approval", %hash, "approval submitted, awaiting inclusion");

        loop {
            let raw = provider
                .request(ProviderRequest::GetTransactionReceipt([hash]))
                .await
                .map_err(WalletError::approval)?;
            if !raw.is_null() {
                let receipt: ReceiptStatus = serde_json::from_value(raw).map_err(|e| {
                    WalletError::ApprovalTxFailed(format!("malformed receipt: {e}"))
                })?;
                if receipt.status == Some(U64::ZERO) {
                    return Err(WalletError::ApprovalTxFailed("transaction reverted".into()));
                }
                trace!(target: "wallet::approval", %hash, "approval confirmed");
                return Ok(ApprovalOutcome::Transaction(hash));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
