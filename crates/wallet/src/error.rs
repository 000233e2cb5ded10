//! Error taxonomy for the wallet authorization layer.
//!
//! Every expected outcome is a typed result. The provider's raw EIP-1193
//! errors carry a numeric code; `4001` is the universal "user rejected"
//! signal and is classified into [`WalletError::UserRejected`] at every call
//! site where a prompt can be declined.

/// EIP-1193 error code emitted when the user declines a wallet prompt.
pub const USER_REJECTED_REQUEST: i64 = 4001;

/// Raw error returned by an injected provider's `request` call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("provider error {code}: {message}")]
pub struct ProviderError {
    /// EIP-1193 / JSON-RPC error code.
    pub code: i64,
    /// Human readable message from the wallet.
    pub message: String,
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// A canned user-rejection error, mostly useful in tests.
    pub fn user_rejected() -> Self {
        Self::new(USER_REJECTED_REQUEST, "user rejected the request")
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == USER_REJECTED_REQUEST
    }
}

/// Classified failures of the wallet authorization layer.
///
/// `Clone` is required so a coalesced in-flight connection future can hand
/// the same failure to every waiter; payloads are therefore plain strings
/// rather than chained sources.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    /// No injected wallet provider is available.
    #[error("no wallet provider found")]
    ProviderNotFound,
    /// The user declined a wallet prompt.
    #[error("user rejected the request")]
    UserRejected,
    /// The wallet failed to establish a connection.
    #[error("wallet connection failed: {0}")]
    ConnectionFailed(String),
    /// The wallet failed to produce a signature.
    #[error("signature request failed: {0}")]
    SignatureFailed(String),
    /// The approval transaction reverted or could not be submitted.
    #[error("approval transaction failed: {0}")]
    ApprovalTxFailed(String),
    /// A read-only contract call (permit nonce) failed.
    #[error("contract read failed: {0}")]
    ContractReadFailed(String),
    /// The permit deadline is not in the future. Rejected locally, before
    /// any provider traffic.
    #[error("permit deadline {deadline} is not after the current time {now}")]
    InvalidDeadline { deadline: u64, now: u64 },
    /// A `wallet_watchAsset` request failed for a reason other than the user
    /// declining it.
    #[error("watch asset request failed: {0}")]
    WatchAssetFailed(String),
}

impl WalletError {
    /// Classify a provider failure during connection establishment.
    pub(crate) fn connection(err: ProviderError) -> Self {
        if err.is_user_rejection() { Self::UserRejected } else { Self::ConnectionFailed(err.message) }
    }

    /// Classify a provider failure during a signing request.
    pub(crate) fn signature(err: ProviderError) -> Self {
        if err.is_user_rejection() { Self::UserRejected } else { Self::SignatureFailed(err.message) }
    }

    /// Classify a provider failure during approval submission.
    pub(crate) fn approval(err: ProviderError) -> Self {
        if err.is_user_rejection() { Self::UserRejected } else { Self::ApprovalTxFailed(err.message) }
    }
}
