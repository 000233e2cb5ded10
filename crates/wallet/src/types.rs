use alloy_primitives::{Address, ChainId};
use serde::{Deserialize, Serialize};

/// An active wallet session.
///
/// Created when a connection succeeds and destroyed when the wallet reports
/// an empty account list; owned exclusively by the connection manager, read
/// by everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSession {
    pub address: Address,
    pub chain_id: ChainId,
}

/// The fixed EIP-712 domain parameters of a permit-capable token.
///
/// `name` and `version` must match what the verifying contract expects
/// exactly; a mismatch produces a signature the contract rejects on-chain,
/// which the client cannot detect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitToken {
    /// Token contract address, doubling as the domain's `verifyingContract`.
    pub address: Address,
    /// EIP-712 domain name, e.g. the token's name.
    pub name: String,
    /// EIP-712 domain version, typically `"1"`.
    pub version: String,
}
