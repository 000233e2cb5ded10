//! # Lombard wallet authorization layer
//!
//! Client-side wallet plumbing for the Lombard peer-to-peer loan/auction
//! marketplace, following:
//! - [EIP-1193](https://eips.ethereum.org/EIPS/eip-1193): Ethereum provider
//!   requests and account/chain-change events
//! - [EIP-712](https://eips.ethereum.org/EIPS/eip-712) /
//!   [EIP-2612](https://eips.ethereum.org/EIPS/eip-2612): typed-data permit
//!   signatures authorizing token spending without an on-chain approval
//! - [EIP-747](https://eips.ethereum.org/EIPS/eip-747): asking the wallet to
//!   track marketplace assets
//!
//! ## Architecture
//!
//! Providers are dependency-injected as [`ProviderHandle`] trait objects;
//! nothing reaches into ambient global state, so every flow is testable
//! against a mock wallet. [`ConnectionManager`] owns the session and
//! coalesces concurrent connection prompts; [`SessionSigner`] produces login
//! and permit signatures; [`ApprovalCoordinator`] picks between the gasless
//! permit path and a direct approval transaction; [`AssetRegistrar`] and the
//! [`reminder`] module cover wallet-side asset tracking and its 24-hour
//! re-prompt gate.
//!
//! All failures are classified into [`WalletError`] and returned as values;
//! nothing in this layer is fatal to the application.

pub mod approval;
pub mod assets;
pub mod connection;
pub mod error;
pub mod provider;
pub mod reminder;
pub mod signer;
mod types;

pub use approval::{ApprovalCoordinator, ApprovalOutcome, ApprovalPath, ApprovalRequest};
pub use assets::{AssetRegistrar, Erc20Asset, Erc721Asset, WatchAssetParams};
pub use connection::ConnectionManager;
pub use error::{ProviderError, USER_REJECTED_REQUEST, WalletError};
pub use provider::{ProviderEvent, ProviderHandle, ProviderRequest, resolve_provider};
pub use signer::{PermitSignature, SessionSigner};
pub use types::{PermitToken, WalletSession};
