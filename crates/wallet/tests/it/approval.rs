use crate::mock::{
    ALICE, MockProvider, SPENDER, abi_word, connected, loan_token, raw_signature,
};
use alloy_primitives::{TxHash, U256, b256};
use lombard_wallet::{
    ApprovalCoordinator, ApprovalOutcome, ApprovalPath, ApprovalRequest, ProviderError,
    SessionSigner, WalletError,
};
use serde_json::json;
use std::{
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

const HASH: TxHash = b256!("0x1111111111111111111111111111111111111111111111111111111111111111");

fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
}

fn request(path: ApprovalPath) -> ApprovalRequest {
    ApprovalRequest {
        token: loan_token(),
        owner: ALICE,
        spender: SPENDER,
        amount: U256::from(1000),
        deadline: unix_now() + 3600,
        path,
    }
}

async fn coordinator(provider: &Arc<MockProvider>) -> ApprovalCoordinator {
    let manager = connected(provider).await;
    let signer = Arc::new(SessionSigner::new(manager.clone()));
    ApprovalCoordinator::new(manager, signer).with_poll_interval(Duration::from_millis(10))
}

#[tokio::test]
async fn permit_path_yields_an_offchain_artifact() {
    let provider = MockProvider::new();
    let coordinator = coordinator(&provider).await;
    provider.respond("eth_call", abi_word(5));
    provider.respond("eth_signTypedData_v4", raw_signature());

    let outcome = coordinator.approve(request(ApprovalPath::Permit)).await.unwrap();
    let ApprovalOutcome::Permit(permit) = outcome else {
        panic!("expected a permit outcome");
    };
    assert_eq!(permit.nonce, U256::from(5));

    // Gasless: the client submitted no transaction.
    assert!(provider.requests_for("eth_sendTransaction").is_empty());
}

#[tokio::test]
async fn transaction_path_awaits_inclusion() {
    let provider = MockProvider::new();
    let coordinator = coordinator(&provider).await;
    provider.respond("eth_sendTransaction", json!(HASH));
    provider.respond("eth_getTransactionReceipt", json!(null));
    provider.respond("eth_getTransactionReceipt", json!({"status": "0x1"}));

    let outcome = coordinator.approve(request(ApprovalPath::Transaction)).await.unwrap();
    assert_eq!(outcome, ApprovalOutcome::Transaction(HASH));

    // Kept polling past the pending result.
    assert_eq!(provider.requests_for("eth_getTransactionReceipt").len(), 2);

    // The submitted calldata is approve(address,uint256).
    let sent = &provider.requests_for("eth_sendTransaction")[0];
    let input = sent["params"][0]["input"].as_str().unwrap();
    assert!(input.starts_with("0x095ea7b3"));

    // The permit machinery stays untouched on this path.
    assert!(provider.requests_for("eth_call").is_empty());
    assert!(provider.requests_for("eth_signTypedData_v4").is_empty());
}

#[tokio::test]
async fn reverted_approval_is_reported() {
    let provider = MockProvider::new();
    let coordinator = coordinator(&provider).await;
    provider.respond("eth_sendTransaction", json!(HASH));
    provider.respond("eth_getTransactionReceipt", json!({"status": "0x0"}));

    let result = coordinator.approve(request(ApprovalPath::Transaction)).await;
    assert_eq!(result, Err(WalletError::ApprovalTxFailed("transaction reverted".into())));
}

#[tokio::test]
async fn rejected_submission_is_classified() {
    let provider = MockProvider::new();
    let coordinator = coordinator(&provider).await;
    provider.fail("eth_sendTransaction", ProviderError::user_rejected());

    let result = coordinator.approve(request(ApprovalPath::Transaction)).await;
    assert_eq!(result, Err(WalletError::UserRejected));
}

#[tokio::test]
async fn submission_failure_is_approval_tx_failed() {
    let provider = MockProvider::new();
    let coordinator = coordinator(&provider).await;
    provider.fail("eth_sendTransaction", ProviderError::new(-32000, "insufficient funds"));

    let result = coordinator.approve(request(ApprovalPath::Transaction)).await;
    assert_eq!(result, Err(WalletError::ApprovalTxFailed("insufficient funds".into())));
}

#[tokio::test]
async fn permit_failure_does_not_fall_back_to_a_transaction() {
    let provider = MockProvider::new();
    let coordinator = coordinator(&provider).await;
    provider.respond("eth_call", abi_word(5));
    provider.fail("eth_signTypedData_v4", ProviderError::user_rejected());

    let result = coordinator.approve(request(ApprovalPath::Permit)).await;
    assert_eq!(result, Err(WalletError::UserRejected));
    assert!(provider.requests_for("eth_sendTransaction").is_empty());
}
