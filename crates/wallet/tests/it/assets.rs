use crate::mock::{MockProvider, TOKEN, connected, manager_for};
use lombard_wallet::{
    AssetRegistrar, Erc20Asset, Erc721Asset, ProviderError, WalletError, WatchAssetParams,
};
use serde_json::json;

fn loan_note() -> WatchAssetParams {
    WatchAssetParams::Erc721(Erc721Asset {
        address: TOKEN,
        token_id: "42".into(),
        symbol: "LOAN".into(),
        name: "Loan Note #42".into(),
        image: "https://example.invalid/notes/42.png".into(),
    })
}

fn loan_token_asset() -> WatchAssetParams {
    WatchAssetParams::Erc20(Erc20Asset { address: TOKEN, symbol: "LLT".into(), decimals: Some(18) })
}

#[tokio::test]
async fn added_asset_reports_true() {
    let provider = MockProvider::new();
    let registrar = AssetRegistrar::new(connected(&provider).await);
    provider.respond("wallet_watchAsset", json!(true));

    assert_eq!(registrar.watch_asset(loan_token_asset()).await, Ok(true));

    let requests = provider.requests_for("wallet_watchAsset");
    assert_eq!(requests[0]["params"]["type"], "ERC20");
    assert_eq!(requests[0]["params"]["options"]["symbol"], "LLT");
}

#[tokio::test]
async fn declined_asset_is_false_not_an_error() {
    let provider = MockProvider::new();
    let registrar = AssetRegistrar::new(connected(&provider).await);
    provider.respond("wallet_watchAsset", json!(false));

    assert_eq!(registrar.watch_asset(loan_note()).await, Ok(false));
}

#[tokio::test]
async fn rejection_code_is_also_a_normal_decline() {
    let provider = MockProvider::new();
    let registrar = AssetRegistrar::new(connected(&provider).await);
    provider.fail("wallet_watchAsset", ProviderError::user_rejected());

    assert_eq!(registrar.watch_asset(loan_note()).await, Ok(false));
}

#[tokio::test]
async fn other_failures_are_errors() {
    let provider = MockProvider::new();
    let registrar = AssetRegistrar::new(connected(&provider).await);
    provider.fail("wallet_watchAsset", ProviderError::new(-32602, "invalid params"));

    assert_eq!(
        registrar.watch_asset(loan_note()).await,
        Err(WalletError::WatchAssetFailed("invalid params".into()))
    );
}

#[tokio::test]
async fn registration_requires_a_session() {
    let provider = MockProvider::new();
    let registrar = AssetRegistrar::new(manager_for(&provider));

    assert_eq!(registrar.watch_asset(loan_note()).await, Err(WalletError::ProviderNotFound));
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn nonfungible_options_carry_the_token_identity() {
    let provider = MockProvider::new();
    let registrar = AssetRegistrar::new(connected(&provider).await);
    provider.respond("wallet_watchAsset", json!(true));

    registrar.watch_asset(loan_note()).await.unwrap();

    let options = &provider.requests_for("wallet_watchAsset")[0]["params"]["options"];
    assert_eq!(options["tokenId"], "42");
    assert_eq!(options["name"], "Loan Note #42");
    assert_eq!(options["image"], "https://example.invalid/notes/42.png");
}
