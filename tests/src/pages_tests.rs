// =============================================================================
// Storefront Page Integration Tests
// =============================================================================
// Drives the HTML routes against a fake content store and a fake chain that
// also plays the wallet. Covers:
// - Gallery lists every collection with CDN preview URLs
// - Unknown slug renders the 404 page
// - Supply line and mint button label per drop state
// - Connect / disconnect redirects and the wallet banner
// - A mint submits exactly one claim transaction of one token
// - Failed mints surface the error toast only
// - A second mint while one is pending is refused with 409
//
// Run with:
//   cargo test -p storefront-integration-tests pages_tests

use crate::utils::*;
use alloy_primitives::hex;
use alloy_sol_types::SolCall;
use anyhow::Result;
use storefront::chain::IDropERC721;

#[tokio::test]
async fn test_gallery_lists_collections() -> Result<()> {
    let h = setup_storefront(default_collections(), ChainScript::default()).await?;

    let response = h.get("/").await?;
    assert_eq!(response.status(), 200);
    let html = response.text().await?;

    assert!(html.contains("The <span class=\"brand-name\">KYUMHO</span> NFT Market Place"));
    assert!(html.contains("href=\"/nft/ape-club\""));
    assert!(html.contains("href=\"/nft/ghost-drop\""));
    assert!(html.contains(
        "https://cdn.sanity.io/images/testproj/production/prevape-club-400x400.jpg"
    ));
    Ok(())
}

#[tokio::test]
async fn test_empty_gallery() -> Result<()> {
    let h = setup_storefront(vec![], ChainScript::default()).await?;
    let html = h.get("/").await?.text().await?;
    assert!(html.contains("No collections yet."));
    Ok(())
}

#[tokio::test]
async fn test_unknown_slug_renders_not_found() -> Result<()> {
    let h = setup_storefront(default_collections(), ChainScript::default()).await?;

    let response = h.get("/nft/does-not-exist").await?;
    assert_eq!(response.status(), 404);
    let html = response.text().await?;
    assert!(html.contains("404 - Collection not found"));
    assert!(!html.contains("mint-button"));
    Ok(())
}

#[tokio::test]
async fn test_detail_without_wallet() -> Result<()> {
    let h = setup_storefront(default_collections(), ChainScript::default()).await?;

    let response = h.get("/nft/ape-club").await?;
    assert_eq!(response.status(), 200);
    let html = response.text().await?;

    assert!(html.contains("13 / 21 NFT's claimed"));
    assert!(html.contains("<button class=\"mint-button\" disabled>Sign in to Mint</button>"));
    assert!(html.contains("Sign In"));
    assert!(html.contains("Ape Club Series"));
    assert!(html.contains("mainape-club-800x600.png"));
    assert!(!html.contains("You're logged in"));
    Ok(())
}

#[tokio::test]
async fn test_sold_out_disables_button_even_when_connected() -> Result<()> {
    let chain = ChainScript {
        claimed: 21,
        total: 21,
        ..ChainScript::default()
    };
    let h = setup_storefront(default_collections(), chain).await?;
    h.connect_wallet().await?;

    let html = h.get("/nft/ape-club").await?.text().await?;
    assert!(html.contains("21 / 21 NFT's claimed"));
    assert!(html.contains("<button class=\"mint-button\" disabled>SOLD OUT</button>"));
    Ok(())
}

#[tokio::test]
async fn test_connect_then_disconnect() -> Result<()> {
    let h = setup_storefront(default_collections(), ChainScript::default()).await?;

    let response = h
        .post_form("/wallet/connect", &[("return_to", "/nft/ape-club")])
        .await?;
    assert_eq!(response.status(), 303);
    assert_eq!(response.headers()["location"], "/nft/ape-club");

    let html = h.get("/nft/ape-club").await?.text().await?;
    assert!(html.contains("You're logged in with wallet 0xaaa...aaaaa"));
    assert!(html.contains("<button class=\"mint-button\">Mint NFT (0.01 ETH)</button>"));
    assert!(html.contains("Sign Out"));

    let response = h
        .post_form("/wallet/disconnect", &[("return_to", "/nft/ape-club")])
        .await?;
    assert_eq!(response.status(), 303);

    let html = h.get("/nft/ape-club").await?.text().await?;
    assert!(html.contains("disabled>Sign in to Mint</button>"));
    assert!(!html.contains("You're logged in"));
    Ok(())
}

#[tokio::test]
async fn test_connect_rejects_foreign_redirect() -> Result<()> {
    let h = setup_storefront(default_collections(), ChainScript::default()).await?;
    let response = h
        .post_form("/wallet/connect", &[("return_to", "https://evil.example/")])
        .await?;
    assert_eq!(response.status(), 303);
    assert_eq!(response.headers()["location"], "/");
    Ok(())
}

#[tokio::test]
async fn test_mint_submits_single_claim() -> Result<()> {
    let h = setup_storefront(default_collections(), ChainScript::default()).await?;
    h.connect_wallet().await?;

    let response = h.post_form("/nft/ape-club/mint", &[]).await?;
    assert_eq!(response.status(), 200);
    let html = response.text().await?;
    assert!(html.contains("HOORAY... You Successfully Minted!"));
    assert!(html.contains("data-duration-ms=\"8000\""));
    assert!(!html.contains("Minting..."));

    let sent = h.sent_transactions();
    assert_eq!(sent.len(), 1, "exactly one claim per click");
    let tx = &sent[0];
    assert_eq!(json_address(&tx["from"])?, wallet());
    assert_eq!(json_address(&tx["to"])?, drop_address());
    assert_eq!(tx["value"], "0x2386f26fc10000");

    let data = hex::decode(tx["data"].as_str().unwrap())?;
    assert_eq!(data.len(), 4 + 12 * 32);
    assert_eq!(data[..4], IDropERC721::claimCall::SELECTOR);
    let call = IDropERC721::claimCall::abi_decode(&data)?;
    assert_eq!(call.receiver, wallet());
    assert_eq!(call.quantity, 1, "quantity is one");
    Ok(())
}

#[tokio::test]
async fn test_concurrent_mint_is_refused() -> Result<()> {
    let (chain, gate) = gated_chain();
    let h = setup_storefront(default_collections(), chain).await?;
    h.connect_wallet().await?;

    let first = tokio::spawn({
        let client = h.client.clone();
        let url = h.url("/nft/ape-club/mint");
        async move { client.post(url).send().await }
    });
    h.wait_for_method("eth_sendTransaction").await?;

    let response = h.post_form("/nft/ape-club/mint", &[]).await?;
    assert_eq!(response.status(), 409);
    let html = response.text().await?;
    assert!(html.contains("A mint for this collection is already in progress"));
    assert!(!html.contains("HOORAY"));

    gate.notify_one();
    let response = first.await??;
    assert_eq!(response.status(), 200);
    assert!(response.text().await?.contains("HOORAY... You Successfully Minted!"));
    assert_eq!(h.sent_transactions().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_mint_on_unavailable_contract_is_silent() -> Result<()> {
    let h = setup_storefront(default_collections(), ChainScript::default()).await?;
    h.connect_wallet().await?;

    let response = h.post_form("/nft/ghost-drop/mint", &[]).await?;
    assert_eq!(response.status(), 200);
    let html = response.text().await?;
    assert!(html.contains("Minting is currently unavailable"));
    assert!(!html.contains("role=\"status\""), "no toast raised");
    assert!(h.sent_transactions().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_mint_without_wallet_sends_nothing() -> Result<()> {
    let h = setup_storefront(default_collections(), ChainScript::default()).await?;

    let response = h.post_form("/nft/ape-club/mint", &[]).await?;
    assert_eq!(response.status(), 200);
    let html = response.text().await?;
    assert!(html.contains("disabled>Sign in to Mint</button>"));
    assert!(h.sent_transactions().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_rejected_mint_shows_error_toast() -> Result<()> {
    let chain = ChainScript {
        reject_send: true,
        ..ChainScript::default()
    };
    let h = setup_storefront(default_collections(), chain).await?;
    h.connect_wallet().await?;

    let html = h.post_form("/nft/ape-club/mint", &[]).await?.text().await?;
    assert!(html.contains("toast toast-error"));
    assert!(html.contains("Whoops... Something went wrong!"));
    assert!(!html.contains("toast-pending"));
    assert!(!html.contains("HOORAY"));
    assert_eq!(h.sent_transactions().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_undeployed_contract_reports_unavailable() -> Result<()> {
    let h = setup_storefront(default_collections(), ChainScript::default()).await?;

    let response = h.get("/nft/ghost-drop").await?;
    assert_eq!(response.status(), 200);
    let html = response.text().await?;
    assert!(html.contains("Minting is currently unavailable"));
    assert!(html.contains("disabled>Loading</button>"));
    Ok(())
}

#[tokio::test]
async fn test_content_store_outage_is_bad_gateway() -> Result<()> {
    let h = setup_storefront(default_collections(), ChainScript::default()).await?;
    h.content.lock().unwrap().fail_with = Some(500);

    let response = h.get("/").await?;
    assert_eq!(response.status(), 502);
    assert!(response.text().await?.contains("Something went wrong"));

    let response = h.get("/nft/ape-club").await?;
    assert_eq!(response.status(), 502);
    Ok(())
}
