//! Cloudflare 只读集成测试
//!
//! 需要 `CLOUDFLARE_EMAIL`、`CLOUDFLARE_API_KEY` 和 `TEST_DOMAIN`（账户中已存在的 zone）。

mod common;

use common::TestContext;

#[tokio::test]
async fn cloudflare_find_zone() {
    skip_if_no_credentials!("CLOUDFLARE_EMAIL", "CLOUDFLARE_API_KEY", "TEST_DOMAIN");

    let ctx = require_some!(TestContext::cloudflare(), "failed to build test context");
    let zone = require_ok!(ctx.provider.find_zone(&ctx.domain).await);
    let zone = require_some!(zone, "zone {} not found in account", ctx.domain);

    assert_eq!(zone.name, ctx.domain);
    assert!(zone.name_servers.len() >= 2);
}

#[tokio::test]
async fn cloudflare_list_records() {
    skip_if_no_credentials!("CLOUDFLARE_EMAIL", "CLOUDFLARE_API_KEY", "TEST_DOMAIN");

    let ctx = require_some!(TestContext::cloudflare(), "failed to build test context");
    let zone = require_ok!(ctx.provider.find_zone(&ctx.domain).await);
    let zone = require_some!(zone);

    let records = require_ok!(ctx.provider.list_records(&zone.id).await);
    for record in &records {
        assert!(record.name.ends_with(&ctx.domain));
    }
}

#[tokio::test]
async fn cloudflare_unknown_zone_is_none() {
    skip_if_no_credentials!("CLOUDFLARE_EMAIL", "CLOUDFLARE_API_KEY", "TEST_DOMAIN");

    let ctx = require_some!(TestContext::cloudflare(), "failed to build test context");
    let zone = require_ok!(
        ctx.provider
            .find_zone("wp-orchestrator-nonexistent-zone.invalid")
            .await
    );
    assert!(zone.is_none());
}
