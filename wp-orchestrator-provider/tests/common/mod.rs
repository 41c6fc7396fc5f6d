//! 共享测试工具和辅助函数
//!
//! 集成测试访问真实 API，缺少环境变量时自动跳过。

#![allow(dead_code)]

use std::env;
use std::sync::Arc;

use wp_orchestrator_provider::{ZoneCredentials, ZoneProvider, create_zone_provider};

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Option` 为 `Some`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_some {
    ($expr:expr $(,)?) => {{
        let opt = $expr;
        assert!(opt.is_some(), "expected Some(..), got None");
        let Some(val) = opt else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let opt = $expr;
        assert!(opt.is_some(), "{}", format_args!($($msg)+));
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// 测试上下文 - 封装 zone provider 和测试域名
pub struct TestContext {
    pub provider: Arc<dyn ZoneProvider>,
    pub domain: String,
}

impl TestContext {
    /// 创建 Cloudflare 测试上下文
    pub fn cloudflare() -> Option<Self> {
        let email = env::var("CLOUDFLARE_EMAIL").ok()?;
        let api_key = env::var("CLOUDFLARE_API_KEY").ok()?;
        let domain = env::var("TEST_DOMAIN").ok()?;

        let provider = create_zone_provider(ZoneCredentials { email, api_key }).ok()?;
        Some(Self { provider, domain })
    }
}
