//! 密钥仓库抽象 Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::KeyMaterial;

/// Per-server key pairs, addressed by server address.
///
/// 平台实现:
/// - `FileKeyRepository`: one OpenSSH key file (0600) plus `.pub` per server
/// - `MemoryKeyRepository`: tests
#[async_trait]
pub trait KeyRepository: Send + Sync {
    /// 获取服务器密钥
    ///
    /// # Returns
    /// * `Ok(Some(key))` - 密钥存在
    /// * `Ok(None)` - 尚未生成
    async fn get(&self, server: &str) -> CoreResult<Option<KeyMaterial>>;

    /// Return the existing key pair or generate and store a new one.
    ///
    /// A key pair is generated once per server; later calls return the same one.
    async fn get_or_create(&self, server: &str) -> CoreResult<KeyMaterial>;

    /// 删除密钥（服务器退役）
    async fn remove(&self, server: &str) -> CoreResult<()>;
}
