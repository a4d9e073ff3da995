use crate::CoreResult;
use async_trait::async_trait;

/// Namespaces the portal stores overrides under.
pub mod namespaces {
    pub const PRODUCT: &str = "product";
    pub const VARIANT: &str = "variant";
    pub const TAG: &str = "tag";

    pub const ALL: &[&str] = &[PRODUCT, VARIANT, TAG];
}

/// Namespaced key-value facade over the demo's tag/product/variant
/// override maps. Injected wherever overrides are consulted so each test
/// (and each process) owns its own state; implementations live in the
/// store crate.
#[async_trait]
pub trait OverrideStore: Send + Sync {
    async fn get(&self, namespace: &str, key: &str) -> CoreResult<Option<serde_json::Value>>;

    async fn set(&self, namespace: &str, key: &str, value: serde_json::Value) -> CoreResult<()>;

    /// Returns true when an entry was actually removed.
    async fn remove(&self, namespace: &str, key: &str) -> CoreResult<bool>;

    async fn list(&self, namespace: &str) -> CoreResult<Vec<(String, serde_json::Value)>>;
}
