use async_trait::async_trait;
use merca_core::overrides::{namespaces, OverrideStore};
use merca_core::{CoreError, CoreResult};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory implementation of the override store. Each instance owns
/// its own maps, so tests and processes never share state the way the
/// original module-global maps did.
#[derive(Default)]
pub struct MemoryOverrideStore {
    entries: RwLock<HashMap<(String, String), serde_json::Value>>,
}

impl MemoryOverrideStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_namespace(namespace: &str) -> CoreResult<()> {
    if namespaces::ALL.contains(&namespace) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "unknown override namespace: {}",
            namespace
        )))
    }
}

#[async_trait]
impl OverrideStore for MemoryOverrideStore {
    async fn get(&self, namespace: &str, key: &str) -> CoreResult<Option<serde_json::Value>> {
        check_namespace(namespace)?;
        Ok(self
            .entries
            .read()
            .await
            .get(&(namespace.to_string(), key.to_string()))
            .cloned())
    }

    async fn set(&self, namespace: &str, key: &str, value: serde_json::Value) -> CoreResult<()> {
        check_namespace(namespace)?;
        self.entries
            .write()
            .await
            .insert((namespace.to_string(), key.to_string()), value);
        Ok(())
    }

    async fn remove(&self, namespace: &str, key: &str) -> CoreResult<bool> {
        check_namespace(namespace)?;
        Ok(self
            .entries
            .write()
            .await
            .remove(&(namespace.to_string(), key.to_string()))
            .is_some())
    }

    async fn list(&self, namespace: &str) -> CoreResult<Vec<(String, serde_json::Value)>> {
        check_namespace(namespace)?;
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|((_, key), value)| (key.clone(), value.clone()))
            .collect())
    }
}
