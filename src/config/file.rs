//! File-based Configuration Provider
//!
//! Reads a JSON document; nested objects are addressed with dotted keys.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::sync::RwLock;

use super::ConfigResult;
use super::provider::ConfigProvider;

/// JSON file configuration provider. A missing file reads as empty.
pub struct FileConfigProvider {
    path: PathBuf,
    data: RwLock<Option<Value>>,
    auto_reload: bool,
}

impl FileConfigProvider {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(None),
            auto_reload: false,
        }
    }

    /// Re-read the file on every lookup.
    pub fn auto_reload(path: PathBuf) -> Self {
        Self {
            auto_reload: true,
            ..Self::new(path)
        }
    }

    async fn load(&self) -> ConfigResult<Value> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(Value::Object(Default::default()));
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    async fn snapshot(&self) -> ConfigResult<Value> {
        if !self.auto_reload
            && let Some(ref cached) = *self.data.read().await
        {
            return Ok(cached.clone());
        }

        let value = self.load().await?;
        *self.data.write().await = Some(value.clone());
        Ok(value)
    }

    pub async fn reload(&self) -> ConfigResult<()> {
        let value = self.load().await?;
        *self.data.write().await = Some(value);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn lookup<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(root, |current, part| current.get(part))
}

fn collect_keys(value: &Value, path: String, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                let child = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{}.{}", path, k)
                };
                collect_keys(v, child, out);
            }
        }
        _ => out.push(path),
    }
}

#[async_trait::async_trait]
impl ConfigProvider for FileConfigProvider {
    fn name(&self) -> &str {
        "file"
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        let data = self.snapshot().await?;
        Ok(match lookup(&data, key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(v) => Some(v.to_string()),
        })
    }

    async fn list_keys(&self, prefix: &str) -> ConfigResult<Vec<String>> {
        let data = self.snapshot().await?;
        let mut keys = Vec::new();
        collect_keys(&data, String::new(), &mut keys);
        keys.retain(|k| !k.is_empty() && k.starts_with(prefix));
        Ok(keys)
    }
}

impl std::fmt::Debug for FileConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigProvider")
            .field("path", &self.path)
            .field("auto_reload", &self.auto_reload)
            .finish()
    }
}
