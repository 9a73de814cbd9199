//! Where discoveries go.

use std::collections::HashMap;
use std::fmt;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Context;
use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// An address whose TLS certificate named a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub address: Ipv4Addr,
    pub common_name: String,
}

impl fmt::Display for Discovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "https://{} - {}", self.address, self.common_name)
    }
}

#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Appends one record to the output identified by `key`.
    ///
    /// Concurrent appends to the same key must never interleave partial lines.
    async fn append(&self, key: &str, record: &Discovery) -> anyhow::Result<()>;
}

/// One append-only text file per key, inside `dir`.
#[derive(Debug)]
pub struct FileSink {
    dir: PathBuf,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn lock_for(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(key.to_string()).or_default())
    }
}

#[async_trait]
impl ResultSink for FileSink {
    async fn append(&self, key: &str, record: &Discovery) -> anyhow::Result<()> {
        let path: PathBuf = self.path_for(key);
        let line: String = format!("{record}\n");

        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("opening {}", path.display()))?;
        file.write_all(line.as_bytes())
            .await
            .with_context(|| format!("writing to {}", path.display()))?;
        file.flush().await?;

        Ok(())
    }
}
