use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{create_dir_all, read_to_string, write};

/// Where the bearer token for API requests lives between sessions.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn token(&self) -> Option<String>;
}

#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self(Some(token.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

#[async_trait]
impl TokenStore for StaticToken {
    async fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Token kept in a file. Read again on every request so a token written by
/// another process is picked up without restarting.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn token(&self) -> Option<String> {
        match read_to_string(&self.path).await {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    None
                } else {
                    Some(token.to_string())
                }
            }
            Err(err) => {
                log::debug!("No token at {}: {}", self.path.display(), err);
                None
            }
        }
    }
}

pub async fn save_token<P: AsRef<Path>>(path: P, token: &str) -> anyhow::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent).await?;
    }
    write(path, token.trim()).await?;
    Ok(())
}
